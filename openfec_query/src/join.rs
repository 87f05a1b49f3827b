//! Explicit join specifications consumed by [`Query::join`](crate::Query::join).

use crate::expr::Condition;
use crate::schema::Model;
use crate::value::SqlValue;

/// A `LEFT JOIN` against a registered model with its `ON` conditions.
///
/// Built eagerly (see `openfec_lib::relations`) rather than resolved lazily
/// at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    model: String,
    table: String,
    conditions: Vec<Condition>,
}

impl JoinSpec {
    pub fn new(target: &Model) -> Self {
        Self {
            model: target.name().to_string(),
            table: target.table().to_string(),
            conditions: Vec::new(),
        }
    }

    pub fn on(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        sql.push_str(" LEFT JOIN ");
        sql.push_str(&self.table);
        if self.conditions.is_empty() {
            sql.push_str(" ON 1=1");
            return;
        }
        sql.push_str(" ON ");
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            condition.render(sql, params);
        }
    }
}

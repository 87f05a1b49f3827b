//! The deferred [`Query`] value and its ordering terms.

use crate::expr::{Condition, Expr};
use crate::join::JoinSpec;
use crate::schema::{ColumnType, Model};
use crate::value::SqlValue;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (smallest first). This is the default.
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        matches!(self, Self::Asc)
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Explicit placement of NULLs within an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub expr: Expr,
    pub direction: SortDirection,
    pub nulls: Option<NullsOrder>,
}

impl OrderTerm {
    pub fn new(expr: Expr, direction: SortDirection) -> Self {
        Self {
            expr,
            direction,
            nulls: None,
        }
    }

    pub fn with_nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        self.expr.render(sql, params);
        sql.push(' ');
        sql.push_str(self.direction.sql());
        match self.nulls {
            Some(NullsOrder::First) => sql.push_str(" NULLS FIRST"),
            Some(NullsOrder::Last) => sql.push_str(" NULLS LAST"),
            None => {}
        }
    }
}

/// Rows of one model matching a set of filters, optionally joined, ordered
/// and limited.
///
/// Every builder method returns a new value; nothing runs until an executor
/// renders the query with [`Query::to_sql`] and executes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    model: Model,
    extra_columns: Vec<(Expr, String)>,
    joins: Vec<JoinSpec>,
    filters: Vec<Condition>,
    order: Vec<OrderTerm>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Query {
    pub fn new(model: &Model) -> Self {
        Self {
            model: model.clone(),
            extra_columns: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Adds a join. A second join against the same table is ignored.
    pub fn join(mut self, join: JoinSpec) -> Self {
        if !self.joins.iter().any(|j| j.table() == join.table()) {
            self.joins.push(join);
        }
        self
    }

    /// Selects an extra expression under `alias`, after the model's columns.
    pub fn add_column(mut self, expr: impl Into<Expr>, alias: &str) -> Self {
        self.extra_columns.push((expr.into(), alias.to_string()));
        self
    }

    pub fn order_by(mut self, term: OrderTerm) -> Self {
        self.order.push(term);
        self
    }

    pub fn clear_order(mut self) -> Self {
        self.order.clear();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn filters(&self) -> &[Condition] {
        &self.filters
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    pub fn ordering(&self) -> &[OrderTerm] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    /// Names of the selected fields, in result-column order.
    pub fn column_names(&self) -> Vec<String> {
        self.model
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .chain(self.extra_columns.iter().map(|(_, alias)| alias.clone()))
            .collect()
    }

    /// Declared types of the selected fields, aligned with
    /// [`Query::column_names`]. Computed columns report the type of the
    /// column they wrap, if any.
    pub fn column_types(&self) -> Vec<Option<ColumnType>> {
        self.model
            .columns()
            .iter()
            .map(|c| Some(c.column_type))
            .chain(self.extra_columns.iter().map(|(expr, _)| expr.column_type()))
            .collect()
    }

    /// Renders the full `SELECT` with positional (`?N`) parameters.
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");
        let mut first = true;
        for column in self.model.columns() {
            if !first {
                sql.push_str(", ");
            }
            sql.push_str(&column.qualified());
            first = false;
        }
        for (expr, alias) in &self.extra_columns {
            if !first {
                sql.push_str(", ");
            }
            expr.render(&mut sql, &mut params);
            sql.push_str(" AS ");
            sql.push_str(alias);
            first = false;
        }
        self.render_from(&mut sql, &mut params);

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, term) in self.order.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                term.render(&mut sql, &mut params);
            }
        }
        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = self.offset {
            if self.limit.is_none() {
                sql.push_str(" LIMIT -1");
            }
            sql.push_str(&format!(" OFFSET {}", n));
        }
        (sql, params)
    }

    /// Renders `SELECT COUNT(*)` over the same joins and filters, ignoring
    /// ordering, limit and offset.
    pub fn count_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();
        let mut sql = String::from("SELECT COUNT(*)");
        self.render_from(&mut sql, &mut params);
        (sql, params)
    }

    fn render_from(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        sql.push_str(" FROM ");
        sql.push_str(self.model.table());
        for join in &self.joins {
            join.render(sql, params);
        }
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            for (i, condition) in self.filters.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                condition.render(sql, params);
            }
        }
    }
}

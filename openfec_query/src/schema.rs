//! Column and model descriptors, plus the name-keyed model registry.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::errors::Error;
use crate::expr::{Condition, Expr};
use crate::query::{OrderTerm, SortDirection};
use crate::value::SqlValue;

/// Declared storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Date,
    Text,
    Boolean,
}

impl ColumnType {
    /// Lowercase category name, used to key the null sentinel tables.
    pub fn category(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Float => "float",
            Self::Date => "date",
            Self::Text => "text",
            Self::Boolean => "bool",
        }
    }

    /// Parse a raw request parameter into a typed value for this column.
    ///
    /// Dates accept `YYYY-MM-DD`, optionally followed by a `T` or space and a
    /// time part, which is dropped.
    pub fn parse_value(self, raw: &str) -> Result<SqlValue, Error> {
        let trimmed = raw.trim();
        let invalid = || Error::InvalidValue {
            category: self.category(),
            value: raw.to_string(),
        };
        match self {
            Self::Integer => trimmed
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|_| invalid()),
            Self::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(SqlValue::Real)
                .ok_or_else(invalid),
            Self::Date => {
                let date_part = match trimmed.char_indices().nth(10) {
                    Some((idx, 'T')) | Some((idx, ' ')) => &trimmed[..idx],
                    _ => trimmed,
                };
                NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                    .map(SqlValue::Date)
                    .map_err(|_| invalid())
            }
            Self::Text => Ok(SqlValue::Text(raw.to_string())),
            Self::Boolean => match trimmed.to_lowercase().as_str() {
                "true" | "1" => Ok(SqlValue::Integer(1)),
                "false" | "0" => Ok(SqlValue::Integer(0)),
                _ => Err(invalid()),
            },
        }
    }
}

/// A column of a registered table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub table: String,
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl Column {
    pub fn new(table: &str, name: &str, column_type: ColumnType) -> Self {
        Self {
            table: table.to_string(),
            name: name.to_string(),
            column_type,
            nullable: true,
            primary_key: false,
        }
    }

    /// Attribute key under which row values for this column are stored.
    pub fn key(&self) -> &str {
        &self.name
    }

    /// `table.column`, as rendered into SQL.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    pub fn expr(&self) -> Expr {
        Expr::Column(self.clone())
    }

    pub fn eq(&self, rhs: impl Into<Expr>) -> Condition {
        self.expr().eq(rhs)
    }

    pub fn is_null(&self) -> Condition {
        self.expr().is_null()
    }

    pub fn is_not_null(&self) -> Condition {
        self.expr().is_not_null()
    }

    pub fn asc(&self) -> OrderTerm {
        OrderTerm::new(self.expr(), SortDirection::Asc)
    }

    pub fn desc(&self) -> OrderTerm {
        OrderTerm::new(self.expr(), SortDirection::Desc)
    }
}

/// Schema descriptor for one table: its registry name, SQL table name and
/// columns in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    table: String,
    columns: Vec<Column>,
}

impl Model {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            columns: Vec::new(),
        }
    }

    /// Adds the primary key column. Primary keys are never nullable.
    pub fn with_primary_key(mut self, name: &str, column_type: ColumnType) -> Self {
        let mut column = Column::new(&self.table, name, column_type);
        column.primary_key = true;
        column.nullable = false;
        self.columns.push(column);
        self
    }

    pub fn with_column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(Column::new(&self.table, name, column_type));
        self
    }

    pub fn with_required_column(mut self, name: &str, column_type: ColumnType) -> Self {
        let mut column = Column::new(&self.table, name, column_type);
        column.nullable = false;
        self.columns.push(column);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn try_column(&self, name: &str) -> Result<&Column, Error> {
        self.column(name).ok_or_else(|| Error::UnknownColumn {
            model: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// First primary key column, the default index column for seek paging.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// Models keyed by name, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Model>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.register(model);
        self
    }

    /// Registers a model, replacing any previous model with the same name.
    pub fn register(&mut self, model: Model) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn try_get(&self, name: &str) -> Result<&Model, Error> {
        self.get(name)
            .ok_or_else(|| Error::UnknownModel(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

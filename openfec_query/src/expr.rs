//! Scalar expressions and boolean conditions, with SQL rendering.

use chrono::NaiveDate;

use crate::schema::{Column, ColumnType};
use crate::value::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mod,
}

impl ArithOp {
    fn sql(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mod => "%",
        }
    }
}

/// A scalar SQL expression. Values always render as bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    Value(SqlValue),
    Coalesce(Vec<Expr>),
    /// Row value, e.g. `(a, b)`, for composite comparisons.
    Tuple(Vec<Expr>),
    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Case {
        whens: Vec<(Condition, Expr)>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn value(value: impl Into<SqlValue>) -> Self {
        Self::Value(value.into())
    }

    /// `COALESCE(self, fallback)`.
    pub fn coalesce(self, fallback: SqlValue) -> Self {
        Self::Coalesce(vec![self, Self::Value(fallback)])
    }

    pub fn plus(self, rhs: impl Into<Expr>) -> Self {
        self.arith(ArithOp::Add, rhs.into())
    }

    pub fn minus(self, rhs: impl Into<Expr>) -> Self {
        self.arith(ArithOp::Sub, rhs.into())
    }

    pub fn modulo(self, rhs: impl Into<Expr>) -> Self {
        self.arith(ArithOp::Mod, rhs.into())
    }

    fn arith(self, op: ArithOp, rhs: Expr) -> Self {
        Self::Arith {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    pub fn compare(self, op: CompareOp, rhs: impl Into<Expr>) -> Condition {
        Condition::Compare {
            lhs: self,
            op,
            rhs: rhs.into(),
        }
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Condition {
        self.compare(CompareOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Expr>) -> Condition {
        self.compare(CompareOp::NotEq, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Condition {
        self.compare(CompareOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Condition {
        self.compare(CompareOp::GtEq, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Condition {
        self.compare(CompareOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Condition {
        self.compare(CompareOp::LtEq, rhs)
    }

    pub fn is_null(self) -> Condition {
        Condition::IsNull(self)
    }

    pub fn is_not_null(self) -> Condition {
        Condition::IsNotNull(self)
    }

    /// The underlying column, looking through `COALESCE`.
    pub fn column(&self) -> Option<&Column> {
        match self {
            Self::Column(column) => Some(column),
            Self::Coalesce(items) => items.first().and_then(Expr::column),
            _ => None,
        }
    }

    /// Attribute key of the underlying column, if any.
    pub fn key(&self) -> Option<&str> {
        self.column().map(Column::key)
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.column().map(|c| c.column_type)
    }

    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        match self {
            Self::Column(column) => sql.push_str(&column.qualified()),
            Self::Value(value) => {
                params.push(value.clone());
                sql.push_str(&format!("?{}", params.len()));
            }
            Self::Coalesce(items) => {
                sql.push_str("COALESCE(");
                render_list(items, sql, params);
                sql.push(')');
            }
            Self::Tuple(items) => {
                sql.push('(');
                render_list(items, sql, params);
                sql.push(')');
            }
            Self::Arith { op, lhs, rhs } => {
                sql.push('(');
                lhs.render(sql, params);
                sql.push_str(&format!(" {} ", op.sql()));
                rhs.render(sql, params);
                sql.push(')');
            }
            Self::Case { whens, otherwise } => {
                sql.push_str("CASE");
                for (condition, result) in whens {
                    sql.push_str(" WHEN ");
                    condition.render(sql, params);
                    sql.push_str(" THEN ");
                    result.render(sql, params);
                }
                sql.push_str(" ELSE ");
                otherwise.render(sql, params);
                sql.push_str(" END");
            }
        }
    }
}

fn render_list(items: &[Expr], sql: &mut String, params: &mut Vec<SqlValue>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        item.render(sql, params);
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<&Column> for Expr {
    fn from(column: &Column) -> Self {
        Self::Column(column.clone())
    }
}

impl From<SqlValue> for Expr {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Self::Value(v.into())
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Self::Value(v.into())
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Self::Value(v.into())
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Self::Value(v.into())
    }
}

impl From<String> for Expr {
    fn from(v: String) -> Self {
        Self::Value(v.into())
    }
}

impl From<NaiveDate> for Expr {
    fn from(v: NaiveDate) -> Self {
        Self::Value(v.into())
    }
}

/// A boolean predicate usable in `WHERE` and `ON` clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare { lhs: Expr, op: CompareOp, rhs: Expr },
    IsNull(Expr),
    IsNotNull(Expr),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn and(self, other: Condition) -> Condition {
        match self {
            Self::And(mut items) => {
                items.push(other);
                Self::And(items)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Condition) -> Condition {
        match self {
            Self::Or(mut items) => {
                items.push(other);
                Self::Or(items)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        match self {
            Self::Compare { lhs, op, rhs } => {
                lhs.render(sql, params);
                sql.push_str(&format!(" {} ", op.sql()));
                rhs.render(sql, params);
            }
            Self::IsNull(expr) => {
                expr.render(sql, params);
                sql.push_str(" IS NULL");
            }
            Self::IsNotNull(expr) => {
                expr.render(sql, params);
                sql.push_str(" IS NOT NULL");
            }
            Self::And(items) => render_joined(items, " AND ", sql, params),
            Self::Or(items) => render_joined(items, " OR ", sql, params),
        }
    }
}

fn render_joined(items: &[Condition], sep: &str, sql: &mut String, params: &mut Vec<SqlValue>) {
    sql.push('(');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            sql.push_str(sep);
        }
        item.render(sql, params);
    }
    sql.push(')');
}

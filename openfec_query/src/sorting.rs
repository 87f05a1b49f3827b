//! Sort compiler: turns user-facing sort options such as
//! `-contribution_receipt_date` into ordering terms on a [`Query`].
//!
//! Null placement follows "nulls compare as largest": `NULLS LAST` when
//! ascending and `NULLS FIRST` when descending, unless `reverse_nulls` is
//! set. The seek paginator's max sentinels rely on this placement.

use std::collections::HashMap;

use crate::errors::Error;
use crate::expr::Expr;
use crate::join::JoinSpec;
use crate::query::{NullsOrder, OrderTerm, Query, SortDirection};
use crate::schema::{Column, ColumnType, Model};

/// The column a query was sorted on, and in which direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SortColumn {
    /// Requested sort name without its `-` prefix. Differs from the column
    /// name for aliases and join columns.
    pub field: String,
    pub expr: Expr,
    pub direction: SortDirection,
}

impl SortColumn {
    /// Attribute key used to read the sort value back from a record.
    pub fn key(&self) -> &str {
        &self.field
    }

    /// Whether rows of `model` already carry the sort value under
    /// [`SortColumn::key`].
    pub fn is_selected_by(&self, model: &Model) -> bool {
        match (model.column(&self.field), self.expr.column()) {
            (Some(selected), Some(sorted)) => selected == sorted,
            _ => false,
        }
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.expr.column_type()
    }
}

/// Knobs for [`sort`] and [`multi_sort`].
#[derive(Debug, Clone, Default)]
pub struct SortOptions {
    /// Sort names mapped onto columns with a different name or model.
    pub aliases: HashMap<String, Column>,
    /// Sort names that need a join before the column can be ordered on.
    pub join_columns: HashMap<String, (Column, JoinSpec)>,
    /// Drop any ordering already present on the query.
    pub clear: bool,
    /// Exclude rows whose sort value is null.
    pub hide_null: bool,
    /// Place nulls as if they were the smallest values.
    pub reverse_nulls: bool,
    /// Tiebreak column appended after the sort terms, same direction.
    pub index_column: Option<Column>,
}

impl SortOptions {
    pub fn with_alias(mut self, name: &str, column: Column) -> Self {
        self.aliases.insert(name.to_string(), column);
        self
    }

    pub fn with_join_column(mut self, name: &str, column: Column, join: JoinSpec) -> Self {
        self.join_columns.insert(name.to_string(), (column, join));
        self
    }

    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn with_hide_null(mut self, hide_null: bool) -> Self {
        self.hide_null = hide_null;
        self
    }

    pub fn with_reverse_nulls(mut self, reverse_nulls: bool) -> Self {
        self.reverse_nulls = reverse_nulls;
        self
    }

    pub fn with_index_column(mut self, column: Column) -> Self {
        self.index_column = Some(column);
        self
    }

    fn nulls_for(&self, direction: SortDirection) -> NullsOrder {
        match (direction, self.reverse_nulls) {
            (SortDirection::Asc, false) | (SortDirection::Desc, true) => NullsOrder::Last,
            (SortDirection::Desc, false) | (SortDirection::Asc, true) => NullsOrder::First,
        }
    }
}

/// Resolves one sort option against aliases, join columns and the model.
///
/// A leading `-` selects descending order.
pub fn parse_option(
    option: &str,
    model: &Model,
    options: &SortOptions,
) -> Result<(Column, SortDirection, Option<JoinSpec>), Error> {
    let trimmed = option.trim();
    let (direction, name) = match trimmed.strip_prefix('-') {
        Some(rest) => (SortDirection::Desc, rest),
        None => (SortDirection::Asc, trimmed),
    };
    let invalid = || Error::InvalidSortField {
        field: option.to_string(),
    };
    if name.is_empty() {
        return Err(invalid());
    }
    if let Some(column) = options.aliases.get(name) {
        return Ok((column.clone(), direction, None));
    }
    if let Some((column, join)) = options.join_columns.get(name) {
        return Ok((column.clone(), direction, Some(join.clone())));
    }
    match model.column(name) {
        Some(column) => Ok((column.clone(), direction, None)),
        None => Err(invalid()),
    }
}

/// Orders `query` by a single sort option.
pub fn sort(
    query: Query,
    option: &str,
    model: &Model,
    options: &SortOptions,
) -> Result<(Query, SortColumn), Error> {
    let mut query = if options.clear { query.clear_order() } else { query };
    let sort_column = apply(&mut query, option, model, options)?;
    if let Some(index) = &options.index_column {
        query = query.order_by(OrderTerm::new(index.expr(), sort_column.direction));
    }
    Ok((query, sort_column))
}

/// Orders `query` by several sort options in sequence. The index column,
/// if any, is appended once after all of them using the last direction.
pub fn multi_sort(
    query: Query,
    sort_options: &[String],
    model: &Model,
    options: &SortOptions,
) -> Result<(Query, Vec<SortColumn>), Error> {
    let mut query = if options.clear { query.clear_order() } else { query };
    let mut columns = Vec::with_capacity(sort_options.len());
    for option in sort_options {
        columns.push(apply(&mut query, option, model, options)?);
    }
    if let (Some(index), Some(last)) = (&options.index_column, columns.last()) {
        query = query.order_by(OrderTerm::new(index.expr(), last.direction));
    }
    Ok((query, columns))
}

fn field_name(option: &str) -> &str {
    let trimmed = option.trim();
    trimmed.strip_prefix('-').unwrap_or(trimmed)
}

fn apply(
    query: &mut Query,
    option: &str,
    model: &Model,
    options: &SortOptions,
) -> Result<SortColumn, Error> {
    let (column, direction, join) = parse_option(option, model, options)?;
    tracing::debug!(
        sort = option,
        column = %column.qualified(),
        "resolved sort option"
    );
    let mut next = query.clone();
    if let Some(join) = join {
        next = next.join(join);
    }
    if options.hide_null {
        next = next.filter(column.is_not_null());
    }
    next = next.order_by(
        OrderTerm::new(column.expr(), direction).with_nulls(options.nulls_for(direction)),
    );
    *query = next;
    Ok(SortColumn {
        field: field_name(option).to_string(),
        expr: column.expr(),
        direction,
    })
}

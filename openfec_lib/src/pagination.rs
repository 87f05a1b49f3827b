//! Offset and seek (keyset) pagination over deferred queries.
//!
//! Seek pagination compares `(COALESCE(sort_column, sentinel), index_column)`
//! against the values carried over from the previous page, so pages stay
//! stable while rows are inserted. Nulls in the sort column are replaced by a
//! per-type sentinel so they sort as a contiguous block. Text and boolean
//! columns have no sentinel: their nulls are ordered last explicitly and
//! admitted past any non-null cursor with an `OR sort_column IS NULL` arm.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use openfec_query::sorting::{self, SortColumn, SortOptions};
use openfec_query::{
    Column, ColumnType, Expr, Model, NullsOrder, OrderTerm, Query, Record, SortDirection, SqlValue,
};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::db::QueryExecutor;
use crate::error::ApiError;

/// Page-size cap applied when callers do not configure one.
pub const DEFAULT_CAP: i64 = 100;

/// Paging and sorting parameters of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub per_page: Option<i64>,
    /// 1-based page number (offset mode only).
    pub page: i64,
    pub sort: Vec<String>,
    pub sort_hide_null: bool,
    pub sort_reverse_nulls: bool,
    pub sort_null_only: bool,
    /// Raw `last_index` cursor value.
    pub last_index: Option<String>,
    /// Raw `last_<field>` cursor values, keyed by field name.
    pub last_values: BTreeMap<String, String>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            per_page: None,
            page: 1,
            sort: Vec::new(),
            sort_hide_null: false,
            sort_reverse_nulls: false,
            sort_null_only: false,
            last_index: None,
            last_values: BTreeMap::new(),
        }
    }
}

impl PageParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Appends a sort option such as `-contribution_receipt_date`.
    pub fn with_sort(mut self, sort: &str) -> Self {
        self.sort.push(sort.to_string());
        self
    }

    pub fn with_hide_null(mut self, hide_null: bool) -> Self {
        self.sort_hide_null = hide_null;
        self
    }

    pub fn with_reverse_nulls(mut self, reverse_nulls: bool) -> Self {
        self.sort_reverse_nulls = reverse_nulls;
        self
    }

    pub fn with_sort_null_only(mut self, sort_null_only: bool) -> Self {
        self.sort_null_only = sort_null_only;
        self
    }

    pub fn with_last_index(mut self, last_index: impl ToString) -> Self {
        self.last_index = Some(last_index.to_string());
        self
    }

    pub fn with_last_value(mut self, field: &str, value: impl ToString) -> Self {
        self.last_values.insert(field.to_string(), value.to_string());
        self
    }

    /// Carries the cursor of a previous page into this request.
    pub fn apply_last_indexes(mut self, last: &LastIndexes) -> Self {
        self.last_index = Some(last.last_index.to_string());
        self.last_values.clear();
        if let Some((field, value)) = &last.sort_value {
            self.last_values.insert(field.clone(), value.to_string());
        }
        self.sort_null_only = last.sort_null_only;
        self
    }

    /// Raw `last_<field>` value. Empty strings count as absent.
    pub fn last_value(&self, field: &str) -> Option<&str> {
        self.last_values
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn last_index_raw(&self) -> Option<&str> {
        self.last_index.as_deref().filter(|v| !v.is_empty())
    }

    /// Builds params from query-string pairs. Unrelated keys are ignored;
    /// `sort` may repeat or hold a comma-separated list.
    pub fn from_query_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, ApiError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "per_page" => params.per_page = Some(parse_int(key, value)?),
                "page" => params.page = parse_int(key, value)?,
                "sort" => params.sort.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                ),
                "sort_hide_null" => params.sort_hide_null = parse_bool(key, value)?,
                "sort_reverse_nulls" => params.sort_reverse_nulls = parse_bool(key, value)?,
                "sort_null_only" => params.sort_null_only = parse_bool(key, value)?,
                "last_index" => params.last_index = Some(value.to_string()),
                _ => {
                    if let Some(field) = key.strip_prefix("last_") {
                        params.last_values.insert(field.to_string(), value.to_string());
                    }
                }
            }
        }
        Ok(params)
    }

    /// The inverse of [`PageParams::from_query_pairs`]; defaults are omitted.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page".to_string(), per_page.to_string()));
        }
        if self.page != 1 {
            pairs.push(("page".to_string(), self.page.to_string()));
        }
        for sort in &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        if self.sort_hide_null {
            pairs.push(("sort_hide_null".to_string(), "true".to_string()));
        }
        if self.sort_reverse_nulls {
            pairs.push(("sort_reverse_nulls".to_string(), "true".to_string()));
        }
        if self.sort_null_only {
            pairs.push(("sort_null_only".to_string(), "true".to_string()));
        }
        if let Some(last_index) = &self.last_index {
            pairs.push(("last_index".to_string(), last_index.clone()));
        }
        for (field, value) in &self.last_values {
            pairs.push((format!("last_{}", field), value.clone()));
        }
        pairs
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::validation(format!("Parameter \"{}\" must be an integer", key))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(ApiError::validation(format!(
            "Parameter \"{}\" must be a boolean",
            key
        ))),
    }
}

/// Rejects a missing, non-positive or oversized `per_page`. A cap of `None`
/// or 0 disables the check.
pub fn check_cap(params: &PageParams, cap: Option<i64>) -> Result<(), ApiError> {
    let cap = match cap {
        Some(cap) if cap > 0 => cap,
        _ => return Ok(()),
    };
    match params.per_page {
        Some(per_page) if (1..=cap).contains(&per_page) => Ok(()),
        per_page => {
            tracing::warn!(?per_page, cap, "rejected per_page");
            Err(ApiError::validation(format!(
                "Parameter \"per_page\" must be between 1 and {}",
                cap
            )))
        }
    }
}

/// Sort and cap settings shared by the fetch functions.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub cap: Option<i64>,
    /// Precomputed row count; skips the `COUNT(*)` query when set.
    pub count: Option<i64>,
    /// Apply every requested sort option instead of only the first.
    pub multi: bool,
    pub sort: SortOptions,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            cap: Some(DEFAULT_CAP),
            count: None,
            multi: false,
            sort: SortOptions::default(),
        }
    }
}

impl FetchOptions {
    pub fn with_cap(mut self, cap: Option<i64>) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn with_sort(mut self, sort: SortOptions) -> Self {
        self.sort = sort;
        self
    }
}

fn page_count(count: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        0
    } else {
        (count + per_page - 1) / per_page
    }
}

// -- Offset pagination --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffsetPagination {
    pub page: i64,
    pub per_page: i64,
    pub count: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffsetPage {
    pub results: Vec<Record>,
    pub pagination: OffsetPagination,
}

/// Classic `LIMIT`/`OFFSET` pagination over an already sorted query.
pub struct OffsetPaginator<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    query: Query,
    per_page: Option<i64>,
    count: Option<i64>,
}

impl<'a, E: QueryExecutor + ?Sized> OffsetPaginator<'a, E> {
    pub fn new(executor: &'a E, query: Query, per_page: Option<i64>, count: Option<i64>) -> Self {
        Self {
            executor,
            query,
            per_page,
            count,
        }
    }

    pub fn get_page(&self, page: i64) -> Result<OffsetPage, ApiError> {
        if page < 1 {
            return Err(ApiError::validation(
                "Parameter \"page\" must be greater than or equal to 1",
            ));
        }
        let count = match self.count {
            Some(count) => count,
            None => self.executor.count(&self.query)?,
        };
        // Without a cap, a missing per_page means "everything on one page".
        let per_page = self.per_page.unwrap_or(count);
        let pages = page_count(count, per_page);

        let results = if per_page > 0 {
            let offset = (page - 1)
                .checked_mul(per_page)
                .ok_or_else(|| ApiError::validation("Parameter \"page\" is out of range"))?;
            let query = self.query.clone().limit(per_page).offset(offset);
            self.executor.all(&query)?
        } else {
            Vec::new()
        };
        tracing::debug!(page, per_page, count, pages, "fetched offset page");

        Ok(OffsetPage {
            results,
            pagination: OffsetPagination {
                page,
                per_page,
                count,
                pages,
            },
        })
    }
}

// -- Seek pagination --

/// Replacement for nulls when paging ascending, so they sort after every
/// real value. Text and boolean columns have no sentinel.
pub fn max_sentinel(category: &str) -> Option<SqlValue> {
    match category {
        "date" => NaiveDate::from_ymd_opt(9999, 12, 31).map(SqlValue::Date),
        "float" | "int" => Some(SqlValue::Real(f64::INFINITY)),
        _ => None,
    }
}

/// Replacement for nulls when paging descending. Numeric columns keep
/// `+inf` here as well, so their nulls lead a descending listing.
pub fn min_sentinel(category: &str) -> Option<SqlValue> {
    match category {
        "date" => NaiveDate::from_ymd_opt(1, 1, 1).map(SqlValue::Date),
        "float" | "int" => Some(SqlValue::Real(f64::INFINITY)),
        _ => None,
    }
}

/// Cursor values taken from the last record of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct LastIndexes {
    pub last_index: SqlValue,
    /// Sort field and its value, when the page was sorted and the value was
    /// not null.
    pub sort_value: Option<(String, SqlValue)>,
    /// Set when the last record's sort value was null.
    pub sort_null_only: bool,
}

impl LastIndexes {
    /// Cursor as query-string pairs (`last_index`, `last_<field>`,
    /// `sort_null_only`).
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("last_index".to_string(), self.last_index.to_string())];
        if let Some((field, value)) = &self.sort_value {
            pairs.push((format!("last_{}", field), value.to_string()));
        }
        if self.sort_null_only {
            pairs.push(("sort_null_only".to_string(), "true".to_string()));
        }
        pairs
    }
}

impl Serialize for LastIndexes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("last_index", &self.last_index)?;
        if let Some((field, value)) = &self.sort_value {
            map.serialize_entry(&format!("last_{}", field), value)?;
        }
        if self.sort_null_only {
            map.serialize_entry("sort_null_only", &true)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeekPagination {
    pub per_page: i64,
    pub count: i64,
    pub pages: i64,
    pub last_indexes: Option<LastIndexes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeekPage {
    pub results: Vec<Record>,
    pub pagination: SeekPagination,
}

/// Keyset paginator that coalesces nulls in the sort column to a per-type
/// sentinel before comparing.
pub struct SeekCoalescePaginator<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    /// Query used for counting; never restricted.
    base: Query,
    query: Query,
    per_page: Option<i64>,
    index_column: Column,
    sort_column: Option<SortColumn>,
    count: Option<i64>,
}

impl<'a, E: QueryExecutor + ?Sized> SeekCoalescePaginator<'a, E> {
    pub fn new(
        executor: &'a E,
        query: Query,
        per_page: Option<i64>,
        index_column: Column,
        sort_column: Option<SortColumn>,
        count: Option<i64>,
    ) -> Self {
        let base = query.clone();
        // Joined and aliased sort values are selected under the sort key so
        // the cursor can be read back from the last record.
        let select_sort = sort_column
            .as_ref()
            .is_some_and(|s| !s.is_selected_by(query.model()));
        let query = match &sort_column {
            Some(s) if select_sort => query.add_column(s.expr.clone(), s.key()),
            _ => query,
        };
        Self {
            executor,
            base,
            query,
            per_page,
            index_column,
            sort_column,
            count,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn index_column(&self) -> &Column {
        &self.index_column
    }

    pub fn sort_column(&self) -> Option<&SortColumn> {
        self.sort_column.as_ref()
    }

    pub fn per_page(&self) -> Option<i64> {
        self.per_page
    }

    /// Narrows the rows pages are drawn from. Counts still cover the
    /// unrestricted query.
    pub fn restrict(&mut self, condition: openfec_query::Condition) {
        self.query = self.query.clone().filter(condition);
    }

    fn direction(&self) -> SortDirection {
        self.sort_column
            .as_ref()
            .map(|s| s.direction)
            .unwrap_or_default()
    }

    fn sentinel(&self) -> Option<SqlValue> {
        let sort_column = self.sort_column.as_ref()?;
        let category = sort_column.column_type()?.category();
        if sort_column.direction.is_ascending() {
            max_sentinel(category)
        } else {
            min_sentinel(category)
        }
    }

    /// The sort column when its nulls are left in place rather than
    /// coalesced.
    fn null_tail(&self) -> Option<&SortColumn> {
        self.sort_column
            .as_ref()
            .filter(|_| self.sentinel().is_none())
    }

    /// The sort expression with nulls replaced by the direction's sentinel.
    fn sort_expr(&self) -> Option<Expr> {
        let sort_column = self.sort_column.as_ref()?;
        Some(match self.sentinel() {
            Some(sentinel) => sort_column.expr.clone().coalesce(sentinel),
            None => sort_column.expr.clone(),
        })
    }

    /// The unexecuted query for the page after the given cursor values.
    pub fn seek_query(&self, last_index: Option<SqlValue>, sort_index: Option<SqlValue>) -> Query {
        let direction = self.direction();
        let sort_expr = self.sort_expr();
        let null_tail = self.null_tail();

        let mut lhs = Vec::new();
        let mut rhs = Vec::new();
        let mut past_value = false;
        if let (Some(value), Some(expr)) = (sort_index, &sort_expr) {
            lhs.push(expr.clone());
            rhs.push(Expr::Value(value));
            past_value = true;
        }
        if let Some(value) = last_index {
            lhs.push(self.index_column.expr());
            rhs.push(Expr::Value(value));
        }

        let mut query = self.query.clone();
        if !lhs.is_empty() {
            let (lhs, rhs) = (row_value(lhs), row_value(rhs));
            let condition = if direction.is_ascending() {
                lhs.gt(rhs)
            } else {
                lhs.lt(rhs)
            };
            let condition = match null_tail {
                Some(sort_column) if past_value => condition.or(sort_column.expr.clone().is_null()),
                _ => condition,
            };
            query = query.filter(condition);
        }

        query = query.clear_order();
        if let Some(expr) = sort_expr {
            let term = OrderTerm::new(expr, direction);
            query = query.order_by(match null_tail {
                Some(_) => term.with_nulls(NullsOrder::Last),
                None => term,
            });
        }
        query = query.order_by(OrderTerm::new(self.index_column.expr(), direction));
        if let Some(per_page) = self.per_page {
            query = query.limit(per_page);
        }
        query
    }

    pub fn fetch(
        &self,
        last_index: Option<SqlValue>,
        sort_index: Option<SqlValue>,
    ) -> Result<Vec<Record>, ApiError> {
        let query = self.seek_query(last_index, sort_index);
        Ok(self.executor.all(&query)?)
    }

    /// Cursor values for the page after `record`.
    pub fn get_index_values(&self, record: &Record) -> LastIndexes {
        let mut last = LastIndexes {
            last_index: record.value_of(self.index_column.key()),
            sort_value: None,
            sort_null_only: false,
        };
        if let Some(sort_column) = &self.sort_column {
            let key = sort_column.key();
            match record.value_of(key) {
                SqlValue::Null => last.sort_null_only = true,
                value => last.sort_value = Some((key.to_string(), value)),
            }
        }
        last
    }

    pub fn get_page(
        &self,
        last_index: Option<SqlValue>,
        sort_index: Option<SqlValue>,
    ) -> Result<SeekPage, ApiError> {
        let results = self.fetch(last_index, sort_index)?;
        let count = match self.count {
            Some(count) => count,
            None => self.executor.count(&self.base)?,
        };
        let per_page = self.per_page.unwrap_or(count);
        let pages = page_count(count, per_page);
        let last_indexes = results.last().map(|record| self.get_index_values(record));
        tracing::debug!(
            per_page,
            count,
            returned = results.len(),
            ?last_indexes,
            "fetched seek page"
        );

        Ok(SeekPage {
            results,
            pagination: SeekPagination {
                per_page,
                count,
                pages,
                last_indexes,
            },
        })
    }
}

fn row_value(mut items: Vec<Expr>) -> Expr {
    if items.len() == 1 {
        items.remove(0)
    } else {
        Expr::Tuple(items)
    }
}

// -- Orchestrators --

/// Offset mode: validates the cap, applies the requested sort and returns
/// page `params.page`.
pub fn fetch_page<E: QueryExecutor + ?Sized>(
    executor: &E,
    query: Query,
    params: &PageParams,
    model: &Model,
    options: &FetchOptions,
) -> Result<OffsetPage, ApiError> {
    check_cap(params, options.cap)?;
    let sort_options = options
        .sort
        .clone()
        .with_hide_null(params.sort_hide_null)
        .with_reverse_nulls(params.sort_reverse_nulls);

    let query = match params.sort.first() {
        Some(_) if options.multi => sorting::multi_sort(query, &params.sort, model, &sort_options)?.0,
        Some(first) => sorting::sort(query, first, model, &sort_options)?.0,
        None => query,
    };
    OffsetPaginator::new(executor, query, params.per_page, options.count).get_page(params.page)
}

/// Seek mode: validates the cap, applies the first requested sort option
/// and builds the paginator. Aliases and join columns in `options.sort`
/// are honoured; the index tiebreak is always `index_column`.
pub fn fetch_seek_paginator<'a, E: QueryExecutor + ?Sized>(
    executor: &'a E,
    query: Query,
    params: &PageParams,
    index_column: &Column,
    options: &FetchOptions,
) -> Result<SeekCoalescePaginator<'a, E>, ApiError> {
    check_cap(params, options.cap)?;
    let model = query.model().clone();
    let sort_options = SortOptions {
        hide_null: params.sort_hide_null,
        index_column: None,
        ..options.sort.clone()
    };

    let (query, sort_column) = match params.sort.first() {
        Some(option) => {
            let (query, column) = sorting::sort(query, option, &model, &sort_options)?;
            if model.column(column.key()).is_some() && !column.is_selected_by(&model) {
                return Err(ApiError::validation(format!(
                    "Sort field \"{}\" conflicts with a column of the same name",
                    column.key()
                )));
            }
            (query, Some(column))
        }
        None => (query, None),
    };
    Ok(SeekCoalescePaginator::new(
        executor,
        query,
        params.per_page,
        index_column.clone(),
        sort_column,
        options.count,
    ))
}

/// Seek mode, eager: returns the page after the cursor in `params`.
pub fn fetch_seek_page<E: QueryExecutor + ?Sized>(
    executor: &E,
    query: Query,
    params: &PageParams,
    index_column: &Column,
    options: &FetchOptions,
) -> Result<SeekPage, ApiError> {
    let mut paginator = fetch_seek_paginator(executor, query, params, index_column, options)?;
    let (last_index, sort_index) = resolve_cursor(&mut paginator, params)?;
    paginator.get_page(last_index, sort_index)
}

/// Seek mode, deferred: returns the paginator together with the unexecuted
/// query for the requested page.
pub fn fetch_seek_query<'a, E: QueryExecutor + ?Sized>(
    executor: &'a E,
    query: Query,
    params: &PageParams,
    index_column: &Column,
    options: &FetchOptions,
) -> Result<(SeekCoalescePaginator<'a, E>, Query), ApiError> {
    let mut paginator = fetch_seek_paginator(executor, query, params, index_column, options)?;
    let (last_index, sort_index) = resolve_cursor(&mut paginator, params)?;
    let query = paginator.seek_query(last_index, sort_index);
    Ok((paginator, query))
}

/// Parses the cursor values in `params` by their columns' types and applies
/// the null-only continuation when the previous page ended on a null.
fn resolve_cursor<E: QueryExecutor + ?Sized>(
    paginator: &mut SeekCoalescePaginator<'_, E>,
    params: &PageParams,
) -> Result<(Option<SqlValue>, Option<SqlValue>), ApiError> {
    let last_index = params
        .last_index_raw()
        .map(|raw| paginator.index_column().column_type.parse_value(raw))
        .transpose()?;

    let Some(sort_column) = paginator.sort_column().cloned() else {
        return Ok((last_index, None));
    };
    let column_type = sort_column.column_type().unwrap_or(ColumnType::Text);
    let sort_index = params
        .last_value(sort_column.key())
        .map(|raw| column_type.parse_value(raw))
        .transpose()?;

    if sort_index.is_none() && params.sort_null_only {
        if !sort_column.direction.is_ascending() {
            return Err(ApiError::Unsupported(format!(
                "sort_null_only cannot be used with descending sort on \"{}\"",
                sort_column.key()
            )));
        }
        tracing::debug!(field = sort_column.key(), "continuing within null sort values");
        paginator.restrict(sort_column.expr.clone().is_null());
    }
    Ok((last_index, sort_index))
}

//! SQLite mirror of OpenFEC tables, used to execute rendered queries.

use std::path::Path;

use chrono::NaiveDate;
use openfec_query::{ColumnType, Model, Query, Record, SqlValue};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("date parse error: {0}")]
    Date(#[from] chrono::ParseError),
    #[error("table {table} has no column {column}")]
    UnknownColumn { table: String, column: String },
    #[error("column {column} holds a blob, which cannot be decoded")]
    Blob { column: String },
}

/// Runs deferred [`Query`] values. Paginators only ever talk to this trait.
pub trait QueryExecutor {
    /// All rows the query selects, in order.
    fn all(&self, query: &Query) -> Result<Vec<Record>, DbError>;

    /// Number of rows matching the query's joins and filters.
    fn count(&self, query: &Query) -> Result<i64, DbError>;
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    #[doc(hidden)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn init(&self) -> Result<(), DbError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Insert one row into the model's table. Every field of the record must
    /// name a column of the model.
    pub fn insert_record(&self, model: &Model, record: &Record) -> Result<(), DbError> {
        insert(&self.conn, model, record)
    }

    /// Insert many rows in a single transaction.
    pub fn insert_records(&mut self, model: &Model, records: &[Record]) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        for record in records {
            insert(&tx, model, record)?;
        }
        tx.commit()?;
        tracing::debug!(table = model.table(), rows = records.len(), "inserted records");
        Ok(())
    }
}

impl QueryExecutor for Db {
    fn all(&self, query: &Query) -> Result<Vec<Record>, DbError> {
        let (sql, params) = query.to_sql();
        tracing::debug!(%sql, params = params.len(), "executing query");

        let names = query.column_names();
        let types = query.column_types();
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter().map(to_sql_value)))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (idx, name) in names.iter().enumerate() {
                let value = from_value_ref(row.get_ref(idx)?, types[idx], name)?;
                record.push(name, value);
            }
            result.push(record);
        }
        Ok(result)
    }

    fn count(&self, query: &Query) -> Result<i64, DbError> {
        let (sql, params) = query.count_sql();
        tracing::debug!(%sql, "counting rows");
        let count = self.conn.query_row(
            &sql,
            params_from_iter(params.iter().map(to_sql_value)),
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn insert(conn: &Connection, model: &Model, record: &Record) -> Result<(), DbError> {
    let mut columns = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());
    for (name, value) in record.iter() {
        let column = model.column(name).ok_or_else(|| DbError::UnknownColumn {
            table: model.table().to_string(),
            column: name.to_string(),
        })?;
        columns.push(column.name.as_str());
        values.push(to_sql_value(value));
    }
    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        model.table(),
        columns.join(", "),
        placeholders.join(", ")
    );
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Dates bind as `YYYY-MM-DD` text so they compare lexically in SQLite.
fn to_sql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(v) => Value::Text(v.clone()),
        SqlValue::Date(v) => Value::Text(v.format("%Y-%m-%d").to_string()),
    }
}

fn from_value_ref(
    value: ValueRef<'_>,
    column_type: Option<ColumnType>,
    column: &str,
) -> Result<SqlValue, DbError> {
    let decoded = match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => match column_type {
            Some(ColumnType::Float) => SqlValue::Real(v as f64),
            _ => SqlValue::Integer(v),
        },
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            match column_type {
                Some(ColumnType::Date) => {
                    SqlValue::Date(NaiveDate::parse_from_str(&text, "%Y-%m-%d")?)
                }
                _ => SqlValue::Text(text.into_owned()),
            }
        }
        ValueRef::Blob(_) => {
            return Err(DbError::Blob {
                column: column.to_string(),
            })
        }
    };
    Ok(decoded)
}

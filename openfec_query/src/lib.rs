//! Query layer for the OpenFEC data mirror.
//!
//! Describes tables as [`Model`]s, composes deferred [`Query`] values out of
//! filters, joins and orderings, and compiles user-facing sort options into
//! ordered column expressions. Nothing in this crate executes SQL; rendering
//! produces a statement string plus positional bind parameters.

mod errors;
mod expr;
mod join;
mod query;
mod record;
mod schema;
pub mod sorting;
mod value;

pub use self::errors::Error;
pub use self::expr::{ArithOp, CompareOp, Condition, Expr};
pub use self::join::JoinSpec;
pub use self::query::{NullsOrder, OrderTerm, Query, SortDirection};
pub use self::record::Record;
pub use self::schema::{Column, ColumnType, Model, ModelRegistry};
pub use self::sorting::{SortColumn, SortOptions};
pub use self::value::SqlValue;

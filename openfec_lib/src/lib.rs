//! Library layer for the OpenFEC data mirror: SQLite execution, offset and
//! seek pagination, request validation and document link helpers.
//!
//! Builds on the `openfec_query` crate, which describes tables and composes
//! deferred queries without executing them.

pub mod config;
pub mod db;
pub mod decoders;
pub mod documents;
pub mod error;
pub mod models;
pub mod pagination;
pub mod relations;
pub mod validation;

pub use openfec_query;

pub use config::{Config, ConfigError};
pub use db::{Db, DbError, QueryExecutor};
pub use error::ApiError;
pub use pagination::{
    check_cap, fetch_page, fetch_seek_page, fetch_seek_paginator, fetch_seek_query, FetchOptions,
    LastIndexes, OffsetPage, OffsetPaginator, PageParams, SeekCoalescePaginator, SeekPage,
};
pub use relations::Related;
pub use validation::{check_election_arguments, parse_fulltext, ElectionArgs};

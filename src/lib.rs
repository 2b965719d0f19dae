//! # sqlhelper
//!
//! Small helpers over a pooled database connection.
//!
//! - [`prepare_fields_for_insert`] / [`prepare_fields_for_set`] build column
//!   lists and SET clauses with `$n` placeholders.
//! - [`transform_to_column`] / [`transform_to_field`] convert between
//!   `camelCase` fields and `underscored_names` columns.
//! - [`Database`] runs statements on pooled connections and releases them;
//!   [`Transaction`] keeps one connection with the caller until commit.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqlhelper::prelude::*;
//!
//! let pool = SqlxPool::connect(&Config::discover()?.database).await?;
//! let db = Database::new(pool);
//!
//! let (values_sql, values) = prepare_record_for_insert(&record)?;
//! let tx = db.begin_transaction().await?;
//! let res = tx
//!     .query_safe(&Statement::with_params(format!("INSERT INTO users {}", values_sql), values))
//!     .await?;
//! res.connection.commit().await?;
//! ```
//!
//! ## Result policies
//!
//! | Method        | Rows      | Empty result        |
//! |---------------|-----------|---------------------|
//! | `query`       | all       | `NoQueryResults`    |
//! | `query_safe`  | all       | `[]`                |
//! | `lookup`      | exactly 1 | `NoQueryResults`    |
//! | `lookup_safe` | exactly 1 | `Data::Empty`       |

pub mod columns;
pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod fields;
pub mod interpreter;
pub mod orchestrator;
pub mod outcome;
pub mod sqlx_pool;
pub mod statement;
pub mod timestamp;
pub mod transaction;

#[cfg(test)]
mod mock;

pub use columns::{transform_to_column, transform_to_field};
pub use connection::{Connection, Pool, PooledConnection, get_connection};
pub use database::Database;
pub use error::{DriverError, DriverErrorCode, HelperResult, QueryError};
pub use fields::{
    prepare_fields_for_insert, prepare_fields_for_set, prepare_record_for_insert,
    prepare_record_for_set,
};
pub use interpreter::{Lease, QueryOptions, interpret};
pub use orchestrator::{Handle, run_query};
pub use outcome::{Data, QueryMeta, QueryOutcome, Response, TransactionResponse};
pub use statement::{Record, SqlValue, Statement};
pub use timestamp::create_now_timestamp;
pub use transaction::{Transaction, commit, query_on_transaction};

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::database::Database;
    pub use crate::error::*;
    pub use crate::fields::*;
    pub use crate::columns::{transform_to_column, transform_to_field};
    pub use crate::interpreter::QueryOptions;
    pub use crate::outcome::{Data, QueryMeta, Response, TransactionResponse};
    pub use crate::sqlx_pool::SqlxPool;
    pub use crate::statement::{Record, SqlValue, Statement};
    pub use crate::timestamp::create_now_timestamp;
    pub use crate::transaction::Transaction;
}

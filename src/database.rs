//! Pool-level entry points.

use crate::connection::{Pool, PooledConnection, get_connection};
use crate::error::HelperResult;
use crate::interpreter::QueryOptions;
use crate::orchestrator::{Handle, run_query};
use crate::outcome::Response;
use crate::statement::Statement;
use crate::transaction::Transaction;

/// Runs statements on connections checked out from a pool.
///
/// # Example
///
/// ```rust,ignore
/// let db = Database::new(pool);
///
/// let users = db.query_safe(&Statement::new("SELECT * FROM users")).await?;
/// let user = db
///     .lookup(&Statement::new("SELECT * FROM users WHERE id = $1").bind(42))
///     .await?;
/// ```
#[derive(Clone)]
pub struct Database<P: Pool> {
    pool: P,
}

impl<P: Pool> Database<P> {
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Check out a connection; see [`get_connection`].
    pub async fn get_connection(&self) -> HelperResult<PooledConnection<P::Connection>> {
        get_connection(&self.pool).await
    }

    /// Run a statement on a fresh connection, released afterwards.
    pub async fn execute(&self, statement: &Statement, options: QueryOptions) -> HelperResult<Response> {
        let conn = self.get_connection().await?;
        run_query(Handle::Ready(conn), statement, options).await
    }

    /// Many rows; empty is an error.
    pub async fn query(&self, statement: &Statement) -> HelperResult<Response> {
        self.execute(statement, QueryOptions::QUERY).await
    }

    /// Many rows; empty is fine.
    pub async fn query_safe(&self, statement: &Statement) -> HelperResult<Response> {
        self.execute(statement, QueryOptions::QUERY_SAFE).await
    }

    /// One row; empty is an error.
    pub async fn lookup(&self, statement: &Statement) -> HelperResult<Response> {
        self.execute(statement, QueryOptions::LOOKUP).await
    }

    /// One row or nothing.
    pub async fn lookup_safe(&self, statement: &Statement) -> HelperResult<Response> {
        self.execute(statement, QueryOptions::LOOKUP_SAFE).await
    }

    /// Check out a connection and issue BEGIN on it.
    pub async fn begin_transaction(&self) -> HelperResult<Transaction<P::Connection>> {
        let conn = self.get_connection().await?;
        Transaction::begin(conn).await
    }
}

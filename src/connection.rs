//! Pool and connection seams, plus the scoped connection guard.
//!
//! The pool itself lives outside this crate. Anything that can hand out
//! connections implements [`Pool`]; see [`crate::sqlx_pool`] for the
//! sqlx-backed one.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{DriverError, HelperResult, QueryError};
use crate::outcome::QueryOutcome;
use crate::statement::{SqlValue, Statement};

/// A checked-out database session.
#[async_trait]
pub trait Connection: Send {
    /// Run one statement with positional parameters.
    async fn query(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<QueryOutcome, DriverError>;

    /// Give the connection back to its pool.
    fn release(self)
    where
        Self: Sized;

    /// Give up a session left in an unknown state (e.g. an open BEGIN).
    /// Drivers that can close the session instead of pooling it should.
    fn discard(self)
    where
        Self: Sized,
    {
        self.release();
    }
}

/// Something that hands out connections.
#[async_trait]
pub trait Pool: Send + Sync {
    type Connection: Connection;

    /// Check out a connection. `Ok(None)` means the pool answered but had
    /// nothing usable to give.
    async fn connect(&self) -> Result<Option<Self::Connection>, DriverError>;
}

/// A pooled connection that goes back to the pool when dropped.
pub struct PooledConnection<C: Connection> {
    conn: Option<C>,
}

impl<C: Connection> PooledConnection<C> {
    pub fn new(conn: C) -> Self {
        Self { conn: Some(conn) }
    }

    /// Run a statement on the underlying connection.
    pub async fn query(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError> {
        self.query_raw(statement.sql(), statement.params()).await
    }

    pub(crate) async fn query_raw(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<QueryOutcome, DriverError> {
        match self.conn.as_mut() {
            Some(conn) => conn.query(sql, params).await,
            None => Err(DriverError::uncoded("connection already released")),
        }
    }

    /// Return the connection to the pool now.
    pub fn release(mut self) {
        self.release_now();
    }

    pub(crate) fn release_now(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("releasing connection");
            conn.release();
        }
    }

    pub(crate) fn discard_now(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("discarding connection");
            conn.discard();
        }
    }

    pub(crate) fn is_held(&self) -> bool {
        self.conn.is_some()
    }
}

impl<C: Connection> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        self.release_now();
    }
}

/// Check out a connection from `pool`.
///
/// Pool failures come back unchanged as [`QueryError::Driver`]; a pool that
/// answers without a connection gives [`QueryError::MissingConnection`].
pub async fn get_connection<P: Pool>(pool: &P) -> HelperResult<PooledConnection<P::Connection>> {
    match pool.connect().await? {
        Some(conn) => {
            debug!("acquired connection");
            Ok(PooledConnection::new(conn))
        }
        None => Err(QueryError::MissingConnection),
    }
}

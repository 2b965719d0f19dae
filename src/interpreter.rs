//! Turning a finished statement into a response or a classified failure.
//!
//! What happens to the connection afterwards depends on who holds it, which
//! is the job of [`Lease`]: a [`PooledConnection`] always goes back to the
//! pool, a [`Transaction`] stays with the caller unless the statement failed.

use async_trait::async_trait;

use crate::columns::transform_to_field;
use crate::connection::{Connection, PooledConnection};
use crate::error::{DriverError, HelperResult, QueryError};
use crate::outcome::{Data, QueryMeta, QueryOutcome, Response, TransactionResponse};
use crate::statement::{Record, Statement};
use crate::transaction::Transaction;

/// Call-site policy for a statement's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Expect exactly one row and unwrap it.
    pub single_return_item: bool,
    /// Treat an empty result as a valid answer.
    pub allow_empty_response: bool,
}

impl QueryOptions {
    /// Many rows; empty is an error.
    pub const QUERY: Self = Self {
        single_return_item: false,
        allow_empty_response: false,
    };
    /// Many rows; empty is fine.
    pub const QUERY_SAFE: Self = Self {
        single_return_item: false,
        allow_empty_response: true,
    };
    /// One row; empty is an error.
    pub const LOOKUP: Self = Self {
        single_return_item: true,
        allow_empty_response: false,
    };
    /// One row or nothing.
    pub const LOOKUP_SAFE: Self = Self {
        single_return_item: true,
        allow_empty_response: true,
    };
}

/// Whoever holds the connection a statement runs on.
#[async_trait]
pub trait Lease: Send + Sized {
    /// What a successful statement produces.
    type Output: Send;

    /// Issue a statement on the held connection.
    async fn issue(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError>;

    /// The statement failed: undo what needs undoing, release, and return
    /// the error the caller should see.
    async fn fail(self, err: QueryError) -> QueryError;

    /// Release without rolling anything back.
    fn abandon(self, err: QueryError) -> QueryError;

    /// Package a successful result.
    fn finish(self, data: Data, meta: QueryMeta) -> Self::Output;
}

#[async_trait]
impl<C: Connection> Lease for PooledConnection<C> {
    type Output = Response;

    async fn issue(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError> {
        self.query(statement).await
    }

    async fn fail(self, err: QueryError) -> QueryError {
        self.release();
        err
    }

    fn abandon(self, err: QueryError) -> QueryError {
        self.release();
        err
    }

    fn finish(self, data: Data, meta: QueryMeta) -> Response {
        self.release();
        Response { data, meta }
    }
}

#[async_trait]
impl<C: Connection> Lease for Transaction<C> {
    type Output = TransactionResponse<C>;

    async fn issue(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError> {
        self.connection_mut().query(statement).await
    }

    async fn fail(self, err: QueryError) -> QueryError {
        match self.rollback().await {
            Ok(()) => err,
            Err(rollback_err) => {
                tracing::warn!(superseded = %err, "rollback failed after statement error");
                rollback_err
            }
        }
    }

    fn abandon(self, err: QueryError) -> QueryError {
        self.release();
        err
    }

    fn finish(self, data: Data, meta: QueryMeta) -> TransactionResponse<C> {
        TransactionResponse {
            data,
            meta,
            connection: self,
        }
    }
}

/// Interpret a finished statement.
///
/// Driver errors are classified ([`QueryError::Duplicate`] or
/// [`QueryError::Unknown`]) and handed to [`Lease::fail`]. An empty result
/// fails with [`QueryError::NoQueryResults`] unless the options allow it.
/// A single-item call that gets back more than one row fails with
/// [`QueryError::InvalidState`] through [`Lease::fail`] as well, so a
/// transaction is rolled back before its connection is released. Row keys are converted from column names to field names.
pub async fn interpret<L: Lease>(
    outcome: Result<QueryOutcome, DriverError>,
    lease: L,
    options: QueryOptions,
) -> HelperResult<L::Output> {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => return Err(lease.fail(QueryError::classify(err)).await),
    };

    if outcome.is_empty() {
        if !options.allow_empty_response {
            return Err(lease.abandon(QueryError::NoQueryResults));
        }
        let (_, meta) = outcome.into_parts();
        let data = if options.single_return_item {
            Data::Empty
        } else {
            Data::Rows(Vec::new())
        };
        return Ok(lease.finish(data, meta));
    }

    let (rows, meta) = outcome.into_parts();
    let data = if options.single_return_item {
        match single_row(rows) {
            Ok(row) => Data::Single(field_names(row)),
            Err(err) => return Err(lease.fail(err).await),
        }
    } else {
        Data::Rows(rows.into_iter().map(field_names).collect())
    };

    Ok(lease.finish(data, meta))
}

fn single_row(rows: Vec<Record>) -> HelperResult<Record> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        _ => Err(QueryError::invalid_state(format!(
            "expected a single row, got {}",
            count
        ))),
    }
}

fn field_names(row: Record) -> Record {
    row.into_iter()
        .map(|(column, value)| (transform_to_field(&column), value))
        .collect()
}

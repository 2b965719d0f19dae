//! Run a statement on whatever connection the caller has.

use tracing::debug;

use crate::error::{HelperResult, QueryError};
use crate::interpreter::{Lease, QueryOptions, interpret};
use crate::statement::Statement;

/// The connection situation a statement is about to run in.
pub enum Handle<L> {
    /// Nothing to run on.
    Missing,
    /// A usable connection.
    Ready(L),
    /// A connection that arrived together with an upstream failure.
    Failed(L, QueryError),
}

impl<L> From<Option<L>> for Handle<L> {
    fn from(lease: Option<L>) -> Self {
        match lease {
            Some(lease) => Handle::Ready(lease),
            None => Handle::Missing,
        }
    }
}

/// Issue `statement` and interpret the outcome.
///
/// - [`Handle::Missing`] fails with [`QueryError::NoDbConnection`].
/// - [`Handle::Failed`] is rolled back (inside a transaction) and released,
///   and the statement is never issued.
/// - [`Handle::Ready`] runs the statement; see [`interpret`].
pub async fn run_query<L: Lease>(
    handle: Handle<L>,
    statement: &Statement,
    options: QueryOptions,
) -> HelperResult<L::Output> {
    match handle {
        Handle::Missing => Err(QueryError::NoDbConnection),
        Handle::Failed(lease, err) => Err(lease.fail(err).await),
        Handle::Ready(mut lease) => {
            debug!(sql = statement.sql(), params = statement.params().len(), "issuing statement");
            let outcome = lease.issue(statement).await;
            interpret(outcome, lease, options).await
        }
    }
}

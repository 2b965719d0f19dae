//! Transactions: a connection owned by the caller until commit or rollback.

use tracing::{debug, warn};

use crate::connection::{Connection, PooledConnection};
use crate::error::{HelperResult, QueryError};
use crate::interpreter::QueryOptions;
use crate::orchestrator::{Handle, run_query};
use crate::outcome::TransactionResponse;
use crate::statement::Statement;

/// An open transaction.
///
/// Every statement run through it hands the transaction back inside its
/// [`TransactionResponse`], so the caller keeps ownership between
/// statements. A failed statement rolls back and releases; so does
/// [`Transaction::rollback`]. [`Transaction::commit`] releases on success
/// and failure alike. Dropping an unfinished transaction discards the
/// connection without issuing anything, so the open BEGIN never reaches
/// another pool user.
pub struct Transaction<C: Connection> {
    conn: PooledConnection<C>,
}

impl<C: Connection> Transaction<C> {
    /// Begin a transaction on a freshly acquired connection.
    ///
    /// If BEGIN fails the connection is released and the driver error
    /// returned.
    pub async fn begin(mut conn: PooledConnection<C>) -> HelperResult<Self> {
        conn.query_raw("BEGIN", &[]).await?;
        debug!("transaction started");
        Ok(Self { conn })
    }

    /// Wrap a connection that already has a transaction open on it.
    pub fn from_connection(conn: PooledConnection<C>) -> Self {
        Self { conn }
    }

    pub(crate) fn connection_mut(&mut self) -> &mut PooledConnection<C> {
        &mut self.conn
    }

    /// Run a statement inside the transaction.
    pub async fn execute(
        self,
        statement: &Statement,
        options: QueryOptions,
    ) -> HelperResult<TransactionResponse<C>> {
        run_query(Handle::Ready(self), statement, options).await
    }

    /// Many rows; empty is an error.
    pub async fn query(self, statement: &Statement) -> HelperResult<TransactionResponse<C>> {
        self.execute(statement, QueryOptions::QUERY).await
    }

    /// Many rows; empty is fine.
    pub async fn query_safe(self, statement: &Statement) -> HelperResult<TransactionResponse<C>> {
        self.execute(statement, QueryOptions::QUERY_SAFE).await
    }

    /// One row; empty is an error.
    pub async fn lookup(self, statement: &Statement) -> HelperResult<TransactionResponse<C>> {
        self.execute(statement, QueryOptions::LOOKUP).await
    }

    /// One row or nothing.
    pub async fn lookup_safe(self, statement: &Statement) -> HelperResult<TransactionResponse<C>> {
        self.execute(statement, QueryOptions::LOOKUP_SAFE).await
    }

    /// Commit and release.
    ///
    /// When COMMIT fails a ROLLBACK is issued; its error, if any, is what
    /// the caller sees, otherwise the COMMIT error is.
    pub async fn commit(mut self) -> HelperResult<bool> {
        match self.conn.query_raw("COMMIT", &[]).await {
            Ok(_) => {
                debug!("transaction committed");
                self.conn.release_now();
                Ok(true)
            }
            Err(commit_err) => {
                let rollback = self.conn.query_raw("ROLLBACK", &[]).await;
                self.conn.release_now();
                match rollback {
                    Ok(_) => Err(QueryError::Driver(commit_err)),
                    Err(rollback_err) => {
                        warn!(superseded = %commit_err, "rollback failed after commit error");
                        Err(QueryError::Driver(rollback_err))
                    }
                }
            }
        }
    }

    /// Roll back and release.
    pub async fn rollback(mut self) -> HelperResult<()> {
        let result = self.conn.query_raw("ROLLBACK", &[]).await;
        self.conn.release_now();
        result?;
        debug!("transaction rolled back");
        Ok(())
    }

    pub(crate) fn release(mut self) {
        self.conn.release_now();
    }
}

impl<C: Connection> Drop for Transaction<C> {
    fn drop(&mut self) {
        if self.conn.is_held() {
            warn!("transaction dropped without commit or rollback, discarding connection");
            self.conn.discard_now();
        }
    }
}

/// Commit `transaction`; see [`Transaction::commit`].
pub async fn commit<C: Connection>(transaction: Transaction<C>) -> HelperResult<bool> {
    transaction.commit().await
}

/// Run a statement on a transaction the caller may or may not have.
///
/// Without one this fails with [`QueryError::NoDbConnection`] and nothing
/// is issued.
pub async fn query_on_transaction<C: Connection>(
    transaction: Option<Transaction<C>>,
    statement: &Statement,
    options: QueryOptions,
) -> HelperResult<TransactionResponse<C>> {
    run_query(Handle::from(transaction), statement, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use crate::mock::MockConnection;
    use crate::outcome::{Data, QueryOutcome};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fake_error() -> DriverError {
        DriverError::uncoded("fake error")
    }

    fn open(conn: &MockConnection) -> Transaction<MockConnection> {
        Transaction::from_connection(PooledConnection::new(conn.clone()))
    }

    #[tokio::test]
    async fn test_commit_succeeds() {
        let conn = MockConnection::new();
        assert!(open(&conn).commit().await.unwrap());
        assert_eq!(conn.events(), vec!["COMMIT", "release"]);
    }

    #[tokio::test]
    async fn test_commit_fails_rollback_fails() {
        let conn = MockConnection::new().otherwise(Err(fake_error()));
        let err = commit(open(&conn)).await.err().unwrap();
        assert_eq!(err, QueryError::Driver(fake_error()));
        assert_eq!(conn.events(), vec!["COMMIT", "ROLLBACK", "release"]);
    }

    #[tokio::test]
    async fn test_commit_fails_rollback_succeeds() {
        let commit_err = DriverError::uncoded("commit broke");
        let conn = MockConnection::new().on("COMMIT", Err(commit_err.clone()));

        let err = open(&conn).commit().await.err().unwrap();

        assert_eq!(err, QueryError::Driver(commit_err));
        assert_eq!(conn.events(), vec!["COMMIT", "ROLLBACK", "release"]);
    }

    #[tokio::test]
    async fn test_commit_surfaces_rollback_error() {
        let conn = MockConnection::new()
            .on("COMMIT", Err(DriverError::uncoded("commit broke")))
            .on("ROLLBACK", Err(DriverError::uncoded("rollback broke")));

        let err = open(&conn).commit().await.err().unwrap();

        assert_eq!(err, QueryError::Driver(DriverError::uncoded("rollback broke")));
        assert_eq!(conn.release_count(), 1);
    }

    #[tokio::test]
    async fn test_begin_issues_begin() {
        let conn = MockConnection::new();
        let tx = Transaction::begin(PooledConnection::new(conn.clone()))
            .await
            .unwrap();
        assert_eq!(conn.events(), vec!["BEGIN"]);
        tx.rollback().await.unwrap();
        assert_eq!(conn.events(), vec!["BEGIN", "ROLLBACK", "release"]);
    }

    #[tokio::test]
    async fn test_begin_failure_releases() {
        let conn = MockConnection::new().on("BEGIN", Err(fake_error()));
        let err = Transaction::begin(PooledConnection::new(conn.clone()))
            .await
            .err()
            .unwrap();
        assert_eq!(err, QueryError::Driver(fake_error()));
        assert_eq!(conn.events(), vec!["BEGIN", "release"]);
    }

    #[tokio::test]
    async fn test_statements_then_commit() {
        let conn = MockConnection::new()
            .on(
                "INSERT INTO users (name) VALUES ($1)",
                Ok(QueryOutcome::affected(1)),
            )
            .on(
                "SELECT user_name FROM users",
                Ok(QueryOutcome::from_rows(vec![
                    json!({"user_name": "ada"}).as_object().cloned().unwrap(),
                ])),
            );

        let tx = open(&conn);
        let insert = Statement::new("INSERT INTO users (name) VALUES ($1)").bind("ada");
        let res = tx.query(&insert).await.unwrap();
        assert_eq!(res.meta.row_count, Some(1));

        let res = res
            .connection
            .lookup(&Statement::new("SELECT user_name FROM users"))
            .await
            .unwrap();
        assert_eq!(
            res.data,
            Data::Single(json!({"userName": "ada"}).as_object().cloned().unwrap())
        );

        assert!(res.connection.commit().await.unwrap());
        assert_eq!(
            conn.events(),
            vec![
                "INSERT INTO users (name) VALUES ($1)",
                "SELECT user_name FROM users",
                "COMMIT",
                "release",
            ]
        );
    }

    #[tokio::test]
    async fn test_query_on_missing_transaction() {
        let err = query_on_transaction::<MockConnection>(
            None,
            &Statement::new("SELECT 1"),
            QueryOptions::QUERY,
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err, QueryError::NoDbConnection);
    }

    #[tokio::test]
    async fn test_drop_discards_once() {
        let conn = MockConnection::new();
        drop(open(&conn));
        assert_eq!(conn.events(), vec!["discard"]);
        assert_eq!(conn.release_count(), 0);
    }

    #[tokio::test]
    async fn test_begin_then_drop_never_pools_open_session() {
        let conn = MockConnection::new();
        let tx = Transaction::begin(PooledConnection::new(conn.clone()))
            .await
            .unwrap();
        drop(tx);
        assert_eq!(conn.events(), vec!["BEGIN", "discard"]);
    }

    #[tokio::test]
    async fn test_lookup_with_many_rows_rolls_back() {
        let row = json!({"id": 1}).as_object().cloned().unwrap();
        let conn = MockConnection::new().on(
            "SELECT id FROM users",
            Ok(QueryOutcome::from_rows(vec![row.clone(), row])),
        );

        let err = open(&conn)
            .lookup(&Statement::new("SELECT id FROM users"))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, QueryError::InvalidState(_)));
        assert_eq!(
            conn.events(),
            vec!["SELECT id FROM users", "ROLLBACK", "release"]
        );
    }
}

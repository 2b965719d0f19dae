//! What a driver reports for a statement, and what callers get back.

use serde::Serialize;

use crate::statement::Record;
use crate::transaction::Transaction;

/// Raw result of one statement as reported by a [`Connection`](crate::Connection).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Returned rows, keyed by column name.
    pub rows: Vec<Record>,
    /// Affected-row count, when the driver reports one.
    pub row_count: Option<u64>,
    /// Any other driver metadata (command tag, last insert id, ...).
    pub metadata: Record,
}

impl QueryOutcome {
    pub fn from_rows(rows: Vec<Record>) -> Self {
        let row_count = Some(rows.len() as u64);
        Self {
            rows,
            row_count,
            metadata: Record::new(),
        }
    }

    /// Outcome of a statement that returns no rows.
    pub fn affected(row_count: u64) -> Self {
        Self {
            rows: Vec::new(),
            row_count: Some(row_count),
            metadata: Record::new(),
        }
    }

    /// No rows, and no affected rows (when a count is reported at all).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.row_count.is_none_or(|n| n == 0)
    }

    /// Split into rows and everything else.
    pub fn into_parts(self) -> (Vec<Record>, QueryMeta) {
        let meta = QueryMeta {
            row_count: self.row_count,
            extra: self.metadata,
        };
        (self.rows, meta)
    }
}

/// Driver metadata for a statement, without the row payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryMeta {
    #[serde(rename = "rowCount", skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Record,
}

/// The `data` part of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// Every returned row, in order.
    Rows(Vec<Record>),
    /// The one row a lookup asked for.
    Single(Record),
    /// A lookup that was allowed to come back empty.
    Empty,
}

impl Data {
    pub fn rows(&self) -> Option<&[Record]> {
        match self {
            Data::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn single(&self) -> Option<&Record> {
        match self {
            Data::Single(row) => Some(row),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Data::Rows(rows) => rows.is_empty(),
            Data::Single(_) => false,
            Data::Empty => true,
        }
    }
}

/// Result of a statement whose connection has gone back to the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub data: Data,
    pub meta: QueryMeta,
}

/// Result of a statement run inside a transaction.
///
/// The connection comes back with it so the caller can keep issuing
/// statements and eventually commit or roll back.
pub struct TransactionResponse<C: crate::Connection> {
    pub data: Data,
    pub meta: QueryMeta,
    pub connection: Transaction<C>,
}

impl<C: crate::Connection> std::fmt::Debug for TransactionResponse<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionResponse")
            .field("data", &self.data)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

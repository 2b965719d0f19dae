//! Scripted pool and connection for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::connection::{Connection, Pool};
use crate::error::DriverError;
use crate::outcome::QueryOutcome;
use crate::statement::SqlValue;

#[derive(Default)]
struct State {
    responses: HashMap<String, Result<QueryOutcome, DriverError>>,
    fallback: Option<Result<QueryOutcome, DriverError>>,
    events: Vec<String>,
    params: Vec<Vec<SqlValue>>,
}

/// Connection whose answers are scripted per SQL text.
///
/// Clones share state, so a test can keep one handle and inspect what the
/// code under test did with the other.
#[derive(Clone, Default)]
pub struct MockConnection {
    state: Arc<Mutex<State>>,
}

impl MockConnection {
    /// Every statement succeeds with an empty outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `sql` with `response`.
    pub fn on(self, sql: &str, response: Result<QueryOutcome, DriverError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(sql.to_string(), response);
        self
    }

    /// Answer any unscripted statement with `response`.
    pub fn otherwise(self, response: Result<QueryOutcome, DriverError>) -> Self {
        self.state.lock().unwrap().fallback = Some(response);
        self
    }

    /// Every query, release and discard, in order.
    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn release_count(&self) -> usize {
        self.events().iter().filter(|e| *e == "release").count()
    }

    pub fn last_params(&self) -> Option<Vec<SqlValue>> {
        self.state.lock().unwrap().params.last().cloned()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<QueryOutcome, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.events.push(sql.to_string());
        state.params.push(params.to_vec());
        match state.responses.get(sql).or(state.fallback.as_ref()) {
            Some(response) => response.clone(),
            None => Ok(QueryOutcome::default()),
        }
    }

    fn release(self) {
        self.state.lock().unwrap().events.push("release".to_string());
    }

    fn discard(self) {
        self.state.lock().unwrap().events.push("discard".to_string());
    }
}

enum Behaviour {
    Yield(MockConnection),
    Empty,
    Fail(DriverError),
}

pub struct MockPool {
    behaviour: Behaviour,
}

impl MockPool {
    pub fn yielding(conn: MockConnection) -> Self {
        Self {
            behaviour: Behaviour::Yield(conn),
        }
    }

    pub fn empty() -> Self {
        Self {
            behaviour: Behaviour::Empty,
        }
    }

    pub fn failing(err: DriverError) -> Self {
        Self {
            behaviour: Behaviour::Fail(err),
        }
    }
}

#[async_trait]
impl Pool for MockPool {
    type Connection = MockConnection;

    async fn connect(&self) -> Result<Option<MockConnection>, DriverError> {
        match &self.behaviour {
            Behaviour::Yield(conn) => Ok(Some(conn.clone())),
            Behaviour::Empty => Ok(None),
            Behaviour::Fail(err) => Err(err.clone()),
        }
    }
}

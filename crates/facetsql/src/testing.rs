//! In-memory client used by unit tests.
//!
//! Statements are recorded instead of executed. Statements run inside a unit
//! of work become visible in [`FakeDb::committed`] only once it commits.

use crate::client::{Begin, GenericClient, UnitOfWork};
use crate::error::{StoreError, StoreResult};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Default)]
struct State {
    committed: Vec<String>,
    rollbacks: usize,
    fail_on: Option<String>,
    fail_commit: bool,
    fail_rollback: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeDb {
    state: Arc<Mutex<State>>,
}

impl FakeDb {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Fail every statement containing `needle`.
    pub fn fail_on(&self, needle: &str) {
        self.state().fail_on = Some(needle.to_string());
    }

    pub fn fail_commit(&self) {
        self.state().fail_commit = true;
    }

    pub fn fail_rollback(&self) {
        self.state().fail_rollback = true;
    }

    pub fn committed(&self) -> Vec<String> {
        self.state().committed.clone()
    }

    pub fn rollbacks(&self) -> usize {
        self.state().rollbacks
    }

    fn check(&self, sql: &str) -> StoreResult<()> {
        match &self.state().fail_on {
            Some(needle) if sql.contains(needle.as_str()) => {
                Err(StoreError::Other(format!("statement failed: {sql}")))
            }
            _ => Ok(()),
        }
    }
}

impl GenericClient for FakeDb {
    async fn query(&self, sql: &str, _params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        self.check(sql)?;
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, _params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        self.check(sql)?;
        self.state().committed.push(sql.to_string());
        Ok(1)
    }
}

pub(crate) struct FakeTx<'a> {
    db: &'a FakeDb,
    pending: Mutex<Vec<String>>,
}

impl GenericClient for FakeTx<'_> {
    async fn query(&self, sql: &str, _params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        self.db.check(sql)?;
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, _params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        self.db.check(sql)?;
        self.pending.lock().unwrap().push(sql.to_string());
        Ok(1)
    }
}

impl UnitOfWork for FakeTx<'_> {
    async fn commit(self) -> StoreResult<()> {
        let mut state = self.db.state();
        if state.fail_commit {
            return Err(StoreError::Other("commit failed".into()));
        }
        let pending = self.pending.into_inner().unwrap();
        state.committed.extend(pending);
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        let mut state = self.db.state();
        if state.fail_rollback {
            return Err(StoreError::Other("connection closed".into()));
        }
        state.rollbacks += 1;
        Ok(())
    }
}

impl Begin for FakeDb {
    type Tx<'a> = FakeTx<'a>;

    async fn begin(&mut self) -> StoreResult<Self::Tx<'_>> {
        Ok(FakeTx {
            db: self,
            pending: Mutex::new(Vec::new()),
        })
    }
}

//! Execution collaborator traits.
//!
//! - [`GenericClient`] runs one parameterized statement. Clients and open
//!   transactions both implement it, so repository methods compose with or
//!   without a surrounding unit of work.
//! - [`Begin`] opens a unit of work on a connection.
//! - [`UnitOfWork`] is an open transaction that can be committed or rolled back.
//!   Both consume it; a `tokio_postgres` transaction dropped without either is
//!   rolled back by the driver.

use crate::error::{StoreError, StoreResult};
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients and transactions.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = StoreResult<Vec<Row>>> + Send;

    /// Execute a query and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 or more rows: returns `Ok(Some(first_row))`
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = StoreResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Return a cancellation token for the underlying connection, if supported.
    ///
    /// Used to cancel a statement server-side when its deadline expires.
    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        None
    }
}

/// An open unit of work.
pub trait UnitOfWork: GenericClient + Sized {
    /// Make every statement executed in this unit of work permanent.
    fn commit(self) -> impl Future<Output = StoreResult<()>> + Send;

    /// Discard every statement executed in this unit of work.
    fn rollback(self) -> impl Future<Output = StoreResult<()>> + Send;
}

/// A connection that can open a unit of work.
pub trait Begin: Send {
    type Tx<'a>: UnitOfWork
    where
        Self: 'a;

    /// Begin a new unit of work borrowing this connection.
    fn begin(&mut self) -> impl Future<Output = StoreResult<Self::Tx<'_>>> + Send;
}

// ===== tokio-postgres =====

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(StoreError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(StoreError::from_db_error)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Client::cancel_token(self))
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(StoreError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(StoreError::from_db_error)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Transaction::cancel_token(self))
    }
}

impl UnitOfWork for tokio_postgres::Transaction<'_> {
    async fn commit(self) -> StoreResult<()> {
        tokio_postgres::Transaction::commit(self)
            .await
            .map_err(StoreError::from_db_error)
    }

    async fn rollback(self) -> StoreResult<()> {
        tokio_postgres::Transaction::rollback(self)
            .await
            .map_err(StoreError::from_db_error)
    }
}

impl Begin for tokio_postgres::Client {
    type Tx<'a> = tokio_postgres::Transaction<'a>;

    async fn begin(&mut self) -> StoreResult<Self::Tx<'_>> {
        self.transaction().await.map_err(StoreError::from_db_error)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        GenericClient::query(client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        let client: &tokio_postgres::Client = self;
        GenericClient::execute(client, sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        let client: &tokio_postgres::Client = self;
        GenericClient::cancel_token(client)
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        let tx: &tokio_postgres::Transaction<'_> = self;
        GenericClient::query(tx, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        let tx: &tokio_postgres::Transaction<'_> = self;
        GenericClient::execute(tx, sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        let tx: &tokio_postgres::Transaction<'_> = self;
        GenericClient::cancel_token(tx)
    }
}

#[cfg(feature = "pool")]
impl UnitOfWork for deadpool_postgres::Transaction<'_> {
    async fn commit(self) -> StoreResult<()> {
        deadpool_postgres::Transaction::commit(self)
            .await
            .map_err(StoreError::from_db_error)
    }

    async fn rollback(self) -> StoreResult<()> {
        deadpool_postgres::Transaction::rollback(self)
            .await
            .map_err(StoreError::from_db_error)
    }
}

#[cfg(feature = "pool")]
impl Begin for deadpool_postgres::Client {
    type Tx<'a> = deadpool_postgres::Transaction<'a>;

    async fn begin(&mut self) -> StoreResult<Self::Tx<'_>> {
        self.transaction().await.map_err(StoreError::from_db_error)
    }
}

// ===== Reference implementations =====

impl<C: GenericClient> GenericClient for &C {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        (*self).query(sql, params).await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> StoreResult<Option<Row>> {
        (*self).query_opt(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        (*self).execute(sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        (*self).cancel_token()
    }
}

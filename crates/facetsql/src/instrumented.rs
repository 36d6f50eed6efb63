//! Statement deadlines and logging around any client.

use crate::client::{Begin, GenericClient, UnitOfWork};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use std::future::Future;
use std::time::Instant;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Wraps a client (or an open unit of work) and applies [`StoreConfig`] to
/// every statement it runs.
///
/// A unit of work begun through the wrapper is wrapped too, so statements of a
/// batch observe the same deadline. When a deadline expires the statement is
/// cancelled on the server and the call fails with [`StoreError::Timeout`];
/// the batch executor then rolls the unit of work back.
#[derive(Debug)]
pub struct InstrumentedClient<C> {
    client: C,
    config: StoreConfig,
}

impl<C> InstrumentedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C: GenericClient> InstrumentedClient<C> {
    async fn run<T, F>(&self, sql: &str, params: usize, future: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        #[cfg(feature = "tracing")]
        if self.config.log_statements {
            tracing::debug!(target: "facetsql.sql", sql, params, "executing statement");
        }

        let start = Instant::now();
        let result = match self.config.statement_timeout {
            Some(timeout) => {
                tokio::pin!(future);
                tokio::select! {
                    result = &mut future => result,
                    _ = tokio::time::sleep(timeout) => {
                        if let Some(cancel_token) = self.client.cancel_token() {
                            tokio::spawn(async move {
                                let _ = cancel_token.cancel_query(tokio_postgres::NoTls).await;
                            });
                        }
                        #[cfg(feature = "tracing")]
                        tracing::warn!(target: "facetsql.sql", sql, ?timeout, "statement timed out");
                        Err(StoreError::Timeout(timeout))
                    }
                }
            }
            None => future.await,
        };
        let elapsed = start.elapsed();

        if let Some(threshold) = self.config.slow_statement_threshold {
            if elapsed > threshold {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "facetsql.sql", sql, params, ?elapsed, "slow statement");
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (sql, params, elapsed);

        result
    }
}

impl<C: GenericClient> GenericClient for InstrumentedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        self.run(sql, params.len(), self.client.query(sql, params))
            .await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> StoreResult<Option<Row>> {
        self.run(sql, params.len(), self.client.query_opt(sql, params))
            .await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        self.run(sql, params.len(), self.client.execute(sql, params))
            .await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        self.client.cancel_token()
    }
}

impl<C: UnitOfWork> UnitOfWork for InstrumentedClient<C> {
    async fn commit(self) -> StoreResult<()> {
        self.client.commit().await
    }

    async fn rollback(self) -> StoreResult<()> {
        self.client.rollback().await
    }
}

impl<C: Begin + Sync> Begin for InstrumentedClient<C> {
    type Tx<'a>
        = InstrumentedClient<C::Tx<'a>>
    where
        Self: 'a;

    async fn begin(&mut self) -> StoreResult<Self::Tx<'_>> {
        let config = self.config.clone();
        let tx = self.client.begin().await?;
        Ok(InstrumentedClient { client: tx, config })
    }
}

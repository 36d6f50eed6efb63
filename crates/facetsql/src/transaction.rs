//! Unit-of-work helpers.
//!
//! Prefer passing an open unit of work into APIs that accept
//! [`GenericClient`](crate::GenericClient); repository methods then compose
//! with or without a surrounding transaction.
//!
//! # Example
//!
//! ```ignore
//! use facetsql::{sql, StoreResult};
//!
//! # async fn demo(client: &mut tokio_postgres::Client) -> StoreResult<()> {
//! facetsql::unit_of_work!(client, tx, {
//!     sql("UPDATE product SET quantity = quantity - ")
//!         .bind(1_i64)
//!         .push(" WHERE id = ")
//!         .push_bind(7_i64)
//!         .execute(&tx)
//!         .await?;
//!     Ok(())
//! })?;
//! # Ok(()) }
//! ```

use crate::client::UnitOfWork;
use crate::error::{StoreError, StoreResult};

/// Runs the given block inside a unit of work.
///
/// - Begins via [`Begin::begin`](crate::Begin::begin) on `$client` (a `&mut`).
/// - Commits on `Ok(_)`; a failed commit is the result.
/// - Rolls back on `Err(_)`; a failed rollback is reported together with the
///   original error.
///
/// The block must evaluate to `facetsql::StoreResult<T>`; the macro evaluates
/// to the same type.
#[macro_export]
macro_rules! unit_of_work {
    ($client:expr, $tx:ident, $body:block) => {{
        match $crate::Begin::begin($client).await {
            Ok($tx) => {
                let __facetsql_uow_result: $crate::StoreResult<_> = async { $body }.await;
                $crate::transaction::finish($tx, __facetsql_uow_result).await
            }
            Err(error) => Err(error),
        }
    }};
}

/// Commit `tx` if `result` is `Ok`, roll it back otherwise.
pub async fn finish<U: UnitOfWork, T>(tx: U, result: StoreResult<T>) -> StoreResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => match tx.rollback().await {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "facetsql.tx", %error, "unit of work rolled back");
                Err(error)
            }
            Err(rollback) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "facetsql.tx", %error, %rollback, "rollback failed");
                Err(StoreError::rollback(error, rollback))
            }
        },
    }
}

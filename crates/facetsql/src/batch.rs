//! Atomic execution of statement batches.

use crate::client::{Begin, GenericClient};
use crate::error::StoreResult;
use crate::sql::Sql;

/// Run `statements` in order on an already open unit of work (or any client).
///
/// Stops at the first failure. Returns the sum of affected rows.
pub async fn run_in(conn: &impl GenericClient, statements: &[Sql]) -> StoreResult<u64> {
    let mut affected = 0;
    for statement in statements {
        affected += statement.execute(conn).await?;
    }
    Ok(affected)
}

/// Run `statements` in order inside a new unit of work.
///
/// The first failure rolls everything back and is returned; otherwise the
/// unit of work commits once and the sum of affected rows is returned.
/// Dropping the returned future before it completes drops the open unit of
/// work, which rolls it back.
pub async fn run_atomic<B: Begin>(client: &mut B, statements: &[Sql]) -> StoreResult<u64> {
    crate::unit_of_work!(client, tx, { run_in(&tx, statements).await })
}

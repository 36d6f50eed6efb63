//! Row mapping traits and utilities

use crate::error::{StoreError, StoreResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Maps a result row to a typed record by column name.
///
/// Statements in this crate alias every projected column so the names used
/// here line up (e.g. `count(*) OVER () AS count`).
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> StoreResult<Self>;
}

/// Typed column access that reports the failing column.
pub trait RowExt {
    fn get_column<'a, T: FromSql<'a>>(&'a self, column: &str) -> StoreResult<T>;
}

impl RowExt for Row {
    fn get_column<'a, T: FromSql<'a>>(&'a self, column: &str) -> StoreResult<T> {
        self.try_get(column)
            .map_err(|e| StoreError::decode(column, e.to_string()))
    }
}

/// A record paired with the window total (`count`) of the statement that produced it.
#[derive(Debug, Clone)]
pub struct Counted<T> {
    pub item: T,
    pub count: i64,
}

impl<T: FromRow> FromRow for Counted<T> {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            item: T::from_row(row)?,
            count: row.get_column("count")?,
        })
    }
}

/// Split counted rows into records and the total (0 when there are no rows).
pub fn split_counted<T>(rows: Vec<Counted<T>>) -> (Vec<T>, i64) {
    let count = rows.last().map_or(0, |row| row.count);
    (rows.into_iter().map(|row| row.item).collect(), count)
}

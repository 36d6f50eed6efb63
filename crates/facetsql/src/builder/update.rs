use crate::error::{StoreError, StoreResult};
use crate::partial::PartialSet;
use crate::sql::Sql;
use tokio_postgres::types::ToSql;

/// UPDATE builder.
///
/// Column names are trusted (they come from code, never from a request).
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    /// `col = value` assignments
    sets: Vec<Sql>,
    /// WHERE conditions (without leading AND)
    conditions: Vec<Sql>,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            sets: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Set a column to a bound value.
    pub fn set<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        let mut assignment = Sql::new(format!("{column} = "));
        assignment.push_bind(value);
        self.sets.push(assignment);
        self
    }

    /// Set a column only when `tag` is flagged in `partial`.
    ///
    /// The value is taken lazily so untouched fields are never read.
    pub fn set_if<T>(
        &mut self,
        partial: &PartialSet,
        tag: &str,
        column: &str,
        value: impl FnOnce() -> T,
    ) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if partial.contains(tag) {
            self.set(column, value());
        }
        self
    }

    /// Set a column to a trusted SQL expression, e.g. `now()`.
    pub fn set_raw(&mut self, column: &str, expr: &str) -> &mut Self {
        self.sets.push(Sql::new(format!("{column} = {expr}")));
        self
    }

    /// AND a condition; an empty fragment adds nothing.
    pub fn and_where(&mut self, condition: Sql) -> &mut Self {
        if !condition.is_empty() {
            self.conditions.push(condition);
        }
        self
    }

    /// Add AND equality condition.
    pub fn and_eq<T>(&mut self, col: &str, val: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        let mut condition = Sql::new(format!("{col} = "));
        condition.push_bind(val);
        self.and_where(condition)
    }

    /// Render the statement. Fails without SET or without WHERE.
    pub fn build(&self) -> StoreResult<Sql> {
        if self.sets.is_empty() {
            return Err(StoreError::validation(format!(
                "UPDATE {} requires at least one SET",
                self.table
            )));
        }
        if self.conditions.is_empty() {
            return Err(StoreError::validation(format!(
                "UPDATE {} requires a WHERE condition",
                self.table
            )));
        }

        let mut sql = Sql::new(format!("UPDATE {} SET ", self.table));
        for (i, assignment) in self.sets.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push_sql(assignment.clone());
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            sql.push(if i == 0 { " WHERE " } else { " AND " });
            sql.push_sql(condition.clone());
        }
        Ok(sql)
    }
}

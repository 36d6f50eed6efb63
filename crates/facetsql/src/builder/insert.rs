use crate::error::{StoreError, StoreResult};
use crate::sql::Sql;
use tokio_postgres::types::ToSql;

/// Single-row INSERT builder with optional upsert and RETURNING.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    values: Vec<Sql>,
    /// `(conflict target, columns refreshed from EXCLUDED)`
    on_conflict: Option<(String, Vec<String>)>,
    returning: Option<String>,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
            on_conflict: None,
            returning: None,
        }
    }

    /// Insert a bound value into `column`.
    pub fn value<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.columns.push(column.to_string());
        self.values.push(Sql::empty().bind(value));
        self
    }

    /// Insert a trusted SQL expression into `column`, e.g. `now()`.
    pub fn value_raw(&mut self, column: &str, expr: &str) -> &mut Self {
        self.columns.push(column.to_string());
        self.values.push(Sql::new(expr));
        self
    }

    /// `ON CONFLICT (target) DO UPDATE SET c = EXCLUDED.c` for each column.
    pub fn on_conflict_update(&mut self, target: &str, columns: &[&str]) -> &mut Self {
        self.on_conflict = Some((
            target.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    pub fn returning(&mut self, cols: &str) -> &mut Self {
        self.returning = Some(cols.to_string());
        self
    }

    pub fn build(&self) -> StoreResult<Sql> {
        if self.columns.is_empty() {
            return Err(StoreError::validation(format!(
                "INSERT INTO {} requires at least one column",
                self.table
            )));
        }

        let mut sql = Sql::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            self.table,
            self.columns.join(", ")
        ));
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push_sql(value.clone());
        }
        sql.push(")");

        if let Some((target, columns)) = &self.on_conflict {
            if columns.is_empty() {
                sql.push(&format!(" ON CONFLICT ({target}) DO NOTHING"));
            } else {
                let assignments = columns
                    .iter()
                    .map(|c| format!("{c} = EXCLUDED.{c}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                sql.push(&format!(
                    " ON CONFLICT ({target}) DO UPDATE SET {assignments}"
                ));
            }
        }

        if let Some(returning) = &self.returning {
            sql.push(" RETURNING ").push(returning);
        }
        Ok(sql)
    }
}

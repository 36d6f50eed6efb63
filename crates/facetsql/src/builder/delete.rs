use crate::error::{StoreError, StoreResult};
use crate::sql::Sql;
use tokio_postgres::types::ToSql;

/// DELETE builder. Refuses to build without a WHERE condition.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    conditions: Vec<Sql>,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            conditions: Vec::new(),
        }
    }

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

    /// Add AND IN (...) condition. An empty list matches nothing.
    pub fn and_in<T>(&mut self, col: &str, values: Vec<T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if values.is_empty() {
            return self.and_where(Sql::new("1=0"));
        }
        let mut condition = Sql::new(format!("{col} IN ("));
        condition.push_bind_list(values).push(")");
        self.and_where(condition)
    }

    /// Add AND `col NOT IN (subquery)`.
    pub fn and_not_in(&mut self, col: &str, subquery: Sql) -> &mut Self {
        let mut condition = Sql::new(format!("{col} NOT IN ("));
        condition.push_sql(subquery).push(")");
        self.and_where(condition)
    }

    pub fn build(&self) -> StoreResult<Sql> {
        if self.conditions.is_empty() {
            return Err(StoreError::validation(format!(
                "DELETE FROM {} requires a WHERE condition",
                self.table
            )));
        }

        let mut sql = Sql::new(format!("DELETE FROM {}", self.table));
        for (i, condition) in self.conditions.iter().enumerate() {
            sql.push(if i == 0 { " WHERE " } else { " AND " });
            sql.push_sql(condition.clone());
        }
        Ok(sql)
    }
}

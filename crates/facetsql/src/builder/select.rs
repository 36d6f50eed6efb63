use crate::sql::Sql;
use tokio_postgres::types::ToSql;

// LIMIT and OFFSET are bigint on the server.
const MAX_ROWS: u64 = i64::MAX as u64;

/// Structured SELECT builder.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    /// `WITH ...` prefix
    with: Option<String>,
    /// SELECT columns (empty renders `*`)
    columns: Vec<String>,
    /// Main table expression
    from: String,
    /// JOIN clauses, possibly with bound parameters
    joins: Vec<Sql>,
    /// WHERE conditions (without leading AND)
    conditions: Vec<Sql>,
    /// ORDER BY terms
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Append `count(*) OVER () AS count`
    total_count: bool,
}

impl SelectBuilder {
    pub fn new(from: &str) -> Self {
        Self {
            with: None,
            columns: Vec::new(),
            from: from.to_string(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            total_count: false,
        }
    }

    /// Prefix the statement with a common table expression (`WITH ...`).
    pub fn with(&mut self, cte: &str) -> &mut Self {
        self.with = Some(cte.to_string());
        self
    }

    /// Append one SELECT column.
    pub fn column(&mut self, expr: &str) -> &mut Self {
        self.columns.push(expr.to_string());
        self
    }

    /// Append multiple SELECT columns.
    pub fn columns(&mut self, exprs: &[&str]) -> &mut Self {
        self.columns.extend(exprs.iter().map(|s| s.to_string()));
        self
    }

    /// Report the total number of matching rows in a `count` column.
    pub fn with_total_count(&mut self) -> &mut Self {
        self.total_count = true;
        self
    }

    /// Add INNER JOIN with a trusted ON expression.
    pub fn inner_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join("INNER JOIN", table, Sql::new(on))
    }

    /// Add INNER JOIN whose ON expression binds parameters.
    pub fn inner_join_sql(&mut self, table: &str, on: Sql) -> &mut Self {
        self.join("INNER JOIN", table, on)
    }

    /// Add LEFT JOIN with a trusted ON expression.
    pub fn left_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join("LEFT JOIN", table, Sql::new(on))
    }

    fn join(&mut self, kind: &str, table: &str, on: Sql) -> &mut Self {
        let mut clause = Sql::new(format!("{kind} {table} ON "));
        clause.push_sql(on);
        self.joins.push(clause);
        self
    }

    /// AND a condition; an empty fragment adds nothing.
    pub fn and_where(&mut self, condition: Sql) -> &mut Self {
        if !condition.is_empty() {
            self.conditions.push(condition);
        }
        self
    }

    /// AND a trusted raw condition.
    pub fn and_raw(&mut self, condition: &str) -> &mut Self {
        self.and_where(Sql::new(condition))
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
            return self.and_raw("1=0");
        }
        let mut condition = Sql::new(format!("{col} IN ("));
        condition.push_bind_list(values).push(")");
        self.and_where(condition)
    }

    /// Append an ORDER BY term. `expr` must be trusted.
    pub fn order_by(&mut self, expr: &str, desc: bool) -> &mut Self {
        let direction = if desc { "DESC" } else { "ASC" };
        self.order_by.push(format!("{expr} {direction}"));
        self
    }

    /// Values above the bigint range are clamped to `i64::MAX`.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit.min(MAX_ROWS));
        self
    }

    /// Values above the bigint range are clamped to `i64::MAX`.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset.min(MAX_ROWS));
        self
    }

    /// Render the statement.
    ///
    /// Rendering does not consume the builder; repeated calls yield identical
    /// text and parameters.
    pub fn build(&self) -> Sql {
        let mut sql = Sql::empty();

        if let Some(with) = &self.with {
            sql.push(with).push(" ");
        }

        sql.push("SELECT ");
        if self.columns.is_empty() {
            sql.push("*");
        } else {
            sql.push(&self.columns.join(", "));
        }
        if self.total_count {
            sql.push(", count(*) OVER () AS count");
        }
        sql.push(" FROM ").push(&self.from);

        for join in &self.joins {
            sql.push(" ").push_sql(join.clone());
        }

        for (i, condition) in self.conditions.iter().enumerate() {
            sql.push(if i == 0 { " WHERE " } else { " AND " });
            sql.push_sql(condition.clone());
        }

        if !self.order_by.is_empty() {
            sql.push(" ORDER BY ").push(&self.order_by.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push(&format!(" OFFSET {offset}"));
        }

        sql
    }
}

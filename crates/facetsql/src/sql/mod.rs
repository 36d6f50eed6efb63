//! Dynamic SQL statement builder.
//!
//! `Sql` keeps statement text and bound values apart and numbers the
//! placeholders (`$1, $2, ...`) when the statement is rendered, so fragments can
//! be built independently and composed in any order.
//!
//! # Example
//!
//! ```ignore
//! use facetsql::sql;
//!
//! let mut q = sql("SELECT id, name FROM product WHERE brand_id = ");
//! q.push_bind(7_i64);
//! q.push(" ORDER BY price DESC");
//!
//! let rows = q.fetch_all(&conn).await?;
//! ```

mod builder;
mod parts;


pub use builder::Sql;

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

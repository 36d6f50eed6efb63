//! Structured statement builders.
//!
//! Every builder renders to a [`Sql`](crate::Sql), so fragments with bound
//! parameters (joins, predicates, SET values) can be added in any order and
//! are numbered when the statement is rendered.
//!
//! - Safe defaults: DELETE requires WHERE; UPDATE requires SET and WHERE.
//! - Client-driven WHERE/ORDER BY/LIMIT go through [`apply_find_many`] and an
//!   allow-list; nothing a client sends is interpolated.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;
pub mod where_builder;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;
pub use where_builder::{
    apply_filters, apply_find_many, apply_limit_offset, apply_sorters, filter_clause,
};

#[cfg(test)]
mod tests;

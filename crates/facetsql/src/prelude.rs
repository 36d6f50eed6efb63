//! Convenient imports for typical `facetsql` usage.
//!
//! ```ignore
//! use facetsql::prelude::*;
//! ```

pub use crate::{
    Begin, FilterCombination, FindManyParams, FromRow, GenericClient, Product, ProductAttribute,
    ProductStore, QueryOrderBy, QueryWhere, ResultExt, RowExt, Sql, StoreConfig, StoreError,
    StoreResult, UnitOfWork, sql,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};

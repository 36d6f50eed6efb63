//! # facetsql
//!
//! Allow-listed, parameterized SQL construction for faceted catalog queries
//! on PostgreSQL.
//!
//! ## Features
//!
//! - **Nothing from a request is interpolated**: field names resolve through an
//!   [`AllowList`] (or are quoted with [`quote_ident`]) and every value is bound
//! - **Best effort filters**: unknown fields, unknown operators and values the
//!   column cannot hold are dropped, never turned into errors. The statement
//!   builders ([`apply_find_many`], [`ProductStore::query_find_many`]) return
//!   them as a [`Dropped`] report; every drop is also logged at DEBUG
//! - **Faceted search**: brand and attribute-set facets with AND across facets
//!   and OR within one facet
//! - **Sparse updates**: only fields flagged in a [`PartialSet`] are written
//! - **Atomic batches**: [`run_atomic`] commits all statements or none
//!
//! ## Listing products
//!
//! ```ignore
//! use facetsql::prelude::*;
//!
//! let params: FindManyParams = serde_json::from_str(r#"{
//!     "filters": [[{"field": "brand", "operator": "eq", "value": 7}]],
//!     "sorters": [{"field": "price", "desc": true}],
//!     "limit": 10,
//!     "offset": 0
//! }"#)?;
//!
//! let client = pool.get().await?;
//! let (products, total) = ProductStore::find_many(&client, &params, 0).await?;
//! ```
//!
//! ## Building statements
//!
//! ```ignore
//! use facetsql::{AllowList, Kind, SelectBuilder, apply_find_many};
//!
//! const FILTERS: AllowList = AllowList::typed(&[("brand", "p.brand_id", Kind::Int)]);
//! const SORTERS: AllowList = AllowList::new(&[("price", "p.price")]);
//!
//! let mut select = SelectBuilder::new("product p");
//! select.columns(&["p.id", "p.name"]).with_total_count();
//! let dropped = apply_find_many(&mut select, &params, &FILTERS, &SORTERS);
//! let rows = select.build().fetch_all(&client).await?;
//! ```

pub mod allow_list;
pub mod batch;
pub mod builder;
pub mod category;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod facet;
pub mod find;
pub mod ident;
pub mod instrumented;
pub mod model;
pub mod partial;
pub mod prelude;
pub mod product;
pub mod row;
pub mod sql;
pub mod transaction;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(test)]
mod testing;

pub use allow_list::{AllowList, FieldResolver, QuotedIdent};
pub use batch::{run_atomic, run_in};
pub use builder::{
    DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder, apply_filters, apply_find_many,
    apply_limit_offset, apply_sorters, filter_clause,
};
pub use category::{CATEGORY_CTE, CategoryScope, is_descendant};
pub use client::{Begin, GenericClient, UnitOfWork};
pub use condition::{DropReason, Operator, QueryWhere, translate, translate_as};
pub use config::StoreConfig;
pub use error::{ResultExt, StoreError, StoreResult};
pub use facet::{
    BRAND, FacetKey, FilterCombination, FilterFacet, FilterFacetValue, apply_facets,
};
pub use find::{Dropped, DroppedFilter, FilterLogic, FindManyParams, QueryOrderBy};
pub use ident::quote_ident;
pub use instrumented::InstrumentedClient;
pub use model::{Product, ProductAttribute};
pub use partial::PartialSet;
pub use product::ProductStore;
pub use row::{Counted, FromRow, RowExt};
pub use sql::{Sql, sql};
pub use value::{Kind, Value};

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

//! Catalog records read and written by [`ProductStore`](crate::ProductStore).

use crate::error::StoreResult;
use crate::partial::PartialSet;
use crate::row::{FromRow, RowExt};
use chrono::{DateTime, Utc};
use heck::ToKebabCase;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Partial-update tags of [`Product`] fields.
pub mod tag {
    pub const CODE: &str = "Code";
    pub const NAME: &str = "Name";
    pub const DESCRIPTION: &str = "Description";
    pub const QUANTITY: &str = "Quantity";
    pub const PRICE: &str = "Price";
    pub const IS_PUBLISHED: &str = "IsPublished";
    pub const BRAND_ID: &str = "Brand.ID";
    pub const CATEGORY_ID: &str = "Category.ID";
    pub const SUPPLIER_ID: &str = "Supplier.ID";
    pub const STATUS_ID: &str = "Status.ID";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductCategory {
    pub id: i64,
    /// Full hierarchy name, e.g. `Lighting / Lamps`.
    pub hierarchy: String,
    pub attribute_group_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSupplier {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductBrand {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductStatus {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub color: Option<String>,
}

/// An attribute set of the product's category and the value assigned to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAttribute {
    /// Attribute set id.
    pub id: i64,
    pub name: String,
    pub in_box: bool,
    pub in_filter: bool,
    /// `None` when no value is assigned; writing `None` clears the assignment.
    pub value_id: Option<i64>,
    pub value: Option<String>,
}

impl ProductAttribute {
    /// An assignment to write: attribute set `id` gets `value_id`.
    pub fn assign(id: i64, value_id: Option<i64>) -> Self {
        Self {
            id,
            value_id,
            ..Self::default()
        }
    }
}

impl FromRow for ProductAttribute {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.get_column("id")?,
            name: row.get_column("name")?,
            in_box: row.get_column("in_box")?,
            in_filter: row.get_column("in_filter")?,
            value_id: row.get_column("value_id")?,
            value: row.get_column("value")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// `0` for a product that does not exist yet.
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: ProductCategory,
    pub supplier: ProductSupplier,
    pub brand: ProductBrand,
    pub status: ProductStatus,
    /// `<supplier slug>/<product slug>/`
    pub url: String,
    pub is_available: bool,
    pub attributes: Vec<ProductAttribute>,
    /// Fields an update should write.
    pub partial: PartialSet,
}

impl Product {
    /// Slug derived from the name.
    ///
    /// `None` unless the product is new or its name is being updated, and
    /// `None` for names without any word characters.
    pub fn slugify(&self) -> Option<String> {
        if self.id != 0 && !self.partial.contains(tag::NAME) {
            return None;
        }
        let slug = self.name.to_kebab_case();
        (!slug.is_empty()).then_some(slug)
    }
}

impl FromRow for Product {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.get_column("id")?,
            code: row.get_column("code")?,
            name: row.get_column("name")?,
            description: row.get_column("description")?,
            quantity: row.get_column("quantity")?,
            price: row.get_column("price")?,
            is_published: row.get_column("is_published")?,
            created_at: row.get_column("created_at")?,
            updated_at: row.get_column("updated_at")?,
            category: ProductCategory {
                id: row.get_column("category_id")?,
                hierarchy: row.get_column("category_hierarchy")?,
                attribute_group_id: row.get_column("category_attribute_group_id")?,
            },
            supplier: ProductSupplier {
                id: row.get_column("supplier_id")?,
                name: row.get_column("supplier_name")?,
            },
            brand: ProductBrand {
                id: row.get_column("brand_id")?,
                name: row.get_column("brand_name")?,
            },
            status: ProductStatus {
                id: row.get_column("status_id")?,
                name: row.get_column("status_name")?,
                color: row.get_column("status_color")?,
            },
            url: row.get_column("product_url")?,
            is_available: row.get_column("is_available")?,
            attributes: Vec::new(),
            partial: PartialSet::default(),
        })
    }
}

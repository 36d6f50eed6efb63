//! Product storage.
//!
//! Every statement is produced by a `query_*` function so it can be inspected
//! without a database; the async operations execute them and tag errors with
//! `product.<operation>`.

use crate::allow_list::AllowList;
use crate::batch::{run_atomic, run_in};
use crate::builder::{
    DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder, apply_find_many,
    apply_limit_offset,
};
use crate::category::{CATEGORY_CTE, CategoryScope, join_root_category, join_selected_category};
use crate::client::{Begin, GenericClient};
use crate::error::{ResultExt, StoreError, StoreResult};
use crate::facet::{FilterCombination, apply_facets};
use crate::find::{Dropped, FindManyParams};
use crate::model::{Product, ProductAttribute, tag};
use crate::row::{Counted, RowExt, split_counted};
use crate::sql::Sql;
use crate::value::Kind;

const BASE_COLUMNS: &[&str] = &[
    "p.id",
    "p.code",
    "p.name",
    "p.description",
    "p.quantity",
    "p.price",
    "p.is_published",
    "p.created_at",
    "p.updated_at",
    "p.category_id",
    "c_cte.name AS category_hierarchy",
    "c.attribute_group_id AS category_attribute_group_id",
    "p.supplier_id",
    "s.name AS supplier_name",
    "p.brand_id",
    "b.name AS brand_name",
    "p.status_id",
    "ps.name AS status_name",
    "ps.color AS status_color",
    "concat(s.slug, '/', p.slug, '/') AS product_url",
    "(p.quantity > 0 AND p.is_published AND c.is_published AND s.is_published) AS is_available",
];

const AVAILABLE: &str = "p.quantity > 0 AND p.is_published AND c.is_published AND s.is_published";

/// Queries and commands over `product` and its attribute assignments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductStore;

impl ProductStore {
    /// Filterable fields of product listings.
    pub const FILTERS: AllowList = AllowList::typed(&[
        ("code", "p.code", Kind::Text),
        ("name", "p.name", Kind::Text),
        ("category", "p.category_id", Kind::Int),
        ("supplier", "p.supplier_id", Kind::Int),
        ("brand", "p.brand_id", Kind::Int),
        ("status", "coalesce(p.status_id, 0)", Kind::Int),
        ("is_published", "p.is_published", Kind::Bool),
        ("quantity", "p.quantity", Kind::Int),
        ("price", "p.price", Kind::Float),
    ]);

    /// Sortable fields of product listings.
    pub const SORTERS: AllowList = AllowList::new(&[
        ("code", "p.code"),
        ("name", "p.name"),
        ("supplier", "s.name"),
        ("brand", "b.name"),
        ("status", "ps.name"),
        ("quantity", "p.quantity"),
        ("price", "p.price"),
        ("is_published", "p.is_published"),
        ("created_at", "p.created_at"),
        ("updated_at", "p.updated_at"),
    ]);

    fn select_base() -> SelectBuilder {
        let mut select = SelectBuilder::new("product p");
        select
            .with(CATEGORY_CTE)
            .columns(BASE_COLUMNS)
            .inner_join("category c", "c.id = p.category_id");
        join_root_category(&mut select, "c");
        select
            .inner_join("category_cte c_cte", "c_cte.id = p.category_id")
            .inner_join("supplier s", "s.id = p.supplier_id")
            .inner_join("brand b", "b.id = p.brand_id")
            .left_join("product_status ps", "ps.id = p.status_id");
        select
    }

    // ==================== Statements ====================

    /// Listing of products under `scope`, with a `count` window column.
    pub fn query_find_many(params: &FindManyParams, scope: CategoryScope) -> (Sql, Dropped) {
        let mut select = Self::select_base();
        select.with_total_count();
        join_selected_category(&mut select, "c", scope);
        let dropped = apply_find_many(&mut select, params, &Self::FILTERS, &Self::SORTERS);
        (select.build(), dropped)
    }

    /// Available products under `scope` matching every active facet.
    pub fn query_find_available_by_category_id(
        scope: CategoryScope,
        filters: &FilterCombination,
    ) -> Sql {
        let mut select = Self::select_base();
        join_selected_category(&mut select, "c", scope);
        select.and_raw(AVAILABLE);
        apply_facets(&mut select, filters, "p");
        select.build()
    }

    pub fn query_get_by_id(id: i64) -> Sql {
        let mut select = Self::select_base();
        select.and_eq("p.id", id);
        select.build()
    }

    pub fn query_insert(product: &Product) -> StoreResult<Sql> {
        let mut insert = InsertBuilder::new("product");
        insert
            .value("code", product.code.clone())
            .value("slug", product.slugify().unwrap_or_default())
            .value("name", product.name.clone())
            .value("description", product.description.clone())
            .value("quantity", product.quantity)
            .value("price", product.price)
            .value("brand_id", product.brand.id)
            .value("category_id", product.category.id)
            .value("supplier_id", product.supplier.id)
            .value("status_id", product.status.id)
            .value("is_published", product.is_published)
            .returning("id");
        insert.build()
    }

    /// UPDATE of the fields flagged in `product.partial`.
    ///
    /// `updated_at` is always refreshed; `slug` is rewritten only when
    /// [`Product::slugify`] yields one.
    pub fn query_update_by_id(product: &Product) -> StoreResult<Sql> {
        let partial = &product.partial;
        let mut update = UpdateBuilder::new("product");
        update.set_raw("updated_at", "now()");
        if let Some(slug) = product.slugify() {
            update.set("slug", slug);
        }
        update
            .set_if(partial, tag::CODE, "code", || product.code.clone())
            .set_if(partial, tag::NAME, "name", || product.name.clone())
            .set_if(partial, tag::DESCRIPTION, "description", || {
                product.description.clone()
            })
            .set_if(partial, tag::QUANTITY, "quantity", || product.quantity)
            .set_if(partial, tag::PRICE, "price", || product.price)
            .set_if(partial, tag::BRAND_ID, "brand_id", || product.brand.id)
            .set_if(partial, tag::CATEGORY_ID, "category_id", || {
                product.category.id
            })
            .set_if(partial, tag::SUPPLIER_ID, "supplier_id", || {
                product.supplier.id
            })
            .set_if(partial, tag::STATUS_ID, "status_id", || product.status.id)
            .set_if(partial, tag::IS_PUBLISHED, "is_published", || {
                product.is_published
            })
            .and_eq("id", product.id);
        update.build()
    }

    /// Remove assignments to attribute sets outside the product's category
    /// attribute group.
    pub fn query_delete_invalid_attributes(product_id: i64) -> StoreResult<Sql> {
        let mut valid = SelectBuilder::new("attribute_set ats");
        valid
            .column("ats.id")
            .inner_join("attribute_group atg", "atg.id = ats.attribute_group_id")
            .inner_join("category c", "c.attribute_group_id = atg.id")
            .inner_join("product p", "p.category_id = c.id")
            .and_eq("p.id", product_id);

        let mut delete = DeleteBuilder::new("product_attribute");
        delete
            .and_eq("product_id", product_id)
            .and_not_in("attribute_set_id", valid.build());
        delete.build()
    }

    pub fn query_delete_many_by_id(ids: &[i64]) -> StoreResult<Sql> {
        let mut delete = DeleteBuilder::new("product");
        delete.and_in("id", ids.to_vec());
        delete.build()
    }

    /// Attribute sets of the product's category with the assigned values.
    ///
    /// Only pagination of `params` applies.
    pub fn query_find_many_attributes_by_product_id(
        product_id: i64,
        params: &FindManyParams,
    ) -> Sql {
        let mut select = SelectBuilder::new("product p");
        select
            .columns(&[
                "ats.id AS id",
                "ats.name",
                "ats.in_box",
                "ats.in_filter",
                "atv.id AS value_id",
                "atv.name AS value",
            ])
            .with_total_count()
            .inner_join("category c", "c.id = p.category_id")
            .inner_join("attribute_group atg", "atg.id = c.attribute_group_id")
            .inner_join("attribute_set ats", "ats.attribute_group_id = atg.id")
            .left_join(
                "product_attribute pa",
                "pa.product_id = p.id AND pa.attribute_set_id = ats.id",
            )
            .left_join("attribute_value atv", "atv.id = pa.attribute_value_id")
            .and_eq("p.id", product_id)
            .order_by("ats.position", false)
            .order_by("ats.id", true);
        apply_limit_offset(&mut select, params.limit, params.offset);
        select.build()
    }

    /// Assign (or, without a value, clear) one attribute of a product.
    pub fn query_upsert_attribute(
        product_id: i64,
        attribute: &ProductAttribute,
    ) -> StoreResult<Sql> {
        match attribute.value_id {
            Some(value_id) => {
                let mut insert = InsertBuilder::new("product_attribute");
                insert
                    .value("product_id", product_id)
                    .value("attribute_set_id", attribute.id)
                    .value("attribute_value_id", value_id)
                    .on_conflict_update("product_id, attribute_set_id", &["attribute_value_id"]);
                insert.build()
            }
            None => {
                let mut delete = DeleteBuilder::new("product_attribute");
                delete
                    .and_eq("product_id", product_id)
                    .and_eq("attribute_set_id", attribute.id);
                delete.build()
            }
        }
    }

    // ==================== Operations ====================

    async fn fill_details(conn: &impl GenericClient, product: &mut Product) -> StoreResult<()> {
        let (attributes, _) =
            Self::find_many_attributes_by_product_id(conn, product.id, &FindManyParams::default())
                .await?;
        product.attributes = attributes;
        Ok(())
    }

    /// Products under `category_id` (`0` for every top-level tree) and the
    /// total number of matches ignoring pagination.
    ///
    /// Dropped filters and sorters are only logged here; use
    /// [`Self::query_find_many`] to get the [`Dropped`] report.
    pub async fn find_many(
        conn: &impl GenericClient,
        params: &FindManyParams,
        category_id: i64,
    ) -> StoreResult<(Vec<Product>, i64)> {
        const OP: &str = "product.find_many";

        let (sql, _dropped) = Self::query_find_many(params, CategoryScope::from_id(category_id));
        let rows = sql
            .fetch_all_as::<Counted<Product>>(conn)
            .await
            .op(OP)?;
        let (mut products, count) = split_counted(rows);
        for product in &mut products {
            Self::fill_details(conn, product).await.op(OP)?;
        }
        Ok((products, count))
    }

    pub async fn find_available_by_category_id(
        conn: &impl GenericClient,
        category_id: i64,
        filters: &FilterCombination,
    ) -> StoreResult<Vec<Product>> {
        const OP: &str = "product.find_available_by_category_id";

        let sql =
            Self::query_find_available_by_category_id(CategoryScope::from_id(category_id), filters);
        let mut products = sql.fetch_all_as::<Product>(conn).await.op(OP)?;
        for product in &mut products {
            Self::fill_details(conn, product).await.op(OP)?;
        }
        Ok(products)
    }

    pub async fn get_by_id(conn: &impl GenericClient, id: i64) -> StoreResult<Option<Product>> {
        const OP: &str = "product.get_by_id";

        let product = Self::query_get_by_id(id)
            .fetch_opt_as::<Product>(conn)
            .await
            .op(OP)?;
        match product {
            Some(mut product) => {
                Self::fill_details(conn, &mut product).await.op(OP)?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    /// Insert a new product (`id == 0`) or update the flagged fields of an
    /// existing one, then drop attribute assignments that no longer fit its
    /// category. Returns the product id.
    pub async fn upsert_one(client: &mut impl Begin, product: &Product) -> StoreResult<i64> {
        const OP: &str = "product.upsert_one";

        let result: StoreResult<i64> = crate::unit_of_work!(client, tx, {
            let id = if product.id == 0 {
                let rows = Self::query_insert(product)?.fetch_all(&tx).await?;
                let row = rows
                    .first()
                    .ok_or_else(|| StoreError::not_found("INSERT returned no id"))?;
                row.get_column::<i64>("id")?
            } else {
                Self::query_update_by_id(product)?.execute(&tx).await?;
                product.id
            };
            run_in(&tx, &[Self::query_delete_invalid_attributes(id)?]).await?;
            Ok(id)
        });
        result.op(OP)
    }

    /// Apply the flagged fields of every product in one unit of work.
    pub async fn update_many(client: &mut impl Begin, products: &[Product]) -> StoreResult<u64> {
        const OP: &str = "product.update_many";

        let statements = products
            .iter()
            .map(Self::query_update_by_id)
            .collect::<StoreResult<Vec<_>>>()
            .op(OP)?;
        run_atomic(client, &statements).await.op(OP)
    }

    /// Delete products by id. An empty list deletes nothing and runs nothing.
    pub async fn delete_many_by_id(conn: &impl GenericClient, ids: &[i64]) -> StoreResult<u64> {
        const OP: &str = "product.delete_many_by_id";

        if ids.is_empty() {
            return Ok(0);
        }
        Self::query_delete_many_by_id(ids)
            .op(OP)?
            .execute(conn)
            .await
            .op(OP)
    }

    /// Attributes of a product and the total number of its attribute sets.
    pub async fn find_many_attributes_by_product_id(
        conn: &impl GenericClient,
        product_id: i64,
        params: &FindManyParams,
    ) -> StoreResult<(Vec<ProductAttribute>, i64)> {
        const OP: &str = "product.find_many_attributes_by_product_id";

        let rows = Self::query_find_many_attributes_by_product_id(product_id, params)
            .fetch_all_as::<Counted<ProductAttribute>>(conn)
            .await
            .op(OP)?;
        Ok(split_counted(rows))
    }

    /// Write attribute assignments of one product in one unit of work.
    pub async fn upsert_many_attributes(
        client: &mut impl Begin,
        product_id: i64,
        attributes: &[ProductAttribute],
    ) -> StoreResult<u64> {
        const OP: &str = "product.upsert_many_attributes";

        let statements = attributes
            .iter()
            .map(|attribute| Self::query_upsert_attribute(product_id, attribute))
            .collect::<StoreResult<Vec<_>>>()
            .op(OP)?;
        run_atomic(client, &statements).await.op(OP)
    }
}

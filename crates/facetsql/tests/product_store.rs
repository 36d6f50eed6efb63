//! Product store against a live database.
//!
//! Set `DATABASE_URL` (a `.env` file works too) to run these; without it every
//! test prints a notice and passes.

use facetsql::model::tag;
use facetsql::prelude::*;
use facetsql::{InstrumentedClient, PartialSet};
use std::time::Duration;

const SCHEMA: &str = include_str!("fixtures/schema.sql");

async fn try_connect() -> Option<tokio_postgres::Client> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("failed to connect to DATABASE_URL");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    client
        .batch_execute(SCHEMA)
        .await
        .expect("failed to install fixture schema");
    Some(client)
}

fn update(id: i64, partial: &[&str]) -> Product {
    Product {
        id,
        partial: partial.iter().copied().collect::<PartialSet>(),
        ..Product::default()
    }
}

#[tokio::test]
async fn find_many_filters_sorts_and_counts() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let params = FindManyParams::new()
        .filter(QueryWhere::new("brand", "eq", 2))
        .sort(QueryOrderBy::desc("price"))
        .limit(10)
        .offset(0);
    let (products, total) = ProductStore::find_many(&client, &params, 0).await.unwrap();

    assert_eq!(total, 2);
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Oak Chair", "Floor Lamp"]);

    let lamp = &products[1];
    assert_eq!(lamp.category.hierarchy, "Lighting / Lamps");
    assert_eq!(lamp.url, "acme/floor-lamp/");
    assert_eq!(lamp.status.id, None);
    assert_eq!(lamp.attributes.len(), 2);
    assert_eq!(lamp.attributes[0].value.as_deref(), Some("Black"));
    assert_eq!(lamp.attributes[1].value_id, None);
}

#[tokio::test]
async fn find_many_pagination_keeps_total() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let params = FindManyParams::new()
        .sort(QueryOrderBy::asc("price"))
        .limit(1)
        .offset(1);
    let (products, total) = ProductStore::find_many(&client, &params, 1).await.unwrap();

    assert_eq!(total, 3);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].code, "LMP-3");
}

#[tokio::test]
async fn find_many_ignores_unknown_fields() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let params: FindManyParams = serde_json::from_str(
        r#"{
            "filters": [[{"field": "slug; DROP TABLE product", "operator": "eq", "value": 1}]],
            "sorters": [{"field": "1=1", "desc": true}]
        }"#,
    )
    .unwrap();
    let (_, total) = ProductStore::find_many(&client, &params, 0).await.unwrap();
    assert_eq!(total, 4);
}

#[tokio::test]
async fn find_many_like_and_between() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let params = FindManyParams::new()
        .filter(QueryWhere::new("name", "contains", "Lamp"))
        .filter(QueryWhere::new("price", "between", vec![30, 60]))
        .sort(QueryOrderBy::asc("price"));
    let (products, total) = ProductStore::find_many(&client, &params, 0).await.unwrap();

    assert_eq!(total, 2);
    assert_eq!(products[0].code, "LMP-3");
    assert_eq!(products[1].code, "LMP-2");
}

#[tokio::test]
async fn find_available_combines_facets() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let any_color: FilterCombination = serde_json::from_str(r#"{"1": [10, 11]}"#).unwrap();
    let mut products = ProductStore::find_available_by_category_id(&client, 1, &any_color)
        .await
        .unwrap();
    products.sort_by_key(|p| p.id);
    let ids: Vec<_> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 2]);
    assert!(products.iter().all(|p| p.is_available));

    let black_from_lumo: FilterCombination =
        serde_json::from_str(r#"{"1": [11], "B": [1]}"#).unwrap();
    let products = ProductStore::find_available_by_category_id(&client, 1, &black_from_lumo)
        .await
        .unwrap();
    assert!(products.is_empty());

    let top_level = ProductStore::find_available_by_category_id(&client, 0, &FilterCombination::new())
        .await
        .unwrap();
    assert_eq!(top_level.len(), 3);
}

#[tokio::test]
async fn get_by_id_reads_details() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let product = ProductStore::get_by_id(&client, 1).await.unwrap().unwrap();
    assert_eq!(product.code, "LMP-1");
    assert_eq!(product.brand.name, "Lumo");
    assert_eq!(product.status.name.as_deref(), Some("New"));
    let attributes: Vec<_> = product.attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(attributes, ["Color", "Power"]);

    assert!(ProductStore::get_by_id(&client, 999).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_inserts_new_product() {
    let Some(mut client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut product = update(0, &[]);
    product.code = "LMP-9".into();
    product.name = "Table Lamp".into();
    product.quantity = 1;
    product.price = 42.0;
    product.category.id = 2;
    product.supplier.id = 1;
    product.brand.id = 1;

    let id = ProductStore::upsert_one(&mut client, &product).await.unwrap();
    assert_eq!(id, 101);

    let stored = ProductStore::get_by_id(&client, id).await.unwrap().unwrap();
    assert_eq!(stored.url, "acme/table-lamp/");
    assert_eq!(stored.price, 42.0);
}

#[tokio::test]
async fn upsert_writes_only_flagged_fields() {
    let Some(mut client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut product = update(1, &[tag::PRICE]);
    product.name = "CHANGED".into();
    product.price = 25.0;
    ProductStore::upsert_one(&mut client, &product).await.unwrap();

    let stored = ProductStore::get_by_id(&client, 1).await.unwrap().unwrap();
    assert_eq!(stored.name, "Desk Lamp");
    assert_eq!(stored.url, "acme/desk-lamp/");
    assert_eq!(stored.price, 25.0);
    assert_eq!(stored.quantity, 5);
}

#[tokio::test]
async fn upsert_drops_attributes_of_previous_category() {
    let Some(mut client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut product = update(1, &[tag::CATEGORY_ID]);
    product.category.id = 4;
    ProductStore::upsert_one(&mut client, &product).await.unwrap();

    let left = client
        .query_one(
            "SELECT count(*) FROM product_attribute WHERE product_id = 1",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(left.get::<_, i64>(0), 0);

    let stored = ProductStore::get_by_id(&client, 1).await.unwrap().unwrap();
    assert_eq!(stored.category.hierarchy, "Furniture / Chairs");
    assert_eq!(stored.attributes.len(), 1);
    assert_eq!(stored.attributes[0].value_id, None);
}

#[tokio::test]
async fn update_many_rolls_back_on_failure() {
    let Some(mut client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut cheaper = update(1, &[tag::PRICE]);
    cheaper.price = 1.0;
    let mut dangling = update(2, &[tag::BRAND_ID]);
    dangling.brand.id = 999;

    let err = ProductStore::update_many(&mut client, &[cheaper.clone(), dangling])
        .await
        .unwrap_err();
    assert_eq!(err.op(), Some("product.update_many"));
    assert!(err.is_foreign_key_violation());

    let stored = ProductStore::get_by_id(&client, 1).await.unwrap().unwrap();
    assert_eq!(stored.price, 20.0);

    let affected = ProductStore::update_many(&mut client, &[cheaper])
        .await
        .unwrap();
    assert_eq!(affected, 1);
}

#[tokio::test]
async fn delete_many_by_id_counts_rows() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    assert_eq!(ProductStore::delete_many_by_id(&client, &[]).await.unwrap(), 0);
    assert_eq!(
        ProductStore::delete_many_by_id(&client, &[3, 999]).await.unwrap(),
        1
    );
    assert!(ProductStore::get_by_id(&client, 3).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_many_attributes_sets_and_clears() {
    let Some(mut client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let attributes = [
        ProductAttribute::assign(2, Some(20)),
        ProductAttribute::assign(1, None),
    ];
    let affected = ProductStore::upsert_many_attributes(&mut client, 2, &attributes)
        .await
        .unwrap();
    assert_eq!(affected, 2);

    let (stored, total) =
        ProductStore::find_many_attributes_by_product_id(&client, 2, &FindManyParams::new())
            .await
            .unwrap();
    assert_eq!(total, 2);
    assert_eq!(stored[0].value_id, None);
    assert_eq!(stored[1].value.as_deref(), Some("40W"));
}

#[tokio::test]
async fn statement_timeout_cancels_the_query() {
    let Some(client) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let client = InstrumentedClient::new(client)
        .with_config(StoreConfig::new().with_statement_timeout(Duration::from_millis(50)));
    let err = sql("SELECT pg_sleep(5)")
        .execute(&client)
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    // Let the cancel request land before reusing the connection.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let (_, total) = ProductStore::find_many(&client, &FindManyParams::new(), 0)
        .await
        .unwrap();
    assert_eq!(total, 4);
}

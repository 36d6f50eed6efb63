use super::*;
use crate::allow_list::{AllowList, QuotedIdent};
use crate::condition::{DropReason, QueryWhere};
use crate::find::{FilterLogic, FindManyParams, QueryOrderBy};
use crate::partial::PartialSet;

const FILTERS: AllowList = AllowList::new(&[
    ("brand", "p.brand_id"),
    ("price", "p.price"),
    ("name", "p.name"),
]);
const SORTERS: AllowList = AllowList::new(&[("price", "p.price"), ("brand", "b.name")]);

fn product_select() -> SelectBuilder {
    let mut select = SelectBuilder::new("product p");
    select.columns(&["p.id", "p.name"]);
    select
}

#[test]
fn test_simple_select() {
    let select = SelectBuilder::new("product");
    assert_eq!(select.build().to_sql(), "SELECT * FROM product");
}

#[test]
fn test_select_with_joins_and_count() {
    let mut select = product_select();
    select
        .with_total_count()
        .inner_join("brand b", "b.id = p.brand_id")
        .left_join("product_status ps", "ps.id = p.status_id")
        .and_raw("p.is_published");
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name, count(*) OVER () AS count FROM product p \
         INNER JOIN brand b ON b.id = p.brand_id \
         LEFT JOIN product_status ps ON ps.id = p.status_id \
         WHERE p.is_published"
    );
}

#[test]
fn test_join_params_number_before_where_params() {
    let mut select = product_select();
    select.and_eq("p.code", "X1");
    let mut on = crate::sql("pa.product_id = p.id AND pa.attribute_set_id = ");
    on.push_bind(3_i64);
    select.inner_join_sql("product_attribute pa", on);

    let sql = select.build();
    assert_eq!(
        sql.to_sql(),
        "SELECT p.id, p.name FROM product p \
         INNER JOIN product_attribute pa ON pa.product_id = p.id AND pa.attribute_set_id = $1 \
         WHERE p.code = $2"
    );
    assert_eq!(sql.params_debug(), vec!["3", r#""X1""#]);
}

#[test]
fn test_find_many_filter_sort_page() {
    let params = FindManyParams::new()
        .filter(QueryWhere::new("brand", "eq", 7))
        .sort(QueryOrderBy::desc("price"))
        .limit(10)
        .offset(0);

    let mut select = product_select();
    let dropped = apply_find_many(&mut select, &params, &FILTERS, &SORTERS);
    let sql = select.build();

    assert!(dropped.is_empty());
    assert_eq!(
        sql.to_sql(),
        "SELECT p.id, p.name FROM product p WHERE (p.brand_id = $1) ORDER BY p.price DESC LIMIT 10 OFFSET 0"
    );
    assert_eq!(sql.params_debug(), vec!["Int(7)"]);
}

#[test]
fn test_build_is_idempotent() {
    let params = FindManyParams::new()
        .filter_group(vec![
            QueryWhere::new("brand", "eq", 7),
            QueryWhere::new("name", "contains", "lamp"),
        ])
        .filter(QueryWhere::new("price", "between", vec![10, 20]))
        .sort(QueryOrderBy::asc("brand"))
        .limit(5);

    let build = || {
        let mut select = product_select();
        apply_find_many(&mut select, &params, &FILTERS, &SORTERS);
        select.build()
    };
    let (a, b) = (build(), build());
    assert_eq!(a.to_sql(), b.to_sql());
    assert_eq!(a.params_debug(), b.params_debug());

    let mut select = product_select();
    apply_find_many(&mut select, &params, &FILTERS, &SORTERS);
    assert_eq!(select.build().to_sql(), select.build().to_sql());
}

#[test]
fn test_grouped_logic() {
    let filters = vec![
        vec![
            QueryWhere::new("brand", "eq", 7),
            QueryWhere::new("brand", "eq", 9),
        ],
        vec![QueryWhere::new("price", "gte", 100)],
    ];
    let mut select = product_select();
    select.and_raw("p.is_published");
    apply_filters(&mut select, &filters, &FILTERS, FilterLogic::Grouped);
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name FROM product p WHERE p.is_published \
         AND (p.brand_id = $1 OR p.brand_id = $2) AND (p.price >= $3)"
    );
}

#[test]
fn test_all_and_any_logic_flatten() {
    let filters = vec![
        vec![QueryWhere::new("brand", "eq", 7)],
        vec![
            QueryWhere::new("price", "gt", 1),
            QueryWhere::new("price", "lt", 9),
        ],
    ];

    let mut select = product_select();
    apply_filters(&mut select, &filters, &FILTERS, FilterLogic::All);
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name FROM product p WHERE (p.brand_id = $1 AND p.price > $2 AND p.price < $3)"
    );

    let mut select = product_select();
    select.and_raw("p.is_published");
    apply_filters(&mut select, &filters, &FILTERS, FilterLogic::Any);
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name FROM product p WHERE p.is_published \
         AND (p.brand_id = $1 OR p.price > $2 OR p.price < $3)"
    );
}

#[test]
fn test_logic_and_flag_selects_all() {
    let params = FindManyParams::new()
        .filter(QueryWhere::new("brand", "eq", 7))
        .filter(QueryWhere::new("price", "lt", 9))
        .logic_and(true);
    let mut select = product_select();
    apply_find_many(&mut select, &params, &FILTERS, &SORTERS);
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name FROM product p WHERE (p.brand_id = $1 AND p.price < $2)"
    );
}

#[test]
fn test_unknown_fields_never_reach_sql() {
    let params = FindManyParams::new()
        .filter(QueryWhere::new("secret_margin", "eq", 1))
        .filter_group(vec![
            QueryWhere::new("p.cost", "gt", 1),
            QueryWhere::new("brand", "eq", 7),
        ])
        .sort(QueryOrderBy::asc("secret_margin"))
        .sort(QueryOrderBy::asc("name"));

    let mut select = product_select();
    let dropped = apply_find_many(&mut select, &params, &FILTERS, &SORTERS);
    let sql = select.build().to_sql();

    assert!(!sql.contains("secret_margin"));
    assert!(!sql.contains("cost"));
    // "name" is filterable but not sortable
    assert!(!sql.contains("ORDER BY"));
    assert_eq!(
        sql,
        "SELECT p.id, p.name FROM product p WHERE (p.brand_id = $1)"
    );
    assert_eq!(dropped.filters.len(), 2);
    assert!(
        dropped
            .filters
            .iter()
            .all(|d| d.reason == DropReason::UnknownField)
    );
    assert_eq!(dropped.sorters, vec!["secret_margin", "name"]);
}

#[test]
fn test_malformed_groups_contribute_nothing() {
    let params = FindManyParams::new()
        .filter(QueryWhere::new("price", "between", vec![1, 2, 3]))
        .filter(QueryWhere::new("price", "like", "x"))
        .filter_group(vec![]);

    let mut select = product_select();
    let dropped = apply_find_many(&mut select, &params, &FILTERS, &SORTERS);
    let sql = select.build();

    assert_eq!(sql.to_sql(), "SELECT p.id, p.name FROM product p");
    assert_eq!(sql.param_count(), 0);
    assert_eq!(
        dropped
            .filters
            .iter()
            .map(|d| d.reason)
            .collect::<Vec<_>>(),
        vec![DropReason::MalformedValue, DropReason::UnknownOperator]
    );
}

#[test]
fn test_pagination_only_when_set() {
    let mut select = product_select();
    apply_limit_offset(&mut select, None, Some(20));
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name FROM product p OFFSET 20"
    );

    let mut select = product_select();
    apply_limit_offset(&mut select, Some(0), None);
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name FROM product p LIMIT 0"
    );
}

#[test]
fn test_pagination_clamped_to_bigint() {
    let mut select = product_select();
    apply_limit_offset(&mut select, Some(u64::MAX), Some(i64::MAX as u64 + 1));
    assert_eq!(
        select.build().to_sql(),
        "SELECT p.id, p.name FROM product p LIMIT 9223372036854775807 OFFSET 9223372036854775807"
    );
}

#[test]
fn test_quoted_ident_resolver() {
    let filters = vec![vec![QueryWhere::new("na\"me", "eq", "x")]];
    let mut select = SelectBuilder::new("product");
    apply_filters(&mut select, &filters, &QuotedIdent, FilterLogic::Grouped);
    assert_eq!(
        select.build().to_sql(),
        r#"SELECT * FROM product WHERE ("na""me" = $1)"#
    );
}

#[test]
fn test_and_in_empty() {
    let mut select = SelectBuilder::new("product");
    select.and_in("id", Vec::<i64>::new());
    assert_eq!(select.build().to_sql(), "SELECT * FROM product WHERE 1=0");
}

#[test]
fn test_update_partial_price_only() {
    let partial: PartialSet = ["Price"].into_iter().collect();
    let name_read = std::cell::Cell::new(false);

    let mut update = UpdateBuilder::new("product");
    update
        .set_if(&partial, "Price", "price", || 1999_i64)
        .set_if(&partial, "Name", "name", || {
            name_read.set(true);
            "lamp".to_string()
        })
        .set_if(&partial, "Code", "code", || "X1".to_string())
        .set_raw("updated_at", "now()")
        .and_eq("id", 5_i64);

    let sql = update.build().unwrap();
    assert_eq!(
        sql.to_sql(),
        "UPDATE product SET price = $1, updated_at = now() WHERE id = $2"
    );
    assert_eq!(sql.params_debug(), vec!["1999", "5"]);
    assert!(!name_read.get());
}

#[test]
fn test_update_requires_set_and_where() {
    let mut update = UpdateBuilder::new("product");
    update.and_eq("id", 1_i64);
    assert!(update.build().is_err());

    let mut update = UpdateBuilder::new("product");
    update.set("price", 1_i64);
    assert!(update.build().is_err());
}

#[test]
fn test_delete_requires_where() {
    assert!(DeleteBuilder::new("product").build().is_err());
}

#[test]
fn test_delete_not_in_subquery() {
    let mut sub = crate::sql("SELECT ats.id FROM attribute_set ats WHERE ats.group_id = ");
    sub.push_bind(4_i64);
    let mut delete = DeleteBuilder::new("product_attribute");
    delete
        .and_eq("product_id", 9_i64)
        .and_not_in("attribute_set_id", sub);
    let sql = delete.build().unwrap();
    assert_eq!(
        sql.to_sql(),
        "DELETE FROM product_attribute WHERE product_id = $1 AND attribute_set_id NOT IN \
         (SELECT ats.id FROM attribute_set ats WHERE ats.group_id = $2)"
    );
    assert_eq!(sql.params_debug(), vec!["9", "4"]);
}

#[test]
fn test_insert_upsert_returning() {
    let mut insert = InsertBuilder::new("product_attribute");
    insert
        .value("product_id", 1_i64)
        .value("attribute_set_id", 2_i64)
        .value("attribute_value_id", 3_i64)
        .on_conflict_update("product_id, attribute_set_id", &["attribute_value_id"])
        .returning("product_id");
    assert_eq!(
        insert.build().unwrap().to_sql(),
        "INSERT INTO product_attribute (product_id, attribute_set_id, attribute_value_id) \
         VALUES ($1, $2, $3) ON CONFLICT (product_id, attribute_set_id) \
         DO UPDATE SET attribute_value_id = EXCLUDED.attribute_value_id RETURNING product_id"
    );
}

#[test]
fn test_insert_with_raw_value() {
    let mut insert = InsertBuilder::new("product");
    insert.value("name", "lamp").value_raw("created_at", "now()");
    assert_eq!(
        insert.build().unwrap().to_sql(),
        "INSERT INTO product (name, created_at) VALUES ($1, now())"
    );
    assert!(InsertBuilder::new("product").build().is_err());
}

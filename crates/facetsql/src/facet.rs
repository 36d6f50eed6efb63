//! Faceted filtering over brands and attribute sets.
//!
//! A [`FilterCombination`] maps facet keys to the selected value ids. Facets
//! are ANDed (a product must match every active facet) while the values of one
//! facet are ORed (one matching value is enough).

use crate::builder::SelectBuilder;
use crate::error::StoreResult;
use crate::row::{FromRow, RowExt};
use crate::sql::Sql;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tokio_postgres::Row;

/// Facet key of the brand dimension.
pub const BRAND: &str = "B";

/// Selected value ids per facet key, as sent by a client:
/// `{"B": [7, 9], "3": [101]}`.
pub type FilterCombination = BTreeMap<String, BTreeSet<i64>>;

/// A parsed facet key. Brand sorts before attribute sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacetKey {
    Brand,
    AttributeSet(i64),
}

impl FacetKey {
    pub fn parse(key: &str) -> Option<Self> {
        if key == BRAND {
            return Some(FacetKey::Brand);
        }
        match key.parse::<i64>() {
            Ok(id) if id > 0 => Some(FacetKey::AttributeSet(id)),
            _ => None,
        }
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetKey::Brand => f.write_str(BRAND),
            FacetKey::AttributeSet(id) => write!(f, "{id}"),
        }
    }
}

/// Active facets in generation order; empty facets and unknown keys are left out.
pub fn active_facets(combination: &FilterCombination) -> BTreeMap<FacetKey, BTreeSet<i64>> {
    let mut active: BTreeMap<FacetKey, BTreeSet<i64>> = BTreeMap::new();
    for (key, values) in combination {
        if values.is_empty() {
            continue;
        }
        match FacetKey::parse(key) {
            Some(facet) => active.entry(facet).or_default().extend(values),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "facetsql.find", key = %key, "facet dropped");
            }
        }
    }
    active
}

/// Constrain `select` (whose product table is aliased `product`) to the facets.
///
/// Each attribute-set facet gets its own `product_attribute` join aliased
/// `pa_<attribute set id>`, so a product can match several attribute
/// dimensions at once.
pub fn apply_facets(select: &mut SelectBuilder, combination: &FilterCombination, product: &str) {
    for (facet, values) in active_facets(combination) {
        match facet {
            FacetKey::Brand => {
                select.and_in(&format!("{product}.brand_id"), values.into_iter().collect());
            }
            FacetKey::AttributeSet(id) => {
                let alias = format!("pa_{id}");
                let mut on = Sql::new(format!(
                    "{alias}.product_id = {product}.id AND {alias}.attribute_set_id = "
                ));
                on.push_bind(id)
                    .push(&format!(" AND {alias}.attribute_value_id IN ("))
                    .push_bind_list(values)
                    .push(")");
                select.inner_join_sql(&format!("product_attribute {alias}"), on);
            }
        }
    }
}

/// One selectable value of a facet, with the number of products carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFacetValue {
    pub id: i64,
    pub name: String,
    pub products: i64,
    #[serde(default)]
    pub is_selected: bool,
}

impl FromRow for FilterFacetValue {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.get_column("id")?,
            name: row.get_column("name")?,
            products: row.get_column("products")?,
            is_selected: false,
        })
    }
}

/// A facet as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFacet {
    pub id: String,
    pub name: String,
    pub values: Vec<FilterFacetValue>,
    /// Number of values currently selected.
    #[serde(default)]
    pub selected: usize,
}

impl FilterFacet {
    /// Flag the values selected in `combination` and count them.
    pub fn mark_selected(&mut self, combination: &FilterCombination) {
        // "03" and "3" name the same attribute set.
        let key = FacetKey::parse(&self.id);
        let selected: BTreeSet<i64> = combination
            .iter()
            .filter(|(k, _)| key.is_some() && FacetKey::parse(k) == key)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        self.selected = 0;
        for value in &mut self.values {
            value.is_selected = selected.contains(&value.id);
            if value.is_selected {
                self.selected += 1;
            }
        }
    }
}

//! Category subtree matching over materialized paths.
//!
//! Every category row stores `mp_path`, a prefix-closed path such that a
//! category is inside the subtree of another (itself included) iff its path
//! starts with the other's path. Root categories have `mp_level = 0` and no
//! parent.

use crate::builder::SelectBuilder;
use serde::{Deserialize, Serialize};

/// Recursive CTE exposing `category_cte (id, name)` where `name` is the full
/// hierarchy of the category, e.g. `Lighting / Lamps / Desk lamps`.
pub const CATEGORY_CTE: &str = "WITH RECURSIVE category_cte (id, name) AS (\
SELECT c.id, c.name::text FROM category c WHERE c.parent_id IS NULL \
UNION ALL \
SELECT c.id, category_cte.name || ' / ' || c.name FROM category c \
INNER JOIN category_cte ON c.parent_id = category_cte.id)";

/// Which categories a product listing is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum CategoryScope {
    /// Products of every top-level category tree.
    #[default]
    TopLevel,
    /// Products of this category and all of its descendants.
    Subtree(i64),
}

impl CategoryScope {
    /// `0` selects the top-level scope.
    pub fn from_id(id: i64) -> Self {
        if id == 0 {
            CategoryScope::TopLevel
        } else {
            CategoryScope::Subtree(id)
        }
    }
}

impl From<i64> for CategoryScope {
    fn from(id: i64) -> Self {
        Self::from_id(id)
    }
}

impl From<Option<i64>> for CategoryScope {
    fn from(id: Option<i64>) -> Self {
        id.map_or(CategoryScope::TopLevel, Self::from_id)
    }
}

impl From<CategoryScope> for i64 {
    fn from(scope: CategoryScope) -> Self {
        match scope {
            CategoryScope::TopLevel => 0,
            CategoryScope::Subtree(id) => id,
        }
    }
}

/// Whether `path` lies in the subtree rooted at `ancestor_path` (itself included).
pub fn is_descendant(path: &str, ancestor_path: &str) -> bool {
    path.starts_with(ancestor_path)
}

/// SQL form of [`is_descendant`] for two trusted path expressions.
pub fn descendant_of(path_expr: &str, ancestor_path_expr: &str) -> String {
    format!("{path_expr} LIKE {ancestor_path_expr} || '%'")
}

/// Join the root ancestor of `category` as `c_root`.
pub fn join_root_category(select: &mut SelectBuilder, category: &str) {
    let on = format!(
        "c_root.mp_level = 0 AND {}",
        descendant_of(&format!("{category}.mp_path"), "c_root.mp_path")
    );
    select.inner_join("category c_root", &on);
}

/// Join the selected category as `c_selected` and restrict `category` to its subtree.
pub fn join_selected_category(select: &mut SelectBuilder, category: &str, scope: CategoryScope) {
    let on = descendant_of(&format!("{category}.mp_path"), "c_selected.mp_path");
    select.inner_join("category c_selected", &on);
    match scope {
        CategoryScope::TopLevel => {
            select.and_raw("c_selected.parent_id IS NULL");
        }
        CategoryScope::Subtree(id) => {
            select.and_eq("c_selected.id", id);
        }
    }
}

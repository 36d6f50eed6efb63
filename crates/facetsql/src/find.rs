//! Find-many request types.
//!
//! A request body looks like:
//!
//! ```json
//! {
//!   "filters": [[{"field": "brand", "operator": "eq", "value": 7}]],
//!   "sorters": [{"field": "price", "desc": true}],
//!   "limit": 10,
//!   "offset": 0,
//!   "logicAnd": false
//! }
//! ```

use crate::condition::{DropReason, QueryWhere};
use serde::{Deserialize, Serialize};

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOrderBy {
    pub field: String,
    #[serde(default, alias = "descending")]
    pub desc: bool,
}

impl QueryOrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: true,
        }
    }
}

/// How filter groups are combined into the WHERE clause.
///
/// Whatever the choice, the result is ANDed with the statement's own base
/// predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterLogic {
    /// `(a OR b) AND (c OR d)`: AND across groups, OR within a group.
    #[default]
    Grouped,
    /// `(a AND b AND c AND d)`: every comparison of every group.
    All,
    /// `(a OR b OR c OR d)`: any comparison of any group.
    Any,
}

/// Filter, sort and pagination request for list endpoints.
///
/// `limit`/`offset` are optional: `None` emits no clause, `Some(0)` is an
/// explicit zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindManyParams {
    pub filters: Vec<Vec<QueryWhere>>,
    pub sorters: Vec<QueryOrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub logic_and: bool,
}

impl FindManyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group of comparisons that are ORed together.
    pub fn filter_group(mut self, group: Vec<QueryWhere>) -> Self {
        self.filters.push(group);
        self
    }

    /// Add a single-comparison group.
    pub fn filter(self, condition: QueryWhere) -> Self {
        self.filter_group(vec![condition])
    }

    pub fn sort(mut self, sorter: QueryOrderBy) -> Self {
        self.sorters.push(sorter);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn logic_and(mut self, logic_and: bool) -> Self {
        self.logic_and = logic_and;
        self
    }

    /// Combination rule selected by `logicAnd`.
    pub fn logic(&self) -> FilterLogic {
        if self.logic_and {
            FilterLogic::All
        } else {
            FilterLogic::Grouped
        }
    }
}

/// A filter entry that did not make it into the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFilter {
    pub field: String,
    pub operator: String,
    pub reason: DropReason,
}

/// Entries ignored while building a statement.
///
/// Ignoring them never fails the request; the report is there for callers that
/// want to tell the client what was not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dropped {
    pub filters: Vec<DroppedFilter>,
    pub sorters: Vec<String>,
}

impl Dropped {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sorters.is_empty()
    }

    pub(crate) fn filter(&mut self, condition: &QueryWhere, reason: DropReason) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "facetsql.find",
            field = %condition.field,
            operator = %condition.operator,
            %reason,
            "filter dropped"
        );
        self.filters.push(DroppedFilter {
            field: condition.field.clone(),
            operator: condition.operator.clone(),
            reason,
        });
    }

    pub(crate) fn sorter(&mut self, sorter: &QueryOrderBy) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "facetsql.find",
            field = %sorter.field,
            "sorter dropped"
        );
        self.sorters.push(sorter.field.clone());
    }

    pub(crate) fn extend(&mut self, other: Dropped) {
        self.filters.extend(other.filters);
        self.sorters.extend(other.sorters);
    }
}

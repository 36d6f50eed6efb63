//! Client comparisons and their translation into SQL predicates.
//!
//! [`translate`] turns one `(target, operator, value)` triple into a predicate
//! fragment with bound parameters. Only the target is interpolated as text and
//! it must already be safe (an allow-listed expression or a quoted identifier);
//! values are always bound.
//!
//! | operator                | SQL                          | bound value     |
//! |-------------------------|------------------------------|-----------------|
//! | `eq`, `is`, `=`         | `target = $n`                | value           |
//! | `gt`, `>`               | `target > $n`                | value           |
//! | `lt`, `<`               | `target < $n`                | value           |
//! | `gte`, `>=`             | `target >= $n`               | value           |
//! | `lte`, `<=`             | `target <= $n`               | value           |
//! | `begins`                | `CAST(target AS text) LIKE $n` | `value%`      |
//! | `contains`              | `CAST(target AS text) LIKE $n` | `%value%`     |
//! | `ends`                  | `CAST(target AS text) LIKE $n` | `%value`      |
//! | `between`               | `target BETWEEN $n AND $m`   | `[low, high]`   |

use crate::sql::Sql;
use crate::value::{Kind, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Is,
    Gt,
    Lt,
    Gte,
    Lte,
    Begins,
    Contains,
    Ends,
    Between,
}

impl Operator {
    /// Parse an operator from either its word or its symbolic spelling.
    pub fn parse(s: &str) -> Option<Self> {
        let op = match s {
            "eq" | "=" => Operator::Eq,
            "is" => Operator::Is,
            "gt" | ">" => Operator::Gt,
            "lt" | "<" => Operator::Lt,
            "gte" | ">=" => Operator::Gte,
            "lte" | "<=" => Operator::Lte,
            "begins" => Operator::Begins,
            "contains" => Operator::Contains,
            "ends" => Operator::Ends,
            "between" => Operator::Between,
            _ => return None,
        };
        Some(op)
    }

    fn symbol(self) -> &'static str {
        match self {
            Operator::Eq | Operator::Is => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Begins | Operator::Contains | Operator::Ends => "LIKE",
            Operator::Between => "BETWEEN",
        }
    }

    fn pattern(self, text: &str) -> Option<String> {
        match self {
            Operator::Begins => Some(format!("{text}%")),
            Operator::Contains => Some(format!("%{text}%")),
            Operator::Ends => Some(format!("%{text}")),
            _ => None,
        }
    }
}

/// One client comparison: `{"field": "price", "operator": "gte", "value": 10}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryWhere {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

impl QueryWhere {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Why a filter or sort entry contributed nothing to a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The field is not exposed by the allow-list.
    UnknownField,
    /// The operator is not one of [`Operator`].
    UnknownOperator,
    /// Wrong value shape for the operator (e.g. `between` without two values),
    /// or a value the target column's kind cannot hold.
    MalformedValue,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::UnknownField => f.write_str("unknown field"),
            DropReason::UnknownOperator => f.write_str("unknown operator"),
            DropReason::MalformedValue => f.write_str("malformed value"),
        }
    }
}

/// Translate one comparison against an already-safe `target` expression.
///
/// Returns the reason instead of a fragment when the comparison must be dropped;
/// a dropped comparison never contributes partial SQL.
pub fn translate(target: &str, operator: &str, value: &Value) -> Result<Sql, DropReason> {
    translate_as(target, operator, value, Kind::Any)
}

/// Like [`translate`], but first converts `value` to the `kind` of the target.
///
/// LIKE operators match on the text form and skip the conversion.
pub fn translate_as(
    target: &str,
    operator: &str,
    value: &Value,
    kind: Kind,
) -> Result<Sql, DropReason> {
    let op = Operator::parse(operator).ok_or(DropReason::UnknownOperator)?;

    let coerced;
    let value = match op {
        Operator::Begins | Operator::Contains | Operator::Ends => value,
        _ => {
            coerced = kind.coerce(value).ok_or(DropReason::MalformedValue)?;
            &coerced
        }
    };

    let mut sql = Sql::empty();
    match op {
        Operator::Between => {
            let (low, high) = value.as_pair().ok_or(DropReason::MalformedValue)?;
            sql.push(target)
                .push(" BETWEEN ")
                .push_bind(low.clone())
                .push(" AND ")
                .push_bind(high.clone());
        }
        Operator::Begins | Operator::Contains | Operator::Ends => {
            let text = value.pattern_text().ok_or(DropReason::MalformedValue)?;
            let pattern = op.pattern(&text).ok_or(DropReason::UnknownOperator)?;
            sql.push("CAST(")
                .push(target)
                .push(" AS text) LIKE ")
                .push_bind(pattern);
        }
        _ => {
            if !value.is_scalar() {
                return Err(DropReason::MalformedValue);
            }
            sql.push(target)
                .push(" ")
                .push(op.symbol())
                .push(" ")
                .push_bind(value.clone());
        }
    }
    Ok(sql)
}

//! Dynamically typed values carried by client filter requests.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A scalar (or a pair/list of scalars) supplied by a client.
///
/// Deserializes from plain JSON values. Filters over a typed allow-list are
/// converted with [`Kind::coerce`] first, so `"value": "7"` for an integer
/// column binds as `Int(7)` and `"abc"` is dropped. Binding itself stays
/// lenient about the target column type for statements built by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Whether this is a single bindable value.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_))
    }

    /// The two elements of a `[low, high]` pair, if this is one.
    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match self {
            Value::List(items) => match items.as_slice() {
                [low, high] if low.is_scalar() && high.is_scalar() => Some((low, high)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Text used to build a LIKE pattern; `None` for NULL and lists.
    pub(crate) fn pattern_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::List(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// The value type a filterable column expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Bind whatever the client sent.
    #[default]
    Any,
    Bool,
    Int,
    Float,
    Text,
}

impl Kind {
    /// Convert `value` to this kind, or `None` when it cannot represent one.
    ///
    /// NULL stays NULL. Lists are converted element by element.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Kind::Any, _) | (_, Value::Null) => Some(value.clone()),
            (_, Value::List(items)) => items
                .iter()
                .map(|item| self.coerce(item))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),

            (Kind::Bool, Value::Bool(v)) => Some(Value::Bool(*v)),
            (Kind::Bool, Value::Int(v)) => match v {
                0 => Some(Value::Bool(false)),
                1 => Some(Value::Bool(true)),
                _ => None,
            },
            (Kind::Bool, Value::Text(v)) => match v.trim() {
                "1" | "true" | "t" => Some(Value::Bool(true)),
                "0" | "false" | "f" => Some(Value::Bool(false)),
                _ => None,
            },
            (Kind::Bool, Value::Float(_)) => None,

            (Kind::Int, Value::Int(v)) => Some(Value::Int(*v)),
            (Kind::Int, Value::Bool(v)) => Some(Value::Int(i64::from(*v))),
            (Kind::Int, Value::Float(v)) => float_as_int(*v).map(Value::Int),
            (Kind::Int, Value::Text(v)) => v.trim().parse().ok().map(Value::Int),

            (Kind::Float, Value::Float(v)) => Some(Value::Float(*v)),
            (Kind::Float, Value::Int(v)) => Some(Value::Float(*v as f64)),
            (Kind::Float, Value::Text(v)) => v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Float),
            (Kind::Float, Value::Bool(_)) => None,

            (Kind::Text, Value::Text(v)) => Some(Value::Text(v.clone())),
            (Kind::Text, v) => Some(Value::Text(v.to_string())),
        }
    }
}

fn float_as_int(v: f64) -> Option<i64> {
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (v.fract() == 0.0 && in_range).then_some(v as i64)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

fn is_text(ty: &Type) -> bool {
    <&str as ToSql>::accepts(ty)
}

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::BOOL => (v != 0).to_sql(ty, out),
        _ if is_text(ty) => v.to_string().as_str().to_sql(ty, out),
        _ => Err(format!("cannot bind integer {v} as {ty}").into()),
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => v.to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 if v.fract() == 0.0 => int_to_sql(v as i64, ty, out),
        _ if is_text(ty) => v.to_string().as_str().to_sql(ty, out),
        _ => Err(format!("cannot bind float {v} as {ty}").into()),
    }
}

fn text_to_sql(v: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => int_to_sql(v.trim().parse()?, ty, out),
        Type::FLOAT4 | Type::FLOAT8 => float_to_sql(v.trim().parse()?, ty, out),
        Type::BOOL => match v.trim() {
            "1" | "true" | "t" => true.to_sql(ty, out),
            "0" | "false" | "f" => false.to_sql(ty, out),
            other => Err(format!("cannot bind '{other}' as bool").into()),
        },
        _ => v.to_sql(ty, out),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ => int_to_sql(i64::from(*v), ty, out),
            },
            Value::Int(v) => int_to_sql(*v, ty, out),
            Value::Float(v) => float_to_sql(*v, ty, out),
            Value::Text(v) => text_to_sql(v, ty, out),
            Value::List(_) => Err("a list cannot be bound as a single parameter".into()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

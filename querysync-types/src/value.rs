//! Typed query values and the abstract query map.

use chrono::{DateTime, SecondsFormat, Utc};
use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// A single typed query value
#[derive(Debug, Clone, PartialEq)]
pub enum QueryScalar {
    String(String),
    Number(f64),
    /// A whole number, kept exact
    Integer(i64),
    Boolean(bool),
    Date(DateTime<Utc>),
    BigInt(BigInt),
}

impl QueryScalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryScalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            QueryScalar::Number(n) => Some(*n),
            QueryScalar::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The value as an integer, if it is one or is a number without a
    /// fractional part
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryScalar::Integer(i) => Some(*i),
            QueryScalar::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryScalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            QueryScalar::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            QueryScalar::BigInt(b) => Some(b),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            QueryScalar::String(s) => serde_json::Value::String(s.clone()),
            QueryScalar::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            QueryScalar::Integer(i) => serde_json::Value::from(*i),
            QueryScalar::Boolean(b) => serde_json::Value::Bool(*b),
            QueryScalar::Date(_) | QueryScalar::BigInt(_) => {
                serde_json::Value::String(self.to_string())
            }
        }
    }
}

/// Natural string form of a value, used by the default query conversion.
///
/// Whole numbers print without a fractional part and dates print as
/// RFC 3339 in UTC.
impl fmt::Display for QueryScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryScalar::String(s) => f.write_str(s),
            QueryScalar::Number(n) => write!(f, "{}", n),
            QueryScalar::Integer(i) => write!(f, "{}", i),
            QueryScalar::Boolean(b) => write!(f, "{}", b),
            QueryScalar::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            QueryScalar::BigInt(b) => write!(f, "{}", b),
        }
    }
}

impl Serialize for QueryScalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

macro_rules! scalar_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for QueryScalar {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<$ty> for QueryValue {
                fn from(v: $ty) -> Self {
                    QueryValue::Scalar(QueryScalar::from(v))
                }
            }

            impl From<Vec<$ty>> for QueryValue {
                fn from(values: Vec<$ty>) -> Self {
                    QueryValue::List(values.into_iter().map(QueryScalar::from).collect())
                }
            }
        )*
    };
}

scalar_from! {
    String => |v| QueryScalar::String(v),
    &str => |v| QueryScalar::String(v.to_string()),
    f64 => |v| QueryScalar::Number(v),
    i32 => |v| QueryScalar::Integer(i64::from(v)),
    u32 => |v| QueryScalar::Integer(i64::from(v)),
    i64 => |v| QueryScalar::Integer(v),
    u64 => |v| match i64::try_from(v) {
        Ok(i) => QueryScalar::Integer(i),
        Err(_) => QueryScalar::BigInt(BigInt::from(v)),
    },
    bool => |v| QueryScalar::Boolean(v),
    DateTime<Utc> => |v| QueryScalar::Date(v),
    BigInt => |v| QueryScalar::BigInt(v),
}

/// A typed query parameter: a scalar or a list of scalars
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Scalar(QueryScalar),
    List(Vec<QueryScalar>),
}

impl QueryValue {
    pub fn as_scalar(&self) -> Option<&QueryScalar> {
        match self {
            QueryValue::Scalar(s) => Some(s),
            QueryValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[QueryScalar]> {
        match self {
            QueryValue::Scalar(_) => None,
            QueryValue::List(values) => Some(values),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            QueryValue::Scalar(s) => s.to_json(),
            QueryValue::List(values) => {
                serde_json::Value::Array(values.iter().map(QueryScalar::to_json).collect())
            }
        }
    }
}

impl From<QueryScalar> for QueryValue {
    fn from(scalar: QueryScalar) -> Self {
        QueryValue::Scalar(scalar)
    }
}

impl From<Vec<QueryScalar>> for QueryValue {
    fn from(values: Vec<QueryScalar>) -> Self {
        QueryValue::List(values)
    }
}

impl Serialize for QueryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// A caller-shaped typed query.
///
/// Keys absent from the map are "missing"; there is no null value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AbstractQuery(BTreeMap<String, QueryValue>);

impl AbstractQuery {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Option<QueryValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, QueryValue> {
        self.0.iter()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay `self` on top of `base`: `{...base, ...self}`
    pub fn over(&self, base: &AbstractQuery) -> AbstractQuery {
        let mut merged = base.clone();
        merged.0.extend(self.0.clone());
        merged
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_scalar()?.as_str()
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_scalar()?.as_number()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_scalar()?.as_i64()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_scalar()?.as_bool()
    }

    pub fn get_date(&self, key: &str) -> Option<&DateTime<Utc>> {
        self.get(key)?.as_scalar()?.as_date()
    }

    pub fn get_bigint(&self, key: &str) -> Option<&BigInt> {
        self.get(key)?.as_scalar()?.as_bigint()
    }

    pub fn get_list(&self, key: &str) -> Option<&[QueryScalar]> {
        self.get(key)?.as_list()
    }

    /// Decode the query into a caller-defined struct.
    ///
    /// Dates and big integers are presented to the deserializer as strings.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let object = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::from_value(serde_json::Value::Object(object))
    }
}

impl<K, V> FromIterator<(K, V)> for AbstractQuery
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Extend<(String, QueryValue)> for AbstractQuery {
    fn extend<I: IntoIterator<Item = (String, QueryValue)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for AbstractQuery {
    type Item = (String, QueryValue);
    type IntoIter = btree_map::IntoIter<String, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AbstractQuery {
    type Item = (&'a String, &'a QueryValue);
    type IntoIter = btree_map::Iter<'a, String, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

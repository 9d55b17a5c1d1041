//! Declarative field coercion.
//!
//! A [`Schema`] names the fields of a query and how to coerce each from its
//! flat string form. It is one ready-made [`ParseQuery`]; callers with their
//! own validation can plug in a closure instead.
//!
//! Fields are coerced independently. By default a field that fails coercion
//! is simply left out of the result, so one bad parameter in a URL does not
//! throw away the others. A [`Schema::strict`] schema fails as a whole
//! instead, which the engines then treat as "nothing parsed".

use crate::parse::{ParseError, ParseQuery};
use chrono::{DateTime, NaiveDate, Utc};
use querysync_types::{AbstractQuery, BigInt, FlatQuery, FlatValue, QueryScalar, QueryValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// The type of a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    BigInt,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Integer => "integer",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Date => "date",
            ScalarKind::BigInt => "bigint",
        };
        f.write_str(name)
    }
}

impl ScalarKind {
    /// Coerce one string into a typed value
    pub fn coerce(self, raw: &str) -> Option<QueryScalar> {
        match self {
            ScalarKind::String => Some(QueryScalar::String(raw.to_string())),
            ScalarKind::Number => {
                let n: f64 = raw.trim().parse().ok()?;
                n.is_finite().then_some(QueryScalar::Number(n))
            }
            ScalarKind::Integer => raw.trim().parse::<i64>().ok().map(QueryScalar::from),
            ScalarKind::Boolean => match raw.trim() {
                "true" | "1" => Some(QueryScalar::Boolean(true)),
                "false" | "0" => Some(QueryScalar::Boolean(false)),
                _ => None,
            },
            ScalarKind::Date => parse_date(raw.trim()).map(QueryScalar::Date),
            ScalarKind::BigInt => raw.trim().parse::<BigInt>().ok().map(QueryScalar::BigInt),
        }
    }
}

/// RFC 3339 timestamps, or plain dates taken as midnight UTC
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// The type of a query field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar(ScalarKind),
    List(ScalarKind),
}

impl FieldKind {
    pub fn string() -> Self {
        FieldKind::Scalar(ScalarKind::String)
    }

    pub fn number() -> Self {
        FieldKind::Scalar(ScalarKind::Number)
    }

    pub fn integer() -> Self {
        FieldKind::Scalar(ScalarKind::Integer)
    }

    pub fn boolean() -> Self {
        FieldKind::Scalar(ScalarKind::Boolean)
    }

    pub fn date() -> Self {
        FieldKind::Scalar(ScalarKind::Date)
    }

    pub fn bigint() -> Self {
        FieldKind::Scalar(ScalarKind::BigInt)
    }

    pub fn list_of(kind: ScalarKind) -> Self {
        FieldKind::List(kind)
    }

    /// Coerce a flat value into a typed value of this kind.
    ///
    /// A scalar field rejects multi-valued input; a list field accepts a
    /// single string as a one-element list.
    pub fn coerce(self, value: &FlatValue) -> Option<QueryValue> {
        match self {
            FieldKind::Scalar(kind) => kind.coerce(value.as_single()?).map(QueryValue::Scalar),
            FieldKind::List(kind) => value
                .as_list()
                .into_iter()
                .map(|raw| kind.coerce(raw))
                .collect::<Option<Vec<_>>>()
                .map(QueryValue::List),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(kind) => write!(f, "{}", kind),
            FieldKind::List(kind) => write!(f, "list of {}", kind),
        }
    }
}

/// A set of named, typed query fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: BTreeMap<String, FieldKind>,
    strict: bool,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(key.into(), kind);
        self
    }

    /// Fail the whole parse on the first field that does not coerce
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn kind(&self, key: &str) -> Option<FieldKind> {
        self.fields.get(key).copied()
    }

    /// Coerce one field's flat value
    pub fn coerce_field(&self, key: &str, value: &FlatValue) -> Result<QueryValue, ParseError> {
        let kind = self
            .kind(key)
            .ok_or_else(|| ParseError::custom(format!("Unknown field: {}", key)))?;
        kind.coerce(value).ok_or_else(|| ParseError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: kind.to_string(),
        })
    }
}

impl ParseQuery for Schema {
    fn parse(&self, query: &FlatQuery) -> Result<AbstractQuery, ParseError> {
        let mut parsed = AbstractQuery::new();
        for key in self.fields.keys() {
            let Some(value) = query.get(key) else {
                continue;
            };
            match self.coerce_field(key, value) {
                Ok(typed) => {
                    parsed.insert(key.clone(), typed);
                }
                Err(e) if self.strict => return Err(e),
                Err(e) => trace!(error = %e, "dropping field"),
            }
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn schema() -> Schema {
        Schema::new()
            .field("search", FieldKind::string())
            .field("age", FieldKind::number())
            .field("birth_date", FieldKind::date())
            .field("net_worth", FieldKind::bigint())
            .field("dark_mode", FieldKind::boolean())
            .field("tags", FieldKind::list_of(ScalarKind::String))
    }

    #[test]
    fn test_coerces_every_kind() {
        let query = FlatQuery::new()
            .with("search", "Max")
            .with("age", "42")
            .with("birth_date", "2000-01-02T03:04:05Z")
            .with("net_worth", "330596250786212389484463426546493779967")
            .with("dark_mode", "false")
            .with("tags", vec!["a", "b"]);

        let parsed = schema().parse(&query).unwrap();

        assert_eq!(parsed.get_str("search"), Some("Max"));
        assert_eq!(parsed.get_number("age"), Some(42.0));
        assert_eq!(
            parsed.get_date("birth_date"),
            Some(&Utc.with_ymd_and_hms(2000, 1, 2, 3, 4, 5).unwrap())
        );
        assert_eq!(
            parsed.get_bigint("net_worth").map(|b| b.to_string()),
            Some("330596250786212389484463426546493779967".to_string())
        );
        assert_eq!(parsed.get_bool("dark_mode"), Some(false));
        assert_eq!(parsed.get_list("tags").map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_bad_field_is_dropped() {
        let query = FlatQuery::new().with("search", "Max").with("age", "old");
        let parsed = schema().parse(&query).unwrap();

        assert_eq!(parsed.get_str("search"), Some("Max"));
        assert!(parsed.get("age").is_none());
    }

    #[test]
    fn test_strict_schema_fails_whole_parse() {
        let query = FlatQuery::new().with("search", "Max").with("age", "old");
        let err = schema().strict().parse(&query).unwrap_err();

        assert!(matches!(err, ParseError::InvalidValue { ref key, .. } if key == "age"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let parsed = schema()
            .parse(&FlatQuery::new().with("greeting", "hello"))
            .unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_plain_date_is_midnight_utc() {
        let value = FieldKind::date().coerce(&FlatValue::from("2024-02-29")).unwrap();
        assert_eq!(
            value.as_scalar().and_then(QueryScalar::as_date),
            Some(&Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_list_field_accepts_single_value() {
        let value = FieldKind::list_of(ScalarKind::Integer)
            .coerce(&FlatValue::from("7"))
            .unwrap();
        assert_eq!(value, QueryValue::from(vec![7i64]));
    }

    #[test]
    fn test_scalar_field_rejects_lists() {
        assert!(FieldKind::string()
            .coerce(&FlatValue::from(vec!["a", "b"]))
            .is_none());
    }
}

//! Conversion from typed queries to flat queries.

use querysync_types::{AbstractQuery, FlatQuery, FlatValue, QueryValue};

/// Turns a (partial) typed query into its flat form.
///
/// This is the only serialization hook of the engines; an implementation
/// replaces the default behaviour entirely.
pub trait ConvertToQuery: Send + Sync {
    fn convert(&self, query: &AbstractQuery) -> FlatQuery;
}

impl<F> ConvertToQuery for F
where
    F: Fn(&AbstractQuery) -> FlatQuery + Send + Sync,
{
    fn convert(&self, query: &AbstractQuery) -> FlatQuery {
        self(query)
    }
}

/// Default conversion: every value in its natural string form, lists
/// element-wise.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringifyValues;

impl ConvertToQuery for StringifyValues {
    fn convert(&self, query: &AbstractQuery) -> FlatQuery {
        query
            .iter()
            .map(|(key, value)| (key.clone(), stringify(value)))
            .collect()
    }
}

fn stringify(value: &QueryValue) -> FlatValue {
    match value {
        QueryValue::Scalar(scalar) => FlatValue::Single(scalar.to_string()),
        QueryValue::List(values) => FlatValue::Many(values.iter().map(|v| v.to_string()).collect()),
    }
}

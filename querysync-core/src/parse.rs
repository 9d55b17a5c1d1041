//! The injected parse capability.

use querysync_types::{AbstractQuery, FlatQuery};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid value for '{key}': expected {expected}, got {value:?}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("{0}")]
    Custom(String),
}

impl ParseError {
    pub fn custom(msg: impl Into<String>) -> Self {
        ParseError::Custom(msg.into())
    }
}

/// Parses a flat query into the typed fields it can recognise.
///
/// Returns the fields that could be parsed, or an error if parsing failed as
/// a whole. The engines treat an error exactly like an empty result.
pub trait ParseQuery: Send + Sync {
    fn parse(&self, query: &FlatQuery) -> Result<AbstractQuery, ParseError>;
}

impl<F> ParseQuery for F
where
    F: Fn(&FlatQuery) -> Result<AbstractQuery, ParseError> + Send + Sync,
{
    fn parse(&self, query: &FlatQuery) -> Result<AbstractQuery, ParseError> {
        self(query)
    }
}

/// A parser that never recognises anything, for pagination-only use
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseNothing;

impl ParseQuery for ParseNothing {
    fn parse(&self, _query: &FlatQuery) -> Result<AbstractQuery, ParseError> {
        Ok(AbstractQuery::new())
    }
}

/// Run a parser, swallowing failure as "nothing parsed"
pub fn safe_parse(parser: &dyn ParseQuery, query: &FlatQuery) -> AbstractQuery {
    match parser.parse(query) {
        Ok(parsed) => parsed,
        Err(e) => {
            trace!(error = %e, "query parse failed, falling back to defaults");
            AbstractQuery::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_parse_swallows_errors() {
        let failing = |_: &FlatQuery| -> Result<AbstractQuery, ParseError> {
            Err(ParseError::custom("boom"))
        };
        assert!(safe_parse(&failing, &FlatQuery::new().with("a", "b")).is_empty());
    }

    #[test]
    fn test_parse_nothing() {
        let parsed = ParseNothing.parse(&FlatQuery::new().with("search", "Max")).unwrap();
        assert!(parsed.is_empty());
    }
}

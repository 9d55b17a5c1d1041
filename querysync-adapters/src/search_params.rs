//! Router over the search string of a [`BrowserHistory`].
//!
//! List values are written either as repeated parameters (`tags=a&tags=b`)
//! or as one comma-joined parameter with percent-encoded elements
//! (`tags=a,b`), depending on the configured [`ArrayEncoding`]. Parameters
//! not mentioned in a write keep their value and their position.

use crate::history::BrowserHistory;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use querysync_core::{
    ArrayEncoding, FlatQuery, FlatValue, HistoryMode, Router, RouterConfig, RouterResult,
};
use std::sync::Arc;
use tracing::debug;

pub const QUERY_ARRAY_SEPARATOR: char = ',';

/// Characters escaped inside one element of a delimited list
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// An ordered list of decoded `key=value` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    /// Decode a search string, with or without the leading `?`
    pub fn parse(search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        Self {
            pairs: form_urlencoded::parse(search.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Distinct keys in first-occurrence order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in &self.pairs {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Set `key` to `value`: the first occurrence is overwritten in place and
    /// later occurrences are removed. A new key is appended.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    pub fn delete(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode as `application/x-www-form-urlencoded`, without the `?`
    pub fn to_search(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Router backed by the current location's search string
#[derive(Debug, Clone)]
pub struct SearchParamsRouter {
    history: Arc<BrowserHistory>,
    mode: HistoryMode,
    encoding: ArrayEncoding,
}

impl SearchParamsRouter {
    /// Replace-mode, repeated-key router
    pub fn new(history: Arc<BrowserHistory>) -> Self {
        Self::with_config(history, RouterConfig::default())
    }

    pub fn with_config(history: Arc<BrowserHistory>, config: RouterConfig) -> Self {
        Self {
            history,
            mode: config.history,
            encoding: config.array_encoding,
        }
    }

    pub fn history(&self) -> &Arc<BrowserHistory> {
        &self.history
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn encoding(&self) -> ArrayEncoding {
        self.encoding
    }

    /// The live query without defaults
    pub fn live_query(&self) -> FlatQuery {
        let params = SearchParams::parse(&self.history.location().search);
        params
            .keys()
            .into_iter()
            .map(|key| (key.to_string(), self.read_value(&params.get_all(key))))
            .collect()
    }

    fn read_value(&self, raw: &[&str]) -> FlatValue {
        match self.encoding {
            ArrayEncoding::Repeated => {
                FlatValue::from_list(raw.iter().map(|v| v.to_string()).collect())
            }
            ArrayEncoding::Delimited => {
                // Only the last occurrence counts when a key is repeated
                let last = raw.last().copied().unwrap_or_default();
                FlatValue::from_list(
                    last.split(QUERY_ARRAY_SEPARATOR)
                        .map(|element| percent_decode_str(element).decode_utf8_lossy().into_owned())
                        .collect(),
                )
            }
        }
    }

    fn write_value(&self, params: &mut SearchParams, key: &str, value: &FlatValue) {
        match self.encoding {
            ArrayEncoding::Repeated => {
                let values = value.as_list();
                match values.split_first() {
                    Some((first, rest)) => {
                        params.set(key, *first);
                        for v in rest {
                            params.append(key, *v);
                        }
                    }
                    None => params.delete(key),
                }
            }
            ArrayEncoding::Delimited => {
                let joined = value
                    .as_list()
                    .iter()
                    .map(|v| utf8_percent_encode(v, COMPONENT).to_string())
                    .collect::<Vec<_>>()
                    .join(&QUERY_ARRAY_SEPARATOR.to_string());
                params.set(key, joined);
            }
        }
    }
}

impl Router for SearchParamsRouter {
    fn get_query(&self, default_query: &FlatQuery) -> FlatQuery {
        self.live_query().over(default_query)
    }

    fn set_query(&self, query: &FlatQuery, default_query: &FlatQuery) -> RouterResult<()> {
        let next = self.history.update(self.mode, |location| {
            let mut params = SearchParams::parse(&location.search);
            for (key, value) in query {
                if default_query.matches(key, value) {
                    params.delete(key);
                } else {
                    self.write_value(&mut params, key, value);
                }
            }
            location.with_search(params.to_search())
        });
        debug!(href = %next, mode = ?self.mode, "navigated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_position_and_drops_duplicates() {
        let mut params = SearchParams::parse("?a=1&b=2&a=3&c=4");
        params.set("a", "9");
        assert_eq!(params.to_search(), "a=9&b=2&c=4");
    }

    #[test]
    fn test_plus_and_percent_decoding() {
        let params = SearchParams::parse("q=hello+world&x=%26");
        assert_eq!(params.get_all("q"), vec!["hello world"]);
        assert_eq!(params.get_all("x"), vec!["&"]);
    }

    #[test]
    fn test_keys_are_distinct_in_order() {
        let params = SearchParams::parse("b=1&a=2&b=3");
        assert_eq!(params.keys(), vec!["b", "a"]);
    }

    #[test]
    fn test_delimited_round_trip_with_separator_inside_element() {
        let history = Arc::new(BrowserHistory::default());
        let router = SearchParamsRouter::with_config(
            history.clone(),
            RouterConfig {
                history: HistoryMode::Replace,
                array_encoding: ArrayEncoding::Delimited,
            },
        );

        let query = FlatQuery::new().with("tags", vec!["a,b", "c d"]);
        router.set_query(&query, &FlatQuery::new()).unwrap();

        assert_eq!(router.live_query(), query);
    }

    #[test]
    fn test_repeated_round_trip() {
        let history = Arc::new(BrowserHistory::default());
        let router = SearchParamsRouter::new(history.clone());

        let query = FlatQuery::new().with("tags", vec!["a", "b"]);
        router.set_query(&query, &FlatQuery::new()).unwrap();

        assert_eq!(history.location().search, "tags=a&tags=b");
        assert_eq!(router.live_query(), query);
    }

    #[test]
    fn test_empty_list_removes_repeated_key() {
        let history = Arc::new(BrowserHistory::from_href("/?tags=a&tags=b").unwrap());
        let router = SearchParamsRouter::new(history.clone());

        router
            .set_query(&FlatQuery::new().with("tags", Vec::<String>::new()), &FlatQuery::new())
            .unwrap();

        assert_eq!(history.location().search, "");
    }
}

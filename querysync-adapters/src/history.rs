//! An in-process model of browser location and history.
//!
//! URL routers read their query from the current [`Location`] and navigate
//! by pushing or replacing history entries. The history is caller-owned and
//! is usually shared between routers behind an `Arc`.

use parking_lot::RwLock;
use querysync_core::{HistoryMode, RouterError, RouterResult};
use std::fmt;
use tracing::debug;

/// A path plus search string and fragment, without scheme or host
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub pathname: String,
    /// The search string without the leading `?`
    pub search: String,
    /// The fragment without the leading `#`
    pub hash: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
            hash: String::new(),
        }
    }

    /// Parse an absolute URL or a path such as `/list?page=2#top`
    pub fn parse(href: &str) -> RouterResult<Self> {
        let path = match href.find("://") {
            Some(scheme_end) => {
                let rest = &href[scheme_end + 3..];
                match rest.find(['/', '?', '#']) {
                    Some(i) => &rest[i..],
                    None => "",
                }
            }
            None => href,
        };

        let (path, hash) = match path.split_once('#') {
            Some((p, h)) => (p, h),
            None => (path, ""),
        };
        let (pathname, search) = match path.split_once('?') {
            Some((p, s)) => (p, s),
            None => (path, ""),
        };

        let pathname = if pathname.is_empty() {
            "/".to_string()
        } else if pathname.starts_with('/') {
            pathname.to_string()
        } else {
            return Err(RouterError::InvalidUrl(href.to_string()));
        };

        Ok(Self {
            pathname,
            search: search.to_string(),
            hash: hash.to_string(),
        })
    }

    /// The same path with a different search string
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            pathname: self.pathname.clone(),
            search: search.into(),
            hash: self.hash.clone(),
        }
    }

    /// `pathname?search#hash`, omitting empty parts
    pub fn href(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pathname)?;
        if !self.search.is_empty() {
            write!(f, "?{}", self.search)?;
        }
        if !self.hash.is_empty() {
            write!(f, "#{}", self.hash)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct HistoryState {
    entries: Vec<Location>,
    index: usize,
}

impl HistoryState {
    fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    fn push(&mut self, location: Location) {
        let next = self.index + 1;
        self.entries.truncate(next);
        self.entries.push(location);
        self.index = next;
    }

    fn replace(&mut self, location: Location) {
        let index = self.index;
        self.entries[index] = location;
    }

    fn navigate(&mut self, location: Location, mode: HistoryMode) {
        match mode {
            HistoryMode::Push => self.push(location),
            HistoryMode::Replace => self.replace(location),
        }
    }
}

/// A navigable stack of locations
#[derive(Debug)]
pub struct BrowserHistory {
    state: RwLock<HistoryState>,
}

impl BrowserHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            state: RwLock::new(HistoryState {
                entries: vec![initial],
                index: 0,
            }),
        }
    }

    pub fn from_href(href: &str) -> RouterResult<Self> {
        Ok(Self::new(Location::parse(href)?))
    }

    /// The current location
    pub fn location(&self) -> Location {
        self.state.read().current().clone()
    }

    /// Add an entry after the current one, dropping any forward entries
    pub fn push(&self, location: Location) {
        debug!(href = %location, "history push");
        self.state.write().push(location);
    }

    /// Overwrite the current entry
    pub fn replace(&self, location: Location) {
        debug!(href = %location, "history replace");
        self.state.write().replace(location);
    }

    /// Derive the next location from the current one and navigate to it,
    /// without letting another navigation in between. Returns the new
    /// location.
    pub fn update<F>(&self, mode: HistoryMode, next: F) -> Location
    where
        F: FnOnce(&Location) -> Location,
    {
        let mut state = self.state.write();
        let location = next(state.current());
        debug!(href = %location, ?mode, "history update");
        state.navigate(location.clone(), mode);
        location
    }

    /// Go back one entry; returns false at the start of the history
    pub fn back(&self) -> bool {
        let mut state = self.state.write();
        if state.index == 0 {
            return false;
        }
        state.index -= 1;
        true
    }

    /// Go forward one entry; returns false at the end of the history
    pub fn forward(&self) -> bool {
        let mut state = self.state.write();
        if state.index + 1 >= state.entries.len() {
            return false;
        }
        state.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }
}

impl Default for BrowserHistory {
    fn default() -> Self {
        Self::new(Location::new("/", ""))
    }
}

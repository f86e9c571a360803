//! Match history pagination.
//!
//! The backend has no cursor, so one extra ID past the requested window is
//! fetched and its presence decides `hasMore`. This assumes the upstream list
//! does not change between two page requests.

use serde::Serialize;

pub const DEFAULT_COUNT: usize = 10;
pub const MAX_COUNT: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchWindow {
    pub start: usize,
    pub count: usize,
}

impl Default for MatchWindow {
    fn default() -> Self {
        Self {
            start: 0,
            count: DEFAULT_COUNT,
        }
    }
}

impl MatchWindow {
    /// `count` is clamped to `1..=MAX_COUNT`.
    pub fn new(start: usize, count: usize) -> Self {
        Self {
            start,
            count: count.clamp(1, MAX_COUNT),
        }
    }

    /// End of the window, exclusive.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.count)
    }

    /// Number of IDs to request: the window plus one sentinel.
    pub fn upstream_count(&self) -> usize {
        self.end().saturating_add(1)
    }

    pub fn select(&self, mut ids: Vec<String>) -> MatchSlice {
        let has_more = ids.len() > self.end();
        ids.truncate(self.end());
        let ids = if self.start < ids.len() {
            ids.split_off(self.start)
        } else {
            Vec::new()
        };
        MatchSlice { ids, has_more }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSlice {
    pub ids: Vec<String>,
    pub has_more: bool,
}

/// Response of the match history route.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPage {
    pub matches: Vec<serde_json::Value>,
    pub has_more: bool,
    pub total_fetched: usize,
}

impl MatchPage {
    pub fn empty(window: &MatchWindow) -> Self {
        Self {
            matches: Vec::new(),
            has_more: false,
            total_fetched: window.start,
        }
    }

    /// `total_fetched` counts the IDs consumed so far, including the ones
    /// whose details could not be fetched.
    pub fn new(window: &MatchWindow, slice: &MatchSlice, matches: Vec<serde_json::Value>) -> Self {
        Self {
            matches,
            has_more: slice.has_more,
            total_fetched: window.start + slice.ids.len(),
        }
    }
}

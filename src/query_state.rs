//! Filter state for the post list and its query-string persistence.
//!
//! The query string is the single source of truth: a view reads the filter
//! from it before every fetch and writes it back after every change. Parsing
//! is total; malformed values fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

pub const DEFAULT_SKIP: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 10;

/// Page sizes offered by the pager
pub const PAGE_SIZES: [u32; 3] = [10, 20, 30];

pub fn is_page_size(limit: u32) -> bool {
    PAGE_SIZES.contains(&limit)
}

/// Tag value that means "no tag filter"
pub const ALL_TAGS: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(format!("unknown sort order '{}'", s))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub skip: u32,
    pub limit: u32,
    pub search: String,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub tag: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            sort_by: String::new(),
            sort_order: SortOrder::Asc,
            tag: String::new(),
        }
    }
}

impl FilterState {
    /// Parse a query string, with or without the leading `?`.
    /// The first occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();
        let mut seen: Vec<String> = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if seen.iter().any(|k| *k == key) {
                continue;
            }
            seen.push(key.to_string());

            match key.as_ref() {
                "skip" => state.skip = parse_leading_int(&value).unwrap_or(DEFAULT_SKIP),
                "limit" => {
                    // 0 would ask the server for every post
                    state.limit = parse_leading_int(&value)
                        .filter(|n| *n != 0)
                        .unwrap_or(DEFAULT_LIMIT)
                }
                "search" => state.search = value.into_owned(),
                "sortBy" => state.sort_by = value.into_owned(),
                "sortOrder" => state.sort_order = value.parse().unwrap_or_default(),
                "tag" => state.tag = value.into_owned(),
                _ => {}
            }
        }

        state
    }

    /// Serialize to a query string (no leading `?`). Keys holding a falsy or
    /// default value are left out.
    pub fn to_query(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());

        if self.skip != DEFAULT_SKIP {
            out.append_pair("skip", &self.skip.to_string());
        }
        if self.limit != DEFAULT_LIMIT && self.limit != 0 {
            out.append_pair("limit", &self.limit.to_string());
        }
        if !self.search.is_empty() {
            out.append_pair("search", &self.search);
        }
        if !self.sort_by.is_empty() {
            out.append_pair("sortBy", &self.sort_by);
        }
        if self.sort_order != SortOrder::default() {
            out.append_pair("sortOrder", self.sort_order.as_str());
        }
        if !self.tag.is_empty() {
            out.append_pair("tag", &self.tag);
        }

        out.finish()
    }

    /// Tag filter in effect, ignoring the "all" sentinel
    pub fn active_tag(&self) -> Option<&str> {
        if self.tag.is_empty() || self.tag == ALL_TAGS {
            None
        } else {
            Some(&self.tag)
        }
    }

    pub fn has_previous(&self) -> bool {
        self.skip > 0
    }

    pub fn has_next(&self, total: u64) -> bool {
        u64::from(self.skip) + u64::from(self.limit) < total
    }

    pub fn previous_page(&self) -> Self {
        Self {
            skip: self.skip.saturating_sub(self.limit),
            ..self.clone()
        }
    }

    pub fn next_page(&self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.limit),
            ..self.clone()
        }
    }
}

/// Lenient integer parse: optional leading whitespace and `+`, then as many
/// decimal digits as are present. No digits at all means no value.
fn parse_leading_int(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: &str = {
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    if digits.is_empty() {
        return None;
    }
    // Overlong values saturate rather than fall back
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Holds the current query string and the navigation history produced by
/// writes to it.
#[derive(Debug, Clone, Default)]
pub struct QueryStateStore {
    query: String,
    history: Vec<String>,
}

impl QueryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(query: impl Into<String>) -> Self {
        let query = query.into();
        let query = query.strip_prefix('?').map(str::to_string).unwrap_or(query);
        Self {
            query,
            history: Vec::new(),
        }
    }

    pub fn read(&self) -> FilterState {
        FilterState::from_query(&self.query)
    }

    pub fn write(&mut self, state: &FilterState) {
        self.query = state.to_query();
        tracing::debug!("Navigating to ?{}", self.query);
        self.history.push(self.query.clone());
    }

    /// Read, change, write back
    pub fn update(&mut self, f: impl FnOnce(&mut FilterState)) -> FilterState {
        let mut state = self.read();
        f(&mut state);
        self.write(&state);
        state
    }

    /// Current query string without the leading `?`
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Every query string written so far, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

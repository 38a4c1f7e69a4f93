//! Event-code → class-label table.
//!
//! [`EventCodeTable`] is passed explicitly to every extraction call; there is
//! no global table.  The default holds the five labelled cue codes of the
//! BCI IV 2a recordings:
//!
//! | code | label     |
//! |------|-----------|
//! | 769  | `left`    |
//! | 770  | `right`   |
//! | 771  | `foot`    |
//! | 772  | `tongue`  |
//! | 783  | `unknown` |
//!
//! ```
//! use mitrials::EventCodeTable;
//!
//! let table = EventCodeTable::default().with_label(1072, "eyes");
//! assert_eq!(table.label(769), Some("left"));
//! assert_eq!(table.label(1072), Some("eyes"));
//! ```
use std::collections::BTreeMap;

use crate::constants::{
    EVENT_CUE_FOOT, EVENT_CUE_LEFT, EVENT_CUE_RIGHT, EVENT_CUE_TONGUE, EVENT_CUE_UNKNOWN,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCodeTable {
    labels: BTreeMap<i32, String>,
}

impl Default for EventCodeTable {
    fn default() -> Self {
        Self::from_pairs([
            (EVENT_CUE_LEFT, "left"),
            (EVENT_CUE_RIGHT, "right"),
            (EVENT_CUE_FOOT, "foot"),
            (EVENT_CUE_TONGUE, "tongue"),
            (EVENT_CUE_UNKNOWN, "unknown"),
        ])
    }
}

impl EventCodeTable {
    /// Table with no entries.  Every trial extracted against it is skipped.
    pub fn empty() -> Self {
        Self { labels: BTreeMap::new() }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        Self {
            labels: pairs.into_iter().map(|(c, l)| (c, l.into())).collect(),
        }
    }

    /// Parse a JSON object whose keys are decimal event codes:
    /// `{"769": "left", "770": "right"}`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| Error::json("parsing event code table", e))?;
        let obj = value.as_object().ok_or_else(|| Error::InvalidTable {
            message: "expected a JSON object".into(),
        })?;

        let mut labels = BTreeMap::new();
        for (key, val) in obj {
            let code: i32 = key.trim().parse().map_err(|_| Error::InvalidTable {
                message: format!("key '{key}' is not an integer event code"),
            })?;
            let label = val.as_str().ok_or_else(|| Error::InvalidTable {
                message: format!("label for code {code} is not a string"),
            })?;
            labels.insert(code, label.to_string());
        }
        Ok(Self { labels })
    }

    /// Builder-style insert.
    pub fn with_label(mut self, code: i32, label: impl Into<String>) -> Self {
        self.insert(code, label);
        self
    }

    /// Insert or replace a label; returns the previous one.
    pub fn insert(&mut self, code: i32, label: impl Into<String>) -> Option<String> {
        self.labels.insert(code, label.into())
    }

    pub fn remove(&mut self, code: i32) -> Option<String> {
        self.labels.remove(&code)
    }

    pub fn label(&self, code: i32) -> Option<&str> {
        self.labels.get(&code).map(String::as_str)
    }

    pub fn contains(&self, code: i32) -> bool {
        self.labels.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.labels.iter().map(|(&c, l)| (c, l.as_str()))
    }
}

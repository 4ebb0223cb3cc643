use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar day identifier in `YYYY-MM-DD` form.
///
/// Ordering is plain string ordering, which the catalog guarantees to match
/// chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_KEY_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar date, when the key is well formed.
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, DATE_KEY_FORMAT).ok()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DateKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DateKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One capture within a day. `time` is display text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub thumb_url: String,
    pub full_url: String,
    pub time: String,
}

impl ImageDescriptor {
    pub fn new(
        thumb_url: impl Into<String>,
        full_url: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            thumb_url: thumb_url.into(),
            full_url: full_url.into(),
            time: time.into(),
        }
    }

    /// Accessibility text shared by thumbnails and the main image.
    pub fn alt_text(&self) -> String {
        format!("Capture at {}", self.time)
    }
}

/// Direction of a single navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Previous,
    Next,
}

/// Ascending, duplicate-free list of days that have captures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailableDates(Vec<DateKey>);

impl AvailableDates {
    pub fn new(dates: Vec<DateKey>) -> Self {
        Self(dates)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, date: &DateKey) -> bool {
        self.0.contains(date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateKey> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[DateKey] {
        &self.0
    }

    pub fn position(&self, date: &DateKey) -> Option<usize> {
        self.0.iter().position(|candidate| candidate == date)
    }

    pub fn latest(&self) -> Option<&DateKey> {
        self.0.last()
    }

    /// Adjacent day in the given direction. `None` when `current` is unknown
    /// or already at that end of the list.
    pub fn neighbor(&self, current: &DateKey, step: Step) -> Option<&DateKey> {
        let idx = self.position(current)?;
        match step {
            Step::Previous => idx.checked_sub(1).and_then(|prev| self.0.get(prev)),
            Step::Next => self.0.get(idx + 1),
        }
    }
}

impl FromIterator<DateKey> for AvailableDates {
    fn from_iter<I: IntoIterator<Item = DateKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

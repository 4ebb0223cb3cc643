//! Single source of truth for the displayed day and selection.

use lapse_types::capture::{AvailableDates, DateKey, ImageDescriptor};
use thiserror::Error;

/// Current day, its captures, the selected capture and the known days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineState {
    current_date: DateKey,
    images: Vec<ImageDescriptor>,
    current_index: usize,
    available_dates: AvailableDates,
}

impl TimelineState {
    /// Starts at the first capture, with no known days until the catalog answers.
    pub fn new(current_date: DateKey, images: Vec<ImageDescriptor>) -> Self {
        Self {
            current_date,
            images,
            current_index: 0,
            available_dates: AvailableDates::default(),
        }
    }

    pub fn current_date(&self) -> &DateKey {
        &self.current_date
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    pub fn available_dates(&self) -> &AvailableDates {
        &self.available_dates
    }

    /// Selected position; `None` while the day has no captures.
    pub fn current_index(&self) -> Option<usize> {
        (!self.images.is_empty()).then_some(self.current_index)
    }

    pub fn selected(&self) -> Option<(usize, &ImageDescriptor)> {
        let index = self.current_index()?;
        self.images.get(index).map(|image| (index, image))
    }
}

/// Why a mutation left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("index {index} outside 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("day {date} has no images")]
    EmptyDay { date: DateKey },
}

/// Owns the [`TimelineState`]. Every mutation either commits completely or
/// leaves the state exactly as it was.
#[derive(Debug, Clone)]
pub struct TimelineStore {
    state: TimelineState,
}

impl TimelineStore {
    pub fn new(state: TimelineState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn select_index(&mut self, index: usize) -> Result<&TimelineState, Rejection> {
        let len = self.state.images.len();
        if index >= len {
            return Err(Rejection::IndexOutOfRange { index, len });
        }
        self.state.current_index = index;
        Ok(&self.state)
    }

    /// Swaps in a whole day and selects its first capture. An empty list is
    /// rejected so the previous day stays on screen.
    pub fn replace_day(
        &mut self,
        date: DateKey,
        images: Vec<ImageDescriptor>,
    ) -> Result<&TimelineState, Rejection> {
        if images.is_empty() {
            return Err(Rejection::EmptyDay { date });
        }
        self.state.current_date = date;
        self.state.images = images;
        self.state.current_index = 0;
        Ok(&self.state)
    }

    /// Last write wins.
    pub fn set_available_dates(&mut self, dates: AvailableDates) -> &TimelineState {
        self.state.available_dates = dates;
        &self.state
    }
}

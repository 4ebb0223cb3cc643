//! One-way projection of the timeline state onto the hosted view.

use lapse_types::capture::DateKey;

use crate::store::TimelineState;

/// How much of the view a committed mutation invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderScope {
    /// Same-day selection change; `previous` loses its selected marker.
    Selection { previous: Option<usize> },
    /// Day switch or mount: the filmstrip and date controls are rebuilt.
    Day,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailView {
    pub index: usize,
    pub src: String,
    pub full_url: String,
    pub time: String,
    pub alt: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionView {
    pub index: usize,
    pub previous: Option<usize>,
    pub main_src: String,
    pub main_alt: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView {
    pub date_display: String,
    pub picker_value: DateKey,
    pub thumbnails: Vec<ThumbnailView>,
    pub focus_filmstrip: bool,
}

/// Everything a host needs to update after one committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    pub selection: Option<SelectionView>,
    pub day: Option<DayView>,
}

pub fn render(state: &TimelineState, scope: RenderScope) -> RenderFrame {
    let selected = state.current_index();
    let previous = match scope {
        RenderScope::Selection { previous } => previous,
        RenderScope::Day => None,
    };

    let selection = state.selected().map(|(index, image)| SelectionView {
        index,
        previous,
        main_src: image.full_url.clone(),
        main_alt: image.alt_text(),
        timestamp: image.time.clone(),
    });

    let day = matches!(scope, RenderScope::Day).then(|| DayView {
        date_display: state.current_date().to_string(),
        picker_value: state.current_date().clone(),
        thumbnails: state
            .images()
            .iter()
            .enumerate()
            .map(|(index, image)| ThumbnailView {
                index,
                src: image.thumb_url.clone(),
                full_url: image.full_url.clone(),
                time: image.time.clone(),
                alt: image.alt_text(),
                selected: Some(index) == selected,
            })
            .collect(),
        focus_filmstrip: true,
    });

    RenderFrame { selection, day }
}

/// Render target hosted by a front-end.
pub trait ViewSink {
    fn apply(&mut self, frame: &RenderFrame);

    /// UI-only affordance; never a state transition.
    fn open_date_picker(&mut self) {}

    /// Shown only when failed day switches are announced.
    fn notice(&mut self, _message: &str) {}
}

/// Retained view contents: filmstrip, main image, timestamp overlay, date
/// display and date-picker value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub thumbnails: Vec<ThumbnailView>,
    pub main_src: Option<String>,
    pub main_alt: String,
    pub timestamp: String,
    pub date_display: String,
    pub picker_value: Option<DateKey>,
    pub scrolled_to: Option<usize>,
    pub filmstrip_focused: bool,
    pub picker_open: bool,
    pub notice: Option<String>,
    pub renders: usize,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.thumbnails
            .iter()
            .filter(|thumb| thumb.selected)
            .map(|thumb| thumb.index)
            .collect()
    }

    pub fn close_date_picker(&mut self) {
        self.picker_open = false;
    }
}

impl ViewSink for ViewModel {
    fn apply(&mut self, frame: &RenderFrame) {
        if let Some(day) = &frame.day {
            self.thumbnails = day.thumbnails.clone();
            self.date_display = day.date_display.clone();
            self.picker_value = Some(day.picker_value.clone());
            self.picker_open = false;
            if day.focus_filmstrip {
                self.filmstrip_focused = true;
            }
        }

        if let Some(selection) = &frame.selection {
            if let Some(thumb) = selection
                .previous
                .and_then(|previous| self.thumbnails.get_mut(previous))
            {
                thumb.selected = false;
            }
            if let Some(thumb) = self.thumbnails.get_mut(selection.index) {
                thumb.selected = true;
            }
            self.scrolled_to = Some(selection.index);
            self.main_src = Some(selection.main_src.clone());
            self.main_alt = selection.main_alt.clone();
            self.timestamp = selection.timestamp.clone();
        }

        self.notice = None;
        self.renders += 1;
    }

    fn open_date_picker(&mut self) {
        self.picker_open = true;
        self.filmstrip_focused = false;
    }

    fn notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }
}

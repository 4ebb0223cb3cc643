//! One-time parse of the server-rendered page into the initial state.

use std::{fs, path::Path};

use lapse_types::{
    capture::{DateKey, ImageDescriptor},
    LapseError, Result,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::TimelineState;

/// A pre-rendered filmstrip entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailElement {
    pub src: String,
    pub full_url: String,
    pub time: String,
}

/// The initially served page: the current-date marker plus its thumbnails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialPage {
    pub current_date: DateKey,
    #[serde(default)]
    pub thumbnails: Vec<ThumbnailElement>,
}

impl InitialPage {
    pub fn from_json(doc: &str) -> Result<Self> {
        serde_json::from_str(doc)
            .map_err(|err| bootstrap_error(format!("malformed initial page: {err}")))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let doc = fs::read_to_string(path_ref).map_err(|err| {
            bootstrap_error(format!(
                "unable to read initial page {}: {err}",
                path_ref.display()
            ))
        })?;
        Self::from_json(&doc)
    }

    /// Page as the server would render it for `date`.
    pub fn for_day(current_date: DateKey, images: &[ImageDescriptor]) -> Self {
        Self {
            current_date,
            thumbnails: images
                .iter()
                .map(|image| ThumbnailElement {
                    src: image.thumb_url.clone(),
                    full_url: image.full_url.clone(),
                    time: image.time.clone(),
                })
                .collect(),
        }
    }

    pub fn into_state(self) -> TimelineState {
        if self.current_date.as_str().is_empty() {
            warn!("Initial page carries no current date marker");
        }
        let images = self
            .thumbnails
            .into_iter()
            .map(|thumb| ImageDescriptor {
                thumb_url: thumb.src,
                full_url: thumb.full_url,
                time: thumb.time,
            })
            .collect();
        TimelineState::new(self.current_date, images)
    }
}

pub fn bootstrap_error(message: impl Into<String>) -> LapseError {
    LapseError::Bootstrap(message.into())
}

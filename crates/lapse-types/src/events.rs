use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capture::DateKey;

/// High-level categories of view events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Lifecycle,
    Navigation,
    Catalog,
}

/// Immutable event envelope for the journal and the status pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    Lifecycle(LifecyclePhase),
    DatesLoaded {
        count: usize,
    },
    IndexSelected {
        date: DateKey,
        index: usize,
    },
    DaySwitched {
        date: DateKey,
        image_count: usize,
        token: u64,
    },
    /// The fetched day had no images, so the switch was not committed.
    SwitchRejected {
        date: DateKey,
        token: u64,
    },
    StaleResponseDiscarded {
        date: DateKey,
        token: u64,
        latest: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecyclePhase {
    Mounted,
    Unmounted,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Lifecycle(_) => EventKind::Lifecycle,
            EventPayload::DatesLoaded { .. } => EventKind::Catalog,
            EventPayload::IndexSelected { .. }
            | EventPayload::DaySwitched { .. }
            | EventPayload::SwitchRejected { .. }
            | EventPayload::StaleResponseDiscarded { .. } => EventKind::Navigation,
        }
    }
}

impl ViewEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: payload.kind(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

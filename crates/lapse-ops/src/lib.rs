//! Operational helpers: logging setup and the view-event journal.

use std::{
    collections::VecDeque,
    fs::OpenOptions,
    sync::{Arc, Mutex},
};

use futures::{stream::BoxStream, StreamExt};
use lapse_types::{
    config::OpsConfig,
    events::{EventPayload, ViewEvent},
    LapseError, Result,
};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| LapseError::Ops(format!("failed to create log filter: {err}")))?;

    let builder = fmt().with_env_filter(filter);
    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| LapseError::Ops(format!("cannot open log file {path}: {err}")))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| LapseError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}

/// Bounded in-memory record of view events with live subscription.
#[derive(Clone)]
pub struct Journal {
    events: Arc<Mutex<VecDeque<ViewEvent>>>,
    capacity: usize,
    tx: broadcast::Sender<ViewEvent>,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
            tx,
        }
    }

    /// Records the event, evicting the oldest entry once full.
    pub fn record(&self, payload: EventPayload) -> ViewEvent {
        let event = ViewEvent::new(payload);
        if let Ok(mut events) = self.events.lock() {
            if events.len() == self.capacity {
                events.pop_front();
            }
            events.push_back(event.clone());
        }
        let _ = self.tx.send(event.clone());
        event
    }

    pub fn snapshot(&self) -> Vec<ViewEvent> {
        self.events
            .lock()
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> BoxStream<'static, ViewEvent> {
        BroadcastStream::new(self.tx.subscribe())
            .filter_map(|event| async move { event.ok() })
            .boxed()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new(256)
    }
}

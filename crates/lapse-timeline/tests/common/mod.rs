//! Shared fixtures for timeline integration tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use lapse_catalog::{catalog_error, CatalogClient, CatalogSource, StaticCatalog};
use lapse_ops::Journal;
use lapse_timeline::{NavigationController, TimelineState, ViewModel};
use lapse_types::{
    capture::{DateKey, ImageDescriptor},
    config::NavigationConfig,
    Result,
};
use tokio::sync::oneshot;

/// Deterministic captures for a day, one every fifteen minutes from 08:00.
#[allow(dead_code)]
pub fn captures(date: &str, count: usize) -> Vec<ImageDescriptor> {
    (0..count)
        .map(|i| {
            let minutes = i * 15;
            let stamp = format!("{:02}{:02}00", 8 + minutes / 60, minutes % 60);
            ImageDescriptor::new(
                format!("/images/{date}/thumbs/{stamp}.jpg"),
                format!("/images/{date}/{stamp}.jpg"),
                format!("{}:{}:{}", &stamp[0..2], &stamp[2..4], &stamp[4..6]),
            )
        })
        .collect()
}

/// Wraps a source and counts day fetches.
#[allow(dead_code)]
pub struct CountingSource {
    inner: StaticCatalog,
    pub day_fetches: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingSource {
    pub fn new(inner: StaticCatalog) -> Self {
        Self {
            inner,
            day_fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl CatalogSource for CountingSource {
    async fn available_dates(&self) -> Result<Vec<DateKey>> {
        self.inner.available_dates().await
    }

    async fn day_images(&self, date: &DateKey) -> Result<Vec<ImageDescriptor>> {
        self.day_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.day_images(date).await
    }

    fn describe(&self) -> String {
        "counting catalog".into()
    }
}

/// Holds each day fetch until the test releases it.
#[allow(dead_code)]
pub struct GatedSource {
    inner: StaticCatalog,
    gates: Mutex<HashMap<DateKey, oneshot::Receiver<()>>>,
}

#[allow(dead_code)]
impl GatedSource {
    pub fn new(inner: StaticCatalog) -> Self {
        Self {
            inner,
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn gate(&self, date: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("gate lock")
            .insert(DateKey::from(date), rx);
        tx
    }
}

#[async_trait]
impl CatalogSource for GatedSource {
    async fn available_dates(&self) -> Result<Vec<DateKey>> {
        self.inner.available_dates().await
    }

    async fn day_images(&self, date: &DateKey) -> Result<Vec<ImageDescriptor>> {
        let gate = self.gates.lock().expect("gate lock").remove(date);
        if let Some(gate) = gate {
            gate.await
                .map_err(|_| catalog_error(format!("gate for {date} dropped")))?;
        }
        self.inner.day_images(date).await
    }

    fn describe(&self) -> String {
        "gated catalog".into()
    }
}

/// Controller mounted on `current` with `count` captures and the catalog's
/// dates already loaded.
#[allow(dead_code)]
pub async fn mounted(
    catalog: CatalogClient,
    current: &str,
    count: usize,
    config: &NavigationConfig,
) -> NavigationController<ViewModel> {
    let state = TimelineState::new(DateKey::from(current), captures(current, count));
    let mut controller =
        NavigationController::new(state, catalog, ViewModel::new(), Journal::new(64), config);
    controller.load_available_dates().await;
    controller
}

//! Catalog client for dates and per-day capture lists.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use lapse_types::{
    capture::{AvailableDates, DateKey, ImageDescriptor},
    config::{CatalogConfig, CatalogSourceKind},
    LapseError, Result,
};
use tracing::{debug, info, warn};

mod directory;
mod http;
mod memory;

pub use directory::DirectoryCatalog;
pub use http::{decode_dates, decode_images, HttpCatalog};
pub use memory::StaticCatalog;

/// Raw access to a catalog backend. Failures are reported, not absorbed.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn available_dates(&self) -> Result<Vec<DateKey>>;
    async fn day_images(&self, date: &DateKey) -> Result<Vec<ImageDescriptor>>;
    fn describe(&self) -> String;
}

/// Read-only client that degrades every failure to an empty result.
///
/// Emptiness means "nothing to show": a transport error, a malformed payload,
/// an unknown date and a genuinely empty day all look the same to callers.
/// Each call is an independent request with no caching or de-duplication.
#[derive(Clone)]
pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
}

impl CatalogClient {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    pub fn from_source<S: CatalogSource + 'static>(source: S) -> Self {
        Self::new(Arc::new(source))
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let client = match config.source {
            CatalogSourceKind::Http => {
                let timeout = config.request_timeout_ms.map(Duration::from_millis);
                Self::from_source(HttpCatalog::new(&config.base_url, timeout)?)
            }
            CatalogSourceKind::Directory => {
                let root = config.root_dir.as_deref().ok_or_else(|| {
                    LapseError::Configuration("catalog.root_dir is not set".into())
                })?;
                Self::from_source(DirectoryCatalog::new(root, &config.url_prefix))
            }
        };
        info!("Catalog client ready: {}", client.describe());
        Ok(client)
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub async fn fetch_available_dates(&self) -> AvailableDates {
        match self.source.available_dates().await {
            Ok(dates) => normalize_dates(dates),
            Err(err) => {
                warn!("Available dates unavailable, day navigation disabled: {err}");
                AvailableDates::default()
            }
        }
    }

    pub async fn fetch_day_images(&self, date: &DateKey) -> Vec<ImageDescriptor> {
        match self.source.day_images(date).await {
            Ok(images) => {
                debug!("Fetched {} images for {}", images.len(), date);
                images
            }
            Err(err) => {
                warn!("Images for {} unavailable: {err}", date);
                Vec::new()
            }
        }
    }
}

/// Restores ascending, duplicate-free order if a backend breaks it.
fn normalize_dates(mut dates: Vec<DateKey>) -> AvailableDates {
    if !dates.windows(2).all(|pair| pair[0] < pair[1]) {
        warn!("Catalog returned unordered or duplicate dates; normalizing");
        dates.sort();
        dates.dedup();
    }
    AvailableDates::new(dates)
}

pub fn catalog_error(message: impl Into<String>) -> LapseError {
    LapseError::Catalog(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UnreachableSource;

    #[async_trait]
    impl CatalogSource for UnreachableSource {
        async fn available_dates(&self) -> Result<Vec<DateKey>> {
            Err(catalog_error("connection refused"))
        }

        async fn day_images(&self, _date: &DateKey) -> Result<Vec<ImageDescriptor>> {
            Err(catalog_error("connection refused"))
        }

        fn describe(&self) -> String {
            "unreachable".into()
        }
    }

    #[tokio::test]
    async fn failures_degrade_to_empty_results() {
        let client = CatalogClient::from_source(UnreachableSource);
        assert!(client.fetch_available_dates().await.is_empty());
        assert!(client
            .fetch_day_images(&DateKey::from("2024-01-01"))
            .await
            .is_empty());
    }

    #[test]
    fn unordered_dates_are_normalized() {
        let shuffled = vec![
            DateKey::from("2024-01-02"),
            DateKey::from("2024-01-01"),
            DateKey::from("2024-01-02"),
        ];
        let normalized = normalize_dates(shuffled);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized.latest(), Some(&DateKey::from("2024-01-02")));
    }
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use lapse_types::{
    capture::{DateKey, ImageDescriptor},
    Result,
};

use crate::{catalog_error, CatalogSource};

/// In-process catalog backed by a sorted map of days.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    days: BTreeMap<DateKey, Vec<ImageDescriptor>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, date: impl Into<DateKey>, images: Vec<ImageDescriptor>) -> Self {
        self.days.insert(date.into(), images);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn available_dates(&self) -> Result<Vec<DateKey>> {
        Ok(self.days.keys().cloned().collect())
    }

    async fn day_images(&self, date: &DateKey) -> Result<Vec<ImageDescriptor>> {
        self.days
            .get(date)
            .cloned()
            .ok_or_else(|| catalog_error(format!("no such date {date}")))
    }

    fn describe(&self) -> String {
        format!("static catalog with {} days", self.days.len())
    }
}

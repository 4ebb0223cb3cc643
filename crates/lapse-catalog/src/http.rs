use std::time::Duration;

use async_trait::async_trait;
use lapse_types::{
    capture::{DateKey, ImageDescriptor},
    Result,
};
use tracing::debug;

use crate::{catalog_error, CatalogSource};

/// Catalog served over HTTP as `GET /api/dates` and `GET /api/images/{date}`.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| catalog_error(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_body(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| catalog_error(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(catalog_error(format!("{url} answered {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| catalog_error(format!("reading {url} failed: {err}")))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn available_dates(&self) -> Result<Vec<DateKey>> {
        let body = self.get_body(&self.endpoint("/api/dates")).await?;
        decode_dates(&body)
    }

    async fn day_images(&self, date: &DateKey) -> Result<Vec<ImageDescriptor>> {
        let body = self
            .get_body(&self.endpoint(&format!("/api/images/{date}")))
            .await?;
        decode_images(&body)
    }

    fn describe(&self) -> String {
        format!("http catalog at {}", self.base_url)
    }
}

/// Decodes a `/api/dates` body: a JSON array of date strings.
pub fn decode_dates(body: &[u8]) -> Result<Vec<DateKey>> {
    serde_json::from_slice(body)
        .map_err(|err| catalog_error(format!("malformed dates payload: {err}")))
}

/// Decodes a `/api/images/{date}` body: a JSON array of capture objects.
pub fn decode_images(body: &[u8]) -> Result<Vec<ImageDescriptor>> {
    serde_json::from_slice(body)
        .map_err(|err| catalog_error(format!("malformed images payload: {err}")))
}

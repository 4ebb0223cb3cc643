use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{LapseError, Result};

/// Where captures are listed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSourceKind {
    #[default]
    Http,
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: CatalogSourceKind,
    #[serde(default)]
    pub base_url: String,
    pub root_dir: Option<String>,
    /// Prefix used to build image URLs for directory sources.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// No timeout when absent; a hung fetch simply never resolves.
    pub request_timeout_ms: Option<u64>,
}

/// What happens to a day response that is no longer the latest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    #[default]
    Discard,
    LastResolved,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub stale_responses: StaleResponsePolicy,
    #[serde(default)]
    pub announce_failed_switch: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    #[serde(default = "default_journal_capacity")]
    pub journal_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    pub ops: OpsConfig,
}

fn default_url_prefix() -> String {
    "/images".into()
}

fn default_journal_capacity() -> usize {
    256
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                source: CatalogSourceKind::Http,
                base_url: "http://127.0.0.1:5000".into(),
                root_dir: None,
                url_prefix: default_url_prefix(),
                request_timeout_ms: None,
            },
            navigation: NavigationConfig::default(),
            ops: OpsConfig {
                log_level: "info".into(),
                log_file: Some("lapse-viewer.log".into()),
                journal_capacity: default_journal_capacity(),
            },
        }
    }
}

impl ViewerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            LapseError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            LapseError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        match self.catalog.source {
            CatalogSourceKind::Http => {
                let url = self.catalog.base_url.as_str();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(LapseError::Configuration(
                        "catalog.base_url must be an http(s) URL".into(),
                    ));
                }
            }
            CatalogSourceKind::Directory => {
                if self.catalog.root_dir.as_deref().map_or(true, str::is_empty) {
                    return Err(LapseError::Configuration(
                        "catalog.root_dir is required for directory sources".into(),
                    ));
                }
            }
        }
        if self.catalog.request_timeout_ms == Some(0) {
            return Err(LapseError::Configuration(
                "catalog.request_timeout_ms must be greater than zero when set".into(),
            ));
        }
        if self.ops.journal_capacity == 0 {
            return Err(LapseError::Configuration(
                "ops.journal_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

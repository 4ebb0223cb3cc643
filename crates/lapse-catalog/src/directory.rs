use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lapse_types::{
    capture::{DateKey, ImageDescriptor},
    Result,
};
use tokio::fs;
use tracing::debug;

use crate::{catalog_error, CatalogSource};

const THUMB_DIR: &str = "thumbs";
const CAPTURE_EXT: &str = "jpg";

/// Catalog read straight from a capture store laid out as
/// `root/YYYY/MM/DD/HHMMSS.jpg`, with optional `thumbs/HHMMSS.jpg` per day.
pub struct DirectoryCatalog {
    root: PathBuf,
    url_prefix: String,
}

struct NamedDir {
    name: String,
    path: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn day_dir(&self, date: &DateKey) -> Result<(PathBuf, String)> {
        let day = date
            .to_date()
            .ok_or_else(|| catalog_error(format!("invalid date key {date}")))?;
        let relative = day.format("%Y/%m/%d").to_string();
        Ok((self.root.join(&relative), relative))
    }
}

#[async_trait]
impl CatalogSource for DirectoryCatalog {
    async fn available_dates(&self) -> Result<Vec<DateKey>> {
        let mut dates = Vec::new();
        for year in numeric_dirs(&self.root, 4).await? {
            for month in numeric_dirs(&year.path, 2).await? {
                for day in numeric_dirs(&month.path, 2).await? {
                    let key = DateKey::new(format!("{}-{}-{}", year.name, month.name, day.name));
                    if key.to_date().is_none() {
                        continue;
                    }
                    if !capture_names(&day.path).await?.is_empty() {
                        dates.push(key);
                    }
                }
            }
        }
        dates.sort();
        Ok(dates)
    }

    async fn day_images(&self, date: &DateKey) -> Result<Vec<ImageDescriptor>> {
        let (dir, relative) = self.day_dir(date)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            debug!("No capture directory for {}", date);
            return Ok(Vec::new());
        }

        let mut images = Vec::new();
        for name in capture_names(&dir).await? {
            let full_url = format!("{}/{}/{}", self.url_prefix, relative, name);
            let thumb_path = dir.join(THUMB_DIR).join(&name);
            let thumb_url = if fs::try_exists(&thumb_path).await.unwrap_or(false) {
                format!("{}/{}/{}/{}", self.url_prefix, relative, THUMB_DIR, name)
            } else {
                full_url.clone()
            };
            images.push(ImageDescriptor {
                thumb_url,
                full_url,
                time: display_time(&name),
            });
        }
        Ok(images)
    }

    fn describe(&self) -> String {
        format!("directory catalog at {}", self.root.display())
    }
}

/// Child directories whose names are exactly `width` ASCII digits, sorted.
async fn numeric_dirs(parent: &Path, width: usize) -> Result<Vec<NamedDir>> {
    let mut entries = fs::read_dir(parent)
        .await
        .map_err(|err| catalog_error(format!("cannot list {}: {err}", parent.display())))?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| catalog_error(format!("cannot list {}: {err}", parent.display())))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.len() != width || !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            dirs.push(NamedDir {
                name,
                path: entry.path(),
            });
        }
    }
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dirs)
}

/// `HHMMSS.jpg` file names in a day directory, in capture order.
async fn capture_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|err| catalog_error(format!("cannot list {}: {err}", dir.display())))?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| catalog_error(format!("cannot list {}: {err}", dir.display())))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_capture_name(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn is_capture_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((stem, ext)) => {
            ext.eq_ignore_ascii_case(CAPTURE_EXT)
                && stem.len() == 6
                && stem.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn display_time(name: &str) -> String {
    let stem = &name[..6];
    format!("{}:{}:{}", &stem[0..2], &stem[2..4], &stem[4..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root(label: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "lapse-catalog-{}-{}",
            label,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        root
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        std::fs::write(path, b"jpeg").expect("write capture");
    }

    #[test]
    fn capture_names_and_times() {
        assert!(is_capture_name("081500.jpg"));
        assert!(is_capture_name("081500.JPG"));
        assert!(!is_capture_name("0815.jpg"));
        assert!(!is_capture_name("081500.png"));
        assert!(!is_capture_name(".write_test"));
        assert_eq!(display_time("081500.jpg"), "08:15:00");
    }

    #[tokio::test]
    async fn lists_days_with_captures_in_order() {
        let root = scratch_root("dates");
        touch(&root.join("2024/01/02/120000.jpg"));
        touch(&root.join("2024/01/01/080000.jpg"));
        std::fs::create_dir_all(root.join("2024/01/03")).expect("empty day");
        std::fs::create_dir_all(root.join("2024/13/40")).expect("bogus day");
        touch(&root.join("2024/13/40/080000.jpg"));

        let catalog = DirectoryCatalog::new(&root, "/images");
        let dates = catalog.available_dates().await.expect("dates");
        assert_eq!(
            dates,
            vec![DateKey::from("2024-01-01"), DateKey::from("2024-01-02")]
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn day_images_prefer_thumbnails() {
        let root = scratch_root("images");
        touch(&root.join("2024/01/01/090000.jpg"));
        touch(&root.join("2024/01/01/080000.jpg"));
        touch(&root.join("2024/01/01/thumbs/080000.jpg"));

        let catalog = DirectoryCatalog::new(&root, "/images/");
        let images = catalog
            .day_images(&DateKey::from("2024-01-01"))
            .await
            .expect("images");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].time, "08:00:00");
        assert_eq!(images[0].thumb_url, "/images/2024/01/01/thumbs/080000.jpg");
        assert_eq!(images[0].full_url, "/images/2024/01/01/080000.jpg");
        assert_eq!(images[1].thumb_url, images[1].full_url);

        let missing = catalog
            .day_images(&DateKey::from("2023-06-01"))
            .await
            .expect("missing day");
        assert!(missing.is_empty());
        assert!(catalog.day_images(&DateKey::from("junk")).await.is_err());
        let _ = std::fs::remove_dir_all(&root);
    }
}

//! File-backed analytics source.
//!
//! Serves pre-aggregated component documents from `<data_dir>/<parent_asin>.json`:
//!
//! ```json
//! { "summary": {...}, "wordcloud": [...], "distribution_year": [...] }
//! ```
//!
//! Documents are unfiltered aggregates: date and city filters only shape the
//! cache key, not the value served.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::cache::Fetched;
use crate::dashboard::{Component, DashboardQuery};
use crate::source::AnalyticsSource;

pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn document_path(&self, parent_asin: &str) -> anyhow::Result<PathBuf> {
        let safe = !parent_asin.is_empty()
            && parent_asin
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(anyhow!("invalid product id '{}'", parent_asin));
        }
        Ok(self.data_dir.join(format!("{}.json", parent_asin)))
    }
}

#[async_trait]
impl AnalyticsSource for FileSource {
    async fn fetch(&self, component: Component, query: &DashboardQuery) -> Fetched {
        let path = self.document_path(&query.parent_asin)?;

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No analytics document at {}", path.display());
                return Ok(None);
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("reading {}", path.display()))
                    .into())
            }
        };

        let mut document: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        let Some(sections) = document.as_object_mut() else {
            return Err(anyhow!("{} is not a JSON object", path.display()).into());
        };

        Ok(sections
            .remove(component.name())
            .filter(|value| !value.is_null()))
    }
}

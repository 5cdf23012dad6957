use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use common::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub username: String,
    /// ISO-8601, UTC, millisecond precision.
    pub exported_at: String,
    pub url: String,
}

impl ExportDocument {
    pub fn new(username: &str, url: String, at: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            exported_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            url,
        }
    }

    /// Anything outside `[A-Za-z0-9_-]` becomes `_`, so the name never
    /// leaves the target directory.
    pub fn file_name(&self) -> String {
        let safe: String = self
            .username
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("github-profile-{safe}.json")
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        let body = serde_json::to_string_pretty(self)
            .context("serializing export document")
            .map_err(AppError::Other)?;
        std::fs::write(&path, body)?;
        info!(path = %path.display(), username = %self.username, "profile exported");
        Ok(path)
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "GithubConfig::default_api_base")]
    pub api_base: String,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GithubConfig::default_accept")]
    pub accept: String,
    /// Per-request timeout; `0` disables it.
    #[serde(default = "GithubConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GithubConfig {
    fn default_api_base() -> String {
        "https://api.github.com/".to_string()
    }

    fn default_user_agent() -> String {
        "gh-profile-viewer".to_string()
    }

    fn default_accept() -> String {
        "application/vnd.github.v3+json".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: Self::default_api_base(),
            user_agent: Self::default_user_agent(),
            accept: Self::default_accept(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// The page location the viewer pretends to be served from.
    #[serde(default = "ViewerConfig::default_page_url")]
    pub page_url: String,
    #[serde(default = "ViewerConfig::default_page_size")]
    pub repo_page_size: u32,
    #[serde(default = "ViewerConfig::default_page_size")]
    pub event_page_size: u32,
    #[serde(default = "ViewerConfig::default_repo_cards")]
    pub repo_cards: usize,
    #[serde(default = "ViewerConfig::default_top_languages")]
    pub top_languages: usize,
    #[serde(default = "ViewerConfig::default_activity_days")]
    pub activity_days: usize,
    #[serde(default = "ViewerConfig::default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "ViewerConfig::default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "ViewerConfig::default_popular_users")]
    pub popular_users: Vec<String>,
}

impl ViewerConfig {
    fn default_page_url() -> String {
        "http://localhost/index.html".to_string()
    }

    const fn default_page_size() -> u32 {
        50
    }

    const fn default_repo_cards() -> usize {
        6
    }

    const fn default_top_languages() -> usize {
        8
    }

    const fn default_activity_days() -> usize {
        30
    }

    const fn default_history_limit() -> usize {
        10
    }

    const fn default_suggestion_limit() -> usize {
        5
    }

    fn default_popular_users() -> Vec<String> {
        [
            "torvalds",
            "octocat",
            "gaearon",
            "addyosmani",
            "sindresorhus",
            "yyx990803",
            "egoist",
            "developit",
            "Rich-Harris",
            "substack",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page_url: Self::default_page_url(),
            repo_page_size: Self::default_page_size(),
            event_page_size: Self::default_page_size(),
            repo_cards: Self::default_repo_cards(),
            top_languages: Self::default_top_languages(),
            activity_days: Self::default_activity_days(),
            history_limit: Self::default_history_limit(),
            suggestion_limit: Self::default_suggestion_limit(),
            popular_users: Self::default_popular_users(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_path")]
    pub path: String,
}

impl StorageConfig {
    fn default_path() -> String {
        "~/.config/gh-profile-viewer/storage.json".to_string()
    }

    /// Expands `~` and environment variables in the configured path.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.path)
            .with_context(|| format!("storage path {} is invalid", self.path))
            .map_err(AppError::storage)?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_limits() {
        let config = AppConfig::default();
        assert_eq!(config.viewer.repo_page_size, 50);
        assert_eq!(config.viewer.repo_cards, 6);
        assert_eq!(config.viewer.top_languages, 8);
        assert_eq!(config.viewer.activity_days, 30);
        assert_eq!(config.viewer.history_limit, 10);
        assert_eq!(config.viewer.popular_users.len(), 10);
        assert_eq!(config.github.accept, "application/vnd.github.v3+json");
    }

    #[test]
    fn missing_config_files_fall_back_to_defaults() {
        let config = AppConfig::load_from_path("/nonexistent-config-root").expect("load");
        assert_eq!(config.github.api_base, "https://api.github.com/");
        assert_eq!(config.viewer.suggestion_limit, 5);
    }

    #[test]
    fn storage_path_expands_env() {
        std::env::set_var("GH_PROFILE_TEST_HOME", "/tmp/ghp");
        let storage = StorageConfig {
            path: "$GH_PROFILE_TEST_HOME/state.json".to_string(),
        };
        assert_eq!(
            storage.resolved_path().expect("path"),
            PathBuf::from("/tmp/ghp/state.json")
        );
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use common::config::GithubConfig;
use http::{header, Request};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::GithubApiError;
use crate::exec::{HttpExec, ReqwestExecutor};
use crate::metrics;

/// The three read-only GitHub resources the profile view needs.
#[async_trait]
pub trait GithubClient: Send + Sync {
    async fn get_user(&self, login: &str) -> Result<Value>;
    /// Most recently updated first.
    async fn list_user_repos(&self, login: &str, per_page: u32) -> Result<Vec<Value>>;
    async fn list_user_events(&self, login: &str, per_page: u32) -> Result<Vec<Value>>;
}

pub struct RestGithubClient {
    exec: Arc<dyn HttpExec>,
    base: Url,
    user_agent: String,
    accept: String,
}

impl RestGithubClient {
    pub fn new(
        exec: Arc<dyn HttpExec>,
        base: &str,
        user_agent: impl Into<String>,
        accept: impl Into<String>,
    ) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid api base {base}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("api base {base} cannot carry a path"));
        }
        Ok(Self {
            exec,
            base,
            user_agent: user_agent.into(),
            accept: accept.into(),
        })
    }

    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let exec = Arc::new(ReqwestExecutor::new(&config.user_agent, timeout)?);
        Self::new(exec, &config.api_base, &config.user_agent, &config.accept)
    }

    async fn get_json(&self, url: Url, kind: &'static str) -> Result<Value> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        debug!(endpoint = %endpoint, url = %url, "Dispatching GitHub request");
        let started = Instant::now();
        let result = self.fetch(url, &endpoint).await;
        metrics::REQUEST_LATENCY_SECONDS
            .with_label_values(&[kind])
            .observe(started.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) if GithubApiError::status_of(err).is_some() => "status",
            Err(_) => "error",
        };
        metrics::REQUESTS_TOTAL
            .with_label_values(&[kind, outcome])
            .inc();
        result
    }

    async fn fetch(&self, url: Url, endpoint: &str) -> Result<Value> {
        let response = self.execute(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GithubApiError::status(status, endpoint).into());
        }
        let body = response.into_body();
        let value: Value = serde_json::from_slice(&body)
            .with_context(|| format!("decoding response body for {endpoint}"))?;
        Ok(value)
    }

    async fn get_json_array(&self, url: Url, kind: &'static str) -> Result<Vec<Value>> {
        let value = self.get_json(url, kind).await?;
        match value {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            _ => Err(anyhow!("expected array response")),
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn execute(&self, url: Url) -> Result<http::Response<Vec<u8>>> {
        let uri: http::Uri = url.as_str().parse()?;
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::USER_AGENT, self.user_agent.clone())
            .header(header::ACCEPT, self.accept.clone())
            .body(Vec::new())?;

        self.exec.execute(request).await
    }

    /// Appends percent-encoded path segments to the api base.
    fn join(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("api base {} cannot carry a path", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_query(url: &mut Url, params: &[(&str, String)]) {
        let mut query_pairs = url.query_pairs_mut();
        for (key, val) in params {
            query_pairs.append_pair(key, val);
        }
    }
}

#[async_trait]
impl GithubClient for RestGithubClient {
    async fn get_user(&self, login: &str) -> Result<Value> {
        let url = self.join(&["users", login])?;
        self.get_json(url, "user").await
    }

    async fn list_user_repos(&self, login: &str, per_page: u32) -> Result<Vec<Value>> {
        let mut url = self.join(&["users", login, "repos"])?;
        let params = [
            ("per_page", per_page.to_string()),
            ("sort", "updated".to_string()),
        ];
        Self::with_query(&mut url, &params);
        self.get_json_array(url, "repos").await
    }

    async fn list_user_events(&self, login: &str, per_page: u32) -> Result<Vec<Value>> {
        let mut url = self.join(&["users", login, "events", "public"])?;
        Self::with_query(&mut url, &[("per_page", per_page.to_string())]);
        self.get_json_array(url, "events").await
    }
}

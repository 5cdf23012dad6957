#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use common::config::ViewerConfig;
use gh_client::{GithubApiError, GithubClient};
use http::StatusCode;
use serde_json::{json, Value};
use store::{MemoryStore, Storage, Theme};
use tokio::sync::Notify;
use viewer::{
    Banner, ChartRender, Clipboard, NetworkProbe, ProfileCard, ProfileViewer, RepoCard, Toast,
    ViewSink,
};

pub enum Reply {
    Ok(Value),
    Status(StatusCode),
    Broken,
}

impl Reply {
    fn into_result(self, endpoint: &str) -> Result<Value> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Status(status) => Err(GithubApiError::status(status, endpoint).into()),
            Reply::Broken => Err(anyhow::anyhow!("connection reset by peer")),
        }
    }

    fn clone_reply(&self) -> Reply {
        match self {
            Reply::Ok(value) => Reply::Ok(value.clone()),
            Reply::Status(status) => Reply::Status(*status),
            Reply::Broken => Reply::Broken,
        }
    }
}

/// Canned GitHub answers; counts every call.
pub struct StubClient {
    user: Reply,
    repos: Reply,
    events: Reply,
    pub user_calls: AtomicUsize,
    pub repo_calls: AtomicUsize,
    pub event_calls: AtomicUsize,
    /// When set, `get_user` waits for a notification before answering.
    gate: Option<Arc<Notify>>,
    pub entered: Arc<Notify>,
}

impl StubClient {
    pub fn new(user: Reply, repos: Reply, events: Reply) -> Self {
        Self {
            user,
            repos,
            events,
            user_calls: AtomicUsize::new(0),
            repo_calls: AtomicUsize::new(0),
            event_calls: AtomicUsize::new(0),
            gate: None,
            entered: Arc::new(Notify::new()),
        }
    }

    pub fn octocat() -> Self {
        Self::new(
            Reply::Ok(user_json("octocat")),
            Reply::Ok(json!([
                repo_json("hello-world", Some("Go"), "2024-05-01T00:00:00Z"),
                repo_json("spoon-knife", Some("Go"), "2024-05-03T00:00:00Z"),
                repo_json("linguist", Some("Rust"), "2024-04-01T00:00:00Z"),
                repo_json("notes", None, "2024-05-02T00:00:00Z"),
            ])),
            Reply::Ok(json!([
                {"created_at": "2024-05-03T10:00:00Z"},
                {"created_at": "2024-05-03T11:00:00Z"},
                {"created_at": "2024-04-20T09:00:00Z"},
            ])),
        )
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.user_calls.load(Ordering::SeqCst),
            self.repo_calls.load(Ordering::SeqCst),
            self.event_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl GithubClient for StubClient {
    async fn get_user(&self, login: &str) -> Result<Value> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            self.entered.notify_one();
            gate.notified().await;
        }
        self.user.clone_reply().into_result(&format!("users/{login}"))
    }

    async fn list_user_repos(&self, login: &str, _per_page: u32) -> Result<Vec<Value>> {
        self.repo_calls.fetch_add(1, Ordering::SeqCst);
        let value = self.repos.clone_reply().into_result(&format!("users/{login}/repos"))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn list_user_events(&self, login: &str, _per_page: u32) -> Result<Vec<Value>> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        let value = self
            .events
            .clone_reply()
            .into_result(&format!("users/{login}/events/public"))?;
        Ok(serde_json::from_value(value)?)
    }
}

pub fn user_json(login: &str) -> Value {
    json!({
        "login": login,
        "name": "The Octocat",
        "avatar_url": format!("https://avatars.githubusercontent.com/{login}"),
        "html_url": format!("https://github.com/{login}"),
        "bio": null,
        "company": "@github",
        "location": "San Francisco",
        "blog": "github.blog",
        "created_at": "2011-01-25T18:44:36Z",
        "followers": 4000,
        "following": 9,
        "public_repos": 8,
        "public_gists": 8
    })
}

pub fn repo_json(name: &str, language: Option<&str>, updated_at: &str) -> Value {
    json!({
        "name": name,
        "html_url": format!("https://github.com/octocat/{name}"),
        "description": null,
        "language": language,
        "stargazers_count": 10,
        "forks_count": 2,
        "updated_at": updated_at
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Loading,
    LoadingDone,
    Error(Banner),
    ErrorHidden,
    Profile(ProfileCard),
    ProfileHidden,
    Chart(ChartRender),
    Repos(Vec<RepoCard>),
    Top,
    Toast(Toast),
}

#[derive(Default)]
pub struct RecordingView {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Toast(toast) => Some(toast.message),
                _ => None,
            })
            .collect()
    }

    pub fn banners(&self) -> Vec<Banner> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(banner) => Some(banner),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl ViewSink for RecordingView {
    fn show_loading(&self) {
        self.push(Event::Loading);
    }

    fn hide_loading(&self) {
        self.push(Event::LoadingDone);
    }

    fn show_error(&self, banner: &Banner) {
        self.push(Event::Error(banner.clone()));
    }

    fn hide_error(&self) {
        self.push(Event::ErrorHidden);
    }

    fn show_profile(&self, card: &ProfileCard) {
        self.push(Event::Profile(card.clone()));
    }

    fn hide_profile(&self) {
        self.push(Event::ProfileHidden);
    }

    fn show_chart(&self, chart: &ChartRender) {
        self.push(Event::Chart(chart.clone()));
    }

    fn show_repositories(&self, cards: &[RepoCard]) {
        self.push(Event::Repos(cards.to_vec()));
    }

    fn scroll_to_top(&self) {
        self.push(Event::Top);
    }

    fn toast(&self, toast: &Toast) {
        self.push(Event::Toast(toast.clone()));
    }
}

pub struct StubProbe(pub AtomicBool);

impl StubProbe {
    pub fn online() -> Self {
        Self(AtomicBool::new(true))
    }

    pub fn offline() -> Self {
        Self(AtomicBool::new(false))
    }
}

#[async_trait]
impl NetworkProbe for StubProbe {
    async fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct StubClipboard {
    pub accept: bool,
    pub copied: Mutex<Vec<String>>,
}

impl StubClipboard {
    pub fn new(accept: bool) -> Self {
        Self {
            accept,
            copied: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Clipboard for StubClipboard {
    async fn write_text(&self, text: &str) -> bool {
        if self.accept {
            self.copied.lock().unwrap().push(text.to_string());
        }
        self.accept
    }
}

pub struct Harness {
    pub viewer: Arc<ProfileViewer>,
    pub client: Arc<StubClient>,
    pub view: Arc<RecordingView>,
    pub clipboard: Arc<StubClipboard>,
    pub backend: Arc<MemoryStore>,
}

pub struct HarnessBuilder {
    client: StubClient,
    probe: StubProbe,
    clipboard: StubClipboard,
    backend: Arc<MemoryStore>,
    config: ViewerConfig,
}

impl HarnessBuilder {
    pub fn new(client: StubClient) -> Self {
        Self {
            client,
            probe: StubProbe::online(),
            clipboard: StubClipboard::new(true),
            backend: Arc::new(MemoryStore::new()),
            config: ViewerConfig::default(),
        }
    }

    pub fn probe(mut self, probe: StubProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn clipboard(mut self, clipboard: StubClipboard) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn backend(mut self, backend: Arc<MemoryStore>) -> Self {
        self.backend = backend;
        self
    }

    pub fn page_url(mut self, url: &str) -> Self {
        self.config.page_url = url.to_string();
        self
    }

    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.config = ViewerConfig {
            page_url: self.config.page_url,
            ..config
        };
        self
    }

    pub fn build(self) -> Harness {
        let client = Arc::new(self.client);
        let view = Arc::new(RecordingView::default());
        let clipboard = Arc::new(self.clipboard);
        let viewer = ProfileViewer::builder(client.clone(), Storage::new(self.backend.clone()))
            .config(self.config)
            .view(view.clone())
            .probe(Arc::new(self.probe))
            .clipboard(clipboard.clone())
            .system_theme(Theme::Light)
            .build()
            .expect("viewer");
        Harness {
            viewer: Arc::new(viewer),
            client,
            view,
            clipboard,
            backend: self.backend,
        }
    }
}

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("ghp-viewer-{}", uuid::Uuid::new_v4().simple()))
}

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use analysis::{recently_updated, ActivityHistogram, LanguageHistogram};
use anyhow::{Context, Result};
use chrono::Utc;
use common::config::ViewerConfig;
use gh_client::{GithubApiError, GithubClient};
use normalizer::{parse_events, parse_repositories, parse_user, RepositorySummary, UserProfile};
use serde_json::Value;
use store::{SearchHistory, Storage, Theme, HISTORY_KEY, THEME_KEY};
use tracing::{debug, info, instrument, warn};

use crate::address::{AddressBar, USERNAME_PARAM};
use crate::charts::{ChartEngine, ChartManager, ChartRender};
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::error::SearchFailure;
use crate::export::ExportDocument;
use crate::metrics;
use crate::network::{AssumeOnline, NetworkProbe};
use crate::suggest::{suggest, SuggestionList};
use crate::view::{ProfileCard, RepoCard, TerminalView, Toast, ViewSink};

const MAX_HISTORY: usize = 10;
const MAX_TOP_LANGUAGES: usize = 8;
const MAX_ACTIVITY_DAYS: usize = 30;
const MAX_REPO_CARDS: usize = 6;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub profile: UserProfile,
    pub card: ProfileCard,
    pub repositories: Vec<RepositorySummary>,
    pub languages: LanguageHistogram,
    pub activity: ActivityHistogram,
    pub language_chart: ChartRender,
    pub activity_chart: ChartRender,
    pub repo_cards: Vec<RepoCard>,
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Rendered(Box<ProfileReport>),
    Failed(SearchFailure),
    /// Another search was still running; nothing happened.
    Suppressed,
    /// Blank input; only a warning toast was shown.
    Rejected,
}

impl SearchOutcome {
    pub fn report(&self) -> Option<&ProfileReport> {
        match self {
            SearchOutcome::Rendered(report) => Some(report.as_ref()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&SearchFailure> {
        match self {
            SearchOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLink {
    pub url: String,
    pub copied: bool,
}

struct ViewerState {
    current_username: Option<String>,
    history: SearchHistory,
    theme: Theme,
    address: AddressBar,
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        metrics::SEARCH_IN_FLIGHT.set(1);
        Some(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        metrics::SEARCH_IN_FLIGHT.set(0);
    }
}

pub struct ProfileViewerBuilder {
    config: ViewerConfig,
    client: Arc<dyn GithubClient>,
    storage: Storage,
    view: Option<Arc<dyn ViewSink>>,
    probe: Option<Arc<dyn NetworkProbe>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    system_theme: Option<Theme>,
}

impl ProfileViewerBuilder {
    pub fn new(client: Arc<dyn GithubClient>, storage: Storage) -> Self {
        Self {
            config: ViewerConfig::default(),
            client,
            storage,
            view: None,
            probe: None,
            clipboard: None,
            system_theme: None,
        }
    }

    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn view(mut self, view: Arc<dyn ViewSink>) -> Self {
        self.view = Some(view);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn NetworkProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn system_theme(mut self, theme: Theme) -> Self {
        self.system_theme = Some(theme);
        self
    }

    pub fn build(mut self) -> Result<ProfileViewer> {
        let config = &mut self.config;
        config.history_limit = config.history_limit.min(MAX_HISTORY);
        config.top_languages = config.top_languages.min(MAX_TOP_LANGUAGES);
        config.activity_days = config.activity_days.min(MAX_ACTIVITY_DAYS);
        config.repo_cards = config.repo_cards.min(MAX_REPO_CARDS);
        config.suggestion_limit = config.suggestion_limit.min(MAX_SUGGESTIONS);

        let address = AddressBar::parse(&self.config.page_url)
            .with_context(|| format!("invalid page url {}", self.config.page_url))?;
        let stored: Vec<String> = self.storage.get_or(HISTORY_KEY, Vec::new());
        let history = SearchHistory::from_entries(stored, self.config.history_limit);
        let theme = Theme::resolve(
            self.storage.get(THEME_KEY),
            self.system_theme.unwrap_or_else(Theme::system_preference),
        );
        let charts = ChartManager::new(theme, self.config.top_languages);
        Ok(ProfileViewer {
            client: self.client,
            storage: self.storage,
            view: self
                .view
                .unwrap_or_else(|| Arc::new(TerminalView::stdout(false))),
            probe: self.probe.unwrap_or_else(|| Arc::new(AssumeOnline)),
            clipboard: self
                .clipboard
                .unwrap_or_else(|| Arc::new(SystemClipboard::new())),
            charts,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(ViewerState {
                current_username: None,
                history,
                theme,
                address,
            }),
            config: self.config,
        })
    }
}

pub struct ProfileViewer {
    config: ViewerConfig,
    client: Arc<dyn GithubClient>,
    storage: Storage,
    view: Arc<dyn ViewSink>,
    probe: Arc<dyn NetworkProbe>,
    clipboard: Arc<dyn Clipboard>,
    charts: ChartManager,
    in_flight: AtomicBool,
    state: Mutex<ViewerState>,
}

impl ProfileViewer {
    pub fn builder(client: Arc<dyn GithubClient>, storage: Storage) -> ProfileViewerBuilder {
        ProfileViewerBuilder::new(client, storage)
    }

    fn state(&self) -> MutexGuard<'_, ViewerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies the theme, makes sure the chart engine is loaded and searches
    /// for the `username` address-bar parameter when one is present.
    pub async fn start(&self) -> Option<SearchOutcome> {
        ChartEngine::init();
        let (theme, pending) = {
            let state = self.state();
            let pending = state
                .address
                .param(USERNAME_PARAM)
                .filter(|u| !u.trim().is_empty());
            (state.theme, pending)
        };
        self.charts.update_theme(theme);
        info!(%theme, history = self.history().len(), "viewer started");
        match pending {
            Some(username) => Some(self.search_user(&username).await),
            None => None,
        }
    }

    pub async fn handle_search(&self, input: &str) -> SearchOutcome {
        let username = input.trim();
        if username.is_empty() {
            self.view.toast(&Toast::warning("请输入用户名"));
            return SearchOutcome::Rejected;
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(username, "search already in flight");
            return SearchOutcome::Suppressed;
        };
        {
            let mut state = self.state();
            state.history.add(username);
            self.storage.set(HISTORY_KEY, &state.history);
            state.address.set_param(USERNAME_PARAM, username);
        }
        self.run_pipeline(username).await
    }

    #[instrument(skip(self))]
    pub async fn search_user(&self, username: &str) -> SearchOutcome {
        let username = username.trim();
        if username.is_empty() {
            self.view.toast(&Toast::warning("请输入用户名"));
            return SearchOutcome::Rejected;
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(username, "search already in flight");
            return SearchOutcome::Suppressed;
        };
        self.run_pipeline(username).await
    }

    pub async fn retry(&self) -> Option<SearchOutcome> {
        let username = self.current_username()?;
        Some(self.search_user(&username).await)
    }

    async fn run_pipeline(&self, username: &str) -> SearchOutcome {
        let timer = metrics::SEARCH_DURATION_SECONDS.start_timer();
        let started = Instant::now();
        self.state().current_username = Some(username.to_string());
        self.view.show_loading();
        self.view.hide_error();
        self.view.hide_profile();

        let result = self.fetch_and_render(username).await;
        self.view.hide_loading();
        timer.observe_duration();

        match result {
            Ok(report) => {
                metrics::SEARCHES_TOTAL.with_label_values(&["success"]).inc();
                info!(
                    username,
                    repos = report.repositories.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "profile rendered"
                );
                self.view.toast(&Toast::success(format!(
                    "成功加载用户 {} 的信息",
                    report.profile.login
                )));
                SearchOutcome::Rendered(Box::new(report))
            }
            Err(failure) => {
                metrics::SEARCHES_TOTAL.with_label_values(&["error"]).inc();
                warn!(username, error = %failure, "profile search failed");
                self.view.show_error(&failure.banner());
                SearchOutcome::Failed(failure)
            }
        }
    }

    async fn fetch_and_render(&self, username: &str) -> Result<ProfileReport, SearchFailure> {
        if !self.probe.is_online().await {
            return Err(SearchFailure::Offline);
        }

        let raw_user = self
            .client
            .get_user(username)
            .await
            .map_err(|err| SearchFailure::classify(&err, username))?;
        let profile = parse_user(raw_user).map_err(|err| SearchFailure::unexpected(&err))?;

        let raw_repos = best_effort(
            "repos",
            self.client
                .list_user_repos(username, self.config.repo_page_size)
                .await,
        )?;
        let repositories =
            parse_repositories(raw_repos).map_err(|err| SearchFailure::unexpected(&err))?;

        let raw_events = best_effort(
            "events",
            self.client
                .list_user_events(username, self.config.event_page_size)
                .await,
        )?;
        let events = parse_events(raw_events).map_err(|err| SearchFailure::unexpected(&err))?;

        let card = ProfileCard::from_profile(&profile);
        self.view.show_profile(&card);

        let languages = LanguageHistogram::from_repositories(&repositories);
        let activity = ActivityHistogram::from_events(&events, self.config.activity_days);
        let language_chart = self.charts.render_languages(&languages);
        let activity_chart = self.charts.render_activity(&activity);
        self.view.show_chart(&language_chart);
        self.view.show_chart(&activity_chart);

        let now = Utc::now();
        let repo_cards: Vec<RepoCard> = recently_updated(&repositories, self.config.repo_cards)
            .into_iter()
            .map(|repo| RepoCard::from_repo(repo, now))
            .collect();
        self.view.show_repositories(&repo_cards);
        self.view.scroll_to_top();

        Ok(ProfileReport {
            profile,
            card,
            repositories,
            languages,
            activity,
            language_chart,
            activity_chart,
            repo_cards,
        })
    }

    pub fn clear_search(&self) {
        self.view.hide_error();
        self.view.hide_profile();
        let mut state = self.state();
        state.current_username = None;
        state.address.remove_param(USERNAME_PARAM);
    }

    pub fn suggestions(&self, query: &str) -> SuggestionList {
        SuggestionList::new(suggest(
            &self.config.popular_users,
            query,
            self.config.suggestion_limit,
        ))
    }

    pub fn history(&self) -> Vec<String> {
        self.state().history.entries().to_vec()
    }

    pub fn clear_history(&self) {
        self.state().history.clear();
        self.storage.remove(HISTORY_KEY);
        self.view.toast(&Toast::success("搜索历史已清空"));
    }

    pub fn theme(&self) -> Theme {
        self.state().theme
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = {
            let mut state = self.state();
            state.theme = state.theme.toggle();
            state.theme
        };
        self.storage.set(THEME_KEY, &theme);
        self.charts.update_theme(theme);
        let label = match theme {
            Theme::Dark => "暗色",
            Theme::Light => "亮色",
        };
        self.view.toast(&Toast::success(format!("已切换到{label}主题")));
        theme
    }

    pub async fn share_profile(&self) -> Option<SharedLink> {
        let url = {
            let state = self.state();
            let username = state.current_username.as_deref()?;
            state.address.share_url(username)
        };
        let copied = self.clipboard.write_text(&url).await;
        if copied {
            self.view.toast(&Toast::success("链接已复制到剪贴板"));
        } else {
            self.view.toast(&Toast::error("复制失败，请手动复制链接"));
        }
        Some(SharedLink { url, copied })
    }

    pub fn export_profile(&self, dir: &Path) -> common::Result<Option<PathBuf>> {
        let document = {
            let state = self.state();
            let Some(username) = state.current_username.as_deref() else {
                return Ok(None);
            };
            ExportDocument::new(username, state.address.share_url(username), Utc::now())
        };
        let path = document.write_to(dir)?;
        self.view.toast(&Toast::success("数据导出成功"));
        Ok(Some(path))
    }

    pub fn notify_connectivity(&self, online: bool) {
        if online {
            self.view.toast(&Toast::success("网络已连接"));
        } else {
            self.view.toast(&Toast::warning("网络已断开"));
        }
    }

    pub fn current_username(&self) -> Option<String> {
        self.state().current_username.clone()
    }

    pub fn address(&self) -> AddressBar {
        self.state().address.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn charts(&self) -> &ChartManager {
        &self.charts
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

/// Status failures degrade to an empty list; anything else aborts.
fn best_effort(
    resource: &'static str,
    result: Result<Vec<Value>>,
) -> Result<Vec<Value>, SearchFailure> {
    match result {
        Ok(items) => Ok(items),
        Err(err) => match GithubApiError::status_of(&err) {
            Some(status) => {
                warn!(resource, %status, "best-effort fetch failed; using empty list");
                Ok(Vec::new())
            }
            None => Err(SearchFailure::unexpected(&err)),
        },
    }
}

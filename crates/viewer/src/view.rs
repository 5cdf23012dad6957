//! Presentation models and the terminal sink that draws them.

use std::io::Write;
use std::sync::Mutex;

use analysis::language_color;
use chrono::{DateTime, Utc};
use common::format::{format_date, format_number, format_relative_time, truncate_text};
use normalizer::{RepositorySummary, UserProfile};
use tracing::warn;

use crate::charts::{ChartLine, ChartRender};
use crate::error::Banner;

const DESCRIPTION_LIMIT: usize = 100;
const NOT_SET: &str = "未设置";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Profile fields with display fallbacks already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub name: String,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub bio: String,
    pub company: String,
    pub location: String,
    /// `None` renders as the "not set" placeholder without a link.
    pub blog: Option<String>,
    pub joined: String,
    pub followers: String,
    pub following: String,
    pub public_repos: String,
    pub public_gists: String,
}

impl ProfileCard {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: or_fallback(profile.name.as_deref(), "未设置姓名"),
            login: format!("@{}", profile.login),
            avatar_url: profile.avatar_url.clone(),
            html_url: profile.html_url.clone(),
            bio: or_fallback(profile.bio.as_deref(), "暂无简介"),
            company: or_fallback(profile.company.as_deref(), NOT_SET),
            location: or_fallback(profile.location.as_deref(), NOT_SET),
            blog: profile.blog.clone(),
            joined: format_date(profile.created_at),
            followers: format_number(profile.followers),
            following: format_number(profile.following),
            public_repos: format_number(profile.public_repos),
            public_gists: format_number(profile.public_gists),
        }
    }

    pub fn blog_label(&self) -> &str {
        self.blog.as_deref().unwrap_or(NOT_SET)
    }
}

fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCard {
    pub name: String,
    pub html_url: String,
    pub description: String,
    pub language: Option<String>,
    pub language_color: Option<&'static str>,
    pub stars: String,
    pub forks: String,
    pub updated: String,
}

impl RepoCard {
    pub fn from_repo(repo: &RepositorySummary, now: DateTime<Utc>) -> Self {
        let description = match repo.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "暂无描述",
        };
        Self {
            name: repo.name.clone(),
            html_url: repo.html_url.clone(),
            description: truncate_text(description, DESCRIPTION_LIMIT),
            language: repo.language.clone(),
            language_color: repo.language.as_deref().map(language_color),
            stars: format_number(repo.stargazers_count),
            forks: format_number(repo.forks_count),
            updated: format!("更新于 {}", format_relative_time(repo.updated_at, now)),
        }
    }
}

/// Where the orchestrator draws. Implementations must tolerate calls in any
/// order (e.g. `hide_profile` before anything was shown).
pub trait ViewSink: Send + Sync {
    fn show_loading(&self);
    fn hide_loading(&self);
    fn show_error(&self, banner: &Banner);
    fn hide_error(&self);
    fn show_profile(&self, card: &ProfileCard);
    fn hide_profile(&self);
    fn show_chart(&self, chart: &ChartRender);
    fn show_repositories(&self, cards: &[RepoCard]);
    fn scroll_to_top(&self);
    fn toast(&self, toast: &Toast);
}

/// Line-oriented rendering onto any writer, optionally with 24-bit colour.
pub struct TerminalView {
    out: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            out: Mutex::new(out),
            color,
        }
    }

    pub fn stdout(color: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), color)
    }

    fn paint(&self, text: &str, hex: Option<&str>) -> String {
        match hex.and_then(parse_hex).filter(|_| self.color) {
            Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
            None => text.to_string(),
        }
    }

    fn emit(&self, lines: &[String]) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        for line in lines {
            if let Err(err) = writeln!(out, "{line}") {
                warn!(error = %err, "terminal write failed");
                return;
            }
        }
        if let Err(err) = out.flush() {
            warn!(error = %err, "terminal flush failed");
        }
    }

    fn chart_line(&self, line: &ChartLine) -> String {
        format!("  {}", self.paint(&line.text, line.color.as_deref()))
    }
}

impl ViewSink for TerminalView {
    fn show_loading(&self) {
        self.emit(&["加载中...".to_string()]);
    }

    fn hide_loading(&self) {}

    fn show_error(&self, banner: &Banner) {
        self.emit(&[
            self.paint(&format!("✖ {}", banner.title), Some("#cf222e")),
            format!("  {}", banner.message),
        ]);
    }

    fn hide_error(&self) {}

    fn show_profile(&self, card: &ProfileCard) {
        self.emit(&[
            String::new(),
            format!("{} {}", self.paint(&card.name, Some("#1f6feb")), card.login),
            format!("  {}", card.bio),
            format!(
                "  关注者 {}  关注 {}  仓库 {}  Gists {}",
                card.followers, card.following, card.public_repos, card.public_gists
            ),
            format!("  公司 {}  位置 {}", card.company, card.location),
            format!("  博客 {}", card.blog_label()),
            format!("  加入于 {}", card.joined),
            format!("  {}", card.html_url),
        ]);
    }

    fn hide_profile(&self) {}

    fn show_chart(&self, chart: &ChartRender) {
        let kind = chart.kind();
        let mut lines = vec![String::new(), kind.title().to_string()];
        match chart {
            ChartRender::Placeholder(_) => lines.push("  暂无数据".to_string()),
            ChartRender::Rendered(instance) => {
                lines.extend(instance.lines.iter().map(|l| self.chart_line(l)))
            }
        }
        self.emit(&lines);
    }

    fn show_repositories(&self, cards: &[RepoCard]) {
        let mut lines = vec![String::new(), "最近更新的仓库".to_string()];
        if cards.is_empty() {
            lines.push("  该用户暂无公开仓库".to_string());
        }
        for card in cards {
            lines.push(format!("  {}", self.paint(&card.name, Some("#0969da"))));
            lines.push(format!("    {}", card.description));
            let language = match (&card.language, card.language_color) {
                (Some(name), color) => format!("{} ", self.paint(&format!("● {name}"), color)),
                (None, _) => String::new(),
            };
            lines.push(format!(
                "    {language}★ {}  ⑂ {}  {}",
                card.stars, card.forks, card.updated
            ));
        }
        self.emit(&lines);
    }

    fn scroll_to_top(&self) {}

    fn toast(&self, toast: &Toast) {
        let (icon, color) = match toast.kind {
            ToastKind::Success => ("✔", "#2ea44f"),
            ToastKind::Error => ("✖", "#cf222e"),
            ToastKind::Warning => ("!", "#d4a72c"),
            ToastKind::Info => ("i", "#1f6feb"),
        };
        self.emit(&[self.paint(&format!("{icon} {}", toast.message), Some(color))]);
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn profile() -> UserProfile {
        UserProfile {
            login: "octocat".into(),
            name: None,
            avatar_url: "https://avatars/octocat".into(),
            html_url: "https://github.com/octocat".into(),
            bio: Some(String::new()),
            company: Some("GitHub".into()),
            location: None,
            blog: None,
            created_at: Utc.with_ymd_and_hms(2011, 1, 25, 12, 0, 0).unwrap(),
            followers: 12_345,
            following: 9,
            public_repos: 8,
            public_gists: 1_200_000,
        }
    }

    #[test]
    fn profile_card_applies_fallbacks() {
        let card = ProfileCard::from_profile(&profile());
        assert_eq!(card.name, "未设置姓名");
        assert_eq!(card.login, "@octocat");
        assert_eq!(card.bio, "暂无简介");
        assert_eq!(card.company, "GitHub");
        assert_eq!(card.location, "未设置");
        assert_eq!(card.blog_label(), "未设置");
        assert_eq!(card.followers, "12.3K");
        assert_eq!(card.public_gists, "1.2M");
    }

    #[test]
    fn repo_card_truncates_and_colours() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let repo = RepositorySummary {
            name: "hello".into(),
            html_url: "https://github.com/octocat/hello".into(),
            description: Some("x".repeat(120)),
            language: Some("Rust".into()),
            stargazers_count: 1500,
            forks_count: 3,
            updated_at: now - Duration::hours(2),
        };
        let card = RepoCard::from_repo(&repo, now);
        assert_eq!(card.description.chars().count(), 103);
        assert_eq!(card.language_color, Some("#dea584"));
        assert_eq!(card.stars, "1.5K");
        assert_eq!(card.updated, "更新于 2小时前");

        let bare = RepositorySummary {
            description: None,
            language: None,
            ..repo
        };
        let card = RepoCard::from_repo(&bare, now);
        assert_eq!(card.description, "暂无描述");
        assert_eq!(card.language_color, None);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("#2ea44f"), Some((0x2e, 0xa4, 0x4f)));
        assert_eq!(parse_hex("#ccc"), Some((0xcc, 0xcc, 0xcc)));
        assert_eq!(parse_hex("red"), None);
    }

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_repository_list_prints_placeholder() {
        let buf = Shared::default();
        let view = TerminalView::new(Box::new(buf.clone()), false);
        view.show_repositories(&[]);
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("该用户暂无公开仓库"));
        assert!(!text.contains('\x1b'));
    }
}

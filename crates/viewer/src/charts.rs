//! Text chart rendering for the language and activity panels.
//!
//! The chart engine (glyphs and global style defaults) is loaded once per
//! process. A [`ChartManager`] owns one slot per chart; every render disposes
//! whatever the slot held before drawing into it again.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use analysis::{ActivityHistogram, LanguageHistogram};
use common::format::deep_merge;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::json;
use store::Theme;
use tracing::{debug, info, warn};

static ENGINE: OnceCell<ChartEngine> = OnceCell::new();
static LOADING: AtomicBool = AtomicBool::new(false);
static LOADS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub bar_width: usize,
    pub bar_full: char,
    pub bar_empty: char,
    pub sparkline: Vec<char>,
    pub text_color: String,
    pub grid_color: String,
    pub line_color: String,
}

impl ChartStyle {
    pub fn merged(&self, overrides: &serde_json::Value) -> Self {
        let base = match serde_json::to_value(self) {
            Ok(base) => base,
            Err(err) => {
                warn!(error = %err, "chart style is not serializable; keeping it");
                return self.clone();
            }
        };
        match serde_json::from_value(deep_merge(&base, overrides)) {
            Ok(style) => style,
            Err(err) => {
                warn!(error = %err, "ignoring invalid chart style overrides");
                self.clone()
            }
        }
    }

    pub fn for_theme(&self, theme: Theme) -> Self {
        let overrides = match theme {
            Theme::Dark => json!({"text_color": "#e6edf3", "grid_color": "#30363d"}),
            Theme::Light => json!({"text_color": "#24292e", "grid_color": "#e1e4e8"}),
        };
        self.merged(&overrides)
    }
}

pub struct ChartEngine {
    defaults: ChartStyle,
}

impl ChartEngine {
    fn load() -> Self {
        LOADS.fetch_add(1, Ordering::SeqCst);
        info!("chart engine loaded");
        Self {
            defaults: ChartStyle {
                bar_width: 24,
                bar_full: '█',
                bar_empty: '░',
                sparkline: vec!['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'],
                text_color: "#586069".to_string(),
                grid_color: "#e1e4e8".to_string(),
                line_color: "#2ea44f".to_string(),
            },
        }
    }

    pub fn init() -> &'static ChartEngine {
        ENGINE.get_or_init(|| {
            LOADING.store(true, Ordering::SeqCst);
            let engine = ChartEngine::load();
            LOADING.store(false, Ordering::SeqCst);
            engine
        })
    }

    pub fn state() -> EngineState {
        if ENGINE.get().is_some() {
            EngineState::Ready
        } else if LOADING.load(Ordering::SeqCst) {
            EngineState::Loading
        } else {
            EngineState::Uninitialized
        }
    }

    /// How many times the engine has been loaded in this process.
    pub fn loads() -> usize {
        LOADS.load(Ordering::SeqCst)
    }

    pub fn defaults(&self) -> &ChartStyle {
        &self.defaults
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Language,
    Activity,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Language => "语言分布",
            ChartKind::Activity => "最近活动",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLine {
    pub text: String,
    pub color: Option<String>,
}

impl ChartLine {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    fn colored(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Some(color.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartInstance {
    pub id: u64,
    pub kind: ChartKind,
    pub lines: Vec<ChartLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRender {
    Placeholder(ChartKind),
    Rendered(ChartInstance),
}

impl ChartRender {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartRender::Placeholder(kind) => *kind,
            ChartRender::Rendered(instance) => instance.kind,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ChartRender::Placeholder(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Absent,
    Rendered(u64),
    Destroyed,
}

#[derive(Debug)]
enum Slot {
    Absent,
    Rendered(ChartInstance),
    Destroyed,
}

impl Slot {
    fn state(&self) -> SlotState {
        match self {
            Slot::Absent => SlotState::Absent,
            Slot::Rendered(instance) => SlotState::Rendered(instance.id),
            Slot::Destroyed => SlotState::Destroyed,
        }
    }

    fn destroy(&mut self) {
        if let Slot::Rendered(instance) = self {
            debug!(id = instance.id, kind = ?instance.kind, "disposing chart");
            *self = Slot::Destroyed;
        }
    }
}

struct Slots {
    language: Slot,
    activity: Slot,
}

impl Slots {
    fn get_mut(&mut self, kind: ChartKind) -> &mut Slot {
        match kind {
            ChartKind::Language => &mut self.language,
            ChartKind::Activity => &mut self.activity,
        }
    }
}

pub struct ChartManager {
    style: Mutex<ChartStyle>,
    slots: Mutex<Slots>,
    next_id: AtomicU64,
    top_languages: usize,
}

impl ChartManager {
    pub fn new(theme: Theme, top_languages: usize) -> Self {
        let engine = ChartEngine::init();
        Self {
            style: Mutex::new(engine.defaults().for_theme(theme)),
            slots: Mutex::new(Slots {
                language: Slot::Absent,
                activity: Slot::Absent,
            }),
            next_id: AtomicU64::new(1),
            top_languages,
        }
    }

    pub fn update_theme(&self, theme: Theme) {
        let mut style = self.style.lock().unwrap_or_else(|e| e.into_inner());
        *style = style.for_theme(theme);
    }

    pub fn style(&self) -> ChartStyle {
        self.style.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn slot_state(&self, kind: ChartKind) -> SlotState {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get_mut(kind).state()
    }

    pub fn render_languages(&self, histogram: &LanguageHistogram) -> ChartRender {
        let slices = histogram.top(self.top_languages);
        let style = self.style();
        self.render_into(ChartKind::Language, || {
            if slices.is_empty() {
                return None;
            }
            let name_width = slices
                .iter()
                .map(|s| s.name.chars().count())
                .max()
                .unwrap_or(0);
            let lines = slices
                .iter()
                .map(|slice| {
                    let filled = ((slice.share / 100.0) * style.bar_width as f64).round() as usize;
                    let meter = bar(&style, filled.max(1));
                    let text = format!(
                        "● {:<width$} {} {} 个仓库 ({:.1}%)",
                        slice.name,
                        meter,
                        slice.repos,
                        slice.share,
                        width = name_width
                    );
                    ChartLine::colored(text, slice.color.clone())
                })
                .collect();
            Some(lines)
        })
    }

    pub fn render_activity(&self, histogram: &ActivityHistogram) -> ChartRender {
        let style = self.style();
        self.render_into(ChartKind::Activity, || {
            let buckets = histogram.buckets();
            let (first, last) = (buckets.first()?, buckets.last()?);
            let peak = histogram.peak()?;
            let levels = style.sparkline.len().max(1);
            let spark: String = buckets
                .iter()
                .map(|b| {
                    let idx = (b.count as usize * (levels - 1)) / peak.count.max(1) as usize;
                    style.sparkline.get(idx).copied().unwrap_or(style.bar_full)
                })
                .collect();
            Some(vec![
                ChartLine::colored(spark, style.line_color.clone()),
                ChartLine::plain(format!("{} → {}", first.label(), last.label())),
                ChartLine::plain(format!("峰值 {} ({} 次)", peak.label(), peak.count)),
                ChartLine::plain(format!(
                    "{} 天内共 {} 次活动",
                    histogram.len(),
                    histogram.total()
                )),
            ])
        })
    }

    pub fn destroy_all(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.language.destroy();
        slots.activity.destroy();
    }

    fn render_into<F>(&self, kind: ChartKind, draw: F) -> ChartRender
    where
        F: FnOnce() -> Option<Vec<ChartLine>>,
    {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.get_mut(kind);
        slot.destroy();
        match draw() {
            None => ChartRender::Placeholder(kind),
            Some(lines) => {
                let instance = ChartInstance {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    kind,
                    lines,
                };
                *slot = Slot::Rendered(instance.clone());
                ChartRender::Rendered(instance)
            }
        }
    }
}

fn bar(style: &ChartStyle, filled: usize) -> String {
    let filled = filled.min(style.bar_width);
    let mut out = String::with_capacity(style.bar_width * 3);
    out.extend(std::iter::repeat(style.bar_full).take(filled));
    out.extend(std::iter::repeat(style.bar_empty).take(style.bar_width - filled));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use normalizer::{ActivityEvent, RepositorySummary};

    fn repo(language: &str) -> RepositorySummary {
        RepositorySummary {
            name: "r".into(),
            html_url: String::new(),
            description: None,
            language: Some(language.into()),
            stargazers_count: 0,
            forks_count: 0,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn engine_loads_once() {
        ChartEngine::init();
        let loads = ChartEngine::loads();
        ChartEngine::init();
        let _manager = ChartManager::new(Theme::Light, 8);
        assert_eq!(ChartEngine::state(), EngineState::Ready);
        assert_eq!(ChartEngine::loads(), loads);
        assert_eq!(loads, 1);
    }

    #[test]
    fn slot_cycles_through_destroy_and_render() {
        let manager = ChartManager::new(Theme::Light, 8);
        assert_eq!(manager.slot_state(ChartKind::Language), SlotState::Absent);

        let histogram = LanguageHistogram::from_repositories(&[repo("Go"), repo("Go"), repo("Rust")]);
        let first = match manager.render_languages(&histogram) {
            ChartRender::Rendered(instance) => instance.id,
            other => panic!("expected chart, got {other:?}"),
        };
        assert_eq!(manager.slot_state(ChartKind::Language), SlotState::Rendered(first));

        let second = match manager.render_languages(&histogram) {
            ChartRender::Rendered(instance) => instance.id,
            other => panic!("expected chart, got {other:?}"),
        };
        assert_ne!(first, second);

        let empty = manager.render_languages(&LanguageHistogram::default());
        assert!(empty.is_placeholder());
        assert_eq!(manager.slot_state(ChartKind::Language), SlotState::Destroyed);

        manager.destroy_all();
        manager.destroy_all();
        assert_eq!(manager.slot_state(ChartKind::Activity), SlotState::Absent);
    }

    #[test]
    fn language_lines_follow_ranking() {
        let manager = ChartManager::new(Theme::Light, 8);
        let histogram = LanguageHistogram::from_repositories(&[repo("Rust"), repo("Go"), repo("Go")]);
        let ChartRender::Rendered(instance) = manager.render_languages(&histogram) else {
            panic!("expected chart");
        };
        assert_eq!(instance.lines.len(), 2);
        assert!(instance.lines[0].text.contains("Go"));
        assert!(instance.lines[0].text.contains("2 个仓库 (66.7%)"));
        assert_eq!(instance.lines[0].color.as_deref(), Some("#2ea44f"));
        assert!(instance.lines[1].text.contains("Rust"));
    }

    #[test]
    fn activity_sparkline_has_one_glyph_per_day() {
        let manager = ChartManager::new(Theme::Dark, 8);
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let events: Vec<_> = [0, 0, 0, 1, 3]
            .iter()
            .map(|d| ActivityEvent {
                created_at: start + Duration::days(*d),
            })
            .collect();
        let histogram = ActivityHistogram::from_events_in(&events, &Utc, 30);
        let ChartRender::Rendered(instance) = manager.render_activity(&histogram) else {
            panic!("expected chart");
        };
        assert_eq!(instance.lines[0].text.chars().count(), 3);
        assert!(instance.lines[0].text.ends_with('▃'));
        assert!(instance.lines[0].text.starts_with('█'));
        assert_eq!(instance.lines[1].text, "2024/2/1 → 2024/2/4");
        assert!(manager
            .render_activity(&ActivityHistogram::default())
            .is_placeholder());
    }

    #[test]
    fn theme_switch_changes_text_color_only() {
        let manager = ChartManager::new(Theme::Light, 8);
        let light = manager.style();
        manager.update_theme(Theme::Dark);
        let dark = manager.style();
        assert_eq!(dark.text_color, "#e6edf3");
        assert_eq!(dark.grid_color, "#30363d");
        assert_eq!(dark.bar_width, light.bar_width);
        assert_eq!(dark.sparkline, light.sparkline);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let style = ChartEngine::init().defaults().clone();
        assert_eq!(style.merged(&json!({"bar_width": "wide"})), style);
        assert_eq!(style.merged(&json!({"bar_width": 10})).bar_width, 10);
    }
}

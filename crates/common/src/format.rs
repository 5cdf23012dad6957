use std::collections::HashSet;
use std::hash::Hash;

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde_json::Value;

/// Chart palette; indices past its end get random colours.
pub const PALETTE: [&str; 15] = [
    "#2ea44f", "#1f6feb", "#d4a72c", "#cf222e", "#8250df", "#0969da", "#bc4c00", "#7d4533",
    "#008641", "#a47551", "#6e40aa", "#00a4a6", "#b15c00", "#b93a86", "#57ab5a",
];

/// Compact count: `1234` -> `1.2K`, `2_500_000` -> `2.5M`.
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1000 {
        format!("{:.1}K", num as f64 / 1000.0)
    } else {
        num.to_string()
    }
}

/// Long calendar date in the viewer's local timezone, e.g. `2020年1月5日`.
pub fn format_date(ts: DateTime<Utc>) -> String {
    format_date_in(ts, &Local)
}

pub fn format_date_in<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String {
    let local = ts.with_timezone(tz);
    format!("{}年{}月{}日", local.year(), local.month(), local.day())
}

pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - ts).num_seconds();
    if diff < 60 {
        "刚刚".to_string()
    } else if diff < 3600 {
        format!("{}分钟前", diff / 60)
    } else if diff < 86_400 {
        format!("{}小时前", diff / 3600)
    } else if diff < 2_592_000 {
        format!("{}天前", diff / 86_400)
    } else {
        format_date(ts)
    }
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

pub fn generate_colors(count: usize) -> Vec<String> {
    let mut colors: Vec<String> = PALETTE
        .iter()
        .take(count)
        .map(|c| (*c).to_string())
        .collect();
    while colors.len() < count {
        colors.push(random_color());
    }
    colors
}

pub fn random_color() -> String {
    format!("#{:06x}", fastrand::u32(0..=0xff_ffff))
}

/// Order-preserving de-duplication; the first occurrence wins.
pub fn unique<T: Clone + Eq + Hash>(items: &[T]) -> Vec<T> {
    unique_by_key(items, |item| item.clone())
}

pub fn unique_by_key<T, K, F>(items: &[T], mut key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(key(*item)))
        .cloned()
        .collect()
}

/// Recursively merges `source` into a copy of `target`. Nested objects merge,
/// everything else (arrays included) is replaced by the source value.
pub fn deep_merge(target: &Value, source: &Value) -> Value {
    match (target, source) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                let next = match (merged.get(key), value) {
                    (Some(existing), Value::Object(_)) => deep_merge(existing, value),
                    _ => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

use std::collections::HashMap;

use common::format::generate_colors;
use normalizer::RepositorySummary;
use serde::Serialize;

/// Repository count per primary language, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageHistogram {
    entries: Vec<(String, u32)>,
}

/// One displayed segment of the language chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageSlice {
    pub name: String,
    pub repos: u32,
    /// Percentage of the displayed total.
    pub share: f64,
    pub color: String,
}

impl LanguageHistogram {
    /// Repositories without a language are skipped.
    pub fn from_repositories(repos: &[RepositorySummary]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<(String, u32)> = Vec::new();
        for language in repos.iter().filter_map(|r| r.language.as_deref()) {
            match index.get(language) {
                Some(&pos) => entries[pos].1 += 1,
                None => {
                    index.insert(language, entries.len());
                    entries.push((language.to_string(), 1));
                }
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }

    pub fn count(&self, language: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(name, _)| name == language)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descending by count; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut ranked: Vec<(&str, u32)> = self
            .entries
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn top(&self, limit: usize) -> Vec<LanguageSlice> {
        let ranked: Vec<(&str, u32)> = self.ranked().into_iter().take(limit).collect();
        let total: u32 = ranked.iter().map(|(_, count)| count).sum();
        let colors = generate_colors(ranked.len());
        ranked
            .into_iter()
            .zip(colors)
            .map(|((name, repos), color)| LanguageSlice {
                name: name.to_string(),
                repos,
                share: if total == 0 {
                    0.0
                } else {
                    f64::from(repos) * 100.0 / f64::from(total)
                },
                color,
            })
            .collect()
    }
}

/// GitHub's colour for well-known languages, `#ccc` otherwise.
pub fn language_color(language: &str) -> &'static str {
    match language {
        "JavaScript" => "#f1e05a",
        "Python" => "#3572A5",
        "Java" => "#b07219",
        "TypeScript" => "#2b7489",
        "C++" => "#f34b7d",
        "C#" => "#178600",
        "PHP" => "#4F5D95",
        "Ruby" => "#701516",
        "Go" => "#00ADD8",
        "Swift" => "#ffac45",
        "Kotlin" => "#F18E33",
        "Rust" => "#dea584",
        "Dart" => "#00B4AB",
        "Vue" => "#41b883",
        "React" => "#61dafb",
        _ => "#ccc",
    }
}

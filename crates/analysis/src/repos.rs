use normalizer::RepositorySummary;

/// The `limit` most recently updated repositories, newest first.
pub fn recently_updated(repos: &[RepositorySummary], limit: usize) -> Vec<&RepositorySummary> {
    let mut sorted: Vec<&RepositorySummary> = repos.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn newest_first_and_truncated() {
        let base = Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap();
        let repos: Vec<_> = [3, 9, 1, 7, 5, 8, 2, 6]
            .iter()
            .map(|d| RepositorySummary {
                name: format!("repo-{d}"),
                html_url: String::new(),
                description: None,
                language: None,
                stargazers_count: 0,
                forks_count: 0,
                updated_at: base + Duration::days(*d),
            })
            .collect();
        let names: Vec<_> = recently_updated(&repos, 6)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["repo-9", "repo-8", "repo-7", "repo-6", "repo-5", "repo-3"]
        );
    }
}

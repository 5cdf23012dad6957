use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::models::{ActivityEvent, RepositorySummary, UserProfile};
use crate::payloads::{EventPayload, RepoPayload, UserPayload};

pub fn parse_user(raw: Value) -> Result<UserProfile> {
    let payload: UserPayload = serde_json::from_value(raw).context("decoding user payload")?;
    Ok(normalize_user(payload))
}

pub fn parse_repositories(raw: Vec<Value>) -> Result<Vec<RepositorySummary>> {
    let repos = raw
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            serde_json::from_value::<RepoPayload>(value)
                .with_context(|| format!("decoding repository payload #{idx}"))
                .map(normalize_repo)
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(count = repos.len(), "normalized repositories");
    Ok(repos)
}

pub fn parse_events(raw: Vec<Value>) -> Result<Vec<ActivityEvent>> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, value)| {
            serde_json::from_value::<EventPayload>(value)
                .with_context(|| format!("decoding event payload #{idx}"))
                .map(|payload| ActivityEvent {
                    created_at: payload.created_at,
                })
        })
        .collect()
}

fn normalize_user(payload: UserPayload) -> UserProfile {
    UserProfile {
        blog: payload.blog.as_deref().and_then(normalize_blog_url),
        login: payload.login,
        name: non_empty(payload.name),
        avatar_url: payload.avatar_url,
        html_url: payload.html_url,
        bio: non_empty(payload.bio),
        company: non_empty(payload.company),
        location: non_empty(payload.location),
        created_at: payload.created_at,
        followers: payload.followers,
        following: payload.following,
        public_repos: payload.public_repos,
        public_gists: payload.public_gists,
    }
}

fn normalize_repo(payload: RepoPayload) -> RepositorySummary {
    RepositorySummary {
        name: payload.name,
        html_url: payload.html_url,
        description: non_empty(payload.description),
        language: non_empty(payload.language),
        stargazers_count: payload.stargazers_count,
        forks_count: payload.forks_count,
        updated_at: payload.updated_at,
    }
}

/// GitHub returns `""` for an unset blog; bare hosts get an `https://` prefix.
pub fn normalize_blog_url(blog: &str) -> Option<String> {
    let blog = blog.trim();
    if blog.is_empty() {
        None
    } else if blog.starts_with("http") {
        Some(blog.to_string())
    } else {
        Some(format!("https://{blog}"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

use http::StatusCode;
use thiserror::Error;

use gh_client::GithubApiError;

/// Why a profile search ended without a rendered profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchFailure {
    #[error("network reported unavailable")]
    Offline,
    #[error("user {username} not found")]
    NotFound { username: String },
    #[error("rate limited by the api")]
    RateLimited,
    #[error("authentication rejected")]
    Unauthorized,
    #[error("request failed with status {status}")]
    Status { status: u16 },
    #[error("network failure: {reason}")]
    Network { reason: String },
}

/// Title and body of the dismissible error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: String,
    pub message: String,
}

impl SearchFailure {
    pub fn from_status(status: StatusCode, username: &str) -> Self {
        match status {
            StatusCode::NOT_FOUND => SearchFailure::NotFound {
                username: username.to_string(),
            },
            StatusCode::FORBIDDEN => SearchFailure::RateLimited,
            StatusCode::UNAUTHORIZED => SearchFailure::Unauthorized,
            other => SearchFailure::Status {
                status: other.as_u16(),
            },
        }
    }

    /// Status errors map by code; anything else is a generic network failure.
    pub fn classify(err: &anyhow::Error, username: &str) -> Self {
        match GithubApiError::status_of(err) {
            Some(status) => Self::from_status(status, username),
            None => Self::unexpected(err),
        }
    }

    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        SearchFailure::Network {
            reason: format!("{err:#}"),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SearchFailure::Offline | SearchFailure::Network { .. } => "网络错误",
            SearchFailure::NotFound { .. } => "用户不存在",
            SearchFailure::RateLimited => "请求限制",
            SearchFailure::Unauthorized => "认证失败",
            SearchFailure::Status { .. } => "请求失败",
        }
    }

    pub fn message(&self) -> String {
        match self {
            SearchFailure::Offline => "网络连接已断开，请检查网络设置".to_string(),
            SearchFailure::NotFound { username } => {
                format!("找不到用户 \"{username}\"，请检查用户名是否正确")
            }
            SearchFailure::RateLimited => "API请求过于频繁，请稍后再试".to_string(),
            SearchFailure::Unauthorized => "访问被拒绝，请检查API令牌".to_string(),
            SearchFailure::Status { status: 500 } => "HTTP 500: 服务器内部错误".to_string(),
            SearchFailure::Status { status } => format!("HTTP {status}: 请求失败"),
            SearchFailure::Network { .. } => "网络请求失败，请稍后重试".to_string(),
        }
    }

    pub fn banner(&self) -> Banner {
        Banner {
            title: self.title().to_string(),
            message: self.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_titles() {
        let cases = [
            (StatusCode::NOT_FOUND, "用户不存在"),
            (StatusCode::FORBIDDEN, "请求限制"),
            (StatusCode::UNAUTHORIZED, "认证失败"),
            (StatusCode::BAD_GATEWAY, "请求失败"),
        ];
        for (status, title) in cases {
            assert_eq!(SearchFailure::from_status(status, "x").title(), title);
        }
    }

    #[test]
    fn not_found_message_names_the_user() {
        let banner = SearchFailure::from_status(StatusCode::NOT_FOUND, "doesnotexist123").banner();
        assert_eq!(banner.title, "用户不存在");
        assert!(banner.message.contains("\"doesnotexist123\""));
    }

    #[test]
    fn server_error_has_its_own_wording() {
        let failure = SearchFailure::from_status(StatusCode::INTERNAL_SERVER_ERROR, "x");
        assert_eq!(failure.message(), "HTTP 500: 服务器内部错误");
        let failure = SearchFailure::from_status(StatusCode::BAD_GATEWAY, "x");
        assert_eq!(failure.message(), "HTTP 502: 请求失败");
    }

    #[test]
    fn non_status_errors_are_network_failures() {
        let err = anyhow::anyhow!("connection reset");
        let failure = SearchFailure::classify(&err, "x");
        assert_eq!(failure.title(), "网络错误");
        assert!(matches!(failure, SearchFailure::Network { .. }));

        let err: anyhow::Error = GithubApiError::status(StatusCode::FORBIDDEN, "users/x").into();
        assert_eq!(SearchFailure::classify(&err, "x"), SearchFailure::RateLimited);
    }
}

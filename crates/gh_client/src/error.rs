use http::StatusCode;
use thiserror::Error;

/// A non-success status returned by the GitHub REST API.
#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("github api error: {status} for {endpoint}")]
    Http {
        status: StatusCode,
        endpoint: String,
    },
}

impl GithubApiError {
    pub fn status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match *self {
            GithubApiError::Http { status, .. } => status,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            GithubApiError::Http { endpoint, .. } => endpoint.as_str(),
        }
    }

    /// Extracts the status code when `err` wraps a [`GithubApiError`].
    pub fn status_of(err: &anyhow::Error) -> Option<StatusCode> {
        err.downcast_ref::<GithubApiError>()
            .map(GithubApiError::status_code)
    }
}

pub mod models;
pub mod payloads;
pub mod transform;

pub use models::{ActivityEvent, RepositorySummary, UserProfile};
pub use payloads::{EventPayload, RepoPayload, UserPayload};
pub use transform::{normalize_blog_url, parse_events, parse_repositories, parse_user};

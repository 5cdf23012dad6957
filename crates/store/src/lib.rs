pub mod backend;
pub mod errors;
pub mod history;
pub mod storage;
pub mod theme;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use errors::StoreError;
pub use history::SearchHistory;
pub use storage::{Storage, HISTORY_KEY, THEME_KEY};
pub use theme::Theme;

pub mod activity;
pub mod languages;
pub mod repos;

pub use activity::{ActivityBucket, ActivityHistogram};
pub use languages::{language_color, LanguageHistogram, LanguageSlice};
pub use repos::recently_updated;

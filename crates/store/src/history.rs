use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 10;

/// Recently searched usernames, most recent first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    entries: Vec<String>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SearchHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Rebuilds a history from stored entries, dropping duplicates and
    /// anything past `capacity`.
    pub fn from_entries(entries: Vec<String>, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        for entry in entries {
            if history.entries.len() == capacity {
                break;
            }
            if !history.entries.contains(&entry) {
                history.entries.push(entry);
            }
        }
        history
    }

    /// Moves `username` to the front, inserting it if absent.
    pub fn add(&mut self, username: &str) {
        self.entries.retain(|existing| existing != username);
        self.entries.insert(0, username.to_string());
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

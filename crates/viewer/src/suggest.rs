pub const MIN_QUERY_CHARS: usize = 2;

/// Case-insensitive substring matches from `seed`, in seed order.
pub fn suggest(seed: &[String], query: &str, limit: usize) -> Vec<String> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    seed.iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// The open dropdown and its keyboard cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList {
    items: Vec<String>,
    selected: Option<usize>,
}

impl SuggestionList {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            selected: None,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }

    /// Moves the cursor, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match (direction, self.selected) {
            (Direction::Down, None) => 0,
            (Direction::Down, Some(i)) => (i + 1) % len,
            (Direction::Up, None) | (Direction::Up, Some(0)) => len - 1,
            (Direction::Up, Some(i)) => i - 1,
        });
    }

    /// Takes the selected entry and closes the list.
    pub fn commit(&mut self) -> Option<String> {
        let chosen = self.selected().map(str::to_string);
        if chosen.is_some() {
            self.items.clear();
            self.selected = None;
        }
        chosen
    }
}

use serde::{Deserialize, Serialize};

/// Result of a fetch-all: the items plus the total count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResult<T> {
    /// Build a list result from a complete item set.
    pub fn of(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }

    /// An empty result.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T> IntoIterator for ListResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

//! Label set record.

use crate::model::ItemId;
use serde::{Deserialize, Serialize};

/// Ordered free-text labels attached to one item.
///
/// Order is append order and is user-visible: index-based removal refers to
/// 1-based positions in `labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    /// Item this set belongs to.
    pub item: ItemId,
    /// Labels in append order. Duplicates are allowed.
    pub labels: Vec<String>,
}

impl LabelSet {
    /// Creates an empty label set for `item`.
    pub fn empty(item: ItemId) -> Self {
        Self {
            item,
            labels: Vec::new(),
        }
    }

    /// Largest valid 1-based index, `0` when empty.
    pub fn max_index(&self) -> usize {
        self.labels.len()
    }

    /// Returns whether any label contains `needle` (case-sensitive).
    pub fn any_contains(&self, needle: &str) -> bool {
        self.labels.iter().any(|label| label.contains(needle))
    }
}

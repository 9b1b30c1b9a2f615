//! Label store service.
//!
//! # Responsibility
//! - Maintain exactly one ordered label list per item.
//! - Provide append, index/content removal and substring search.
//!
//! # Invariants
//! - Every operation first checks that at most one label set exists for the
//!   item; more than one is reported as `InvariantViolation`.
//! - Index-based removal uses 1-based positions in append order.
//! - Mutations are read-then-write and are not serialized across callers.

use crate::model::label::LabelSet;
use crate::model::ItemId;
use crate::repo::label_repo::LabelRepository;
use crate::repo::RepoError;
use crate::service::ErrorKind;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static LABEL_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\+?([0-9]+)\s*$").expect("valid label index regex"));

/// Errors from label store operations.
#[derive(Debug)]
pub enum LabelServiceError {
    /// More than one label set is stored for the item.
    InvariantViolation { item: ItemId, count: usize },
    /// The item has no label set.
    NotLabelled(ItemId),
    /// The item already has a label set; initialization is one-shot.
    NotAllowed(ItemId),
    /// Index text is not a positive integer within `1..=max_index`.
    IndexError {
        item: ItemId,
        max_index: usize,
        input: String,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl LabelServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotLabelled(_) => ErrorKind::NotFound,
            Self::IndexError { .. } => ErrorKind::BadInput,
            Self::NotAllowed(_) => ErrorKind::NotAllowed,
            Self::InvariantViolation { .. } | Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for LabelServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvariantViolation { item, count } => write!(
                f,
                "label set invariant broken: {count} label sets stored for item {item}"
            ),
            Self::NotLabelled(item) => write!(f, "item {item} has no labels yet"),
            Self::NotAllowed(item) => {
                write!(f, "item {item} already has a label set; refusing to initialize")
            }
            Self::IndexError {
                max_index, input, ..
            } => write!(
                f,
                "select a positive integer no larger than {max_index}; got `{input}`"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LabelServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LabelServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of a successful label mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelChange {
    /// The item had no label set; one was created holding `label`.
    First { label: String },
    /// `label` was appended at 1-based `position`.
    Appended { position: usize, label: String },
    /// The label at 1-based `position` was removed.
    RemovedAt { position: usize, label: String },
    /// Every occurrence of `label` was removed (possibly none).
    RemovedAll { label: String },
}

impl LabelChange {
    /// Human-readable confirmation for boundary responses.
    pub fn message(&self) -> String {
        match self {
            Self::First { label } => format!("First label for this item! You labelled {label}"),
            Self::Appended { position, label } => format!("Added {position}-th label: {label}!"),
            Self::RemovedAt { position, label } => {
                format!("The {position}-th label: {label} is now removed!")
            }
            Self::RemovedAll { label } => format!("All {label} labels are now removed!"),
        }
    }
}

/// Label store facade over a repository implementation.
pub struct LabelService<R: LabelRepository> {
    repo: R,
}

impl<R: LabelRepository> LabelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns zero or one label set for `item`.
    ///
    /// Fails with `InvariantViolation` when storage holds more than one.
    pub fn labels_of(&self, item: ItemId) -> Result<Vec<LabelSet>, LabelServiceError> {
        let sets = self.repo.find_label_sets(item)?;
        if sets.len() > 1 {
            error!(
                "event=label_invariant module=labels status=error item={item} count={}",
                sets.len()
            );
            return Err(LabelServiceError::InvariantViolation {
                item,
                count: sets.len(),
            });
        }
        Ok(sets)
    }

    /// Returns the label set for `item` or `NotLabelled`.
    pub fn get_or_fail(&self, item: ItemId) -> Result<LabelSet, LabelServiceError> {
        self.labels_of(item)?
            .into_iter()
            .next()
            .ok_or(LabelServiceError::NotLabelled(item))
    }

    /// Creates an empty label set. Not idempotent: a second call fails.
    pub fn initialize(&self, item: ItemId) -> Result<(), LabelServiceError> {
        if !self.labels_of(item)?.is_empty() {
            return Err(LabelServiceError::NotAllowed(item));
        }
        self.repo.create_label_set(&LabelSet::empty(item))?;
        debug!("event=label_init module=labels status=ok item={item}");
        Ok(())
    }

    /// Appends `text`, creating the label set on first use.
    pub fn append(
        &self,
        item: ItemId,
        text: impl Into<String>,
    ) -> Result<LabelChange, LabelServiceError> {
        let text = text.into();
        let Some(mut set) = self.labels_of(item)?.into_iter().next() else {
            let set = LabelSet {
                item,
                labels: vec![text.clone()],
            };
            self.repo.create_label_set(&set)?;
            debug!("event=label_append module=labels status=ok item={item} position=1 created=true");
            return Ok(LabelChange::First { label: text });
        };

        set.labels.push(text.clone());
        self.write_back(&set)?;
        let position = set.labels.len();
        debug!("event=label_append module=labels status=ok item={item} position={position}");
        Ok(LabelChange::Appended {
            position,
            label: text,
        })
    }

    /// Removes the label at 1-based position `index` (given as text).
    pub fn remove_by_index(
        &self,
        item: ItemId,
        index: &str,
    ) -> Result<LabelChange, LabelServiceError> {
        let mut set = self.get_or_fail(item)?;
        let offset = parse_label_index(index, set.max_index()).ok_or_else(|| {
            LabelServiceError::IndexError {
                item,
                max_index: set.max_index(),
                input: index.to_string(),
            }
        })?;

        let removed = set.labels.remove(offset);
        self.write_back(&set)?;
        debug!(
            "event=label_remove module=labels status=ok item={item} position={}",
            offset + 1
        );
        Ok(LabelChange::RemovedAt {
            position: offset + 1,
            label: removed,
        })
    }

    /// Removes every label equal to `text`. Absent labels are a no-op.
    pub fn remove_by_content(
        &self,
        item: ItemId,
        text: &str,
    ) -> Result<LabelChange, LabelServiceError> {
        let mut set = self.get_or_fail(item)?;
        let before = set.labels.len();
        set.labels.retain(|label| label != text);
        self.write_back(&set)?;
        debug!(
            "event=label_remove module=labels status=ok item={item} removed_count={}",
            before - set.labels.len()
        );
        Ok(LabelChange::RemovedAll {
            label: text.to_string(),
        })
    }

    /// Returns the items, in input order, having a label containing
    /// `substring`.
    ///
    /// Duplicated input items are reported once per occurrence. Any item
    /// without a label set fails the whole call.
    pub fn search(
        &self,
        items: &[ItemId],
        substring: &str,
    ) -> Result<Vec<ItemId>, LabelServiceError> {
        let mut matched = Vec::new();
        for &item in items {
            if self.get_or_fail(item)?.any_contains(substring) {
                matched.push(item);
            }
        }
        Ok(matched)
    }

    fn write_back(&self, set: &LabelSet) -> Result<(), LabelServiceError> {
        // Zero rows means the set vanished between read and write.
        if self.repo.replace_labels(set.item, &set.labels)? == 0 {
            return Err(LabelServiceError::NotLabelled(set.item));
        }
        Ok(())
    }
}

/// Parses a 1-based label index and returns the 0-based offset when it
/// addresses one of `max_index` labels.
pub fn parse_label_index(input: &str, max_index: usize) -> Option<usize> {
    let digits = LABEL_INDEX_RE.captures(input)?.get(1)?.as_str();
    let position = digits.parse::<usize>().ok()?;
    if position == 0 || position > max_index {
        return None;
    }
    Some(position - 1)
}

#[cfg(test)]
mod tests {
    use super::{parse_label_index, LabelChange};

    #[test]
    fn label_index_accepts_in_range_positions() {
        assert_eq!(parse_label_index("1", 3), Some(0));
        assert_eq!(parse_label_index("3", 3), Some(2));
        assert_eq!(parse_label_index(" 2 ", 3), Some(1));
        assert_eq!(parse_label_index("+2", 3), Some(1));
    }

    #[test]
    fn label_index_rejects_non_positive_and_non_numeric_input() {
        for input in ["0", "-1", "abc", "", "1.5", "1.0", "1e0", "1a", "4"] {
            assert_eq!(parse_label_index(input, 3), None, "input `{input}`");
        }
    }

    #[test]
    fn label_index_rejects_overflowing_digits() {
        assert_eq!(parse_label_index("99999999999999999999999999", 3), None);
    }

    #[test]
    fn label_index_on_empty_set_is_always_out_of_range() {
        assert_eq!(parse_label_index("1", 0), None);
    }

    #[test]
    fn change_messages_name_position_and_label() {
        let appended = LabelChange::Appended {
            position: 2,
            label: "rust".to_string(),
        };
        assert_eq!(appended.message(), "Added 2-th label: rust!");
        let first = LabelChange::First {
            label: "rust".to_string(),
        };
        assert!(first.message().starts_with("First label"));
    }
}

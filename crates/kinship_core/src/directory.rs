//! Contracts for externally-owned stores the core consults.
//!
//! # Responsibility
//! - Resolve an item to its author (`ItemDirectory`).
//! - Answer the friend-or-self relationship predicate (`FriendDirectory`).
//!
//! # Invariants
//! - Failures are reported as `CollaboratorError` and surfaced unchanged by
//!   orchestration; the core never retries them.

use crate::model::{ItemId, UserId};
use crate::service::ErrorKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError {
    /// Boundary classification chosen by the collaborator.
    pub kind: ErrorKind,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Convenience for "no such item/user" failures.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }
}

impl Display for CollaboratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for CollaboratorError {}

/// Item store lookup.
pub trait ItemDirectory {
    /// Returns the user who authored `item`.
    fn author_of(&self, item: ItemId) -> Result<UserId, CollaboratorError>;
}

/// Relationship store lookup.
pub trait FriendDirectory {
    /// Returns true when `first == second` or the two are mutual friends.
    fn is_friend_or_self(&self, first: UserId, second: UserId) -> Result<bool, CollaboratorError>;
}

impl<T: ItemDirectory + ?Sized> ItemDirectory for &T {
    fn author_of(&self, item: ItemId) -> Result<UserId, CollaboratorError> {
        (**self).author_of(item)
    }
}

impl<T: FriendDirectory + ?Sized> FriendDirectory for &T {
    fn is_friend_or_self(&self, first: UserId, second: UserId) -> Result<bool, CollaboratorError> {
        (**self).is_friend_or_self(first, second)
    }
}

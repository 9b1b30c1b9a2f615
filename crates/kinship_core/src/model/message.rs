//! Message content and distribution records.
//!
//! # Invariants
//! - `MessageContent` is immutable once created.
//! - At most one `DistributionRecord` exists per content id.

use crate::model::{ItemId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one message content.
pub type ContentId = Uuid;

/// Payload of a message, authored before (and independent of) delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub id: ContentId,
    /// Shared item reference. `None` means a plain text message.
    pub item: Option<ItemId>,
    pub text: Option<String>,
}

impl MessageContent {
    /// Creates content with a freshly generated id.
    ///
    /// Both fields may be `None`; deciding whether an empty message is
    /// meaningful is left to callers.
    pub fn new(item: Option<ItemId>, text: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item,
            text,
        }
    }

    /// Returns whether this content references an item.
    pub fn shares_item(&self) -> bool {
        self.item.is_some()
    }
}

/// One delivery of a content from `sender` to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub sender: UserId,
    pub receiver: UserId,
    pub content: ContentId,
}

impl DistributionRecord {
    /// Returns whether `user` is the sender or the receiver.
    pub fn involves(&self, user: UserId) -> bool {
        self.sender == user || self.receiver == user
    }
}

//! Sharing orchestration across labels, ledger and interface modes.
//!
//! # Responsibility
//! - Gate delivery of item-referencing messages on authorship/friendship.
//! - Gate label edits on item authorship.
//! - Compose ledger queries with label search, and interface modes with
//!   pokes.
//!
//! # Invariants
//! - Content is created before authorization and is never rolled back when
//!   delivery is refused.
//! - An item-referencing message is delivered only when both sender and
//!   receiver are the item's author or a friend of the author.
//! - Plain text messages are unrestricted.

use crate::directory::{CollaboratorError, FriendDirectory, ItemDirectory};
use crate::model::interface::InterfaceMode;
use crate::model::label::LabelSet;
use crate::model::message::ContentId;
use crate::model::{ItemId, UserId};
use crate::repo::interface_repo::InterfaceRepository;
use crate::repo::label_repo::LabelRepository;
use crate::repo::message_repo::MessageRepository;
use crate::service::interface_service::{InterfaceService, InterfaceServiceError};
use crate::service::label_service::{LabelChange, LabelService, LabelServiceError};
use crate::service::ledger_service::{Delivery, LedgerError, LedgerService};
use crate::service::ErrorKind;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Text delivered by `poke` when the caller supplies none.
pub const DEFAULT_POKE_TEXT: &str = "Focus Bro!";

/// Errors from sharing orchestration.
#[derive(Debug)]
pub enum SharingError {
    /// Sender or receiver is neither the item's author nor a friend of it.
    SharingNotAuthorized { item: ItemId },
    /// `user` did not author `item`.
    NotAuthor { user: UserId, item: ItemId },
    /// `user` and `other` are not friends.
    NotFriends { user: UserId, other: UserId },
    /// Only the sender may delete a message.
    NotSender { user: UserId, content: ContentId },
    Labels(LabelServiceError),
    Ledger(LedgerError),
    Interface(InterfaceServiceError),
    Collaborator(CollaboratorError),
}

impl SharingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SharingNotAuthorized { .. }
            | Self::NotAuthor { .. }
            | Self::NotFriends { .. }
            | Self::NotSender { .. } => ErrorKind::NotAllowed,
            Self::Labels(err) => err.kind(),
            Self::Ledger(err) => err.kind(),
            Self::Interface(err) => err.kind(),
            Self::Collaborator(err) => err.kind,
        }
    }
}

impl Display for SharingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharingNotAuthorized { item } => write!(
                f,
                "cannot share item {item}: sender and receiver must both be friends with its author"
            ),
            Self::NotAuthor { user, item } => write!(f, "user {user} is not the author of {item}"),
            Self::NotFriends { user, other } => {
                write!(f, "user {user} is not friends with {other}")
            }
            Self::NotSender { user, content } => {
                write!(f, "user {user} did not send message {content}")
            }
            Self::Labels(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
            Self::Interface(err) => write!(f, "{err}"),
            Self::Collaborator(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SharingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Labels(err) => Some(err),
            Self::Ledger(err) => Some(err),
            Self::Interface(err) => Some(err),
            Self::Collaborator(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LabelServiceError> for SharingError {
    fn from(value: LabelServiceError) -> Self {
        Self::Labels(value)
    }
}

impl From<LedgerError> for SharingError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<InterfaceServiceError> for SharingError {
    fn from(value: InterfaceServiceError) -> Self {
        Self::Interface(value)
    }
}

impl From<CollaboratorError> for SharingError {
    fn from(value: CollaboratorError) -> Self {
        Self::Collaborator(value)
    }
}

/// Result of a successful `send_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub content: ContentId,
    pub delivery: Delivery,
}

/// Result of a `poke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PokeOutcome {
    /// The friend was in leisure mode and received `text`.
    Poked { content: ContentId, text: String },
    /// The friend is focused; nothing was sent.
    LockedIn,
}

/// Orchestration over the concept services and external directories.
///
/// Built once at startup and shared by handle; it owns no global state.
pub struct SharingService<L, M, N, I, F>
where
    L: LabelRepository,
    M: MessageRepository,
    N: InterfaceRepository,
    I: ItemDirectory,
    F: FriendDirectory,
{
    labels: LabelService<L>,
    ledger: LedgerService<M>,
    interfaces: InterfaceService<N>,
    items: I,
    friends: F,
}

impl<L, M, N, I, F> SharingService<L, M, N, I, F>
where
    L: LabelRepository,
    M: MessageRepository,
    N: InterfaceRepository,
    I: ItemDirectory,
    F: FriendDirectory,
{
    pub fn new(
        labels: LabelService<L>,
        ledger: LedgerService<M>,
        interfaces: InterfaceService<N>,
        items: I,
        friends: F,
    ) -> Self {
        Self {
            labels,
            ledger,
            interfaces,
            items,
            friends,
        }
    }

    pub fn labels(&self) -> &LabelService<L> {
        &self.labels
    }

    pub fn ledger(&self) -> &LedgerService<M> {
        &self.ledger
    }

    pub fn interfaces(&self) -> &InterfaceService<N> {
        &self.interfaces
    }

    /// Creates content and delivers it once sharing is authorized.
    ///
    /// When authorization fails the created content stays in storage
    /// undelivered.
    pub fn send_message(
        &self,
        sender: UserId,
        receiver: UserId,
        item: Option<ItemId>,
        text: Option<String>,
    ) -> Result<SentMessage, SharingError> {
        let content_id = self.ledger.create_content(item, text)?;
        let content = self.ledger.content_of(content_id)?;
        if let Some(item) = content.item {
            self.authorize_share(item, sender, receiver)?;
        }

        let delivery = self.ledger.deliver(sender, receiver, content_id)?;
        Ok(SentMessage {
            content: content_id,
            delivery,
        })
    }

    /// Checks that both parties may see `item`.
    pub fn authorize_share(
        &self,
        item: ItemId,
        sender: UserId,
        receiver: UserId,
    ) -> Result<(), SharingError> {
        let author = self.items.author_of(item)?;
        let sender_clear = self.friends.is_friend_or_self(author, sender)?;
        let receiver_clear = self.friends.is_friend_or_self(author, receiver)?;
        if sender_clear && receiver_clear {
            return Ok(());
        }

        warn!(
            "event=share_authorize module=sharing status=denied item={item} sender_clear={sender_clear} receiver_clear={receiver_clear}"
        );
        Err(SharingError::SharingNotAuthorized { item })
    }

    /// Content ids of every message sent to or from `user`.
    pub fn messages_of(&self, user: UserId) -> Result<Vec<ContentId>, SharingError> {
        Ok(self.ledger.messages_for_user(user)?)
    }

    /// Items shared with or by `user` whose labels contain `substring`.
    pub fn search_shared_items(
        &self,
        user: UserId,
        substring: &str,
    ) -> Result<Vec<ItemId>, SharingError> {
        let items = self.ledger.items_for_user(user)?;
        Ok(self.labels.search(&items, substring)?)
    }

    /// Deletes the delivery of `content`; only its sender may do so.
    pub fn delete_message(&self, user: UserId, content: ContentId) -> Result<(), SharingError> {
        if self.ledger.sender_of(content)? != user {
            warn!("event=message_delete module=sharing status=denied content={content}");
            return Err(SharingError::NotSender { user, content });
        }
        self.ledger.delete(content)?;
        info!("event=message_delete module=sharing status=ok content={content}");
        Ok(())
    }

    /// Gives a newly created item its empty label set.
    pub fn on_item_created(&self, item: ItemId) -> Result<(), SharingError> {
        Ok(self.labels.initialize(item)?)
    }

    /// Gives a newly registered user the default interface mode.
    pub fn on_user_created(&self, user: UserId) -> Result<(), SharingError> {
        self.interfaces.create(user, InterfaceMode::default())?;
        Ok(())
    }

    pub fn add_label(
        &self,
        user: UserId,
        item: ItemId,
        text: impl Into<String>,
    ) -> Result<LabelChange, SharingError> {
        self.assert_author(user, item)?;
        Ok(self.labels.append(item, text)?)
    }

    pub fn labels_for_author(&self, user: UserId, item: ItemId) -> Result<LabelSet, SharingError> {
        self.assert_author(user, item)?;
        Ok(self.labels.get_or_fail(item)?)
    }

    pub fn remove_label_by_index(
        &self,
        user: UserId,
        item: ItemId,
        index: &str,
    ) -> Result<LabelChange, SharingError> {
        self.assert_author(user, item)?;
        Ok(self.labels.remove_by_index(item, index)?)
    }

    pub fn remove_label_by_content(
        &self,
        user: UserId,
        item: ItemId,
        text: &str,
    ) -> Result<LabelChange, SharingError> {
        self.assert_author(user, item)?;
        Ok(self.labels.remove_by_content(item, text)?)
    }

    /// Parses `mode` and switches the user's interface to it.
    pub fn set_interface(&self, user: UserId, mode: &str) -> Result<InterfaceMode, SharingError> {
        let mode = mode
            .parse::<InterfaceMode>()
            .map_err(InterfaceServiceError::from)?;
        self.interfaces.switch(user, mode)?;
        Ok(mode)
    }

    /// Returns `target`'s mode when `viewer` is `target` or a friend.
    pub fn check_interface(
        &self,
        viewer: UserId,
        target: UserId,
    ) -> Result<InterfaceMode, SharingError> {
        self.assert_friends(viewer, target)?;
        Ok(self.interfaces.mode_of(target)?)
    }

    /// Sends a plain text nudge to a friend who is in leisure mode.
    pub fn poke(
        &self,
        user: UserId,
        friend: UserId,
        text: Option<String>,
    ) -> Result<PokeOutcome, SharingError> {
        self.assert_friends(user, friend)?;
        if self.interfaces.mode_of(friend)? != InterfaceMode::Leisure {
            return Ok(PokeOutcome::LockedIn);
        }

        let text = text.unwrap_or_else(|| DEFAULT_POKE_TEXT.to_string());
        let content = self.ledger.create_content(None, Some(text.clone()))?;
        self.ledger.deliver(user, friend, content)?;
        info!("event=poke module=sharing status=ok content={content}");
        Ok(PokeOutcome::Poked { content, text })
    }

    fn assert_author(&self, user: UserId, item: ItemId) -> Result<(), SharingError> {
        if self.items.author_of(item)? != user {
            return Err(SharingError::NotAuthor { user, item });
        }
        Ok(())
    }

    fn assert_friends(&self, user: UserId, other: UserId) -> Result<(), SharingError> {
        if !self.friends.is_friend_or_self(user, other)? {
            return Err(SharingError::NotFriends { user, other });
        }
        Ok(())
    }
}

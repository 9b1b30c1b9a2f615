//! Message distribution ledger service.
//!
//! # Responsibility
//! - Separate message authoring (`create_content`) from delivery (`deliver`).
//! - Answer per-user and per-conversation queries over deliveries.
//!
//! # Invariants
//! - At most one distribution record per content id. In the default lazy
//!   mode this is checked on read: duplicates make every record lookup for
//!   that content fail with `InvariantViolation`. In strict mode `deliver`
//!   refuses a second record up front.
//! - `deliver` performs no authorization and does not check that the
//!   content exists; orchestration does that.
//! - `delete` removes the record only; content is retained.

use crate::config::LedgerConfig;
use crate::model::message::{ContentId, DistributionRecord, MessageContent};
use crate::model::{ItemId, UserId};
use crate::repo::message_repo::{MessageRepository, RecordFilter};
use crate::repo::RepoError;
use crate::service::ErrorKind;
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from ledger operations.
#[derive(Debug)]
pub enum LedgerError {
    /// No content exists with this id.
    ContentNotFound(ContentId),
    /// No distribution record exists for this content.
    RecordNotFound(ContentId),
    /// More than one distribution record exists for this content.
    InvariantViolation { content: ContentId, count: usize },
    /// Strict mode refused a second delivery of the same content.
    AlreadyDelivered(ContentId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContentNotFound(_) | Self::RecordNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyDelivered(_) => ErrorKind::NotAllowed,
            Self::InvariantViolation { .. } | Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentNotFound(id) => write!(f, "message content {id} does not exist"),
            Self::RecordNotFound(id) => {
                write!(f, "message content {id} does not exist in the record")
            }
            Self::InvariantViolation { content, count } => write!(
                f,
                "message content {content} has {count} distribution records; expected at most one"
            ),
            Self::AlreadyDelivered(id) => write!(f, "message content {id} was already delivered"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Confirmation of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub record: DistributionRecord,
}

impl Delivery {
    pub fn message(&self) -> String {
        format!(
            "Message {} is sent from {} to {}.",
            self.record.content, self.record.sender, self.record.receiver
        )
    }
}

/// Ledger facade over a message repository.
pub struct LedgerService<R: MessageRepository> {
    repo: R,
    strict_delivery: bool,
}

impl<R: MessageRepository> LedgerService<R> {
    /// Creates a ledger with lazy (read-side) duplicate detection.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            strict_delivery: false,
        }
    }

    /// Creates a ledger honoring `config.strict_delivery`.
    pub fn with_config(repo: R, config: &LedgerConfig) -> Self {
        Self {
            repo,
            strict_delivery: config.strict_delivery,
        }
    }

    /// Returns whether `deliver` refuses duplicate records at write time.
    pub fn is_strict(&self) -> bool {
        self.strict_delivery
    }

    /// Stores new content and returns its id. Never validates the fields.
    pub fn create_content(
        &self,
        item: Option<ItemId>,
        text: Option<String>,
    ) -> Result<ContentId, LedgerError> {
        let content = MessageContent::new(item, text);
        let id = self.repo.insert_content(&content)?;
        debug!(
            "event=content_create module=ledger status=ok content={id} shares_item={}",
            content.shares_item()
        );
        Ok(id)
    }

    pub fn content_of(&self, id: ContentId) -> Result<MessageContent, LedgerError> {
        self.repo
            .get_content(id)?
            .ok_or(LedgerError::ContentNotFound(id))
    }

    /// Records delivery of `content` from `sender` to `receiver`.
    pub fn deliver(
        &self,
        sender: UserId,
        receiver: UserId,
        content: ContentId,
    ) -> Result<Delivery, LedgerError> {
        let record = DistributionRecord {
            sender,
            receiver,
            content,
        };

        if self.strict_delivery {
            if !self.repo.insert_record_exclusive(&record)? {
                warn!("event=message_deliver module=ledger status=denied content={content} reason=already_delivered");
                return Err(LedgerError::AlreadyDelivered(content));
            }
        } else {
            self.repo.insert_record(&record)?;
        }

        debug!("event=message_deliver module=ledger status=ok content={content}");
        Ok(Delivery { record })
    }

    /// Returns the single record for `content`.
    pub fn record_of(&self, content: ContentId) -> Result<DistributionRecord, LedgerError> {
        let mut records = self.repo.list_records(RecordFilter::Content(content))?;
        match records.len() {
            0 => Err(LedgerError::RecordNotFound(content)),
            1 => Ok(records.remove(0)),
            count => Err(self.invariant_violation(content, count)),
        }
    }

    pub fn sender_of(&self, content: ContentId) -> Result<UserId, LedgerError> {
        Ok(self.record_of(content)?.sender)
    }

    pub fn receiver_of(&self, content: ContentId) -> Result<UserId, LedgerError> {
        Ok(self.record_of(content)?.receiver)
    }

    /// Records where `user` is sender or receiver.
    pub fn records_for_user(&self, user: UserId) -> Result<Vec<DistributionRecord>, LedgerError> {
        Ok(self.repo.list_records(RecordFilter::Party(user))?)
    }

    /// Records exchanged between two users, in either direction.
    pub fn records_between(
        &self,
        first: UserId,
        second: UserId,
    ) -> Result<Vec<DistributionRecord>, LedgerError> {
        Ok(self.repo.list_records(RecordFilter::Between(first, second))?)
    }

    /// Content ids of every record involving `user`.
    pub fn messages_for_user(&self, user: UserId) -> Result<Vec<ContentId>, LedgerError> {
        Ok(self
            .records_for_user(user)?
            .into_iter()
            .map(|record| record.content)
            .collect())
    }

    /// Items referenced by content delivered to or from `user`.
    ///
    /// Plain text content is skipped, as are record references to content
    /// that was never created.
    pub fn items_for_user(&self, user: UserId) -> Result<Vec<ItemId>, LedgerError> {
        Ok(self
            .repo
            .list_contents_for_user(user)?
            .into_iter()
            .filter_map(|content| content.item)
            .collect())
    }

    /// Records where `user` is the sender.
    pub fn sent_by_user(&self, user: UserId) -> Result<Vec<DistributionRecord>, LedgerError> {
        Ok(self.repo.list_records(RecordFilter::SentBy(user))?)
    }

    /// Returns whether `user` sent or received `content`.
    pub fn is_party(&self, user: UserId, content: ContentId) -> Result<bool, LedgerError> {
        Ok(self.record_of(content)?.involves(user))
    }

    /// Deletes the record for `content`, leaving the content itself.
    pub fn delete(&self, content: ContentId) -> Result<(), LedgerError> {
        match self.repo.delete_records(content)? {
            0 => Err(LedgerError::RecordNotFound(content)),
            1 => {
                debug!("event=message_delete module=ledger status=ok content={content}");
                Ok(())
            }
            count => Err(self.invariant_violation(content, count)),
        }
    }

    /// Every stored record, for diagnostics.
    pub fn all_records(&self) -> Result<Vec<DistributionRecord>, LedgerError> {
        Ok(self.repo.list_records(RecordFilter::All)?)
    }

    /// Every stored content, for diagnostics.
    pub fn all_contents(&self) -> Result<Vec<MessageContent>, LedgerError> {
        Ok(self.repo.list_all_contents()?)
    }

    fn invariant_violation(&self, content: ContentId, count: usize) -> LedgerError {
        error!("event=ledger_invariant module=ledger status=error content={content} count={count}");
        LedgerError::InvariantViolation { content, count }
    }
}

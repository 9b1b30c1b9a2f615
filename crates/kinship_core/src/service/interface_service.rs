//! Interface mode service.
//!
//! # Invariants
//! - At most one interface record per user; creation is one-shot.
//! - Mode names from the boundary are parsed exhaustively.

use crate::model::interface::{InterfaceId, InterfaceMode, InterfaceRecord, UnknownModeError};
use crate::model::UserId;
use crate::repo::interface_repo::InterfaceRepository;
use crate::repo::RepoError;
use crate::service::ErrorKind;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from interface mode operations.
#[derive(Debug)]
pub enum InterfaceServiceError {
    /// The user already has an interface record.
    AlreadyCreated(UserId),
    /// The user has no interface record.
    NoInterface(UserId),
    /// No interface record has this id.
    InterfaceNotFound(InterfaceId),
    /// Boundary text did not name a known mode.
    UnknownMode(UnknownModeError),
    Repo(RepoError),
}

impl InterfaceServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoInterface(_) | Self::InterfaceNotFound(_) => ErrorKind::NotFound,
            Self::UnknownMode(_) => ErrorKind::BadInput,
            Self::AlreadyCreated(_) => ErrorKind::NotAllowed,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for InterfaceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyCreated(user) => write!(f, "user {user} already has interface data"),
            Self::NoInterface(user) => write!(f, "user {user} does not have interface data"),
            Self::InterfaceNotFound(id) => write!(f, "interface {id} does not exist"),
            Self::UnknownMode(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InterfaceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownMode(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for InterfaceServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<UnknownModeError> for InterfaceServiceError {
    fn from(value: UnknownModeError) -> Self {
        Self::UnknownMode(value)
    }
}

/// Interface mode facade over a repository implementation.
pub struct InterfaceService<R: InterfaceRepository> {
    repo: R,
}

impl<R: InterfaceRepository> InterfaceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates the user's interface record with `mode`.
    pub fn create(
        &self,
        user: UserId,
        mode: InterfaceMode,
    ) -> Result<InterfaceId, InterfaceServiceError> {
        if self.repo.find_by_user(user)?.is_some() {
            return Err(InterfaceServiceError::AlreadyCreated(user));
        }
        let record = InterfaceRecord {
            id: Uuid::new_v4(),
            user,
            mode,
        };
        let id = self.repo.create_interface(&record)?;
        debug!("event=interface_create module=interface status=ok user={user} mode={mode}");
        Ok(id)
    }

    pub fn switch(&self, user: UserId, mode: InterfaceMode) -> Result<(), InterfaceServiceError> {
        if self.repo.update_mode(user, mode)? == 0 {
            return Err(InterfaceServiceError::NoInterface(user));
        }
        debug!("event=interface_switch module=interface status=ok user={user} mode={mode}");
        Ok(())
    }

    pub fn mode_of(&self, user: UserId) -> Result<InterfaceMode, InterfaceServiceError> {
        self.repo
            .find_by_user(user)?
            .map(|record| record.mode)
            .ok_or(InterfaceServiceError::NoInterface(user))
    }

    pub fn owner_of(&self, id: InterfaceId) -> Result<UserId, InterfaceServiceError> {
        self.repo
            .find_by_id(id)?
            .map(|record| record.user)
            .ok_or(InterfaceServiceError::InterfaceNotFound(id))
    }
}

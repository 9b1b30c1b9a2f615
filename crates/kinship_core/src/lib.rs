//! Core concepts for the Kinship social backend.
//!
//! Owns the label store, the message distribution ledger, per-user
//! interface modes, and the sharing rules that tie them to authorship and
//! friendship. Account, post and friendship stores live elsewhere and are
//! reached through the `directory` traits.

pub mod config;
pub mod db;
pub mod directory;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LedgerConfig, LoggingConfig};
pub use directory::{CollaboratorError, FriendDirectory, ItemDirectory};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::interface::{InterfaceId, InterfaceMode, InterfaceRecord, UnknownModeError};
pub use model::label::LabelSet;
pub use model::message::{ContentId, DistributionRecord, MessageContent};
pub use model::{ItemId, UserId};
pub use repo::interface_repo::{InterfaceRepository, SqliteInterfaceRepository};
pub use repo::label_repo::{LabelRepository, SqliteLabelRepository};
pub use repo::message_repo::{MessageRepository, RecordFilter, SqliteMessageRepository};
pub use repo::{RepoError, RepoResult};
pub use service::interface_service::{InterfaceService, InterfaceServiceError};
pub use service::label_service::{parse_label_index, LabelChange, LabelService, LabelServiceError};
pub use service::ledger_service::{Delivery, LedgerError, LedgerService};
pub use service::sharing_service::{
    PokeOutcome, SentMessage, SharingError, SharingService, DEFAULT_POKE_TEXT,
};
pub use service::ErrorKind;

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

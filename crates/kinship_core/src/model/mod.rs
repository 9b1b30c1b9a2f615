//! Domain records owned by the label, messaging and interface concepts.
//!
//! # Responsibility
//! - Define the persisted shapes each concept store reads and writes.
//! - Name the external identifiers the concepts refer to but do not own.
//!
//! # Invariants
//! - Identifiers are compared by value, never by textual representation.
//! - Items and users are owned by external stores; no record here validates
//!   their existence.

pub mod interface;
pub mod label;
pub mod message;

use uuid::Uuid;

/// Identifier of an externally-owned item (for example a post).
pub type ItemId = Uuid;

/// Identifier of an externally-owned user account.
pub type UserId = Uuid;

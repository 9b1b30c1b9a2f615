//! Concept services and the sharing orchestration above them.
//!
//! # Responsibility
//! - Enforce per-concept structural invariants on top of repositories.
//! - Keep social rules (authorship, friendship) in `sharing_service`, never
//!   inside the concept stores.
//!
//! # Invariants
//! - Services fail fast; no retries and no self-healing of corrupt state.

pub mod interface_service;
pub mod label_service;
pub mod ledger_service;
pub mod sharing_service;

/// Boundary classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Expected absence; callers map to a "not found" response.
    NotFound,
    /// Caller supplied a malformed or out-of-range value.
    BadInput,
    /// Policy refusal (re-initialization, unauthorized sharing).
    NotAllowed,
    /// Structural corruption or storage failure.
    Internal,
}

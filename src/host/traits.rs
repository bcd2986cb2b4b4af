//! host::traits
//!
//! The commit contract a host must implement.
//!
//! # Design
//!
//! The `BoardHost` trait is async because persisting a move involves I/O.
//! The engine calls it only after the optimistic board has been shown, and
//! only one call at a time per column.
//!
//! Host failures never compromise the board: the engine rolls back to its
//! last confirmed snapshot and reports the failure.
//!
//! No idempotency is assumed. A host that cannot tolerate a repeated call
//! must de-duplicate internally.
//!
//! # Example
//!
//! ```ignore
//! use weekboard::host::{BoardHost, HostError};
//! use weekboard::core::ops::MoveOperation;
//!
//! async fn persist(host: &dyn BoardHost, op: &MoveOperation) -> Result<(), HostError> {
//!     host.move_card(op).await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::ops::{MoveOperation, Operation, ReorderOperation};

/// Errors from host commit calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The host refused the relocation.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The card or column no longer exists on the host.
    #[error("not found: {0}")]
    NotFound(String),

    /// The host's copy changed underneath the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// Storage I/O error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Persistence for board operations.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; commits run on spawned tasks.
///
/// # Error Handling
///
/// Any `Err` is treated as a refusal and rolled back. The engine does not
/// retry.
#[async_trait]
pub trait BoardHost: Send + Sync {
    /// Persist a cross-column relocation.
    async fn move_card(&self, op: &MoveOperation) -> Result<(), HostError>;

    /// Persist a within-column relocation.
    async fn reorder_card(&self, op: &ReorderOperation) -> Result<(), HostError>;
}

/// Dispatch a normalized operation to the matching host call.
pub async fn commit(host: &dyn BoardHost, op: &Operation) -> Result<(), HostError> {
    match op {
        Operation::Move(op) => host.move_card(op).await,
        Operation::Reorder(op) => host.reorder_card(op).await,
    }
}

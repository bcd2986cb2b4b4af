//! engine
//!
//! The reconciliation engine: optimistic board updates backed by host
//! commits.
//!
//! # Architecture
//!
//! - [`store`]: the confirmed and visible snapshots and the pending list
//! - [`queue`]: per-column FIFO queues that serialize commits
//! - [`reconcile`]: the [`Reconciler`] that ties them to a [`BoardHost`]
//!
//! # Invariants
//!
//! - The visible board always satisfies the board invariant
//! - Commits touching a common column reach the host one at a time, in the
//!   order they were applied
//! - Commits on disjoint columns run concurrently
//! - A failed commit leaves the visible board equal to the confirmed board
//!   with the remaining pending operations replayed on top
//!
//! [`BoardHost`]: crate::host::BoardHost

pub mod queue;
pub mod reconcile;
pub mod store;

pub use reconcile::{CommitError, CommitTicket, ReconcileError, Reconciler, Settlement};
pub use store::BoardStore;

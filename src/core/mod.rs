//! core
//!
//! Core domain types and pure board derivations for WeekBoard.
//!
//! # Modules
//!
//! - [`types`] - Strong types: CardId, ColumnId, Slot, Fingerprint
//! - [`board`] - Board snapshots, columns and cards
//! - [`ops`] - Move and reorder operations
//! - [`verify`] - Board invariant verification
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Snapshots are values; derivations return new snapshots
//! - All verification is deterministic

pub mod board;
pub mod config;
pub mod ops;
pub mod types;
pub mod verify;

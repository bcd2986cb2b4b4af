//! WeekBoard - drag and drop for a week of cards, with optimistic commits
//!
//! A card is picked up, its landing spot is previewed as the pointer or
//! keyboard moves, and the drop is shown at once while the host persists
//! it in the background. A drop the host refuses is rolled back.
//!
//! # Architecture
//!
//! The codebase is layered, leaf first:
//!
//! - [`core`] - Board model, operations, verification and configuration
//! - [`drag`] - Drag state machine, drop targeting and drop policy
//! - [`engine`] - Optimistic apply, per-column commit queues, rollback
//! - [`host`] - The persistence contract plus mock and file hosts
//! - [`announce`] - Accessibility announcements
//! - [`weekboard`] - Facade wiring all of the above together
//! - [`cli`] / [`ui`] - The `weekboard` binary
//!
//! # Correctness Invariants
//!
//! WeekBoard maintains the following invariants:
//!
//! 1. Every card is in exactly one column at exactly one index, always
//! 2. Dropping a card where it started changes nothing and commits nothing
//! 3. Commits that share a column reach the host one at a time, in order
//! 4. A refused commit leaves the board as the host last confirmed it,
//!    plus any drops still in flight

pub mod announce;
pub mod cli;
pub mod core;
pub mod drag;
pub mod engine;
pub mod host;
pub mod ui;
pub mod weekboard;

pub use crate::weekboard::{WeekBoard, WeekBoardBuilder, WeekBoardError};

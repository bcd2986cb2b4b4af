//! drag
//!
//! Everything that happens between picking a card up and letting go.
//!
//! # Architecture
//!
//! - [`controller`]: the drag state machine (phases, session, pending commits)
//! - [`resolve`]: pointer and keyboard targeting
//! - [`policy`]: the host's veto over a drop
//!
//! None of these block or perform I/O. The board they read is owned by the
//! reconciliation engine; the controller only ever sees card ids and slots.

pub mod controller;
pub mod policy;
pub mod resolve;

pub use controller::{DragController, DragError, DragPhase, DragSession, DragState, EndDrag};
pub use policy::{AllowAll, DropPolicy};
pub use resolve::{CandidateKind, Direction, DropCandidate, DropCandidateProvider, Point};

//! host
//!
//! The persistence boundary: where board operations become durable.
//!
//! # Architecture
//!
//! The `BoardHost` trait defines the two commit calls the engine makes.
//! Hosts are supplied by the embedding application; this crate ships two:
//!
//! - [`mock`]: in-memory recording host for deterministic testing
//! - [`file`]: JSON file on disk, used by the `weekboard` binary
//!
//! Host calls are invoked only after the optimistic board is visible, and a
//! failed call never leaves the board in a broken state.

pub mod file;
pub mod mock;
mod traits;

pub use traits::*;

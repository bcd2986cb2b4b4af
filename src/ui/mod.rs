//! ui
//!
//! Terminal output for the `weekboard` binary.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! Only this module prints; everything user-facing that the binary
//! shows goes through this module.

pub mod output;

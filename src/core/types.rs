//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`CardId`] - Identity of a card, unique within a board
//! - [`ColumnId`] - Identity of a column, unique within a board
//! - [`Slot`] - A (column, index) position on the board
//! - [`Fingerprint`] - Board order hash for divergence detection
//!
//! # Validation
//!
//! Identifiers enforce validity at construction time. Invalid values
//! cannot be represented, so the engine never has to re-check them.
//!
//! # Examples
//!
//! ```
//! use weekboard::core::types::{CardId, ColumnId, Slot};
//!
//! let card = CardId::new("task-42").unwrap();
//! let column = ColumnId::new("2026-10-12").unwrap();
//! let slot = Slot::new(column.clone(), 0);
//!
//! assert_eq!(card.as_str(), "task-42");
//! assert_eq!(slot.column, column);
//!
//! assert!(CardId::new("").is_err());
//! assert!(ColumnId::new("  ").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid card id: {0}")]
    InvalidCardId(String),

    #[error("invalid column id: {0}")]
    InvalidColumnId(String),
}

/// Shared validation for identifier strings.
///
/// Identifiers must be non-empty, must not be whitespace only and must not
/// contain control characters.
fn validate_identifier(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("identifier cannot be empty".into());
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(format!("identifier '{}' contains control characters", value.escape_debug()));
    }
    Ok(())
}

/// Identity of a card.
///
/// Card ids are supplied by the host and are stable for the lifetime of the
/// card, including across columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    /// Create a new validated card id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCardId` if the id is empty or contains
    /// control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_identifier(&id).map_err(TypeError::InvalidCardId)?;
        Ok(Self(id))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CardId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of a column.
///
/// Week boards use the ISO date of the day (`2026-10-12`), but any valid
/// identifier is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnId(String);

impl ColumnId {
    /// Create a new validated column id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidColumnId` if the id is empty or contains
    /// control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_identifier(&id).map_err(TypeError::InvalidColumnId)?;
        Ok(Self(id))
    }

    /// Column id for a calendar day.
    pub fn for_date(date: chrono::NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ColumnId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnId> for String {
    fn from(id: ColumnId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ColumnId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A position on the board: a column and an index within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// The column.
    pub column: ColumnId,
    /// Zero-based index within the column.
    pub index: usize,
}

impl Slot {
    /// Create a new slot.
    pub fn new(column: ColumnId, index: usize) -> Self {
        Self { column, index }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.column, self.index)
    }
}

/// Hash of the board's column and card order.
///
/// Two boards with the same columns holding the same cards in the same
/// order have the same fingerprint. Card content (title, color) does not
/// participate: only placement matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from columns and the card ids they hold, in order.
    pub fn compute<'a, I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a ColumnId, C)>,
        C: IntoIterator<Item = &'a CardId>,
    {
        let mut hasher = Sha256::new();
        for (column, cards) in columns {
            hasher.update(column.as_str().as_bytes());
            hasher.update(b":");
            for card in cards {
                hasher.update(card.as_str().as_bytes());
                hasher.update(b",");
            }
            hasher.update(b"\n");
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for display.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Semantic newtypes for domain identifiers
//!
//! Each identifier validates its input on construction and trims
//! surrounding whitespace before parsing.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for identifier parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Identifier is empty or contains only whitespace
    #[error("identifier cannot be empty")]
    Empty,

    /// Trial identifier is not a UUID
    #[error("invalid trial id '{value}': {details}")]
    InvalidTrialId { value: String, details: String },

    /// Participant identifier is not `P-<n>` or a positive number
    #[error("invalid participant id '{value}': expected P-<number> or a positive number")]
    InvalidParticipantId { value: String },
}

// ============================================================================
// TRIAL ID
// ============================================================================

/// Opaque, globally unique trial identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialId(Uuid);

impl TrialId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its hyphenated UUID form.
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Empty` for blank input and
    /// `IdentifierError::InvalidTrialId` when the value is not a UUID.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|e| IdentifierError::InvalidTrialId {
                value: trimmed.to_string(),
                details: e.to_string(),
            })
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TrialId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrialId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// PARTICIPANT ID
// ============================================================================

/// Participant identifier, unique within its trial.
///
/// Ids are assigned in screening order starting at 1 and render as `P-0001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(NonZeroU32);

impl ParticipantId {
    const PREFIX: &'static str = "P-";

    #[must_use]
    pub const fn new(sequence: NonZeroU32) -> Self {
        Self(sequence)
    }

    /// Id for the participant screened at zero-based `position`.
    ///
    /// Returns `None` if the sequence number would overflow `u32`.
    #[must_use]
    pub fn from_position(position: usize) -> Option<Self> {
        u32::try_from(position)
            .ok()
            .and_then(|p| p.checked_add(1))
            .and_then(NonZeroU32::new)
            .map(Self)
    }

    /// Parse `P-0007`, `p-7` or `7`.
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Empty` for blank input and
    /// `IdentifierError::InvalidParticipantId` otherwise.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }
        let digits = trimmed
            .get(..Self::PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(Self::PREFIX))
            .map_or(trimmed, |_| &trimmed[Self::PREFIX.len()..]);

        digits
            .parse::<NonZeroU32>()
            .map(Self)
            .map_err(|_| IdentifierError::InvalidParticipantId {
                value: trimmed.to_string(),
            })
    }

    /// Sequence number (1-based screening order).
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", Self::PREFIX, self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

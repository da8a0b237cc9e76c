//! Validation outcome of a guard or invariant check.
//!
//! A [`ValidationResult`] is either `Valid` or `Invalid` with at least one
//! human-readable reason. The non-empty guarantee lives in [`Reasons`].

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::TrialError;

/// Ordered, non-empty list of failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Reasons(Vec<String>);

impl Reasons {
    #[must_use]
    pub fn new(first: impl Into<String>) -> Self {
        Self(vec![first.into()])
    }

    /// `None` when `reasons` is empty.
    #[must_use]
    pub fn from_vec(reasons: Vec<String>) -> Option<Self> {
        if reasons.is_empty() {
            None
        } else {
            Some(Self(reasons))
        }
    }

    pub fn push(&mut self, reason: impl Into<String>) {
        self.0.push(reason.into());
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl TryFrom<Vec<String>> for Reasons {
    type Error = &'static str;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_vec(value).ok_or("reason list cannot be empty")
    }
}

impl From<Reasons> for Vec<String> {
    fn from(value: Reasons) -> Self {
        value.0
    }
}

impl fmt::Display for Reasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

/// Outcome of a domain check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reasons", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid(Reasons),
}

impl ValidationResult {
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(Reasons::new(reason))
    }

    /// `Valid` when `reasons` is empty.
    #[must_use]
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        Reasons::from_vec(reasons).map_or(Self::Valid, Self::Invalid)
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Empty for `Valid`.
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Valid => &[],
            Self::Invalid(reasons) => reasons.as_slice(),
        }
    }

    /// Combine two results, keeping the reasons of both in order.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Valid, other) => other,
            (invalid @ Self::Invalid(_), Self::Valid) => invalid,
            (Self::Invalid(mut first), Self::Invalid(second)) => {
                second.into_vec().into_iter().for_each(|r| first.push(r));
                Self::Invalid(first)
            }
        }
    }

    /// Convert into a `Result`, mapping `Invalid` to `TrialError::ValidationFailure`.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::ValidationFailure` carrying the reasons.
    pub fn into_result(self) -> Result<(), TrialError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(reasons) => Err(TrialError::ValidationFailure { reasons }),
        }
    }
}

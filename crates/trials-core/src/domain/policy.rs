//! Transition guards
//!
//! Every guard is a pure function of the enrollment targets and the derived
//! [`EnrollmentCounters`]. The aggregate asks the policy before committing
//! any state change; the policy itself never mutates anything.
//!
//! | Edge                     | Guard                                              |
//! |--------------------------|----------------------------------------------------|
//! | Planning -> Recruiting   | targets set, positive, `minimum <= target`         |
//! | Recruiting -> Active     | `accepted >= minimum`                              |
//! | Recruiting -> Terminated | `screened >= k * target` and `accepted < target`   |
//! | Active -> Completed      | `randomized > 0`, every randomized has a Final     |
//! | Active -> Terminated     | none                                               |
//!
//! `k` is the futility screening multiplier, 2 unless configured otherwise.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    counters::EnrollmentCounters,
    state::TrialState,
    validation::{Reasons, ValidationResult},
};

/// Invalid initial configuration; no trial is created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid trial configuration: {reasons}")]
pub struct ConstructionError {
    pub reasons: Reasons,
}

// ============================================================================
// ENROLLMENT TARGETS
// ============================================================================

/// Validated enrollment targets. `0 < minimum <= target` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentTargets {
    target: usize,
    minimum: usize,
}

impl EnrollmentTargets {
    /// # Errors
    ///
    /// Returns `ConstructionError` listing every violated rule.
    pub fn new(target: usize, minimum: usize) -> Result<Self, ConstructionError> {
        match TransitionPolicy::validate_enrollment(Some(target), Some(minimum)) {
            ValidationResult::Valid => Ok(Self { target, minimum }),
            ValidationResult::Invalid(reasons) => Err(ConstructionError { reasons }),
        }
    }

    #[must_use]
    pub const fn target(self) -> usize {
        self.target
    }

    #[must_use]
    pub const fn minimum(self) -> usize {
        self.minimum
    }
}

// ============================================================================
// TRANSITION POLICY
// ============================================================================

/// Guard evaluation for the fixed lifecycle edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPolicy {
    futility_screening_multiplier: NonZeroUsize,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FUTILITY_SCREENING_MULTIPLIER)
    }
}

impl TransitionPolicy {
    pub const DEFAULT_FUTILITY_SCREENING_MULTIPLIER: NonZeroUsize =
        NonZeroUsize::MIN.saturating_add(1);

    #[must_use]
    pub const fn new(futility_screening_multiplier: NonZeroUsize) -> Self {
        Self {
            futility_screening_multiplier,
        }
    }

    #[must_use]
    pub const fn futility_screening_multiplier(self) -> NonZeroUsize {
        self.futility_screening_multiplier
    }

    /// Screening volume at which recruitment counts as futile.
    #[must_use]
    pub const fn futility_threshold(self, targets: EnrollmentTargets) -> usize {
        targets
            .target
            .saturating_mul(self.futility_screening_multiplier.get())
    }

    /// Evaluate the guard for `from -> to`.
    ///
    /// Edges outside the fixed set are reported as invalid here; the
    /// aggregate rejects them earlier with `TrialError::InvalidTransition`.
    #[must_use]
    pub fn evaluate(
        self,
        from: TrialState,
        to: TrialState,
        targets: EnrollmentTargets,
        counters: &EnrollmentCounters,
    ) -> ValidationResult {
        match (from, to) {
            (TrialState::Planning, TrialState::Recruiting) => Self::recruiting_readiness(targets),
            (TrialState::Recruiting, TrialState::Active) => {
                Self::activation_readiness(targets, counters)
            }
            (TrialState::Recruiting, TrialState::Terminated) => self.futility(targets, counters),
            (TrialState::Active, TrialState::Completed) => Self::completion_readiness(counters),
            (TrialState::Active, TrialState::Terminated) => ValidationResult::Valid,
            _ => ValidationResult::invalid(format!("no transition from {from} to {to}")),
        }
    }

    /// Enrollment targets must both be set, positive, and ordered.
    #[must_use]
    pub fn validate_enrollment(target: Option<usize>, minimum: Option<usize>) -> ValidationResult {
        let mut reasons = Vec::new();

        match target {
            None => reasons.push("target enrollment not set".to_string()),
            Some(0) => reasons.push("target enrollment must be greater than zero".to_string()),
            Some(_) => {}
        }
        match minimum {
            None => reasons.push("minimum enrollment not set".to_string()),
            Some(0) => reasons.push("minimum enrollment must be greater than zero".to_string()),
            Some(_) => {}
        }
        if let (Some(target), Some(minimum)) = (target, minimum) {
            if minimum > target {
                reasons.push(format!("minimum enrollment {minimum} exceeds target {target}"));
            }
        }

        ValidationResult::from_reasons(reasons)
    }

    /// Planning -> Recruiting.
    #[must_use]
    pub fn recruiting_readiness(targets: EnrollmentTargets) -> ValidationResult {
        Self::validate_enrollment(Some(targets.target), Some(targets.minimum))
    }

    /// Recruiting -> Active.
    #[must_use]
    pub fn activation_readiness(
        targets: EnrollmentTargets,
        counters: &EnrollmentCounters,
    ) -> ValidationResult {
        if counters.accepted >= targets.minimum {
            ValidationResult::Valid
        } else {
            ValidationResult::invalid(format!(
                "accepted enrollment {} below minimum {}",
                counters.accepted, targets.minimum
            ))
        }
    }

    /// Recruiting -> Terminated: recruitment futility.
    #[must_use]
    pub fn futility(
        self,
        targets: EnrollmentTargets,
        counters: &EnrollmentCounters,
    ) -> ValidationResult {
        let threshold = self.futility_threshold(targets);
        let mut reasons = Vec::new();

        if counters.screened < threshold {
            reasons.push(format!(
                "screened {} below futility threshold {threshold} ({} x target {})",
                counters.screened, self.futility_screening_multiplier, targets.target
            ));
        }
        if counters.accepted >= targets.target {
            reasons.push(format!(
                "accepted enrollment {} already meets target {}",
                counters.accepted, targets.target
            ));
        }

        ValidationResult::from_reasons(reasons)
    }

    /// Active -> Completed.
    #[must_use]
    pub fn completion_readiness(counters: &EnrollmentCounters) -> ValidationResult {
        if counters.randomized == 0 {
            return ValidationResult::invalid("no randomized participants");
        }
        match counters.outstanding_final_visits() {
            0 => ValidationResult::Valid,
            1 => ValidationResult::invalid("1 randomized participant missing a Final visit"),
            n => ValidationResult::invalid(format!(
                "{n} randomized participants missing a Final visit"
            )),
        }
    }

    /// Whether recruitment has become futile.
    #[must_use]
    pub fn should_terminate(
        self,
        targets: EnrollmentTargets,
        counters: &EnrollmentCounters,
    ) -> bool {
        self.futility(targets, counters).is_valid()
    }
}

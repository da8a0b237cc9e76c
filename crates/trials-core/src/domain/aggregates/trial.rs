//! Trial aggregate root with business rules and invariants.
//!
//! The Trial aggregate represents one clinical study:
//! - Unique identity (`TrialId`)
//! - Lifecycle state (Planning, Recruiting, Active, Completed, Terminated)
//! - Validated enrollment targets
//! - Participants in screening order, each with their visits
//!
//! # Invariants
//!
//! 1. `0 < minimum_enrollment <= target_enrollment`
//! 2. State only moves along the fixed edge set, after its guard passes
//! 3. Screening and acceptance only while Recruiting
//! 4. Randomization and visits only while Active
//! 5. Completed and Terminated trials are never mutated
//! 6. A rejected operation leaves every field untouched
//!
//! The aggregate performs no locking. Callers sharing a trial across
//! threads serialize mutations per trial (see [`crate::InMemoryTrialRepository`]).

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use itertools::Itertools;
use thiserror::Error;

use crate::domain::{
    counters::EnrollmentCounters,
    events::TrialEvent,
    identifiers::{ParticipantId, TrialId},
    participant::{Participant, ParticipantStatus},
    policy::{ConstructionError, EnrollmentTargets, TransitionPolicy},
    snapshot::{ParticipantSnapshot, SnapshotError, TrialSnapshot},
    state::TrialState,
    validation::{Reasons, ValidationResult},
    visit::{Visit, VisitType},
};

// ============================================================================
// DOMAIN ERRORS
// ============================================================================

/// Errors that can occur during trial operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrialError {
    /// Guard or input validation failed; retry after fixing the data
    #[error("validation failed: {reasons}")]
    ValidationFailure { reasons: Reasons },

    /// Edge is not part of the lifecycle graph
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: TrialState, to: TrialState },

    /// Participant id is unknown to this trial
    #[error("participant {participant_id} not found")]
    NotFound { participant_id: ParticipantId },

    /// Operation not valid for the current trial or participant state
    #[error("cannot {operation}: {reason}")]
    InvalidOperation {
        operation: &'static str,
        reason: String,
    },
}

impl TrialError {
    /// Reasons carried by a validation failure; empty for other kinds.
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::ValidationFailure { reasons } => reasons.as_slice(),
            _ => &[],
        }
    }
}

// ============================================================================
// TRIAL AGGREGATE ROOT
// ============================================================================

/// Trial aggregate root.
///
/// Fields are private; the constructor, [`Trial::restore`] and the
/// operations below are the only ways to obtain or change a trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    id: TrialId,
    state: TrialState,
    enrollment: EnrollmentTargets,
    policy: TransitionPolicy,
    participants: Vec<Participant>,
    created_at: DateTime<Utc>,
    events: Vec<TrialEvent>,
}

impl Trial {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a trial in Planning with the default transition policy.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError` if either target is zero or
    /// `minimum > target`.
    pub fn new(
        target_enrollment: usize,
        minimum_enrollment: usize,
    ) -> Result<Self, ConstructionError> {
        Self::with_policy(target_enrollment, minimum_enrollment, TransitionPolicy::default())
    }

    /// Create a trial in Planning with an explicit policy.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError` if the enrollment targets are invalid.
    pub fn with_policy(
        target_enrollment: usize,
        minimum_enrollment: usize,
        policy: TransitionPolicy,
    ) -> Result<Self, ConstructionError> {
        let enrollment = EnrollmentTargets::new(target_enrollment, minimum_enrollment)?;
        let id = TrialId::generate();
        let now = Utc::now();

        tracing::info!(
            trial_id = %id,
            target_enrollment,
            minimum_enrollment,
            "trial created"
        );

        Ok(Self {
            id,
            state: TrialState::Planning,
            enrollment,
            policy,
            participants: Vec::new(),
            created_at: now,
            events: vec![TrialEvent::TrialCreated {
                trial_id: id,
                target_enrollment,
                minimum_enrollment,
                timestamp: now,
            }],
        })
    }

    /// Rebuild a trial from a stored snapshot.
    ///
    /// Every aggregate invariant is checked again; the restored trial
    /// carries no pending events.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` listing every violated invariant.
    pub fn restore(snapshot: TrialSnapshot) -> Result<Self, SnapshotError> {
        if let ValidationResult::Invalid(reasons) = snapshot.validate() {
            return Err(SnapshotError { reasons });
        }
        let enrollment =
            EnrollmentTargets::new(snapshot.target_enrollment, snapshot.minimum_enrollment)
                .map_err(|e| SnapshotError { reasons: e.reasons })?;

        let participants = snapshot
            .participants
            .into_iter()
            .map(|p| Participant::restored(p.id, p.status, p.visits))
            .collect();

        tracing::debug!(trial_id = %snapshot.id, state = %snapshot.state, "trial restored");

        Ok(Self {
            id: snapshot.id,
            state: snapshot.state,
            enrollment,
            policy: snapshot.policy,
            participants,
            created_at: snapshot.created_at,
            events: Vec::new(),
        })
    }

    /// Capture the persisted form of this trial. Pending events are not included.
    #[must_use]
    pub fn snapshot(&self) -> TrialSnapshot {
        TrialSnapshot {
            id: self.id,
            state: self.state,
            target_enrollment: self.enrollment.target(),
            minimum_enrollment: self.enrollment.minimum(),
            policy: self.policy,
            participants: self
                .participants
                .iter()
                .map(|p| ParticipantSnapshot {
                    id: p.id(),
                    status: p.status(),
                    visits: p.visits().to_vec(),
                })
                .collect(),
            created_at: self.created_at,
        }
    }

    // ========================================================================
    // QUERY METHODS
    // ========================================================================

    #[must_use]
    pub const fn id(&self) -> TrialId {
        self.id
    }

    #[must_use]
    pub const fn state(&self) -> TrialState {
        self.state
    }

    #[must_use]
    pub const fn enrollment(&self) -> EnrollmentTargets {
        self.enrollment
    }

    #[must_use]
    pub const fn target_enrollment(&self) -> usize {
        self.enrollment.target()
    }

    #[must_use]
    pub const fn minimum_enrollment(&self) -> usize {
        self.enrollment.minimum()
    }

    #[must_use]
    pub const fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Participants in screening order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    /// Enrollment counts, recomputed on every call.
    #[must_use]
    pub fn counters(&self) -> EnrollmentCounters {
        EnrollmentCounters::from_participants(&self.participants)
    }

    /// Recruitment is futile: Recruiting, screened at least
    /// `multiplier x target`, and fewer than `target` accepted.
    ///
    /// Advisory only; termination still needs an explicit [`Trial::terminate`].
    #[must_use]
    pub fn should_terminate(&self) -> bool {
        self.state == TrialState::Recruiting
            && self.policy.should_terminate(self.enrollment, &self.counters())
    }

    /// Dry-run the guard for `target` without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::InvalidTransition` if `target` is not reachable
    /// from the current state in one step.
    pub fn evaluate_transition(&self, target: TrialState) -> Result<ValidationResult, TrialError> {
        if !self.state.can_transition_to(target) {
            return Err(TrialError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        Ok(self
            .policy
            .evaluate(self.state, target, self.enrollment, &self.counters()))
    }

    /// Events recorded since construction or the last [`Trial::take_events`].
    #[must_use]
    pub fn events(&self) -> &[TrialEvent] {
        &self.events
    }

    /// Drain pending events, e.g. into an outbox.
    pub fn take_events(&mut self) -> Vec<TrialEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // LIFECYCLE TRANSITIONS
    // ========================================================================

    /// Move to `target` if the edge exists and its guard passes.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::InvalidTransition` for an edge outside the graph
    /// and `TrialError::ValidationFailure` when the guard fails.
    pub fn advance_to(&mut self, target: TrialState) -> Result<(), TrialError> {
        let from = self.state;
        self.evaluate_transition(target)
            .and_then(ValidationResult::into_result)
            .inspect_err(|error| {
                tracing::warn!(
                    trial_id = %self.id,
                    %from,
                    to = %target,
                    reasons = ?error.reasons(),
                    %error,
                    "transition rejected"
                );
            })?;

        self.state = target;
        self.events.push(TrialEvent::StateChanged {
            trial_id: self.id,
            from,
            to: target,
            timestamp: Utc::now(),
        });
        tracing::info!(trial_id = %self.id, %from, to = %target, "trial transitioned");
        Ok(())
    }

    /// Planning -> Recruiting.
    ///
    /// # Errors
    ///
    /// See [`Trial::advance_to`].
    pub fn start_recruiting(&mut self) -> Result<(), TrialError> {
        self.advance_to(TrialState::Recruiting)
    }

    /// Recruiting -> Active.
    ///
    /// # Errors
    ///
    /// See [`Trial::advance_to`].
    pub fn activate(&mut self) -> Result<(), TrialError> {
        self.advance_to(TrialState::Active)
    }

    /// Active -> Completed.
    ///
    /// # Errors
    ///
    /// See [`Trial::advance_to`].
    pub fn complete(&mut self) -> Result<(), TrialError> {
        self.advance_to(TrialState::Completed)
    }

    /// Recruiting -> Terminated (futility only) or Active -> Terminated.
    ///
    /// # Errors
    ///
    /// See [`Trial::advance_to`].
    pub fn terminate(&mut self) -> Result<(), TrialError> {
        self.advance_to(TrialState::Terminated)
    }

    // ========================================================================
    // PLANNING
    // ========================================================================

    /// Replace the enrollment targets while still in Planning.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::InvalidOperation` outside Planning and
    /// `TrialError::ValidationFailure` for invalid targets.
    pub fn revise_enrollment(
        &mut self,
        target_enrollment: usize,
        minimum_enrollment: usize,
    ) -> Result<(), TrialError> {
        self.require_state("revise enrollment", &[TrialState::Planning])?;
        self.enrollment = EnrollmentTargets::new(target_enrollment, minimum_enrollment)
            .map_err(|e| TrialError::ValidationFailure { reasons: e.reasons })?;

        self.events.push(TrialEvent::EnrollmentRevised {
            trial_id: self.id,
            target_enrollment,
            minimum_enrollment,
            timestamp: Utc::now(),
        });
        tracing::info!(
            trial_id = %self.id,
            target_enrollment,
            minimum_enrollment,
            "enrollment revised"
        );
        Ok(())
    }

    // ========================================================================
    // PARTICIPANT OPERATIONS
    // ========================================================================

    /// Add a new Screened participant. Recruiting only.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::InvalidOperation` outside Recruiting.
    pub fn screen_participant(&mut self) -> Result<ParticipantId, TrialError> {
        const OPERATION: &str = "screen participant";

        self.require_state(OPERATION, &[TrialState::Recruiting])?;
        let participant_id = ParticipantId::from_position(self.participants.len()).ok_or_else(|| {
            TrialError::InvalidOperation {
                operation: OPERATION,
                reason: "participant id space exhausted".to_string(),
            }
        })?;

        self.participants.push(Participant::screened(participant_id));
        self.events.push(TrialEvent::ParticipantScreened {
            trial_id: self.id,
            participant_id,
            timestamp: Utc::now(),
        });
        tracing::debug!(trial_id = %self.id, %participant_id, "participant screened");
        Ok(participant_id)
    }

    /// Screened -> Accepted. Recruiting only.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::NotFound` for an unknown id and
    /// `TrialError::InvalidOperation` for the wrong trial or participant state.
    pub fn accept_participant(&mut self, participant_id: ParticipantId) -> Result<(), TrialError> {
        self.change_status(
            "accept participant",
            &[TrialState::Recruiting],
            participant_id,
            ParticipantStatus::Accepted,
        )?;
        self.events.push(TrialEvent::ParticipantAccepted {
            trial_id: self.id,
            participant_id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Accepted -> Randomized. Active only.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::NotFound` for an unknown id and
    /// `TrialError::InvalidOperation` for the wrong trial or participant state.
    pub fn randomize_participant(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<(), TrialError> {
        self.change_status(
            "randomize participant",
            &[TrialState::Active],
            participant_id,
            ParticipantStatus::Randomized,
        )?;
        self.events.push(TrialEvent::ParticipantRandomized {
            trial_id: self.id,
            participant_id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Any non-withdrawn status -> Withdrawn. Recruiting or Active.
    ///
    /// Recorded visits are kept.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::NotFound` for an unknown id and
    /// `TrialError::InvalidOperation` for the wrong trial state or an
    /// already withdrawn participant.
    pub fn withdraw_participant(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<(), TrialError> {
        let previous_status = self.change_status(
            "withdraw participant",
            &[TrialState::Recruiting, TrialState::Active],
            participant_id,
            ParticipantStatus::Withdrawn,
        )?;
        self.events.push(TrialEvent::ParticipantWithdrawn {
            trial_id: self.id,
            participant_id,
            previous_status,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Record a visit for a Randomized participant. Active only.
    ///
    /// # Errors
    ///
    /// Returns `TrialError::NotFound` for an unknown id and
    /// `TrialError::InvalidOperation` for the wrong trial or participant
    /// state, or a second Baseline/Final visit.
    pub fn record_visit(
        &mut self,
        participant_id: ParticipantId,
        visit_type: VisitType,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), TrialError> {
        self.require_state("record visit", &[TrialState::Active])?;
        self.participant_mut(participant_id)?
            .record_visit(Visit::new(visit_type, recorded_at))?;

        self.events.push(TrialEvent::VisitRecorded {
            trial_id: self.id,
            participant_id,
            visit_type,
            recorded_at,
            timestamp: Utc::now(),
        });
        tracing::debug!(
            trial_id = %self.id,
            %participant_id,
            %visit_type,
            "visit recorded"
        );
        Ok(())
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn change_status(
        &mut self,
        operation: &'static str,
        allowed: &[TrialState],
        participant_id: ParticipantId,
        target: ParticipantStatus,
    ) -> Result<ParticipantStatus, TrialError> {
        self.require_state(operation, allowed)?;
        let trial_id = self.id;
        let previous = self
            .participant_mut(participant_id)?
            .transition_to(operation, target)?;

        tracing::debug!(
            %trial_id,
            %participant_id,
            from = %previous,
            to = %target,
            "participant status changed"
        );
        Ok(previous)
    }

    fn require_state(
        &self,
        operation: &'static str,
        allowed: &[TrialState],
    ) -> Result<(), TrialError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        let reason = if self.state.is_terminal() {
            format!("trial is {} and no longer accepts changes", self.state)
        } else {
            format!(
                "trial is {}; requires {}",
                self.state,
                allowed.iter().join(" or ")
            )
        };
        Err(TrialError::InvalidOperation { operation, reason })
    }

    fn participant_mut(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<&mut Participant, TrialError> {
        self.participants
            .iter_mut()
            .find(|p| p.id() == participant_id)
            .ok_or(TrialError::NotFound { participant_id })
    }
}

// ============================================================================
// TESTS
// ============================================================================

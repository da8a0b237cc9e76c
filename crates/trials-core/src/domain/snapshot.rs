//! Persisted form of a trial.
//!
//! A [`TrialSnapshot`] is the unit of load/save. It is plain data with public
//! fields; turning it back into a [`crate::Trial`] goes through
//! [`crate::Trial::restore`], which runs [`TrialSnapshot::validate`] first.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    counters::EnrollmentCounters,
    identifiers::{ParticipantId, TrialId},
    participant::{Participant, ParticipantStatus},
    policy::{EnrollmentTargets, TransitionPolicy},
    state::TrialState,
    validation::{Reasons, ValidationResult},
    visit::{Visit, VisitType},
};

/// Snapshot data violates an aggregate invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("snapshot rejected: {reasons}")]
pub struct SnapshotError {
    pub reasons: Reasons,
}

/// Stored participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    pub id: ParticipantId,
    pub status: ParticipantStatus,
    #[serde(default)]
    pub visits: Vec<Visit>,
}

/// Stored trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSnapshot {
    pub id: TrialId,
    pub state: TrialState,
    pub target_enrollment: usize,
    pub minimum_enrollment: usize,
    #[serde(default)]
    pub policy: TransitionPolicy,
    #[serde(default)]
    pub participants: Vec<ParticipantSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl TrialSnapshot {
    /// Check every invariant a live trial guarantees.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        TransitionPolicy::validate_enrollment(
            Some(self.target_enrollment),
            Some(self.minimum_enrollment),
        )
        .and(self.validate_participant_ids())
        .and(self.validate_visits())
        .and(self.validate_lifecycle())
    }

    /// Ids must be 1, 2, 3, ... in screening order.
    fn validate_participant_ids(&self) -> ValidationResult {
        let reasons = self
            .participants
            .iter()
            .enumerate()
            .filter_map(|(position, p)| {
                let expected = ParticipantId::from_position(position)?;
                (p.id != expected).then(|| {
                    format!(
                        "participant at position {} has id {}, expected {expected}",
                        position + 1,
                        p.id
                    )
                })
            })
            .collect();
        ValidationResult::from_reasons(reasons)
    }

    fn validate_visits(&self) -> ValidationResult {
        let mut reasons = Vec::new();

        for participant in &self.participants {
            if !participant.visits.is_empty() && !participant.status.may_hold_visits() {
                reasons.push(format!(
                    "participant {} is {} but holds visits",
                    participant.id, participant.status
                ));
            }

            let mut per_type: HashMap<VisitType, usize> = HashMap::new();
            for visit in &participant.visits {
                *per_type.entry(visit.visit_type()).or_default() += 1;
            }
            let mut duplicated: Vec<(VisitType, usize)> = per_type
                .into_iter()
                .filter(|(visit_type, count)| visit_type.is_singleton() && *count > 1)
                .collect();
            duplicated.sort_unstable();
            for (visit_type, count) in duplicated {
                reasons.push(format!(
                    "participant {} holds {count} {visit_type} visits",
                    participant.id
                ));
            }
        }

        ValidationResult::from_reasons(reasons)
    }

    /// Data that the lifecycle could never have produced in `state`.
    fn validate_lifecycle(&self) -> ValidationResult {
        let has_randomized = self
            .participants
            .iter()
            .any(|p| p.status == ParticipantStatus::Randomized);
        let has_visits = self.participants.iter().any(|p| !p.visits.is_empty());

        match self.state {
            TrialState::Planning if !self.participants.is_empty() => {
                ValidationResult::invalid("a Planning trial cannot hold participants")
            }
            TrialState::Recruiting => {
                let mut reasons = Vec::new();
                if has_randomized {
                    reasons.push(
                        "a Recruiting trial cannot hold randomized participants".to_string(),
                    );
                }
                if has_visits {
                    reasons.push("a Recruiting trial cannot hold visits".to_string());
                }
                ValidationResult::from_reasons(reasons)
            }
            TrialState::Active => self.validate_activated(),
            TrialState::Completed => self
                .validate_activated()
                .and(TransitionPolicy::completion_readiness(&self.counters())),
            TrialState::Terminated => {
                let futile = !has_randomized && !has_visits && self.recruitment_was_futile();
                if futile || self.validate_activated().is_valid() {
                    ValidationResult::Valid
                } else {
                    ValidationResult::invalid(format!(
                        "Terminated trial: participants past screening {} below minimum {} \
                         and recruitment was not futile",
                        self.enrolled(),
                        self.minimum_enrollment
                    ))
                }
            }
            TrialState::Planning => ValidationResult::Valid,
        }
    }

    /// Activation needed `accepted >= minimum`. Participants are never added
    /// after Recruiting and never return to Screened, so the count of
    /// participants past screening can only hold or grow from then on.
    fn validate_activated(&self) -> ValidationResult {
        let enrolled = self.enrolled();
        if enrolled < self.minimum_enrollment {
            return ValidationResult::invalid(format!(
                "{} trial: participants past screening {enrolled} below minimum {}",
                self.state, self.minimum_enrollment
            ));
        }
        ValidationResult::Valid
    }

    fn recruitment_was_futile(&self) -> bool {
        EnrollmentTargets::new(self.target_enrollment, self.minimum_enrollment)
            .is_ok_and(|targets| self.policy.should_terminate(targets, &self.counters()))
    }

    fn enrolled(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.status != ParticipantStatus::Screened)
            .count()
    }

    fn counters(&self) -> EnrollmentCounters {
        let participants: Vec<Participant> = self
            .participants
            .iter()
            .map(|p| Participant::restored(p.id, p.status, p.visits.clone()))
            .collect();
        EnrollmentCounters::from_participants(&participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(state: TrialState, participants: Vec<ParticipantSnapshot>) -> TrialSnapshot {
        TrialSnapshot {
            id: TrialId::generate(),
            state,
            target_enrollment: 10,
            minimum_enrollment: 1,
            policy: TransitionPolicy::default(),
            participants,
            created_at: Utc::now(),
        }
    }

    fn many(status: ParticipantStatus, range: std::ops::Range<usize>) -> Vec<ParticipantSnapshot> {
        range.map(|position| participant(position, status, &[])).collect()
    }

    fn participant(
        position: usize,
        status: ParticipantStatus,
        visits: &[VisitType],
    ) -> ParticipantSnapshot {
        ParticipantSnapshot {
            id: ParticipantId::from_position(position).expect("fits"),
            status,
            visits: visits.iter().map(|t| Visit::new(*t, Utc::now())).collect(),
        }
    }

    #[test]
    fn test_valid_active_snapshot() {
        let snap = snapshot(
            TrialState::Active,
            vec![
                participant(0, ParticipantStatus::Randomized, &[VisitType::Baseline]),
                participant(1, ParticipantStatus::Accepted, &[]),
            ],
        );
        assert!(snap.validate().is_valid());
    }

    #[test]
    fn test_rejects_bad_targets() {
        let mut snap = snapshot(TrialState::Planning, Vec::new());
        snap.minimum_enrollment = 11;
        assert_eq!(
            snap.validate().reasons(),
            &["minimum enrollment 11 exceeds target 10".to_string()]
        );
    }

    #[test]
    fn test_rejects_gaps_in_participant_ids() {
        let snap = snapshot(
            TrialState::Recruiting,
            vec![
                participant(0, ParticipantStatus::Screened, &[]),
                participant(2, ParticipantStatus::Screened, &[]),
            ],
        );
        assert_eq!(
            snap.validate().reasons(),
            &["participant at position 2 has id P-0003, expected P-0002".to_string()]
        );
    }

    #[test]
    fn test_rejects_duplicate_final_visits() {
        let snap = snapshot(
            TrialState::Active,
            vec![participant(
                0,
                ParticipantStatus::Randomized,
                &[VisitType::Final, VisitType::FollowUp, VisitType::FollowUp, VisitType::Final],
            )],
        );
        assert_eq!(
            snap.validate().reasons(),
            &["participant P-0001 holds 2 Final visits".to_string()]
        );
    }

    #[test]
    fn test_rejects_visits_on_accepted_participant() {
        let snap = snapshot(
            TrialState::Active,
            vec![participant(0, ParticipantStatus::Accepted, &[VisitType::Baseline])],
        );
        assert!(!snap.validate().is_valid());
    }

    #[test]
    fn test_rejects_participants_in_planning() {
        let snap = snapshot(
            TrialState::Planning,
            vec![participant(0, ParticipantStatus::Screened, &[])],
        );
        assert_eq!(
            snap.validate().reasons(),
            &["a Planning trial cannot hold participants".to_string()]
        );
    }

    #[test]
    fn test_rejects_randomized_while_recruiting() {
        let snap = snapshot(
            TrialState::Recruiting,
            vec![participant(0, ParticipantStatus::Randomized, &[])],
        );
        assert!(!snap.validate().is_valid());
    }

    #[test]
    fn test_completed_requires_final_visits() {
        let snap = snapshot(
            TrialState::Completed,
            vec![
                participant(0, ParticipantStatus::Randomized, &[VisitType::Final]),
                participant(1, ParticipantStatus::Randomized, &[VisitType::Baseline]),
            ],
        );
        assert_eq!(
            snap.validate().reasons(),
            &["1 randomized participant missing a Final visit".to_string()]
        );
    }

    #[test]
    fn test_rejects_active_without_participants() {
        let mut snap = snapshot(TrialState::Active, Vec::new());
        snap.minimum_enrollment = 6;
        assert_eq!(
            snap.validate().reasons(),
            &["Active trial: participants past screening 0 below minimum 6".to_string()]
        );
    }

    #[test]
    fn test_rejects_active_below_minimum() {
        let mut snap = snapshot(TrialState::Active, many(ParticipantStatus::Accepted, 0..2));
        snap.minimum_enrollment = 6;
        assert!(!snap.validate().is_valid());
    }

    #[test]
    fn test_withdrawn_participants_count_toward_activation_minimum() {
        let mut participants = many(ParticipantStatus::Randomized, 0..4);
        participants.extend(many(ParticipantStatus::Withdrawn, 4..6));
        participants.extend(many(ParticipantStatus::Screened, 6..8));
        let mut snap = snapshot(TrialState::Active, participants);
        snap.minimum_enrollment = 6;
        assert!(snap.validate().is_valid());
    }

    #[test]
    fn test_rejects_completed_below_minimum() {
        let mut snap = snapshot(
            TrialState::Completed,
            vec![participant(0, ParticipantStatus::Randomized, &[VisitType::Final])],
        );
        snap.minimum_enrollment = 6;
        assert_eq!(
            snap.validate().reasons(),
            &["Completed trial: participants past screening 1 below minimum 6".to_string()]
        );
    }

    #[test]
    fn test_rejects_terminated_without_futility_or_activation() {
        let mut snap = snapshot(
            TrialState::Terminated,
            vec![participant(0, ParticipantStatus::Screened, &[])],
        );
        snap.minimum_enrollment = 6;
        assert_eq!(
            snap.validate().reasons(),
            &["Terminated trial: participants past screening 0 below minimum 6 \
               and recruitment was not futile"
                .to_string()]
        );
    }

    #[test]
    fn test_terminated_after_futile_recruitment() {
        let mut participants = many(ParticipantStatus::Accepted, 0..4);
        participants.extend(many(ParticipantStatus::Screened, 4..20));
        let mut snap = snapshot(TrialState::Terminated, participants);
        snap.minimum_enrollment = 6;
        assert!(snap.validate().is_valid());
    }

    #[test]
    fn test_rejects_futile_termination_with_randomized_participants() {
        let mut participants = many(ParticipantStatus::Screened, 0..19);
        participants.push(participant(19, ParticipantStatus::Randomized, &[]));
        let mut snap = snapshot(TrialState::Terminated, participants);
        snap.minimum_enrollment = 6;
        assert!(!snap.validate().is_valid());
    }

    #[test]
    fn test_terminated_after_activation() {
        let mut snap = snapshot(
            TrialState::Terminated,
            many(ParticipantStatus::Randomized, 0..6),
        );
        snap.minimum_enrollment = 6;
        assert!(snap.validate().is_valid());
    }

    #[test]
    fn test_collects_every_reason() {
        let mut snap = snapshot(
            TrialState::Planning,
            vec![participant(3, ParticipantStatus::Screened, &[VisitType::Final])],
        );
        snap.target_enrollment = 0;

        assert_eq!(snap.validate().reasons().len(), 5);
    }

    #[test]
    fn test_snapshot_json_defaults() {
        let json = serde_json::json!({
            "id": TrialId::generate().to_string(),
            "state": "Planning",
            "target_enrollment": 10,
            "minimum_enrollment": 6,
            "created_at": "2026-01-01T00:00:00Z",
        })
        .to_string();
        let snap: TrialSnapshot = serde_json::from_str(&json).expect("valid snapshot json");

        assert!(snap.participants.is_empty());
        assert_eq!(snap.policy, TransitionPolicy::default());
        assert!(snap.validate().is_valid());
    }
}

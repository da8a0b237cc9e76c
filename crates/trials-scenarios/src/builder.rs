//! Field-by-field construction of trial snapshots.
//!
//! Participants get ids in the order they are added, so the builder never
//! produces gaps. Anything else the domain forbids (visits on a Screened
//! participant, Randomized participants while Recruiting, ...) is caught by
//! [`TrialSnapshotBuilder::build`].

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use trials_core::{
    ParticipantId, ParticipantSnapshot, ParticipantStatus, SnapshotError, TransitionPolicy, Trial,
    TrialId, TrialSnapshot, TrialState, Visit, VisitType,
};

const DEFAULT_TARGET_ENROLLMENT: usize = 10;
const DEFAULT_MINIMUM_ENROLLMENT: usize = 6;

#[derive(Debug, Clone)]
struct PendingParticipant {
    status: ParticipantStatus,
    visits: Vec<VisitType>,
}

/// Builder for [`TrialSnapshot`] and, through restore, [`Trial`].
///
/// Defaults: Planning, target 10, minimum 6, default policy, no participants.
#[derive(Debug, Clone)]
pub struct TrialSnapshotBuilder {
    id: TrialId,
    state: TrialState,
    target_enrollment: usize,
    minimum_enrollment: usize,
    policy: TransitionPolicy,
    participants: Vec<PendingParticipant>,
    created_at: DateTime<Utc>,
}

impl Default for TrialSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrialSnapshotBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TrialId::generate(),
            state: TrialState::Planning,
            target_enrollment: DEFAULT_TARGET_ENROLLMENT,
            minimum_enrollment: DEFAULT_MINIMUM_ENROLLMENT,
            policy: TransitionPolicy::default(),
            participants: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn id(mut self, id: TrialId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub const fn state(mut self, state: TrialState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub const fn enrollment(mut self, target: usize, minimum: usize) -> Self {
        self.target_enrollment = target;
        self.minimum_enrollment = minimum;
        self
    }

    #[must_use]
    pub const fn policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Append `count` participants with `status` and no visits.
    #[must_use]
    pub fn participants(mut self, status: ParticipantStatus, count: usize) -> Self {
        self.participants
            .extend(std::iter::repeat_with(|| PendingParticipant {
                status,
                visits: Vec::new(),
            })
            .take(count));
        self
    }

    /// Append `count` participants with `status`, each holding `visits`.
    #[must_use]
    pub fn participants_with_visits(
        mut self,
        status: ParticipantStatus,
        count: usize,
        visits: &[VisitType],
    ) -> Self {
        self.participants
            .extend(std::iter::repeat_with(|| PendingParticipant {
                status,
                visits: visits.to_vec(),
            })
            .take(count));
        self
    }

    /// The raw snapshot, not yet validated.
    #[must_use]
    pub fn snapshot(&self) -> TrialSnapshot {
        let ids = (1..=u32::MAX)
            .filter_map(NonZeroU32::new)
            .map(ParticipantId::new);

        TrialSnapshot {
            id: self.id,
            state: self.state,
            target_enrollment: self.target_enrollment,
            minimum_enrollment: self.minimum_enrollment,
            policy: self.policy,
            participants: self
                .participants
                .iter()
                .zip(ids)
                .map(|(pending, id)| ParticipantSnapshot {
                    id,
                    status: pending.status,
                    visits: pending
                        .visits
                        .iter()
                        .map(|visit_type| Visit::new(*visit_type, self.created_at))
                        .collect(),
                })
                .collect(),
            created_at: self.created_at,
        }
    }

    /// Restore a [`Trial`] from the assembled snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the data breaks an aggregate invariant.
    pub fn build(&self) -> Result<Trial, SnapshotError> {
        Trial::restore(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builds_planning_trial() {
        let trial = TrialSnapshotBuilder::new().build().expect("valid defaults");
        assert_eq!(trial.state(), TrialState::Planning);
        assert_eq!(trial.target_enrollment(), 10);
        assert_eq!(trial.minimum_enrollment(), 6);
        assert!(trial.participants().is_empty());
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let snapshot = TrialSnapshotBuilder::new()
            .state(TrialState::Recruiting)
            .participants(ParticipantStatus::Accepted, 2)
            .participants(ParticipantStatus::Screened, 1)
            .snapshot();

        let ids: Vec<String> = snapshot.participants.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, ["P-0001", "P-0002", "P-0003"]);
        assert_eq!(snapshot.participants[2].status, ParticipantStatus::Screened);
    }

    #[test]
    fn test_build_rejects_impossible_state() {
        let result = TrialSnapshotBuilder::new()
            .state(TrialState::Recruiting)
            .participants_with_visits(ParticipantStatus::Randomized, 1, &[VisitType::Baseline])
            .build();

        let err = result.expect_err("randomized while recruiting");
        assert_eq!(err.reasons.as_slice().len(), 2);
    }

    #[test]
    fn test_build_rejects_unreachable_post_recruiting_states() {
        let empty_active = TrialSnapshotBuilder::new().state(TrialState::Active).build();
        assert!(empty_active.is_err());

        let under_enrolled = TrialSnapshotBuilder::new()
            .state(TrialState::Active)
            .participants(ParticipantStatus::Accepted, 2)
            .build();
        assert!(under_enrolled.is_err());

        let unexplained_termination = TrialSnapshotBuilder::new()
            .state(TrialState::Terminated)
            .participants(ParticipantStatus::Screened, 1)
            .build();
        assert!(unexplained_termination.is_err());
    }

    #[test]
    fn test_build_rejects_bad_targets() {
        let result = TrialSnapshotBuilder::new().enrollment(5, 6).build();
        assert!(result.is_err());
    }
}

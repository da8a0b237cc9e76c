//! Participant entity
//!
//! Participants are owned by their [`crate::Trial`] and change only through
//! the trial's operations. Status moves forward only:
//!
//! ```text
//! Screened -> Accepted -> Randomized
//!     \          |           /
//!      +----> Withdrawn <---+
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::domain::{
    aggregates::TrialError,
    identifiers::ParticipantId,
    visit::{Visit, VisitType},
};

/// Enrollment status of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum ParticipantStatus {
    Screened,
    Accepted,
    Randomized,
    Withdrawn,
}

impl ParticipantStatus {
    /// Counts toward the `accepted` tally.
    #[must_use]
    pub const fn counts_as_accepted(self) -> bool {
        matches!(self, Self::Accepted | Self::Randomized)
    }

    /// May hold visits. Withdrawn participants keep theirs for audit.
    #[must_use]
    pub const fn may_hold_visits(self) -> bool {
        matches!(self, Self::Randomized | Self::Withdrawn)
    }

    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Screened, Self::Accepted)
                | (Self::Accepted, Self::Randomized)
                | (Self::Screened | Self::Accepted | Self::Randomized, Self::Withdrawn)
        )
    }
}

/// A screened individual and their visit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: ParticipantId,
    status: ParticipantStatus,
    visits: Vec<Visit>,
}

impl Participant {
    pub(crate) const fn screened(id: ParticipantId) -> Self {
        Self {
            id,
            status: ParticipantStatus::Screened,
            visits: Vec::new(),
        }
    }

    /// Rebuild from already-validated snapshot data.
    pub(crate) const fn restored(
        id: ParticipantId,
        status: ParticipantStatus,
        visits: Vec<Visit>,
    ) -> Self {
        Self { id, status, visits }
    }

    #[must_use]
    pub const fn id(&self) -> ParticipantId {
        self.id
    }

    #[must_use]
    pub const fn status(&self) -> ParticipantStatus {
        self.status
    }

    /// Visits in the order they were recorded.
    #[must_use]
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    #[must_use]
    pub fn has_visit(&self, visit_type: VisitType) -> bool {
        self.visits.iter().any(|v| v.visit_type() == visit_type)
    }

    /// Randomized and holding a Final visit.
    #[must_use]
    pub fn has_completed_final_visit(&self) -> bool {
        self.status == ParticipantStatus::Randomized && self.has_visit(VisitType::Final)
    }

    /// Move to `target`, returning the previous status.
    pub(crate) fn transition_to(
        &mut self,
        operation: &'static str,
        target: ParticipantStatus,
    ) -> Result<ParticipantStatus, TrialError> {
        if !self.status.can_transition_to(target) {
            return Err(TrialError::InvalidOperation {
                operation,
                reason: format!(
                    "participant {} is {} and cannot become {target}",
                    self.id, self.status
                ),
            });
        }
        let previous = self.status;
        self.status = target;
        Ok(previous)
    }

    pub(crate) fn record_visit(&mut self, visit: Visit) -> Result<(), TrialError> {
        const OPERATION: &str = "record visit";

        if self.status != ParticipantStatus::Randomized {
            return Err(TrialError::InvalidOperation {
                operation: OPERATION,
                reason: format!(
                    "participant {} is {}; visits require a randomized participant",
                    self.id, self.status
                ),
            });
        }

        let visit_type = visit.visit_type();
        if visit_type.is_singleton() && self.has_visit(visit_type) {
            return Err(TrialError::InvalidOperation {
                operation: OPERATION,
                reason: format!(
                    "participant {} already has a {visit_type} visit",
                    self.id
                ),
            });
        }

        self.visits.push(visit);
        Ok(())
    }
}

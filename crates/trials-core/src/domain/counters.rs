//! Derived enrollment counts.
//!
//! Always recomputed from the participant collection; never cached on the
//! aggregate, so the counts cannot drift from the participants themselves.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::domain::participant::{Participant, ParticipantStatus};

/// Snapshot of enrollment tallies for one trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentCounters {
    /// Every participant ever screened, withdrawn ones included.
    pub screened: usize,
    /// Accepted or Randomized, not withdrawn.
    pub accepted: usize,
    /// Currently Randomized.
    pub randomized: usize,
    /// Randomized participants holding a Final visit.
    pub completed_final_visit: usize,
}

impl EnrollmentCounters {
    #[must_use]
    pub fn from_participants<'a>(participants: impl IntoIterator<Item = &'a Participant>) -> Self {
        participants
            .into_iter()
            .fold(Self::default(), |mut counters, participant| {
                counters.screened += 1;
                if participant.status().counts_as_accepted() {
                    counters.accepted += 1;
                }
                if participant.status() == ParticipantStatus::Randomized {
                    counters.randomized += 1;
                    if participant.has_completed_final_visit() {
                        counters.completed_final_visit += 1;
                    }
                }
                counters
            })
    }

    /// Randomized participants still missing their Final visit.
    #[must_use]
    pub const fn outstanding_final_visits(&self) -> usize {
        self.randomized.saturating_sub(self.completed_final_visit)
    }
}

//! Domain events
//!
//! Every committed mutation of a [`crate::Trial`] appends one event. Rejected
//! operations append nothing, so the event list is an exact audit of what
//! changed.
//!
//! # Usage
//!
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use trials_core::{Trial, TrialEvent};
//!
//! let mut trial = Trial::new(10, 6)?;
//! trial.start_recruiting()?;
//!
//! let events = trial.take_events();
//! assert_eq!(events.len(), 2);
//! assert!(matches!(events[1], TrialEvent::StateChanged { .. }));
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    identifiers::{ParticipantId, TrialId},
    participant::ParticipantStatus,
    state::TrialState,
    visit::VisitType,
};

/// Something that happened to a trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum TrialEvent {
    /// Trial constructed in Planning
    TrialCreated {
        trial_id: TrialId,
        target_enrollment: usize,
        minimum_enrollment: usize,
        timestamp: DateTime<Utc>,
    },

    /// Enrollment targets changed during Planning
    EnrollmentRevised {
        trial_id: TrialId,
        target_enrollment: usize,
        minimum_enrollment: usize,
        timestamp: DateTime<Utc>,
    },

    /// Lifecycle transition committed
    StateChanged {
        trial_id: TrialId,
        from: TrialState,
        to: TrialState,
        timestamp: DateTime<Utc>,
    },

    ParticipantScreened {
        trial_id: TrialId,
        participant_id: ParticipantId,
        timestamp: DateTime<Utc>,
    },

    ParticipantAccepted {
        trial_id: TrialId,
        participant_id: ParticipantId,
        timestamp: DateTime<Utc>,
    },

    ParticipantRandomized {
        trial_id: TrialId,
        participant_id: ParticipantId,
        timestamp: DateTime<Utc>,
    },

    ParticipantWithdrawn {
        trial_id: TrialId,
        participant_id: ParticipantId,
        previous_status: ParticipantStatus,
        timestamp: DateTime<Utc>,
    },

    VisitRecorded {
        trial_id: TrialId,
        participant_id: ParticipantId,
        visit_type: VisitType,
        recorded_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
}

impl TrialEvent {
    /// Get the timestamp for when this event occurred
    #[must_use]
    pub const fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::TrialCreated { timestamp, .. }
            | Self::EnrollmentRevised { timestamp, .. }
            | Self::StateChanged { timestamp, .. }
            | Self::ParticipantScreened { timestamp, .. }
            | Self::ParticipantAccepted { timestamp, .. }
            | Self::ParticipantRandomized { timestamp, .. }
            | Self::ParticipantWithdrawn { timestamp, .. }
            | Self::VisitRecorded { timestamp, .. } => timestamp,
        }
    }

    #[must_use]
    pub const fn trial_id(&self) -> &TrialId {
        match self {
            Self::TrialCreated { trial_id, .. }
            | Self::EnrollmentRevised { trial_id, .. }
            | Self::StateChanged { trial_id, .. }
            | Self::ParticipantScreened { trial_id, .. }
            | Self::ParticipantAccepted { trial_id, .. }
            | Self::ParticipantRandomized { trial_id, .. }
            | Self::ParticipantWithdrawn { trial_id, .. }
            | Self::VisitRecorded { trial_id, .. } => trial_id,
        }
    }

    /// Get the event type as a string
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::TrialCreated { .. } => "trial_created",
            Self::EnrollmentRevised { .. } => "enrollment_revised",
            Self::StateChanged { .. } => "state_changed",
            Self::ParticipantScreened { .. } => "participant_screened",
            Self::ParticipantAccepted { .. } => "participant_accepted",
            Self::ParticipantRandomized { .. } => "participant_randomized",
            Self::ParticipantWithdrawn { .. } => "participant_withdrawn",
            Self::VisitRecorded { .. } => "visit_recorded",
        }
    }
}

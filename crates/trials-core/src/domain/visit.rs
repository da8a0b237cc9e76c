//! Visit records
//!
//! A [`Visit`] is written once and never changed. Baseline and Final are
//! singletons per participant; FollowUp may recur.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Stage of a participant's observation schedule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum VisitType {
    Baseline,
    FollowUp,
    Final,
}

impl VisitType {
    /// At most one visit of this type per participant.
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        matches!(self, Self::Baseline | Self::Final)
    }
}

/// One recorded clinical visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    visit_type: VisitType,
    recorded_at: DateTime<Utc>,
}

impl Visit {
    #[must_use]
    pub const fn new(visit_type: VisitType, recorded_at: DateTime<Utc>) -> Self {
        Self {
            visit_type,
            recorded_at,
        }
    }

    #[must_use]
    pub const fn visit_type(&self) -> VisitType {
        self.visit_type
    }

    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

//! Trial lifecycle state
//!
//! The edge set is fixed:
//!
//! ```text
//! Planning -> Recruiting -> Active -> Completed
//!                  |           |
//!                  +-----------+--> Terminated
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Lifecycle state of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum TrialState {
    /// Protocol and enrollment targets being settled
    Planning,
    /// Screening and accepting participants
    Recruiting,
    /// Randomized participants under observation
    Active,
    /// Every randomized participant reached the Final visit
    Completed,
    /// Stopped early
    Terminated,
}

impl TrialState {
    /// Check if a transition from self to target is on the fixed edge set
    #[must_use]
    #[allow(clippy::match_same_arms)] // More readable as explicit patterns
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Planning, Self::Recruiting) => true,
            (Self::Recruiting, Self::Active | Self::Terminated) => true,
            (Self::Active, Self::Completed | Self::Terminated) => true,
            // Completed and Terminated are terminal; no self-loops
            _ => false,
        }
    }

    /// Get all valid target states from this state
    #[must_use]
    pub fn valid_transitions(self) -> Vec<Self> {
        Self::iter()
            .filter(|target| self.can_transition_to(*target))
            .collect()
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_edge_set() {
        assert_eq!(TrialState::Planning.valid_transitions(), vec![TrialState::Recruiting]);
        assert_eq!(
            TrialState::Recruiting.valid_transitions(),
            vec![TrialState::Active, TrialState::Terminated]
        );
        assert_eq!(
            TrialState::Active.valid_transitions(),
            vec![TrialState::Completed, TrialState::Terminated]
        );
        assert!(TrialState::Completed.valid_transitions().is_empty());
        assert!(TrialState::Terminated.valid_transitions().is_empty());
    }

    #[test]
    fn test_terminal_states_have_no_edges() {
        for state in TrialState::iter().filter(|s| s.is_terminal()) {
            for target in TrialState::iter() {
                assert!(!state.can_transition_to(target), "{state} -> {target}");
            }
        }
    }

    #[test]
    fn test_no_self_loops() {
        for state in TrialState::iter() {
            assert!(!state.can_transition_to(state));
        }
    }
}

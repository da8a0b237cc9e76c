//! trials-core - clinical trial lifecycle engine
//!
//! This crate provides:
//! - The [`Trial`] aggregate root and its five-state lifecycle
//! - Participant screening, acceptance, randomization and visit tracking
//! - Derived [`EnrollmentCounters`] and the [`TransitionPolicy`] guards
//! - Domain events, snapshots and the repository boundary
//! - Layered configuration and `tracing` setup
//!
//! # Example
//!
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use trials_core::{Trial, TrialState};
//!
//! let mut trial = Trial::new(10, 6)?;
//! trial.start_recruiting()?;
//!
//! for _ in 0..6 {
//!     let id = trial.screen_participant()?;
//!     trial.accept_participant(id)?;
//! }
//!
//! trial.activate()?;
//! assert_eq!(trial.state(), TrialState::Active);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod domain;
pub mod error;
pub mod in_memory;
pub mod telemetry;

pub use config::{EnrollmentConfig, LoggingConfig, TrialsConfig};
pub use domain::{
    ConstructionError, EnrollmentCounters, EnrollmentTargets, IdentifierError, Participant,
    ParticipantId, ParticipantSnapshot, ParticipantStatus, Reasons, RepositoryError,
    RepositoryResult, SnapshotError, TransitionPolicy, Trial, TrialError, TrialEvent, TrialId,
    TrialRepository, TrialSnapshot, TrialState, ValidationResult, Visit, VisitType,
};
pub use error::{Error, Result};
pub use in_memory::{InMemoryTrialRepository, Updated};

//! # Domain Layer
//!
//! The clinical trial lifecycle engine. Everything here is pure and
//! synchronous: no I/O, no clocks hidden behind traits, no internal locking.
//!
//! ## Module Structure
//!
//! - **`identifiers`** - [`TrialId`] and [`ParticipantId`] newtypes
//! - **`visit`** - immutable [`Visit`] records and [`VisitType`]
//! - **`participant`** - [`Participant`] and its status machine
//! - **`counters`** - derived [`EnrollmentCounters`]
//! - **`validation`** - [`ValidationResult`] with a non-empty reason list
//! - **`state`** - [`TrialState`] and the fixed edge set
//! - **`policy`** - [`TransitionPolicy`] guard functions
//! - **`aggregates`** - the [`Trial`] aggregate root
//! - **`events`** - [`TrialEvent`] audit records
//! - **`snapshot`** - [`TrialSnapshot`] for load/save
//! - **`repository`** - [`TrialRepository`] persistence boundary
//!
//! ## Error Handling
//!
//! - **`ConstructionError`** - invalid initial enrollment targets
//! - **`TrialError`** - rejected operation; the aggregate is left unchanged
//! - **`SnapshotError`** - stored data violates an aggregate invariant
//! - **`RepositoryError`** - persistence boundary failures
//!
//! All domain errors are expected business outcomes, never panics.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod aggregates;
pub mod counters;
pub mod events;
pub mod identifiers;
pub mod participant;
pub mod policy;
pub mod repository;
pub mod snapshot;
pub mod state;
pub mod validation;
pub mod visit;

pub use aggregates::{Trial, TrialError};
pub use counters::EnrollmentCounters;
pub use events::TrialEvent;
pub use identifiers::{IdentifierError, ParticipantId, TrialId};
pub use participant::{Participant, ParticipantStatus};
pub use policy::{ConstructionError, EnrollmentTargets, TransitionPolicy};
pub use repository::{RepositoryError, RepositoryResult, TrialRepository};
pub use snapshot::{ParticipantSnapshot, SnapshotError, TrialSnapshot};
pub use state::TrialState;
pub use validation::{Reasons, ValidationResult};
pub use visit::{Visit, VisitType};

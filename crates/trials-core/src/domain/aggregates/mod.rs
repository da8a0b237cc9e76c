//! # Aggregate Roots
//!
//! [`Trial`] is the only aggregate: the consistency boundary for the
//! lifecycle state, the enrollment targets and every participant.
//!
//! **Business rules:**
//! - State moves only along the fixed edge set of [`crate::TrialState`]
//! - Every guarded edge is evaluated by [`crate::TransitionPolicy`] first
//! - Screening and acceptance happen only while Recruiting
//! - Randomization and visits happen only while Active
//! - Completed and Terminated trials are read-only
//!
//! A rejected operation leaves the aggregate exactly as it was.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod trial;

pub use trial::{Trial, TrialError};

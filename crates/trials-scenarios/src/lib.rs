//! trials-scenarios - test support for trials-core
//!
//! Builds trials in arbitrary intermediate states without a long chain of
//! lifecycle calls. Every trial still goes through [`trials_core::Trial::restore`],
//! so nothing here can produce data the domain would reject.
//!
//! - [`TrialSnapshotBuilder`] assembles a snapshot field by field
//! - [`scenarios`] holds the named fixtures used across test suites
//!
//! # Example
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use trials_core::{ParticipantStatus, TrialState};
//! use trials_scenarios::TrialSnapshotBuilder;
//!
//! let trial = TrialSnapshotBuilder::new()
//!     .state(TrialState::Recruiting)
//!     .participants(ParticipantStatus::Accepted, 5)
//!     .build()?;
//!
//! let verdict = trial.evaluate_transition(TrialState::Active)?;
//! assert_eq!(verdict.reasons(), ["accepted enrollment 5 below minimum 6"]);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod builder;
pub mod scenarios;

pub use builder::TrialSnapshotBuilder;

use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Honors `RUST_LOG`, defaulting to `warn`.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

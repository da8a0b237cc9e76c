//! Named trial fixtures.
//!
//! All scenarios use target 10 and minimum 6.

use anyhow::{Context, Result};
use trials_core::{ParticipantStatus, Trial, TrialState, VisitType};

use crate::TrialSnapshotBuilder;

fn restore(name: &str, builder: &TrialSnapshotBuilder) -> Result<Trial> {
    let trial = builder
        .build()
        .with_context(|| format!("scenario '{name}' produced an invalid trial"))?;
    tracing::debug!(
        scenario = name,
        trial_id = %trial.id(),
        state = %trial.state(),
        "scenario built"
    );
    Ok(trial)
}

/// Planning with valid targets; `start_recruiting` succeeds.
pub fn planning_ready_for_recruiting() -> Result<Trial> {
    restore("planning_ready_for_recruiting", &TrialSnapshotBuilder::new())
}

/// Recruiting with all 10 target participants accepted and two more
/// screened; `activate` succeeds and futility does not apply.
pub fn recruiting_target_reached() -> Result<Trial> {
    restore(
        "recruiting_target_reached",
        &TrialSnapshotBuilder::new()
            .state(TrialState::Recruiting)
            .participants(ParticipantStatus::Accepted, 10)
            .participants(ParticipantStatus::Screened, 2),
    )
}

/// Active with six randomized participants: four have Baseline and
/// FollowUp visits, two have only Baseline, none have Final. One more is
/// accepted but not randomized and one withdrew after Baseline.
pub fn active_with_partial_data() -> Result<Trial> {
    restore(
        "active_with_partial_data",
        &TrialSnapshotBuilder::new()
            .state(TrialState::Active)
            .participants_with_visits(
                ParticipantStatus::Randomized,
                4,
                &[VisitType::Baseline, VisitType::FollowUp],
            )
            .participants_with_visits(ParticipantStatus::Randomized, 2, &[VisitType::Baseline])
            .participants(ParticipantStatus::Accepted, 1)
            .participants_with_visits(ParticipantStatus::Withdrawn, 1, &[VisitType::Baseline]),
    )
}

fn all_visits_recorded(state: TrialState) -> TrialSnapshotBuilder {
    TrialSnapshotBuilder::new().state(state).participants_with_visits(
        ParticipantStatus::Randomized,
        6,
        &[
            VisitType::Baseline,
            VisitType::FollowUp,
            VisitType::FollowUp,
            VisitType::Final,
        ],
    )
}

/// Active with every randomized participant through their Final visit;
/// `complete` succeeds.
pub fn active_ready_for_completion() -> Result<Trial> {
    restore(
        "active_ready_for_completion",
        &all_visits_recorded(TrialState::Active),
    )
}

/// Completed with all visit data collected.
pub fn completed_ready_for_analysis() -> Result<Trial> {
    restore(
        "completed_ready_for_analysis",
        &all_visits_recorded(TrialState::Completed),
    )
}

/// Recruiting with 20 screened (2x target) and only 4 accepted;
/// `should_terminate` is true.
pub fn recruiting_should_terminate() -> Result<Trial> {
    restore(
        "recruiting_should_terminate",
        &TrialSnapshotBuilder::new()
            .state(TrialState::Recruiting)
            .participants(ParticipantStatus::Accepted, 4)
            .participants(ParticipantStatus::Screened, 16),
    )
}

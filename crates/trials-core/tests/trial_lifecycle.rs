//! End-to-end lifecycle scenarios through the public `Trial` API.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use chrono::Utc;
use trials_core::{
    ParticipantId, ParticipantStatus, Trial, TrialError, TrialEvent, TrialState, VisitType,
};

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

fn recruiting(target: usize, minimum: usize) -> Trial {
    let mut trial = Trial::new(target, minimum).expect("valid targets");
    trial.start_recruiting().expect("planning -> recruiting");
    trial
}

fn enroll(trial: &mut Trial, count: usize) -> Vec<ParticipantId> {
    (0..count)
        .map(|_| {
            let id = trial.screen_participant().expect("screen");
            trial.accept_participant(id).expect("accept");
            id
        })
        .collect()
}

fn active_with_randomized(count: usize) -> (Trial, Vec<ParticipantId>) {
    let mut trial = recruiting(10, count.max(1));
    let ids = enroll(&mut trial, count.max(1));
    trial.activate().expect("recruiting -> active");
    for id in ids.iter().take(count) {
        trial.randomize_participant(*id).expect("randomize");
    }
    (trial, ids.into_iter().take(count).collect())
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn six_accepted_of_minimum_six_activates() {
    let mut trial = recruiting(10, 6);
    enroll(&mut trial, 6);

    trial.activate().expect("minimum met");

    assert_eq!(trial.state(), TrialState::Active);
}

#[test]
fn five_accepted_of_minimum_six_stays_recruiting() {
    let mut trial = recruiting(10, 6);
    enroll(&mut trial, 5);

    let err = trial.activate().expect_err("below minimum");

    let TrialError::ValidationFailure { reasons } = err else {
        panic!("expected validation failure, got {err:?}");
    };
    let message = reasons.to_string();
    assert!(message.contains('5'), "{message}");
    assert!(message.contains('6'), "{message}");
    assert_eq!(trial.state(), TrialState::Recruiting);
}

#[test]
fn twenty_screened_four_accepted_should_terminate() {
    let mut trial = recruiting(10, 6);
    for position in 0..20 {
        let id = trial.screen_participant().expect("screen");
        if position < 4 {
            trial.accept_participant(id).expect("accept");
        }
    }

    assert!(trial.should_terminate());
    trial.terminate().expect("futility termination");
    assert_eq!(trial.state(), TrialState::Terminated);
}

#[test]
fn completion_waits_for_every_final_visit() {
    let (mut trial, ids) = active_with_randomized(3);
    trial
        .record_visit(ids[0], VisitType::Final, Utc::now())
        .expect("final visit");
    trial
        .record_visit(ids[1], VisitType::Final, Utc::now())
        .expect("final visit");

    let err = trial.complete().expect_err("one final visit outstanding");
    assert_eq!(
        err.reasons(),
        &["1 randomized participant missing a Final visit".to_string()]
    );
    assert_eq!(trial.state(), TrialState::Active);

    trial
        .record_visit(ids[2], VisitType::Final, Utc::now())
        .expect("final visit");
    trial.complete().expect("all final visits recorded");
    assert_eq!(trial.state(), TrialState::Completed);
}

#[test]
fn second_final_visit_rejected_first_kept() {
    let (mut trial, ids) = active_with_randomized(1);
    let first = Utc::now();
    trial
        .record_visit(ids[0], VisitType::Final, first)
        .expect("first final visit");

    let result = trial.record_visit(ids[0], VisitType::Final, Utc::now());

    assert!(matches!(result, Err(TrialError::InvalidOperation { .. })));
    let visits = trial.participant(ids[0]).expect("participant").visits();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].recorded_at(), first);
}

#[test]
fn follow_up_visits_may_repeat() {
    let (mut trial, ids) = active_with_randomized(1);
    for _ in 0..3 {
        trial
            .record_visit(ids[0], VisitType::FollowUp, Utc::now())
            .expect("follow-up visit");
    }
    assert_eq!(trial.participant(ids[0]).expect("participant").visits().len(), 3);
}

#[test]
fn planning_rejects_every_edge_but_recruiting() {
    for target in [TrialState::Active, TrialState::Completed, TrialState::Terminated] {
        let mut trial = Trial::new(10, 6).expect("valid targets");
        let result = trial.advance_to(target);
        assert_eq!(
            result,
            Err(TrialError::InvalidTransition {
                from: TrialState::Planning,
                to: target
            })
        );
        assert_eq!(trial.state(), TrialState::Planning);
    }
}

#[test]
fn terminal_states_reject_mutations() {
    let (mut trial, ids) = active_with_randomized(1);
    trial.terminate().expect("active -> terminated");

    assert!(matches!(
        trial.record_visit(ids[0], VisitType::Final, Utc::now()),
        Err(TrialError::InvalidOperation { .. })
    ));
    assert!(matches!(
        trial.withdraw_participant(ids[0]),
        Err(TrialError::InvalidOperation { .. })
    ));
    assert!(matches!(
        trial.screen_participant(),
        Err(TrialError::InvalidOperation { .. })
    ));
    assert!(trial.state().valid_transitions().is_empty());
}

#[test]
fn withdrawn_participants_keep_visits_and_leave_accepted_count() {
    let (mut trial, ids) = active_with_randomized(2);
    trial
        .record_visit(ids[0], VisitType::Baseline, Utc::now())
        .expect("baseline");

    trial.withdraw_participant(ids[0]).expect("withdraw");

    let participant = trial.participant(ids[0]).expect("participant");
    assert_eq!(participant.status(), ParticipantStatus::Withdrawn);
    assert_eq!(participant.visits().len(), 1);
    assert_eq!(trial.counters().accepted, 1);
    assert_eq!(trial.counters().randomized, 1);
}

#[test]
fn unknown_participant_is_not_found() {
    let mut trial = recruiting(10, 6);
    let missing = ParticipantId::from_position(41).expect("fits");

    assert_eq!(
        trial.accept_participant(missing),
        Err(TrialError::NotFound {
            participant_id: missing
        })
    );
}

#[test]
fn record_visit_on_unknown_participant_is_not_found() {
    let (mut trial, _) = active_with_randomized(1);
    let missing = ParticipantId::from_position(9).expect("fits");

    assert_eq!(
        trial.record_visit(missing, VisitType::Baseline, Utc::now()),
        Err(TrialError::NotFound {
            participant_id: missing
        })
    );
}

#[test]
fn record_visit_requires_randomized_participant() {
    let mut trial = recruiting(10, 2);
    let ids = enroll(&mut trial, 2);
    trial.activate().expect("minimum met");
    let before = trial.snapshot();

    let result = trial.record_visit(ids[0], VisitType::Baseline, Utc::now());

    assert!(matches!(result, Err(TrialError::InvalidOperation { .. })));
    assert!(trial.participant(ids[0]).expect("participant").visits().is_empty());
    assert_eq!(trial.snapshot(), before);
}

#[test]
fn randomize_requires_accepted_participant() {
    let mut trial = recruiting(10, 1);
    enroll(&mut trial, 1);
    let screened_only = trial.screen_participant().expect("screen");
    trial.activate().expect("minimum met");

    let result = trial.randomize_participant(screened_only);

    assert!(matches!(result, Err(TrialError::InvalidOperation { .. })));
    assert_eq!(
        trial.participant(screened_only).expect("participant").status(),
        ParticipantStatus::Screened
    );
    assert_eq!(trial.counters().randomized, 0);
}

#[test]
fn withdraw_while_recruiting() {
    let mut trial = recruiting(10, 6);
    let ids = enroll(&mut trial, 2);
    let screened_only = trial.screen_participant().expect("screen");

    trial.withdraw_participant(ids[0]).expect("withdraw accepted");
    trial.withdraw_participant(screened_only).expect("withdraw screened");

    let counters = trial.counters();
    assert_eq!(counters.screened, 3);
    assert_eq!(counters.accepted, 1);
    assert_eq!(
        trial.participant(ids[0]).expect("participant").status(),
        ParticipantStatus::Withdrawn
    );
    assert_eq!(
        trial.events().last().map(TrialEvent::event_type),
        Some("participant_withdrawn")
    );
}

#[test]
fn withdraw_twice_is_invalid_operation() {
    let mut trial = recruiting(10, 6);
    let ids = enroll(&mut trial, 1);
    trial.withdraw_participant(ids[0]).expect("first withdrawal");
    let events_before = trial.events().len();

    let result = trial.withdraw_participant(ids[0]);

    assert!(matches!(result, Err(TrialError::InvalidOperation { .. })));
    assert_eq!(trial.events().len(), events_before);
}

#[test]
fn randomize_and_withdraw_unknown_participant_are_not_found() {
    let (mut trial, _) = active_with_randomized(1);
    let missing = ParticipantId::from_position(9).expect("fits");
    let not_found = Err(TrialError::NotFound {
        participant_id: missing,
    });

    assert_eq!(trial.randomize_participant(missing), not_found);
    assert_eq!(trial.withdraw_participant(missing), not_found);
}

#[test]
fn committed_operations_are_audited_in_order() {
    let mut trial = recruiting(1, 1);
    let id = trial.screen_participant().expect("screen");
    trial.accept_participant(id).expect("accept");
    let _ = trial.complete();

    let kinds: Vec<&str> = trial.events().iter().map(TrialEvent::event_type).collect();
    assert_eq!(
        kinds,
        [
            "trial_created",
            "state_changed",
            "participant_screened",
            "participant_accepted"
        ]
    );
    assert!(trial.events().iter().all(|e| *e.trial_id() == trial.id()));
}

#[test]
fn snapshot_restore_preserves_state() {
    let (mut trial, ids) = active_with_randomized(2);
    trial
        .record_visit(ids[1], VisitType::Baseline, Utc::now())
        .expect("baseline");

    let json = serde_json::to_string(&trial.snapshot()).expect("serialize");
    let restored = Trial::restore(serde_json::from_str(&json).expect("deserialize"))
        .expect("valid snapshot");

    assert_eq!(restored.snapshot(), trial.snapshot());
    assert_eq!(restored.counters(), trial.counters());
    assert!(restored.events().is_empty());
}

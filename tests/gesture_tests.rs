use swipedeck::catalog::CandidateId;
use swipedeck::config::GestureConfig;
use swipedeck::decisions::Direction;
use swipedeck::kernel::gesture::{
    CommitTrigger, GestureInterpreter, GestureOutcome, GestureRejection, GestureState, Vector2,
};

fn interpreter() -> GestureInterpreter {
    GestureInterpreter::new(GestureConfig {
        hint_threshold: 40.0,
        commit_threshold: 100.0,
        velocity_threshold: 500.0,
    })
}

fn dragging(candidate: &str) -> GestureInterpreter {
    let mut gesture = interpreter();
    gesture.begin(CandidateId::from(candidate)).unwrap();
    gesture
}

#[test]
fn test_release_past_threshold_commits() {
    let mut gesture = dragging("card-1");

    let outcome = gesture
        .release(Vector2::new(150.0, 12.0), Vector2::ZERO)
        .unwrap();

    match outcome {
        GestureOutcome::Commit(pending) => {
            assert_eq!(pending.candidate, CandidateId::from("card-1"));
            assert_eq!(pending.direction, Direction::Accept);
            assert_eq!(pending.trigger, CommitTrigger::Distance);
        }
        other => panic!("expected commit, got {:?}", other),
    }
    assert!(matches!(gesture.state(), GestureState::Committing(_)));
}

#[test]
fn test_release_under_threshold_cancels() {
    let mut gesture = dragging("card-1");

    let outcome = gesture
        .release(Vector2::new(50.0, 0.0), Vector2::new(100.0, 0.0))
        .unwrap();

    assert_eq!(
        outcome,
        GestureOutcome::Cancel {
            candidate: CandidateId::from("card-1")
        }
    );
    assert!(gesture.is_idle());
}

#[test]
fn test_threshold_is_strict() {
    let mut gesture = dragging("card-1");
    let outcome = gesture
        .release(Vector2::new(-100.0, 0.0), Vector2::ZERO)
        .unwrap();
    assert!(matches!(outcome, GestureOutcome::Cancel { .. }));
}

#[test]
fn test_fast_flick_commits_below_distance() {
    let mut gesture = dragging("card-1");

    let outcome = gesture
        .release(Vector2::new(-30.0, 0.0), Vector2::new(-900.0, 0.0))
        .unwrap();

    match outcome {
        GestureOutcome::Commit(pending) => {
            assert_eq!(pending.direction, Direction::Reject);
            assert_eq!(pending.trigger, CommitTrigger::Velocity);
        }
        other => panic!("expected commit, got {:?}", other),
    }
}

#[test]
fn test_flick_from_origin_uses_velocity_sign() {
    let mut gesture = dragging("card-1");

    let outcome = gesture
        .release(Vector2::ZERO, Vector2::new(800.0, 0.0))
        .unwrap();

    assert!(matches!(
        outcome,
        GestureOutcome::Commit(ref p) if p.direction == Direction::Accept
    ));
}

#[test]
fn test_hint_reported_only_on_change() {
    let mut gesture = dragging("card-1");

    // 1. Below hint threshold: nothing to report.
    assert_eq!(gesture.update(Vector2::new(20.0, 0.0), Vector2::ZERO), Ok(None));

    // 2. Crossing to the right shows the accept hint once.
    assert_eq!(
        gesture.update(Vector2::new(60.0, 0.0), Vector2::ZERO),
        Ok(Some(Some(Direction::Accept)))
    );
    assert_eq!(gesture.update(Vector2::new(80.0, 5.0), Vector2::ZERO), Ok(None));

    // 3. Swinging across flips it.
    assert_eq!(
        gesture.update(Vector2::new(-60.0, 0.0), Vector2::ZERO),
        Ok(Some(Some(Direction::Reject)))
    );

    // 4. Back near the origin clears it.
    assert_eq!(
        gesture.update(Vector2::new(-10.0, 0.0), Vector2::ZERO),
        Ok(Some(None))
    );
}

#[test]
fn test_update_without_drag_is_rejected() {
    let mut gesture = interpreter();
    assert_eq!(
        gesture.update(Vector2::new(10.0, 0.0), Vector2::ZERO),
        Err(GestureRejection::NotDragging)
    );
    assert_eq!(
        gesture.release(Vector2::new(200.0, 0.0), Vector2::ZERO),
        Err(GestureRejection::NotDragging)
    );
}

#[test]
fn test_second_drag_rejected_while_dragging() {
    let mut gesture = dragging("card-1");

    let err = gesture.begin(CandidateId::from("card-2")).unwrap_err();

    assert_eq!(
        err,
        GestureRejection::AlreadyDragging {
            active: CandidateId::from("card-1")
        }
    );
    assert_eq!(gesture.active_candidate(), Some(&CandidateId::from("card-1")));
}

#[test]
fn test_button_press_rejected_while_dragging() {
    let mut gesture = dragging("card-1");
    assert!(matches!(
        gesture.press(CandidateId::from("card-1"), Direction::Accept),
        Err(GestureRejection::AlreadyDragging { .. })
    ));
}

#[test]
fn test_committing_blocks_new_gestures_until_settled() {
    let mut gesture = interpreter();

    // 1. Button goes straight to Committing.
    let pending = gesture
        .press(CandidateId::from("card-1"), Direction::Reject)
        .unwrap();
    assert_eq!(pending.trigger, CommitTrigger::Button);

    // 2. Nothing new starts while it is in flight.
    assert_eq!(
        gesture.begin(CandidateId::from("card-1")),
        Err(GestureRejection::CommitInFlight {
            candidate: CandidateId::from("card-1")
        })
    );
    assert!(gesture
        .press(CandidateId::from("card-1"), Direction::Reject)
        .is_err());

    // 3. Settling for another card is a no-op.
    assert!(!gesture.settle(&CandidateId::from("card-2")));
    assert!(gesture.settle(&CandidateId::from("card-1")));
    assert!(gesture.is_idle());
    assert!(gesture.begin(CandidateId::from("card-2")).is_ok());
}

#[test]
fn test_interrupt_cancels_drag() {
    let mut gesture = dragging("card-1");
    gesture
        .update(Vector2::new(90.0, 0.0), Vector2::new(300.0, 0.0))
        .unwrap();

    let outcome = gesture.interrupt();

    assert_eq!(
        outcome,
        Some(GestureOutcome::Cancel {
            candidate: CandidateId::from("card-1")
        })
    );
    assert!(gesture.is_idle());
    assert_eq!(gesture.interrupt(), None);
}

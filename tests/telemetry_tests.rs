use swipedeck::catalog::{Candidate, CandidateId, CandidateKind, Level};
use swipedeck::config::EngineConfig;
use swipedeck::decisions::{Decision, Direction, SubjectId};
use swipedeck::kernel::event::{Event, GestureInput, SideEffect};
use swipedeck::kernel::gesture::Vector2;
use swipedeck::kernel::telemetry::event::TelemetryEvent;
use swipedeck::kernel::telemetry::recorder::TelemetryRecorder;
use swipedeck::Reactor;

#[test]
fn test_recorder_is_bounded() {
    let mut recorder = TelemetryRecorder::new();

    for _ in 0..10_050 {
        recorder.record(TelemetryEvent::RecomputeDeferred);
    }

    assert_eq!(recorder.len(), 10_000);
    recorder.clear();
    assert!(recorder.is_empty());
}

#[test]
fn test_snapshot_from_session() {
    let subject = SubjectId::new("s");
    let mut reactor = Reactor::new(subject.clone(), EngineConfig::default());
    let catalog = vec![
        Candidate::new("a", CandidateKind::Teacher, 10.0, Level::Beginner),
        Candidate::new("b", CandidateKind::Teacher, 20.0, Level::Beginner),
    ];
    reactor.tick_step(vec![Event::CatalogLoaded(catalog), Event::HistoryLoaded(vec![])]);

    // 1. Cancelled drag, then a flick.
    reactor.tick_step(vec![
        Event::Gesture(GestureInput::Begin { candidate: CandidateId::from("a") }),
        Event::Gesture(GestureInput::Release { offset: Vector2::new(10.0, 0.0), velocity: Vector2::ZERO }),
        Event::Gesture(GestureInput::Begin { candidate: CandidateId::from("a") }),
    ]);
    let effects = reactor.tick_step(vec![Event::Gesture(GestureInput::Release {
        offset: Vector2::new(30.0, 0.0),
        velocity: Vector2::new(900.0, 0.0),
    })]);
    let request = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::Persist(r) => Some(r.clone()),
            _ => None,
        })
        .unwrap();

    // 2. Two ticks later the log confirms.
    reactor.tick_step(vec![]);
    reactor.tick_step(vec![Event::PersistCompleted {
        request,
        result: Ok(Decision::new(subject, CandidateId::from("a"), Direction::Accept)),
    }]);

    // 3. Button reject on the last card, then a stray tap on a buried id.
    reactor.tick_step(vec![
        Event::Button { candidate: CandidateId::from("b"), direction: Direction::Reject },
        Event::Button { candidate: CandidateId::from("zzz"), direction: Direction::Reject },
    ]);

    let snap = reactor.telemetry.snapshot();
    assert_eq!(snap.gesture_stats.started, 2);
    assert_eq!(snap.gesture_stats.cancelled, 1);
    assert_eq!(snap.gesture_stats.by_velocity, 1);
    assert_eq!(snap.gesture_stats.by_button, 1);
    assert_eq!(snap.gesture_stats.rejected, 1);
    assert_eq!(snap.decision_stats.accepted, 1);
    assert_eq!(snap.decision_stats.rejected, 1);
    assert_eq!(snap.persistence_stats.confirmed, 1);
    assert_eq!(snap.persistence_stats.avg_latency_ticks, 2.0);
    assert_eq!(snap.filter_stats.exhausted, 1);

    println!("Snapshot: {:?}", snap);
}

#[test]
fn test_events_never_carry_free_text() {
    let mut reactor = Reactor::new(SubjectId::new("s"), EngineConfig::default());
    reactor.tick_step(vec![Event::CatalogLoaded(vec![
        Candidate::new("a", CandidateKind::Teacher, 10.0, Level::Beginner).with_text("secret bio"),
    ])]);

    for event in reactor.telemetry.events() {
        let json = serde_json::to_string(event).unwrap();
        assert!(!json.contains("secret"), "leaked: {}", json);
    }
}

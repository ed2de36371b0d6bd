use argo_core::{
    step, Bound, Category, JobState, QueryParameters, Rect, SearchOrchestrator, SearchRequest,
    SessionEffect, SessionEvent, ValidationError, CONNECTION_LOST_MESSAGE,
    PROTOCOL_FAILURE_MESSAGE, TRANSPORT_FAILURE_MESSAGE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    argo_logging::initialize_for_tests();
}

fn valid_bound() -> Bound {
    Bound::from(Rect::new(10.0, -10.0, 20.0, -20.0))
}

fn log(message: &str) -> String {
    serde_json::json!({ "type": "log", "message": message }).to_string()
}

fn count_opens(effects: &[SessionEffect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, SessionEffect::Open { .. }))
        .count()
}

fn count_closes(effects: &[SessionEffect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, SessionEffect::Close { .. }))
        .count()
}

/// Submits and opens a session, returning its id.
fn start(orchestrator: &mut SearchOrchestrator) -> u64 {
    let effects = orchestrator
        .submit(valid_bound(), QueryParameters::default())
        .expect("valid submit");
    let session = match effects.last() {
        Some(SessionEffect::Open { session }) => *session,
        other => panic!("expected open, got {other:?}"),
    };
    let effects = orchestrator.apply(SessionEvent::Opened { session });
    assert_eq!(effects.len(), 1);
    session
}

#[test]
fn invalid_bounds_never_open_a_channel() {
    init_logging();
    let partial = Bound {
        north: Some(10.0),
        south: None,
        east: Some(5.0),
        west: Some(1.0),
    };
    let inverted = Bound::from(Rect::new(-10.0, 10.0, 20.0, -20.0));

    let mut orchestrator = SearchOrchestrator::new();
    assert_eq!(
        orchestrator.submit(Bound::empty(), QueryParameters::default()),
        Err(ValidationError::NoBound)
    );
    assert_eq!(
        orchestrator.submit(partial, QueryParameters::default()),
        Err(ValidationError::Incomplete {
            missing: "south".to_string()
        })
    );
    assert_eq!(
        orchestrator.submit(inverted, QueryParameters::default()),
        Err(ValidationError::Inverted)
    );
    assert_eq!(orchestrator.state(), &JobState::Idle);
}

#[test]
fn open_sends_the_serialized_request_once() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    let effects = orchestrator
        .submit(valid_bound(), QueryParameters::default())
        .unwrap();
    assert_eq!(effects, vec![SessionEffect::Open { session: 1 }]);
    assert!(matches!(orchestrator.state(), JobState::Connecting { .. }));

    let effects = orchestrator.apply(SessionEvent::Opened { session: 1 });
    let [SessionEffect::Send { session, payload }] = effects.as_slice() else {
        panic!("expected a single send, got {effects:?}");
    };
    assert_eq!(*session, 1);
    let value: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "bounds": { "north": 10.0, "south": -10.0, "east": 20.0, "west": -20.0 },
            "params": {
                "startDate": "2023-01-01",
                "endDate": "2023-12-31",
                "minDepth": 0.0,
                "maxDepth": 2000.0,
                "type": "core"
            }
        })
    );
    assert_eq!(
        orchestrator.state(),
        &JobState::Running {
            session: 1,
            category: Category::Core,
            logs: Vec::new()
        }
    );
}

#[test]
fn logs_then_complete_succeeds_in_order() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    let session = start(&mut orchestrator);

    for message in ["loading index", "filtering 120 profiles", "extracting"] {
        let effects = orchestrator.apply(SessionEvent::Received {
            session,
            text: log(message),
        });
        assert!(effects.is_empty());
    }
    let complete = serde_json::json!({
        "type": "complete",
        "csv": "date,lat\n1,2\n",
        "filename": "argo_data.csv"
    })
    .to_string();
    let effects = orchestrator.apply(SessionEvent::Received {
        session,
        text: complete,
    });

    assert_eq!(
        orchestrator.logs(),
        &["loading index", "filtering 120 profiles", "extracting"]
    );
    let artifact = orchestrator.artifact().expect("artifact").clone();
    assert_eq!(artifact.csv, "date,lat\n1,2\n");
    assert_eq!(artifact.filename.as_deref(), Some("argo_data.csv"));
    assert_eq!(
        effects,
        vec![
            SessionEffect::Close { session },
            SessionEffect::Deliver(artifact)
        ]
    );
    assert!(matches!(orchestrator.state(), JobState::Succeeded { .. }));
}

#[test]
fn log_then_error_fails_with_service_message_and_one_close() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    let session = start(&mut orchestrator);

    let mut effects = orchestrator.apply(SessionEvent::Received {
        session,
        text: log("loading index"),
    });
    effects.extend(orchestrator.apply(SessionEvent::Received {
        session,
        text: r#"{"type":"error","message":"No profiles found in selection."}"#.to_string(),
    }));
    // The peer closing afterwards is not a second failure.
    effects.extend(orchestrator.apply(SessionEvent::Closed { session }));

    assert_eq!(count_closes(&effects), 1);
    assert_eq!(
        orchestrator.state(),
        &JobState::Failed {
            message: "No profiles found in selection.".to_string(),
            logs: vec!["loading index".to_string()],
        }
    );
}

#[test]
fn resubmit_while_running_closes_exactly_the_stale_session() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    let first = start(&mut orchestrator);
    orchestrator.apply(SessionEvent::Received {
        session: first,
        text: log("working"),
    });

    let effects = orchestrator
        .submit(valid_bound(), QueryParameters::default())
        .unwrap();
    assert_eq!(
        effects,
        vec![
            SessionEffect::Close { session: first },
            SessionEffect::Open { session: first + 1 }
        ]
    );
    assert_eq!(count_opens(&effects), 1);
    assert_eq!(count_closes(&effects), 1);

    // Late frames from the torn-down channel are dropped.
    let effects = orchestrator.apply(SessionEvent::Received {
        session: first,
        text: r#"{"type":"complete","csv":"a\n1","filename":"x.csv"}"#.to_string(),
    });
    assert!(effects.is_empty());
    assert_eq!(orchestrator.state().live_session(), Some(first + 1));
    assert!(orchestrator.logs().is_empty());
}

#[test]
fn resubmit_while_connecting_closes_the_pending_channel() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    orchestrator
        .submit(valid_bound(), QueryParameters::default())
        .unwrap();
    let effects = orchestrator
        .submit(valid_bound(), QueryParameters::default())
        .unwrap();
    assert_eq!(
        effects,
        vec![
            SessionEffect::Close { session: 1 },
            SessionEffect::Open { session: 2 }
        ]
    );
    assert!(orchestrator
        .apply(SessionEvent::Opened { session: 1 })
        .is_empty());
}

#[test]
fn transport_failure_is_generic_and_terminal() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    orchestrator
        .submit(valid_bound(), QueryParameters::default())
        .unwrap();
    let effects = orchestrator.apply(SessionEvent::TransportFailed {
        session: 1,
        reason: "Connection refused (os error 111)".to_string(),
    });
    assert_eq!(effects, vec![SessionEffect::Close { session: 1 }]);
    assert_eq!(
        orchestrator.state(),
        &JobState::Failed {
            message: TRANSPORT_FAILURE_MESSAGE.to_string(),
            logs: Vec::new(),
        }
    );
    assert!(!orchestrator.state().is_busy());
}

#[test]
fn close_without_terminal_message_fails() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    let session = start(&mut orchestrator);
    orchestrator.apply(SessionEvent::Received {
        session,
        text: log("step 1"),
    });
    let effects = orchestrator.apply(SessionEvent::Closed { session });
    assert!(effects.is_empty());
    assert_eq!(
        orchestrator.state(),
        &JobState::Failed {
            message: CONNECTION_LOST_MESSAGE.to_string(),
            logs: vec!["step 1".to_string()],
        }
    );
}

#[test]
fn malformed_frame_fails_but_unknown_type_is_skipped() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    let session = start(&mut orchestrator);

    let effects = orchestrator.apply(SessionEvent::Received {
        session,
        text: r#"{"type":"heartbeat"}"#.to_string(),
    });
    assert!(effects.is_empty());
    assert!(orchestrator.state().is_busy());

    let effects = orchestrator.apply(SessionEvent::Received {
        session,
        text: "not json".to_string(),
    });
    assert_eq!(effects, vec![SessionEffect::Close { session }]);
    assert_eq!(
        orchestrator.state(),
        &JobState::Failed {
            message: PROTOCOL_FAILURE_MESSAGE.to_string(),
            logs: Vec::new(),
        }
    );
}

#[test]
fn dismiss_returns_terminal_states_to_idle() {
    init_logging();
    let failed = JobState::Failed {
        message: "boom".to_string(),
        logs: Vec::new(),
    };
    let (next, effects) = step(failed, SessionEvent::Dismiss);
    assert_eq!(next, JobState::Idle);
    assert!(effects.is_empty());

    let running = JobState::Running {
        session: 3,
        category: Category::Bio,
        logs: Vec::new(),
    };
    let (next, _) = step(running.clone(), SessionEvent::Dismiss);
    assert_eq!(next, running);
}

#[test]
fn cancel_closes_the_live_channel() {
    init_logging();
    let mut orchestrator = SearchOrchestrator::new();
    let session = start(&mut orchestrator);
    let effects = orchestrator.apply(SessionEvent::Cancel);
    assert_eq!(effects, vec![SessionEffect::Close { session }]);
    assert_eq!(orchestrator.state(), &JobState::Idle);
    assert!(orchestrator.apply(SessionEvent::Cancel).is_empty());
}

#[test]
fn complete_without_filename_keeps_category_for_naming() {
    init_logging();
    let mut params = QueryParameters::default();
    params.category = Category::Bio;
    let request = SearchRequest::new(valid_bound(), params).unwrap();
    let (state, _) = step(
        JobState::Idle,
        SessionEvent::Submit {
            session: 9,
            request,
        },
    );
    let (state, _) = step(state, SessionEvent::Opened { session: 9 });
    let (state, effects) = step(
        state,
        SessionEvent::Received {
            session: 9,
            text: r#"{"type":"complete","csv":"a\n1"}"#.to_string(),
        },
    );
    let JobState::Succeeded { artifact, .. } = state else {
        panic!("expected success");
    };
    assert_eq!(artifact.filename, None);
    assert_eq!(artifact.category, Category::Bio);
    assert_eq!(effects.len(), 2);
}

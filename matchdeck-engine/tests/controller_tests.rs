//! Queue controller integration tests
//!
//! Drives a `SwipeEngine` with paused tokio time and scripted collaborators:
//! - history/cursor bookkeeping across commit, undo and redo
//! - undo prompt lifetime and the stale-prompt guard
//! - drag and programmatic swipes end to end
//! - fire-and-forget sink behavior
//! - the spawned engine loop

mod helpers;

use helpers::*;
use matchdeck_common::events::{GesturePhase, MatchEvent, SwipeFeedback};
use matchdeck_common::{Direction, QueueKind};
use matchdeck_engine::{EngineConfig, Key};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_past_length_tracks_commits_undos_and_redos() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c", "d", "e", "f"]), QueueKind::Individual);

    let mut commits = 0usize;
    let mut undos = 0usize;
    let mut redos = 0usize;

    let script = ["R", "L", "U", "r", "L", "U", "U", "r", "r", "L", "R"];
    for op in script {
        match op {
            "R" | "L" => {
                let direction = if op == "R" { Direction::Right } else { Direction::Left };
                assert!(t.engine.commit(direction).is_some());
                commits += 1;
                assert_eq!(t.engine.history().future_len(), 0, "push clears future");
            }
            "U" => {
                assert!(t.engine.undo(None).is_some());
                undos += 1;
            }
            "r" => {
                assert!(t.engine.redo().is_some());
                redos += 1;
            }
            _ => unreachable!(),
        }
        assert_eq!(t.engine.history().past_len(), commits - undos + redos);
        assert_eq!(t.engine.cursor(), t.engine.history().past_len());
    }
}

#[tokio::test(start_paused = true)]
async fn test_undo_then_redo_restores_cursor() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c", "d"]), QueueKind::Individual);

    t.engine.commit(Direction::Right);
    t.engine.commit(Direction::Left);
    t.engine.commit(Direction::Right);
    let before = t.engine.cursor();

    t.engine.undo(None).unwrap();
    assert_eq!(t.engine.cursor(), before - 1);
    t.engine.redo().unwrap();
    assert_eq!(t.engine.cursor(), before);
}

#[tokio::test(start_paused = true)]
async fn test_undo_returns_to_skipped_candidate() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c"]), QueueKind::Individual);

    t.engine.commit(Direction::Right);
    t.engine.commit(Direction::Left);
    assert_eq!(t.engine.history().future_len(), 0);

    let undone = t.engine.undo(None).unwrap();
    assert_eq!(undone.candidate_id().as_str(), "b");
    assert_eq!(t.engine.current().unwrap().id.as_str(), "b");
    assert!(t.engine.can_redo());

    t.engine.commit(Direction::Right);
    assert!(!t.engine.can_redo());
}

#[tokio::test(start_paused = true)]
async fn test_undo_on_empty_history_is_noop() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a"]), QueueKind::Individual);

    assert!(t.engine.undo(None).is_none());
    assert!(t.engine.redo().is_none());
    assert_eq!(t.engine.cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_undo_prompt_expires_after_lifetime() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["x", "y", "z"]), QueueKind::Individual);

    let decision = t.engine.commit(Direction::Left).unwrap();
    let prompt = t.engine.undo_prompt().cloned().unwrap();
    assert_eq!(&prompt.decision_id, decision.id());
    assert_eq!(prompt.candidate_name, "X");
    drain(&mut t.events);

    advance_and_process(&mut t.engine, 4_999).await;
    assert!(t.engine.undo_prompt().is_some());

    advance_and_process(&mut t.engine, 1).await;
    assert!(t.engine.undo_prompt().is_none());
    assert!(drain(&mut t.events)
        .iter()
        .any(|e| matches!(e, MatchEvent::UndoPromptChanged { prompt: None })));

    // Clicking the expired prompt does nothing
    assert!(t.engine.undo(Some(decision.id())).is_none());
    assert_eq!(t.engine.cursor(), 1);
    assert_eq!(t.engine.history().past_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_undo_through_live_prompt() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["x", "y"]), QueueKind::Individual);

    let decision = t.engine.commit(Direction::Left).unwrap();
    advance_and_process(&mut t.engine, 2_000).await;

    let undone = t.engine.undo(Some(decision.id())).unwrap();
    assert_eq!(undone, decision);
    assert_eq!(t.engine.cursor(), 0);
    assert!(t.engine.undo_prompt().is_none());

    // The cancelled expiry timer must not clear anything later
    advance_and_process(&mut t.engine, 5_000).await;
    assert_eq!(t.engine.cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_prompt_for_older_decision_is_ignored() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c"]), QueueKind::Individual);

    let first = t.engine.commit(Direction::Left).unwrap();
    let second = t.engine.commit(Direction::Left).unwrap();
    assert_eq!(&t.engine.undo_prompt().unwrap().decision_id, second.id());

    assert!(t.engine.undo(Some(first.id())).is_none());
    assert_eq!(t.engine.cursor(), 2);

    assert!(t.engine.undo(Some(second.id())).is_some());
    assert_eq!(t.engine.cursor(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_accept_clears_prompt() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c"]), QueueKind::Individual);

    t.engine.commit(Direction::Left);
    assert!(t.engine.undo_prompt().is_some());

    t.engine.commit(Direction::Right);
    assert!(t.engine.undo_prompt().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_drag_gestures_end_to_end() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c"]), QueueKind::Individual);
    let t0 = Instant::now();

    // (150, 10) commits right
    assert!(t.engine.begin_drag(7, 0.0, 0.0, t0));
    assert!(t.engine.update_drag(7, 150.0, 10.0, t0 + Duration::from_millis(120)));
    let decision = t.engine.end_drag(7).unwrap();
    assert_eq!(decision.direction(), Direction::Right);
    assert_eq!(t.engine.current().unwrap().id.as_str(), "b");

    // (80, 10) commits nothing and relaxes to center
    t.engine.begin_drag(7, 0.0, 0.0, t0);
    t.engine.update_drag(7, 80.0, 10.0, t0 + Duration::from_millis(120));
    assert!(t.engine.end_drag(7).is_none());
    let frame = t.engine.gesture_frame();
    assert_eq!(frame.phase, GesturePhase::Relaxing);
    assert_eq!((frame.translate_x, frame.translate_y), (0.0, 0.0));

    // (-130, 160) is too vertical
    t.engine.begin_drag(7, 0.0, 0.0, t0);
    t.engine.update_drag(7, -130.0, 160.0, t0 + Duration::from_millis(120));
    assert!(t.engine.end_drag(7).is_none());

    assert_eq!(t.engine.cursor(), 1);
    assert_eq!(t.engine.history().past_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_gesture_frames_are_published() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);
    drain(&mut t.events);
    let t0 = Instant::now();

    t.engine.begin_drag(1, 0.0, 0.0, t0);
    t.engine.update_drag(1, -70.0, 0.0, t0 + Duration::from_millis(50));

    let frames: Vec<_> = drain(&mut t.events)
        .into_iter()
        .filter_map(|e| match e {
            MatchEvent::GestureFrame { frame } => Some(frame),
            _ => None,
        })
        .collect();
    assert_eq!(frames.len(), 2);
    let last = frames.last().unwrap();
    assert_eq!(last.phase, GesturePhase::Dragging);
    assert_eq!(last.translate_x, -70.0);
    assert!((last.nope_opacity - 0.5).abs() < 1e-9);
    assert!(last.rotation_deg < 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_programmatic_swipe_commits_once_after_leave_delay() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c"]), QueueKind::Individual);
    drain(&mut t.events);

    assert!(t.engine.trigger_swipe(Direction::Right));
    assert!(!t.engine.trigger_swipe(Direction::Left));
    assert!(!t.engine.handle_key(Key::ArrowLeft));
    assert_eq!(t.engine.gesture_frame().phase, GesturePhase::Leaving(Direction::Right));

    advance_and_process(&mut t.engine, 259).await;
    assert_eq!(t.engine.cursor(), 0);

    advance_and_process(&mut t.engine, 1).await;
    assert_eq!(t.engine.cursor(), 1);
    assert_eq!(t.engine.gesture_frame().phase, GesturePhase::Idle);

    advance_and_process(&mut t.engine, 1_000).await;
    let committed = drain(&mut t.events)
        .into_iter()
        .filter(|e| matches!(e, MatchEvent::DecisionCommitted { .. }))
        .count();
    assert_eq!(committed, 1);
    assert_eq!(t.engine.history().past_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_arrow_keys_trigger_swipes() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    assert!(!t.engine.handle_key(Key::Other));
    assert!(t.engine.handle_key(Key::ArrowLeft));
    advance_and_process(&mut t.engine, 260).await;

    let last = t.engine.history().last().unwrap();
    assert_eq!(last.direction(), Direction::Left);
    assert!(t.engine.undo_prompt().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_leave_cancels_commit() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    t.engine.trigger_swipe(Direction::Left);
    t.engine.reset(candidates(&["c", "d"]), QueueKind::Group);

    advance_and_process(&mut t.engine, 500).await;
    assert_eq!(t.engine.cursor(), 0);
    assert_eq!(t.engine.current().unwrap().id.as_str(), "c");
    assert_eq!(t.engine.history().past_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_everything() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c"]), QueueKind::Individual);

    t.engine.commit(Direction::Right);
    t.engine.commit(Direction::Left);
    t.engine.commit(Direction::Left);
    t.engine.undo(None);
    assert!(t.engine.can_undo());
    assert!(t.engine.can_redo());
    t.engine.commit(Direction::Left);
    assert!(t.engine.undo_prompt().is_some());

    t.engine.reset(candidates(&["p", "q"]), QueueKind::Group);

    assert_eq!(t.engine.cursor(), 0);
    assert_eq!(t.engine.history().past_len(), 0);
    assert_eq!(t.engine.history().future_len(), 0);
    assert!(t.engine.undo_prompt().is_none());
    assert!(t.engine.feedback().is_none());
    assert_eq!(t.engine.current().unwrap().id.as_str(), "p");
    assert_eq!(t.engine.progress(), (1, 2));
}

#[tokio::test(start_paused = true)]
async fn test_redo_of_reject_has_no_prompt_and_no_sink_call() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    let original = t.engine.commit(Direction::Left).unwrap();
    process(&mut t.engine).await;
    assert_eq!(t.sink.records().len(), 1);

    t.engine.undo(None).unwrap();
    drain(&mut t.events);

    let replayed = t.engine.redo().unwrap();
    process(&mut t.engine).await;

    assert_eq!(replayed.id(), original.id());
    assert!(t.engine.undo_prompt().is_none());
    assert_eq!(t.sink.records().len(), 1);

    let events = drain(&mut t.events);
    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::DecisionCommitted { decision, replayed: true } if decision.id() == original.id()
    )));
    assert!(!events
        .iter()
        .any(|e| matches!(e, MatchEvent::UndoPromptChanged { prompt: Some(_) })));
}

#[tokio::test(start_paused = true)]
async fn test_record_on_redo_calls_sink_again() {
    let config = EngineConfig {
        record_on_redo: true,
        ..EngineConfig::default()
    };
    let mut t = engine_with(config, ScriptedProvider::new(), RecordingSink::new());
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    t.engine.commit(Direction::Right);
    t.engine.undo(None);
    t.engine.redo();
    process(&mut t.engine).await;

    let records = t.sink.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|(id, d)| id.as_str() == "a" && *d == Direction::Right));
}

#[tokio::test(start_paused = true)]
async fn test_undo_does_not_touch_sink_by_default() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    t.engine.commit(Direction::Left);
    t.engine.undo(None);
    process(&mut t.engine).await;

    assert_eq!(t.sink.records().len(), 1);
    assert!(t.sink.retracts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_retract_on_undo() {
    let config = EngineConfig {
        retract_on_undo: true,
        ..EngineConfig::default()
    };
    let mut t = engine_with(config, ScriptedProvider::new(), RecordingSink::new());
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    t.engine.commit(Direction::Left);
    t.engine.undo(None);
    process(&mut t.engine).await;

    assert_eq!(t.sink.retracts().len(), 1);
    assert_eq!(t.sink.retracts()[0].as_str(), "a");
}

#[tokio::test(start_paused = true)]
async fn test_sink_failure_does_not_roll_back() {
    let mut t = engine_with(
        EngineConfig::default(),
        ScriptedProvider::new(),
        RecordingSink::failing(),
    );
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    let decision = t.engine.commit(Direction::Right).unwrap();
    process(&mut t.engine).await;

    assert_eq!(t.sink.records().len(), 1);
    assert_eq!(t.engine.cursor(), 1);
    assert_eq!(t.engine.history().last(), Some(&decision));
}

#[tokio::test(start_paused = true)]
async fn test_mutual_match_is_published() {
    let mut t = engine_with(
        EngineConfig::default(),
        ScriptedProvider::new(),
        RecordingSink::new().with_admirer("a"),
    );
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);
    drain(&mut t.events);

    t.engine.commit(Direction::Right);
    process(&mut t.engine).await;

    let matched = drain(&mut t.events).into_iter().find_map(|e| match e {
        MatchEvent::MutualMatch {
            candidate_id,
            candidate_name,
            ..
        } => Some((candidate_id, candidate_name)),
        _ => None,
    });
    assert_eq!(matched, Some(("a".into(), "A".to_string())));
}

#[tokio::test(start_paused = true)]
async fn test_feedback_flash() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b", "c"]), QueueKind::Individual);

    t.engine.commit(Direction::Right);
    assert_eq!(t.engine.feedback(), Some(SwipeFeedback::Saved));
    advance_and_process(&mut t.engine, 599).await;
    assert_eq!(t.engine.feedback(), Some(SwipeFeedback::Saved));
    advance_and_process(&mut t.engine, 1).await;
    assert!(t.engine.feedback().is_none());

    t.engine.commit(Direction::Left);
    assert_eq!(t.engine.feedback(), Some(SwipeFeedback::Skipped));
    t.engine.undo(None);
    assert!(t.engine.feedback().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_exhausting_the_queue() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a"]), QueueKind::Individual);
    drain(&mut t.events);

    t.engine.commit(Direction::Right);
    assert!(t.engine.is_exhausted());
    assert!(t.engine.commit(Direction::Left).is_none());
    assert!(!t.engine.begin_drag(1, 0.0, 0.0, Instant::now()));

    let events = drain(&mut t.events);
    assert!(events
        .iter()
        .any(|e| matches!(e, MatchEvent::Advanced { current: None, position: 1, total: 1, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, MatchEvent::QueueExhausted { total: 1, .. })));

    // Undo brings the last candidate back
    t.engine.undo(None);
    assert_eq!(t.engine.current().unwrap().id.as_str(), "a");
}

#[tokio::test(start_paused = true)]
async fn test_commit_event_order() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);
    drain(&mut t.events);

    t.engine.commit(Direction::Left);

    let events = drain(&mut t.events);
    let order = kinds(&events);
    let committed = order.iter().position(|k| *k == "DecisionCommitted").unwrap();
    let prompt = order.iter().position(|k| *k == "UndoPromptChanged").unwrap();
    let advanced = order.iter().position(|k| *k == "Advanced").unwrap();
    assert!(committed < prompt);
    assert!(prompt < advanced);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_engine_ignores_gestures() {
    let mut t = default_engine();
    t.engine.reset(candidates(&["a", "b"]), QueueKind::Individual);

    t.engine.set_disabled(true);
    assert!(!t.engine.begin_drag(1, 0.0, 0.0, Instant::now()));
    assert!(!t.engine.trigger_swipe(Direction::Right));

    t.engine.set_disabled(false);
    assert!(t.engine.trigger_swipe(Direction::Right));
}

#[tokio::test(start_paused = true)]
async fn test_spawned_engine_loop() {
    let t = default_engine();
    let (handle, task) = t.engine.spawn(16);
    let mut events = handle.subscribe();

    handle
        .reset(candidates(&["a", "b", "c"]), QueueKind::Individual)
        .await
        .unwrap();
    handle.swipe(Direction::Left).await.unwrap();

    // The leave timer commits on the engine task
    let decision = loop {
        match events.recv().await.unwrap() {
            MatchEvent::DecisionCommitted { decision, replayed } => {
                assert!(!replayed);
                break decision;
            }
            _ => continue,
        }
    };
    assert_eq!(decision.candidate_id().as_str(), "a");

    handle.undo(Some(decision.id().clone())).await.unwrap();
    loop {
        if let MatchEvent::DecisionUndone { decision: undone, .. } = events.recv().await.unwrap() {
            assert_eq!(undone.id(), decision.id());
            break;
        }
    }

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(handle.redo().await.is_err());
}

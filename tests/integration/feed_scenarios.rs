//! End-to-end fan-out scenarios against the public orchestrator API.

use std::time::Duration;

use feedweave::{FeedRequest, Item, OutcomeStatus};

use crate::helpers::{context, note, notes, orchestrator, Script, ScriptedGenerator};

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

fn assert_newest_first(items: &[Item]) {
    for pair in items.windows(2) {
        assert!(
            pair[0].created_at > pair[1].created_at
                || (pair[0].created_at == pair[1].created_at && pair[0].id < pair[1].id),
            "{} should precede {}",
            pair[0].id,
            pair[1].id
        );
    }
}

#[tokio::test(start_paused = true)]
async fn slow_generator_is_cut_off_at_budget_and_failure_is_contained() {
    let orch = orchestrator()
        .with_generator(ScriptedGenerator::items("instant", 0, notes("g1", 0, 5)))
        .with_generator(ScriptedGenerator::items("slow", 40, notes("g2", 30, 3)))
        .with_generator(ScriptedGenerator::failing("broken", "upstream 503"));

    let report = orch.run(&context(), &FeedRequest::default()).await.expect("feed");

    assert_eq!(report.items.len(), 5);
    assert!(report.items.iter().all(|i| i.id.as_str().starts_with("g1-")));
    assert_newest_first(&report.items);
    assert_eq!(ids(&report.items), vec!["g1-4", "g1-3", "g1-2", "g1-1", "g1-0"]);

    assert!(report.total_duration >= Duration::from_secs(30));
    assert!(report.total_duration < Duration::from_millis(30_500));

    assert_eq!(report.status_of("instant"), Some(&OutcomeStatus::Succeeded));
    assert_eq!(report.status_of("slow"), Some(&OutcomeStatus::Cancelled));
    match report.status_of("broken") {
        Some(OutcomeStatus::Failed { reason }) => assert!(reason.contains("upstream 503")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(report.successful_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn everything_failing_yields_empty_feed_not_error() {
    let orch = orchestrator()
        .with_generator(ScriptedGenerator::failing("a", "down"))
        .with_generator(ScriptedGenerator::new("b", Script::Panic))
        .with_generator(ScriptedGenerator::items("c", 60, notes("c", 0, 2)));

    let report = orch.run(&context(), &FeedRequest::default()).await.expect("feed");

    assert!(report.items.is_empty());
    assert_eq!(report.successful_count(), 0);
    assert_eq!(report.outcomes.len(), 3);
}

#[tokio::test]
async fn panicking_generator_does_not_affect_siblings() {
    let orch = orchestrator()
        .with_generator(ScriptedGenerator::new("panics", Script::Panic))
        .with_generator(ScriptedGenerator::items("ok", 0, notes("ok", 0, 2)));

    let report = orch.run(&context(), &FeedRequest::default()).await.expect("feed");

    assert_eq!(ids(&report.items), vec!["ok-1", "ok-0"]);
    match report.status_of("panics") {
        Some(OutcomeStatus::Failed { reason }) => assert!(reason.contains("scripted panic")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn truncates_to_limit_keeping_newest() {
    let orch = orchestrator()
        .with_generator(ScriptedGenerator::items("a", 0, notes("a", 0, 6)))
        .with_generator(ScriptedGenerator::items("b", 0, notes("b", 10, 6)));
    let request = FeedRequest {
        limit: 3,
        ..Default::default()
    };

    let items = orch.build_feed(&context(), &request).await.expect("feed");

    assert_eq!(ids(&items), vec!["b-5", "b-4", "b-3"]);
}

#[tokio::test]
async fn limit_zero_returns_nothing_but_still_runs_generators() {
    let orch = orchestrator().with_generator(ScriptedGenerator::items("a", 0, notes("a", 0, 4)));
    let request = FeedRequest {
        limit: 0,
        ..Default::default()
    };

    let report = orch.run(&context(), &request).await.expect("feed");

    assert!(report.items.is_empty());
    assert_eq!(report.successful_count(), 1);
    assert_eq!(report.outcomes[0].item_count, 4);
}

#[tokio::test]
async fn equal_timestamps_break_ties_by_id() {
    let orch = orchestrator()
        .with_generator(ScriptedGenerator::items("x", 0, vec![note("zeta", 5), note("alpha", 5)]))
        .with_generator(ScriptedGenerator::items("y", 0, vec![note("mid", 5), note("old", 1)]));

    let items = orch.build_feed(&context(), &FeedRequest::default()).await.expect("feed");

    assert_eq!(ids(&items), vec!["alpha", "mid", "zeta", "old"]);
}

#[tokio::test]
async fn result_does_not_depend_on_registration_order() {
    let forward = orchestrator()
        .with_generator(ScriptedGenerator::items("a", 0, notes("a", 0, 3)))
        .with_generator(ScriptedGenerator::items("b", 0, notes("b", 1, 3)));
    let reverse = orchestrator()
        .with_generator(ScriptedGenerator::items("b", 0, notes("b", 1, 3)))
        .with_generator(ScriptedGenerator::items("a", 0, notes("a", 0, 3)));

    let first = forward.build_feed(&context(), &FeedRequest::default()).await.expect("feed");
    let second = reverse.build_feed(&context(), &FeedRequest::default()).await.expect("feed");

    assert_eq!(first, second);
    assert_newest_first(&first);
}

#[tokio::test]
async fn repeated_calls_return_identical_feeds() {
    let orch = orchestrator()
        .with_generator(ScriptedGenerator::items("a", 0, notes("a", 0, 4)))
        .with_generator(ScriptedGenerator::items("b", 0, vec![note("a-1", 1)]));

    let first = orch.build_feed(&context(), &FeedRequest::default()).await.expect("feed");
    let second = orch.build_feed(&context(), &FeedRequest::default()).await.expect("feed");

    assert_eq!(first, second);
    // "a-1" is produced twice but returned once.
    assert_eq!(first.len(), 4);
}

#[tokio::test]
async fn closed_pool_fails_every_generator_open() {
    let orch = orchestrator()
        .with_generator(ScriptedGenerator::items("a", 0, notes("a", 0, 2)))
        .with_generator(ScriptedGenerator::items("b", 0, notes("b", 0, 2)));
    orch.pool().close();

    let report = orch.run(&context(), &FeedRequest::default()).await.expect("feed");

    assert!(report.items.is_empty());
    for outcome in &report.outcomes {
        match &outcome.status {
            OutcomeStatus::Failed { reason } => assert!(reason.contains("pool is closed")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

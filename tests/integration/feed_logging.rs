//! Structured log entries emitted by one fan-out.

use feedweave::FeedRequest;

use crate::helpers::{context, notes, orchestrator, LogCapture, ScriptedGenerator};

#[tokio::test(start_paused = true)]
async fn logs_each_outcome_and_the_summary() {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let orch = orchestrator()
        .with_generator(ScriptedGenerator::items("instant", 0, notes("g1", 0, 5)))
        .with_generator(ScriptedGenerator::items("slow", 40, notes("g2", 30, 3)))
        .with_generator(ScriptedGenerator::failing("broken", "upstream 503"));

    let report = orch.run(&context(), &FeedRequest::default()).await.expect("feed");
    assert_eq!(report.items.len(), 5);

    let succeeded = capture.line_with("generator succeeded", Some("instant"));
    assert!(succeeded.contains("INFO"));
    assert!(succeeded.contains("item_count=5"));
    assert!(succeeded.contains("duration_ms="));

    let cancelled = capture.line_with("generator cancelled at budget", Some("slow"));
    assert!(cancelled.contains("WARN"));
    assert!(cancelled.contains("cancelled=true"));

    let failed = capture.line_with("generator failed", Some("broken"));
    assert!(failed.contains("WARN"));
    assert!(failed.contains("reason=upstream error: upstream 503"));

    let summary = capture.line_with("feed built", None);
    assert!(summary.contains("INFO"));
    assert!(summary.contains("total_duration_ms=30"));
    assert!(summary.contains("successful_count=1"));
    assert!(summary.contains("total_count=3"));
    assert!(summary.contains("returned_count=5"));
    assert!(summary.contains("budget_hit=true"));
}

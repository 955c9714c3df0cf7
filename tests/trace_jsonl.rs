use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use ergo_harness::rater::{LocalRater, Rater};
use ergo_harness::session::{AssessmentSession, SessionConfig};
use ergo_harness::trace::{AssessmentTrace, JsonlTraceSink, TraceSink};
use ergo_harness::types::{Artifact, ContextTag};

#[derive(Debug, serde::Deserialize)]
struct TraceRow {
    rater_id: String,
    notation: Option<String>,
    timed_out: bool,
}

fn make_trace(rater_id: &str) -> AssessmentTrace {
    AssessmentTrace {
        timestamp_ms: 0,
        artifact_id: "subject".to_string(),
        snapshot_digest: "digest".to_string(),
        rater_id: rater_id.to_string(),
        notation: Some("<RLG>".to_string()),
        error: None,
        timed_out: false,
        latency_ms: 12,
    }
}

#[test]
fn jsonl_trace_sink_writes_events_and_flushes_on_join() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");

    let (sink, worker) = JsonlTraceSink::new(&path).unwrap();
    sink.record(make_trace("alpha")).unwrap();
    sink.record(make_trace("bravo")).unwrap();

    drop(sink);
    worker.join().unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: TraceRow = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.rater_id, "alpha");
    assert_eq!(first.notation.as_deref(), Some("<RLG>"));
    assert!(!first.timed_out);
}

#[tokio::test]
async fn sessions_trace_one_event_per_rater_invocation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    let (sink, worker) = JsonlTraceSink::new(&path).unwrap();

    let raters: Vec<Arc<dyn Rater>> = vec![
        Arc::new(LocalRater::new("local-1")),
        Arc::new(LocalRater::new("local-2")),
        Arc::new(LocalRater::new("local-3")),
    ];
    let session = AssessmentSession::with_config(
        raters,
        SessionConfig {
            rater_timeout: Duration::from_secs(2),
            ..SessionConfig::default()
        },
    )
    .with_trace(Arc::new(sink));

    let artifact = Artifact::new(
        "subject",
        "fn ping() {\n    pong();\n}\nfn pong() {\n    ping();\n}\n",
        ContextTag::Application,
    );
    session.run(&artifact).await.unwrap();

    drop(session);
    worker.join().unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let rows: Vec<TraceRow> = raw
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.notation.is_some()));
}

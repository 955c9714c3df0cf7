use ergo_harness::axes::Axis;
use ergo_harness::classifier::AxisClassifier;
use ergo_harness::consensus::ConsensusAggregator;
use ergo_harness::error::EngineError;
use ergo_harness::types::{Artifact, ContextTag, RaterAssessment};

// An artifact with an empty snapshot cannot be classified on any axis; no
// rating is produced in its place.
#[test]
fn empty_snapshot_fails_with_insufficient_input() {
    let classifier = AxisClassifier::new();
    let empty = Artifact::new("empty-subject", "", ContextTag::Library);

    for axis in Axis::ALL {
        let err = classifier
            .classify(&empty, axis, ContextTag::Library)
            .unwrap_err();
        match err {
            EngineError::InsufficientInput {
                artifact_id,
                axis: failed_axis,
                ..
            } => {
                assert_eq!(artifact_id, "empty-subject");
                assert_eq!(failed_axis, axis);
            }
            other => panic!("expected InsufficientInput, got {other}"),
        }
    }
    assert!(classifier.classify_all(&empty).is_err());
}

#[test]
fn identical_inputs_always_yield_identical_vectors() {
    let classifier = AxisClassifier::new();
    let artifact = Artifact::new(
        "subject",
        "fn load_config() -> Result<Config, ConfigError> {\n    let raw = read_file().context(\"reading config file\")?;\n    parse_settings(raw).context(\"parsing config\")\n}\nfn parse_settings(raw) {\n    raw\n}\n",
        ContextTag::Library,
    );

    let first = classifier.classify_all(&artifact).unwrap();
    for _ in 0..5 {
        assert_eq!(classifier.classify_all(&artifact).unwrap(), first);
    }
}

// Determinism end to end: three independent classifier-backed raters over
// the same snapshot must agree unanimously.
#[test]
fn deterministic_raters_produce_a_stable_consensus() {
    let classifier = AxisClassifier::new();
    let artifact = Artifact::new(
        "subject",
        "fn summarize_report(report_lines) {\n    collect_totals(report_lines)\n}\nfn collect_totals(report_lines) {\n    report_lines\n}\n",
        ContextTag::Application,
    );

    let assessments: Vec<RaterAssessment> = (0..3)
        .map(|i| {
            let vector = classifier.classify_all(&artifact).unwrap();
            RaterAssessment::new(format!("rater-{i}"), artifact.id(), vector)
        })
        .collect();

    let result = ConsensusAggregator::default()
        .aggregate(artifact.id(), &assessments)
        .unwrap();
    assert!(result.divergences.is_empty());
    for axis in Axis::ALL {
        assert_eq!(result.agreement(axis), 1.0);
    }
}

#[test]
fn classifications_carry_confidence_and_rationale() {
    let classifier = AxisClassifier::new();
    let artifact = Artifact::new(
        "subject",
        "fn ping() {\n    pong();\n}\nfn pong() {\n    ping();\n}\n",
        ContextTag::Application,
    );

    for axis in Axis::ALL {
        let c = classifier
            .classify(&artifact, axis, ContextTag::Application)
            .unwrap();
        assert!(!c.rationale.is_empty(), "{axis} rationale missing");
    }
}

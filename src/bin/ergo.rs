#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use ergo_harness::classifier::AxisClassifier;
use ergo_harness::consensus::{ConsensusAggregator, TieBreakPolicy};
use ergo_harness::notation;
use ergo_harness::planner::TransformationPlanner;
use ergo_harness::rater::{HttpRater, LocalRater, Rater};
use ergo_harness::session::{AssessmentSession, SessionConfig};
use ergo_harness::trace::JsonlTraceSink;
use ergo_harness::types::{Artifact, ContextTag, RaterAssessment};
use ergo_harness::Axis;

#[derive(Parser)]
#[command(name = "ergo", version, about = "Ergonomics rating harness CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an artifact on one axis, or all three
    Classify {
        /// Artifact JSON file: {id, content_snapshot, context_tag}
        artifact: PathBuf,
        #[arg(long)]
        axis: Option<String>,
        /// Override the artifact's own context tag
        #[arg(long)]
        context: Option<String>,
    },
    /// Aggregate rater assessments into a consensus
    Aggregate {
        /// JSON file holding a list of assessments
        input: PathBuf,
        #[arg(long)]
        artifact: String,
        #[arg(long, default_value_t = ConsensusAggregator::DEFAULT_MIN_RATERS)]
        min_raters: usize,
        /// Break ties toward the more desirable state instead of the default
        #[arg(long)]
        toward_best: bool,
    },
    /// Plan the stepwise walk between two ratings
    Plan {
        /// Current rating, notation form (e.g. "<OTS>")
        #[arg(long)]
        current: String,
        /// Target rating: notation form, or raw state indices "e,d,s"
        #[arg(long)]
        target: String,
        /// Comma-separated axis priority (default: error-surface,dependency-flow,expressiveness)
        #[arg(long)]
        priority: Option<String>,
    },
    /// Parse a notation string and show the per-axis breakdown
    Notation { value: String },
    /// Run a full assessment session against rater endpoints
    Assess {
        /// Artifact JSON file: {id, content_snapshot, context_tag}
        artifact: PathBuf,
        /// HTTP rater endpoint; repeatable
        #[arg(long = "rater")]
        raters: Vec<String>,
        /// Number of in-process classifier-backed raters to add
        #[arg(long, default_value_t = 0)]
        local_raters: usize,
        #[arg(long, default_value_t = ConsensusAggregator::DEFAULT_MIN_RATERS)]
        min_raters: usize,
        #[arg(long, default_value_t = 30_000)]
        timeout_ms: u64,
        /// JSONL trace of every rater invocation
        #[arg(long)]
        trace: Option<PathBuf>,
        /// Optional target rating (notation form); adds a plan to the report
        #[arg(long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Classify {
            artifact,
            axis,
            context,
        } => classify(artifact, axis, context),
        Commands::Aggregate {
            input,
            artifact,
            min_raters,
            toward_best,
        } => aggregate(input, &artifact, min_raters, toward_best),
        Commands::Plan {
            current,
            target,
            priority,
        } => plan(&current, &target, priority.as_deref()),
        Commands::Notation { value } => breakdown(&value),
        Commands::Assess {
            artifact,
            raters,
            local_raters,
            min_raters,
            timeout_ms,
            trace,
            target,
        } => {
            assess(
                artifact,
                raters,
                local_raters,
                min_raters,
                timeout_ms,
                trace,
                target,
            )
            .await
        }
    }
}

fn load_artifact(path: &PathBuf) -> Result<Artifact, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn classify(
    path: PathBuf,
    axis: Option<String>,
    context: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = load_artifact(&path)?;
    let context = match context {
        Some(name) => ContextTag::from_name(&name)
            .ok_or_else(|| format!("unknown context tag {name:?}"))?,
        None => artifact.context_tag(),
    };
    let classifier = AxisClassifier::new();

    let output = match axis {
        Some(name) => {
            let axis =
                Axis::from_name(&name).ok_or_else(|| format!("unknown axis {name:?}"))?;
            let classification = classifier.classify(&artifact, axis, context)?;
            json!({
                "artifact_id": artifact.id(),
                "axis": axis,
                "classification": classification,
            })
        }
        None => {
            let mut per_axis = serde_json::Map::new();
            for axis in Axis::ALL {
                let classification = classifier.classify(&artifact, axis, context)?;
                per_axis.insert(axis.name().to_string(), serde_json::to_value(classification)?);
            }
            let vector = classifier.classify_all(&artifact)?;
            json!({
                "artifact_id": artifact.id(),
                "notation": notation::format(&vector),
                "per_axis": per_axis,
            })
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn aggregate(
    input: PathBuf,
    artifact_id: &str,
    min_raters: usize,
    toward_best: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(&input)?;
    let assessments: Vec<RaterAssessment> = serde_json::from_str(&raw)?;

    let mut aggregator = ConsensusAggregator::new(min_raters);
    if toward_best {
        aggregator = aggregator.with_tie_break(TieBreakPolicy::TowardMostDesirable);
    }
    let result = aggregator.aggregate(artifact_id, &assessments)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn plan(
    current: &str,
    target: &str,
    priority: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let current = notation::parse(current)?;
    let priority = match priority {
        Some(raw) => Some(parse_priority(raw)?),
        None => None,
    };
    let planner = TransformationPlanner::new();

    let plan = if target.trim_start().starts_with('<') {
        let target = notation::parse(target)?;
        planner.plan_with_priority(&current, &target, priority.unwrap_or(Axis::DEFAULT_PRIORITY))?
    } else {
        let indices = parse_indices(target)?;
        planner.plan_to_indices(&current, indices, priority)?
    };
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn parse_priority(raw: &str) -> Result<[Axis; 3], Box<dyn std::error::Error>> {
    let axes: Vec<Axis> = raw
        .split(',')
        .map(str::trim)
        .map(|name| Axis::from_name(name).ok_or_else(|| format!("unknown axis {name:?}")))
        .collect::<Result<_, _>>()?;
    axes.try_into()
        .map_err(|_| "priority must name exactly three axes".into())
}

fn parse_indices(raw: &str) -> Result<[u8; 3], Box<dyn std::error::Error>> {
    let indices: Vec<u8> = raw
        .split(',')
        .map(str::trim)
        .map(|part| part.parse::<u8>().map_err(|e| format!("bad state index {part:?}: {e}")))
        .collect::<Result<_, _>>()?;
    indices
        .try_into()
        .map_err(|_| "target must list exactly three state indices".into())
}

fn breakdown(value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let vector = notation::parse(value)?;
    let per_axis: Vec<_> = Axis::ALL
        .into_iter()
        .map(|axis| {
            let state = vector.state(axis);
            let def = axis.state_def(state);
            json!({
                "axis": axis,
                "state": state,
                "symbol": def.symbol,
                "label": def.label,
                "summary": def.summary,
            })
        })
        .collect();
    let output = json!({
        "notation": notation::format(&vector),
        "per_axis": per_axis,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn assess(
    path: PathBuf,
    endpoints: Vec<String>,
    local_raters: usize,
    min_raters: usize,
    timeout_ms: u64,
    trace: Option<PathBuf>,
    target: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = load_artifact(&path)?;

    let mut raters: Vec<Arc<dyn Rater>> = Vec::new();
    for (i, endpoint) in endpoints.iter().enumerate() {
        raters.push(Arc::new(HttpRater::new(
            format!("http-{}", i + 1),
            endpoint.as_str(),
        )?));
    }
    for i in 0..local_raters {
        raters.push(Arc::new(LocalRater::new(format!("local-{}", i + 1))));
    }
    if raters.is_empty() {
        return Err("no raters configured; pass --rater and/or --local-raters".into());
    }

    let config = SessionConfig {
        min_raters,
        rater_timeout: Duration::from_millis(timeout_ms),
        ..SessionConfig::default()
    };
    let mut session = AssessmentSession::with_config(raters, config);

    let mut worker = None;
    if let Some(trace_path) = trace {
        let (sink, handle) = JsonlTraceSink::new(&trace_path)?;
        session = session.with_trace(Arc::new(sink));
        worker = Some(handle);
    }

    let report = match target {
        Some(raw) => {
            let target = notation::parse(&raw)?;
            session.run_to_target(&artifact, &target, None).await?
        }
        None => session.run(&artifact).await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    // Drop the session (and its sink handle) before flushing the trace.
    drop(session);
    if let Some(worker) = worker {
        worker.join()?;
    }
    Ok(())
}

use crate::cli::{Cli, Command, HistoryAction, HistoryFilter, PredictArgs};
use anyhow::Context;
use config::Config;
use covertype::history::export;
use covertype::{
    BatchPrediction, Classifier, HistoryQuery, HistoryRecord, HistoryStore,
    MemoryRepository, Session, SinglePrediction, TreeEnsemble, random_sample, template_csv,
};
use serde_json::json;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Configuration files checked when `--config` is not given.
pub fn default_config_candidates() -> anyhow::Result<Vec<PathBuf>> {
    let mut candidates = glob::glob("covertype.d/*.toml")?
        .filter_map(Result::ok)
        .collect::<Vec<_>>();
    candidates.sort();
    candidates.insert(0, "covertype.toml".into());
    trace!(?candidates, "config file candidates");
    Ok(candidates)
}

/// Resolve configuration and apply command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_multiple(default_config_candidates()?)?,
    };
    if let Some(model) = &cli.model {
        config.model.path = model.clone();
    }
    if cli.no_artifacts {
        config.artifacts.enabled = false;
    }
    Ok(config)
}

/// Execute the parsed command, writing results to `out`.
pub fn run(cli: &Cli, config: &Config, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Command::Predict(args) => {
            let mut session = open_session(cli, config)?;
            predict(&mut session, args, out)
        }
        Command::Batch { file, json } => {
            let mut session = open_session(cli, config)?;
            batch(&mut session, file, *json, out)
        }
        Command::History { action } => {
            let mut store = history_store(cli, config);
            history(&mut store, action, out)
        }
        Command::Template {
            rows,
            fixed,
            output,
        } => {
            let csv = template_csv(*rows, !*fixed, &mut rand::thread_rng());
            emit(output.as_deref(), csv.as_bytes(), out)
        }
    }
}

fn history_store(cli: &Cli, config: &Config) -> HistoryStore {
    if cli.no_history {
        HistoryStore::new(Box::new(MemoryRepository::default()), config.history.max_records)
            .with_display_limit(config.history.display_limit)
    } else {
        HistoryStore::from_config(&config.history)
    }
}

fn open_session(cli: &Cli, config: &Config) -> anyhow::Result<Session> {
    let classifier: Arc<dyn Classifier> = Arc::new(TreeEnsemble::load(&config.model.path)?);
    let session = Session::from_config(config, classifier)?.with_history(history_store(cli, config));
    debug!(view = %session.view(), theme = %session.theme(), "session ready");
    Ok(session)
}

fn predict(session: &mut Session, args: &PredictArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let sample = if args.random {
        random_sample(&mut rand::thread_rng())
    } else {
        args.sample()
    };
    let prediction = session.predict_single(sample)?;
    report_failures(
        prediction.artifact_error.as_ref().map(ToString::to_string),
        prediction.history_error.as_ref().map(ToString::to_string),
    )?;

    if args.json {
        return write_json(out, &single_json(&prediction));
    }

    let result = &prediction.result;
    for advisory in &prediction.advisories {
        writeln!(out, "Warning: {advisory}")?;
    }
    writeln!(
        out,
        "Predicted cover type: {} (class {})",
        result.class_name(),
        result.class_id()
    )?;
    writeln!(
        out,
        "Confidence: {:.2}% ({})",
        result.confidence,
        result.confidence_level()
    )?;
    writeln!(out, "Probabilities:")?;
    for (cover, p) in result.ranked() {
        writeln!(out, "  {:<18} {:>6.2}%", cover.name(), p * 100.0)?;
    }
    if let Some(dir) = &prediction.artifact_dir {
        writeln!(out, "Saved to {}", dir.display())?;
    }
    Ok(())
}

fn single_json(prediction: &SinglePrediction) -> serde_json::Value {
    json!({
        "record": prediction.record,
        "confidence_level": prediction.result.confidence_level().to_string(),
        "advisories": prediction
            .advisories
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    })
}

fn batch(session: &mut Session, file: &Path, as_json: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let prediction = session.predict_batch(&name, &text)?;
    report_failures(
        prediction.artifact_error.as_ref().map(ToString::to_string),
        prediction.history_error.as_ref().map(ToString::to_string),
    )?;

    if as_json {
        return write_json(out, &batch_json(&prediction));
    }

    writeln!(
        out,
        "Scored {} rows from {}",
        prediction.outcome.len(),
        prediction.record.file.as_deref().unwrap_or("upload")
    )?;
    for (cover, count) in prediction.outcome.distribution() {
        writeln!(out, "  {:<18} {:>6}", cover.name(), count)?;
    }
    if let Some(dir) = &prediction.artifact_dir {
        writeln!(out, "Saved to {}", dir.display())?;
    }
    Ok(())
}

fn batch_json(prediction: &BatchPrediction) -> serde_json::Value {
    let distribution: serde_json::Map<String, serde_json::Value> = prediction
        .outcome
        .distribution()
        .into_iter()
        .map(|(cover, count)| (cover.name().to_owned(), json!(count)))
        .collect();
    json!({
        "record": prediction.record,
        "distribution": distribution,
        "predictions": prediction
            .outcome
            .results
            .iter()
            .map(|r| r.class_id())
            .collect::<Vec<_>>(),
    })
}

fn history(store: &mut HistoryStore, action: &HistoryAction, out: &mut dyn Write) -> anyhow::Result<()> {
    match action {
        HistoryAction::List(filter) => {
            let query = build_query(store, filter);
            let records = store.query(filter.kind, &query);
            writeln!(
                out,
                "Showing {} {} records (most recent first)",
                records.len(),
                filter.kind
            )?;
            for record in &records {
                writeln!(out, "{}", describe(record))?;
            }
            Ok(())
        }
        HistoryAction::Export {
            filter,
            format,
            output,
        } => {
            let query = build_query(store, filter);
            let records = store.query(filter.kind, &query);
            debug!(records = records.len(), %format, "exporting history");
            let bytes = export(&records, *format)?;
            emit(output.as_deref(), &bytes, out)
        }
        HistoryAction::Summary => {
            let summary = store.summary();
            writeln!(out, "Single predictions: {}", summary.single)?;
            writeln!(out, "Batch predictions: {}", summary.batch)?;
            writeln!(
                out,
                "Avg. confidence (single): {:.2}%",
                summary.mean_confidence.unwrap_or(0.0)
            )?;
            Ok(())
        }
    }
}

fn build_query(store: &HistoryStore, filter: &HistoryFilter) -> HistoryQuery {
    let mut query = if filter.all {
        HistoryQuery::default()
    } else {
        store.display_query()
    };
    query.text = filter.search.clone();
    query.from = filter.from;
    query.to = filter.to;
    query
}

fn describe(record: &HistoryRecord) -> String {
    let ts = record.timestamp().unwrap_or("?");
    match record {
        HistoryRecord::Single(r) => format!(
            "{ts}  {:<18} {:>7}",
            r.prediction_name.as_deref().unwrap_or("?"),
            r.confidence.map_or_else(|| "?".to_owned(), |c| format!("{c:.2}%"))
        ),
        HistoryRecord::Batch(r) => format!(
            "{ts}  {}  {} rows",
            r.file.as_deref().unwrap_or("?"),
            r.rows.map_or_else(|| "?".to_owned(), |n| n.to_string())
        ),
    }
}

fn write_json(out: &mut dyn Write, value: &serde_json::Value) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn emit(output: Option<&Path>, bytes: &[u8], out: &mut dyn Write) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.display())),
        None => Ok(out.write_all(bytes)?),
    }
}

/// Saving is best effort: the prediction stands, the user is told.
fn report_failures(artifact: Option<String>, history: Option<String>) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    if let Some(err) = artifact {
        writeln!(stderr, "Prediction files were not saved: {err}")?;
    }
    if let Some(err) = history {
        writeln!(stderr, "History was not saved: {err}")?;
    }
    Ok(())
}

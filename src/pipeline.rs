//! Batch driver: load the tables once, run every analysis, write each answer

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::info;

use crate::algorithm::{Analysis, Answer};
use crate::config::{AnalyticsConfig, CsvLoaderConfig};
use crate::error::{Error, Result};
use crate::loader::CrashTables;
use crate::utils::logging::{create_query_progress_bar, finish_and_clear, report_line};
use crate::writer::write_answer;

/// Banner printed before the first analysis
pub const START_BANNER: &str =
    "########################### Execution Started ###################################";
/// Banner printed after the last analysis
pub const END_BANNER: &str =
    "########################### Execution Ended ###################################";

/// One written analysis result
#[derive(Debug, Clone)]
pub struct CompletedAnalysis {
    pub analysis: Analysis,
    pub answer: Answer,
    pub path: PathBuf,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub completed: Vec<CompletedAnalysis>,
    pub elapsed: Duration,
}

/// Run every analysis against already-loaded tables, writing each answer
/// before starting the next
pub fn run_analyses(tables: &CrashTables, config: &AnalyticsConfig) -> Result<RunSummary> {
    let start = Instant::now();
    let pb = create_query_progress_bar(Analysis::ALL.len() as u64, Some("running analyses"));
    let mut summary = RunSummary::default();

    report_line(&pb, START_BANNER);
    report_line(&pb, "");

    for analysis in Analysis::ALL {
        let key = analysis.output_key();
        let path = config
            .output
            .get(&key)
            .ok_or_else(|| Error::Config {
                path: PathBuf::from(&key),
                message: format!("no output path for {key}"),
            })?
            .to_path_buf();

        let query_start = Instant::now();
        let answer = analysis
            .run(tables)
            .with_context(|| format!("Running {analysis}"))?;
        info!(
            "{analysis} produced {} rows in {:?}",
            answer.len(),
            query_start.elapsed()
        );

        write_answer(&answer, &path).with_context(|| format!("Writing {analysis}"))?;

        report_line(&pb, &format!("-> Question-{} Finished", analysis.number()));
        pb.inc(1);

        summary.completed.push(CompletedAnalysis {
            analysis,
            answer,
            path,
        });
    }

    finish_and_clear(&pb);
    report_line(&pb, &format!("\n{END_BANNER}"));

    summary.elapsed = start.elapsed();
    Ok(summary)
}

/// Load the configured tables and run every analysis
pub fn run_all(config: &AnalyticsConfig, loader_config: &CsvLoaderConfig) -> Result<RunSummary> {
    let start = Instant::now();
    let tables = CrashTables::load(&config.data, loader_config)?;
    info!("Loaded all tables in {:?}", start.elapsed());

    let mut summary = run_analyses(&tables, config)?;
    summary.elapsed = start.elapsed();
    info!(
        "Completed {} analyses in {:?}",
        summary.completed.len(),
        summary.elapsed
    );
    Ok(summary)
}

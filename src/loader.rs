//! CSV table loading utilities

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;

use crate::config::{CsvLoaderConfig, DataPaths};
use crate::error::Result;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read a CSV file with a header row into a single record batch
///
/// The schema is inferred from the file, so columns holding only integers
/// come back as `Int64` and everything else as `Utf8`. Fields matching one
/// of the configured null tokens are read as null.
pub fn read_csv(path: &Path, config: &CsvLoaderConfig) -> Result<RecordBatch> {
    log_operation_start("Reading CSV table", path);
    let start = Instant::now();

    let mut file =
        File::open(path).with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let format = Format::default()
        .with_header(true)
        .with_null_regex(config.null_regex()?);

    let (schema, _) = format
        .infer_schema(&mut file, config.infer_rows)
        .with_context(|| format!("Failed to infer schema of {}", path.display()))?;
    file.rewind()
        .with_context(|| format!("Failed to rewind {}", path.display()))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(config.batch_size)
        .build(file)
        .with_context(|| format!("Failed to build CSV reader for {}", path.display()))?;

    let mut batches = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .with_context(|| format!("Failed to read record batch from {}", path.display()))?;
        batches.push(batch);
    }

    let table = concat_batches(&schema, &batches)
        .with_context(|| format!("Failed to combine record batches from {}", path.display()))?;

    log_operation_complete("read", path, table.num_rows(), Some(start.elapsed()));
    Ok(table)
}

/// The six input tables, loaded once and shared read-only by every query
#[derive(Debug, Clone)]
pub struct CrashTables {
    pub charges: RecordBatch,
    pub damages: RecordBatch,
    pub endorsements: RecordBatch,
    pub persons: RecordBatch,
    pub units: RecordBatch,
    pub restricts: RecordBatch,
}

impl CrashTables {
    /// Load every table named in the `Data` section
    pub fn load(paths: &DataPaths, config: &CsvLoaderConfig) -> Result<Self> {
        Ok(Self {
            charges: read_csv(&paths.charges, config).context("Loading charges table")?,
            damages: read_csv(&paths.damages, config).context("Loading damages table")?,
            endorsements: read_csv(&paths.endorses, config)
                .context("Loading endorsements table")?,
            persons: read_csv(&paths.persons, config).context("Loading persons table")?,
            units: read_csv(&paths.units, config).context("Loading units table")?,
            restricts: read_csv(&paths.restricts, config).context("Loading restricts table")?,
        })
    }
}

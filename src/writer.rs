//! CSV output for analysis answers

use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use arrow::csv::WriterBuilder;

use crate::algorithm::Answer;
use crate::error::Result;
use crate::utils::logging::{log_operation_complete, log_warning};

/// Write an answer as CSV with a header row and no index column
///
/// Missing parent directories are created.
pub fn write_answer(answer: &Answer, path: &Path) -> Result<()> {
    let start = Instant::now();
    let batch = answer.to_record_batch()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(&batch)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;

    if answer.is_empty() {
        log_warning("Answer has no rows, wrote header only", Some(path));
    }
    log_operation_complete("wrote", path, batch.num_rows(), Some(start.elapsed()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CsvLoaderConfig;
    use crate::loader::read_csv;
    use crate::utils::arrow::string_column;

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analytics4.csv");
        let answer = Answer::Column {
            name: "VEH_MAKE_ID",
            values: vec!["FORD".into(), "CHEVROLET".into(), "TOYOTA".into()],
        };

        write_answer(&answer, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("VEH_MAKE_ID\n"));

        let batch = read_csv(&path, &CsvLoaderConfig::default()).unwrap();
        let makes = string_column(&batch, "VEH_MAKE_ID").unwrap();
        let makes: Vec<&str> = makes.iter().flatten().collect();
        assert_eq!(makes, vec!["FORD", "CHEVROLET", "TOYOTA"]);
    }

    #[test]
    fn test_count_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics1.csv");
        let answer = Answer::Count {
            label: "male_fatalities",
            value: 182,
        };

        write_answer(&answer, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "male_fatalities\n182\n");
    }

    #[test]
    fn test_pairs_with_commas_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics5.csv");
        let answer = Answer::Pairs {
            columns: ["VEH_BODY_STYL_ID", "PRSN_ETHNICITY_ID"],
            rows: vec![
                ("PASSENGER CAR, 4-DOOR".into(), "WHITE".into()),
                ("SPORT UTILITY VEHICLE".into(), "HISPANIC".into()),
            ],
        };

        write_answer(&answer, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"PASSENGER CAR, 4-DOOR\",WHITE"));

        let batch = read_csv(&path, &CsvLoaderConfig::default()).unwrap();
        assert_eq!(batch.num_columns(), 2);
        let styles = string_column(&batch, "VEH_BODY_STYL_ID").unwrap();
        let ethnicities = string_column(&batch, "PRSN_ETHNICITY_ID").unwrap();
        let styles: Vec<&str> = styles.iter().flatten().collect();
        let ethnicities: Vec<&str> = ethnicities.iter().flatten().collect();
        assert_eq!(styles, vec!["PASSENGER CAR, 4-DOOR", "SPORT UTILITY VEHICLE"]);
        assert_eq!(ethnicities, vec!["WHITE", "HISPANIC"]);
    }

    #[test]
    fn test_label_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics3.csv");
        let answer = Answer::Label {
            label: "state_with_most_female_involvement",
            value: Some("Texas".into()),
        };

        write_answer(&answer, &path).unwrap();

        let batch = read_csv(&path, &CsvLoaderConfig::default()).unwrap();
        assert_eq!(batch.num_rows(), 1);
        let states = string_column(&batch, "state_with_most_female_involvement").unwrap();
        assert_eq!(states.value(0), "Texas");
    }
}

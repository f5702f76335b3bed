use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crash_analytics::{AnalyticsConfig, CONFIG_FILE_NAME, CsvLoaderConfig, Error, run_all};
use log::info;

/// Compute the crash analytics described in a YAML config file
#[derive(Parser)]
#[command(name = "crash-analytics", version)]
#[command(about = "Descriptive statistics over traffic-accident CSV tables", long_about = None)]
struct Cli {
    /// Config file name (must be config.yaml)
    config: Option<String>,
}

/// Ask on stdin until the expected config file name is typed
fn prompt_for_config(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> crash_analytics::Result<String> {
    loop {
        writeln!(
            output,
            "Please provide the correct config file name to proceed further...!!!, Ex: {CONFIG_FILE_NAME}"
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Prompt {
                expected: CONFIG_FILE_NAME.to_string(),
            }
            .into());
        }
        if line.trim_end_matches(['\r', '\n']) == CONFIG_FILE_NAME {
            return Ok(CONFIG_FILE_NAME.to_string());
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_name = match cli.config {
        Some(name) if name == CONFIG_FILE_NAME => name,
        _ => prompt_for_config(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let config_path = PathBuf::from(config_name);
    let config = AnalyticsConfig::load(&config_path)
        .with_context(|| format!("Loading {}", config_path.display()))?;

    let summary = run_all(&config, &CsvLoaderConfig::default())?;
    info!(
        "Wrote {} answers in {:?}",
        summary.completed.len(),
        summary.elapsed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_repeats_until_expected_name() {
        let mut input = Cursor::new("settings.yaml\nconfig.yml\nconfig.yaml\n");
        let mut output = Vec::new();
        let name = prompt_for_config(&mut input, &mut output).unwrap();
        assert_eq!(name, CONFIG_FILE_NAME);
        let prompts = String::from_utf8(output).unwrap();
        assert_eq!(prompts.lines().count(), 3);
    }

    #[test]
    fn test_prompt_fails_on_closed_input() {
        let mut input = Cursor::new("wrong.yaml\n");
        let mut output = Vec::new();
        let err = prompt_for_config(&mut input, &mut output).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Prompt { .. })));
    }
}

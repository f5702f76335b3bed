//! Progress reporting for the analytics run
//!
//! The bar draws to stderr and hides itself when stderr is not a terminal.
//! Console lines go through [`report_line`] so they are printed whether or
//! not the bar is visible.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for the query progress bar
pub const DEFAULT_QUERY_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Create the progress bar tracking completed queries
#[must_use]
pub fn create_query_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(DEFAULT_QUERY_TEMPLATE)
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"));
    pb.set_style(style);

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}

/// Print a console line above the progress bar
pub fn report_line(pb: &ProgressBar, line: &str) {
    pb.suspend(|| println!("{line}"));
}

/// Finish a progress bar and clear it from display
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}

//! Console progress reporting.
//!
//! One spinner per run, updated with whatever milestone message the
//! engine reports. Reporting is advisory: nothing here may block or
//! panic, and dropping the spinner mid-run is always safe.

use indicatif::{ProgressBar, ProgressStyle};
use kalendo_application::ProgressReporter;
use std::time::Duration;

/// Spinner-based progress display for one orchestration run
pub struct ConsoleProgress {
    spinner: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner }
    }

    /// Clear the spinner once the run is over.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressReporter for SimpleProgress {
    fn report(&self, message: &str) {
        println!("-> {}", message);
    }
}

//! Progress bar utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bars are drawn unless METATAX_SILENT is set
pub fn progress_enabled() -> bool {
    std::env::var_os("METATAX_SILENT").is_none()
}

/// Standard progress bar, hidden when progress is disabled
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    if !progress_enabled() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta})")
    {
        pb.set_style(style.progress_chars("━━─"));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner for work of unknown length
pub fn create_spinner(message: &str) -> ProgressBar {
    if !progress_enabled() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

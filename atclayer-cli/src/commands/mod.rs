//! CLI command implementations.

pub mod index;
pub mod layers;
pub mod link;

use std::path::Path;

use atclayer::app::{App, AppConfig};
use atclayer::loader::{FsSource, LoadReport};
use atclayer::render::MemoryRenderer;

use crate::error::CliError;

/// Start the application against a data directory with the stock config.
pub(crate) async fn start_app(data: &Path) -> Result<(App<MemoryRenderer>, LoadReport), CliError> {
    let source = FsSource::new(data);
    App::start(AppConfig::default(), &source, MemoryRenderer::new())
        .await
        .map_err(CliError::from)
}

/// Print per-file load problems, if any.
pub(crate) fn print_report(report: &LoadReport) {
    for failed in &report.failed {
        println!("unavailable: {} ({})", failed.path, failed.error);
    }
    for path in &report.unclassified {
        println!("skipped (unclassifiable): {}", path);
    }
}

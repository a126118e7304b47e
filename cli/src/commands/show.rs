//! Saved report display command

use crate::scenario::BenchmarkReport;
use anyhow::Result;
use std::path::PathBuf;

/// Print the summary of a previously saved report
pub async fn show_command(path: PathBuf) -> Result<()> {
    let report = BenchmarkReport::load(&path).await?;
    println!("🗂️  Run {} started {}", report.run_id, report.started_at);
    report.print_summary();
    Ok(())
}

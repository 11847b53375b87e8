//! Run statistics reporting.

use console::style;

use crate::archive::ArchiveStats;

/// Soft ceiling on daily API calls; crossing it earns a warning.
const API_BUDGET_WARN_THRESHOLD: u64 = 400;

/// Print the archival run summary.
pub fn print_run_stats(stats: &ArchiveStats, api_requests: Option<u64>) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Archive run complete").bold());
    println!("  Total posts:     {}", stats.total);
    println!("  Archived:        {}", style(stats.succeeded).green());
    if stats.failed > 0 {
        println!("  Failed:          {}", style(stats.failed).red());
    } else {
        println!("  Failed:          {}", stats.failed);
    }
    println!("  Media downloaded: {}", stats.media_downloaded);

    if let Some(requests) = api_requests {
        println!("  API requests:    {}", requests);
    }
    println!("{}", style("═".repeat(50)).dim());

    if let Some(requests) = api_requests {
        if requests > API_BUDGET_WARN_THRESHOLD {
            println!(
                "{} High API usage: {}/~500 daily limit",
                style("WARN").yellow().bold(),
                requests
            );
        }
    }
}

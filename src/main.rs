// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and validate the settings
// 3. Run the crawl (Ctrl-C stops it gracefully)
// 4. Print the report
// 5. Exit with proper code (0 = crawl ran to the end, 2 = error, 130 = interrupted)
//
// Individual pages that fail to download do NOT change the exit code: they
// are listed in the report. Only a crawl that could not start is an error.
//
// Rust concepts used:
// - async/await: many downloads run concurrently on the tokio runtime
// - Arc: the fetcher is shared by every worker task
// - Result<T, E>: for error handling, with `?` to bubble errors up
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - validated settings
mod crawl;    // src/crawl/ - the crawl engine
mod error;    // src/error.rs - error types
mod fetch;    // src/fetch/ - HTTP downloads
mod logging;  // src/logging.rs - tracing setup
mod markup;   // src/markup/ - link discovery and rewriting
mod mirror;   // src/mirror/ - URL to file mapping, writing files

use anyhow::Result;
use clap::Parser; // Parser trait enables the parse() method
use std::sync::Arc;
use tracing::{info, warn};

use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlReport, Crawler};
use fetch::HttpFetcher;

/// Exit code when the operator interrupted the crawl (128 + SIGINT)
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Settings or startup problems; print the whole cause chain
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0)   = crawl ran until there was nothing left to fetch
//   Ok(130) = crawl was interrupted with Ctrl-C
//   Err     = the crawl could not start
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;

    let config = CrawlConfig::new(
        &cli.url,
        cli.depth,
        cli.concurrency,
        cli.timeout,
        cli.output,
        cli.user_agent,
    )?;

    info!(
        seed = %config.seed,
        depth = config.max_depth,
        concurrency = config.max_concurrency,
        output = %config.output_dir.display(),
        "starting crawl"
    );

    let fetcher = Arc::new(HttpFetcher::new(config.request_timeout, &config.user_agent)?);
    let crawler = Crawler::new(&config, fetcher);

    // Ctrl-C stops admission; downloads already running are allowed to finish
    let cancel = crawler.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing downloads already in progress");
            cancel.cancel();
        }
    });

    let report = crawler.run(&config.seed).await;

    print_report(&report, cli.json)?;

    if crawler.cancellation().is_cancelled() {
        Ok(EXIT_INTERRUPTED)
    } else {
        Ok(0)
    }
}

// Prints the report either as a table or JSON
// Parameters:
//   report: the finished crawl's report
//   json: whether to output JSON format
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints the report as a human-readable summary in the terminal
fn print_table(report: &CrawlReport) {
    if !report.failures.is_empty() {
        println!("{:<60} {:<10} {:<30}", "URL", "STAGE", "MESSAGE");
        println!("{}", "=".repeat(100));

        for failure in &report.failures {
            // Truncate URL if too long for display
            let url_display = if failure.url.chars().count() > 57 {
                let head: String = failure.url.chars().take(57).collect();
                format!("{}...", head)
            } else {
                failure.url.clone()
            };
            let stage = format!("{:?}", failure.stage).to_lowercase();

            println!("{:<60} {:<10} {}", url_display, stage, failure.message);
        }

        println!();
    }

    println!("📊 Summary:");
    println!("   💾 Saved: {} file(s), {} byte(s)", report.saved, report.bytes_written);
    println!("   ❌ Failed: {}", report.failed());
    println!("   ⚠️  Saved unmodified (unparseable markup): {}", report.parse_fallbacks);
    println!("   🔁 Duplicates skipped: {}", report.duplicates_skipped);
    println!("   📏 Beyond max depth: {}", report.beyond_depth);
    if report.skipped_after_cancel > 0 {
        println!("   🛑 Skipped after interrupt: {}", report.skipped_after_cancel);
    }
    println!("   ⏱️  Elapsed: {:.2}s", report.elapsed_secs);
}

// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is only one thing this tool does (mirror a site), so there are no
// subcommands: one positional URL plus a handful of flags.
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct definition
// - value_parser: plugging our own function in to parse a flag (--timeout)
// =============================================================================

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::DEFAULT_USER_AGENT;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "site-mirror",
    version,
    about = "Recursively download a website into a browsable local copy",
    long_about = "site-mirror crawls a website starting from one URL, saves every same-host page, \
                  stylesheet, script and image it finds, and rewrites links so the copy \
                  can be browsed offline."
)]
pub struct Cli {
    /// Starting URL (e.g., https://example.com/)
    ///
    /// Only pages and resources on this URL's host are downloaded
    pub url: String,

    /// Maximum page depth to follow (0 = only the starting page)
    ///
    /// Stylesheets, scripts and images don't count as a level: they are
    /// always fetched for every page that is fetched
    #[arg(long, default_value_t = 1)]
    pub depth: usize,

    /// How many downloads may run at the same time
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,

    /// Directory the mirror is written into
    ///
    /// Created if missing (the parent must exist)
    #[arg(long, default_value = "downloaded_site")]
    pub output: PathBuf,

    /// Per-request timeout (e.g. 500ms, 10s, 2m; a bare number means seconds)
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Print the final report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides this
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

// Parses a human-friendly duration
//
// Parameters:
//   raw: "250ms", "10s", "2m", "1h" or a bare number of seconds
// Returns: the duration, or a message clap shows next to the flag
fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);

    let value: u64 = number
        .parse()
        .map_err(|_| format!("'{raw}' is not a duration (try 10s or 500ms)"))?;

    let seconds_per_unit: u64 = match unit {
        "ms" => return Ok(Duration::from_millis(value)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => return Err(format!("unknown duration unit '{other}' (use ms, s, m or h)")),
    };

    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("'{raw}' is too long a duration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["site-mirror", "https://example.com/"]).unwrap();
        assert_eq!(cli.url, "https://example.com/");
        assert_eq!(cli.depth, 1);
        assert_eq!(cli.concurrency, 5);
        assert_eq!(cli.output, PathBuf::from("downloaded_site"));
        assert_eq!(cli.timeout, Duration::from_secs(10));
        assert_eq!(cli.user_agent, DEFAULT_USER_AGENT);
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "site-mirror",
            "http://example.com/docs/",
            "--depth",
            "3",
            "--concurrency",
            "8",
            "--output",
            "/tmp/mirror",
            "--timeout",
            "1500ms",
            "--user-agent",
            "bot/1.0",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.depth, 3);
        assert_eq!(cli.concurrency, 8);
        assert_eq!(cli.output, PathBuf::from("/tmp/mirror"));
        assert_eq!(cli.timeout, Duration::from_millis(1500));
        assert_eq!(cli.user_agent, "bot/1.0");
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["site-mirror"]).is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("7"), Ok(Duration::from_secs(7)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10 parsecs").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn test_parse_duration_overflow_is_an_error() {
        assert!(parse_duration("307445734561825861m").is_err());
        assert!(parse_duration("5124095576030432h").is_err());
        assert!(parse_duration("99999999999999999999s").is_err());
        let args = ["site-mirror", "http://x/", "--timeout", "307445734561825861m"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is `timeout` a Duration and not a String?
//    - value_parser runs our function during parsing, so a bad value is
//      reported by clap with the usual usage message and exit code
//    - The rest of the program never sees an unparsed timeout
//
// 2. What does ArgAction::Count do?
//    - Each -v adds one, so -vv gives 2
//
// 3. Why isn't the URL a `Url`?
//    - Validation lives in config.rs so the same rules apply no matter where
//      the settings come from
// -----------------------------------------------------------------------------

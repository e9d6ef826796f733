// src/config.rs
// =============================================================================
// Validated crawl settings.
//
// The CLI hands over raw values; `CrawlConfig::new` checks them and prepares
// the output directory. Anything wrong here is a ConfigError, and the run stops
// before a single request is made.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// User-Agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("site-mirror/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Starting page, fragment removed
    pub seed: Url,
    /// Deepest page level to fetch (seed = 0)
    pub max_depth: usize,
    /// Most fetches allowed in flight at once (>= 1)
    pub max_concurrency: usize,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Mirror root; one subdirectory per host goes in here
    pub output_dir: PathBuf,
    pub user_agent: String,
}

impl CrawlConfig {
    // Validates raw settings
    //
    // The output directory is created if missing, but only one level deep:
    // a missing parent is treated as a typo rather than silently created.
    pub fn new(
        seed: &str,
        max_depth: usize,
        max_concurrency: usize,
        request_timeout: Duration,
        output_dir: PathBuf,
        user_agent: String,
    ) -> Result<Self, ConfigError> {
        let seed = parse_seed(seed)?;

        if max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        prepare_output_dir(&output_dir)?;

        Ok(Self {
            seed,
            max_depth,
            max_concurrency,
            request_timeout,
            output_dir,
            user_agent,
        })
    }
}

// Parses the seed URL; it must be absolute http(s) with a host
fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidSeed {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}

fn prepare_output_dir(path: &Path) -> Result<(), ConfigError> {
    let unusable = |reason: String| ConfigError::OutputDir {
        path: path.to_path_buf(),
        reason,
    };

    if path.exists() {
        if !path.is_dir() {
            return Err(unusable("exists but is not a directory".to_string()));
        }
        return Ok(());
    }

    std::fs::create_dir(path).map_err(|e| unusable(e.to_string()))
}

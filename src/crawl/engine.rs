// src/crawl/engine.rs
// =============================================================================
// The crawl engine: turns one seed URL into a mirrored site.
//
// How it works:
// 1. The seed is admitted as a depth-0 page
// 2. Every admitted target becomes its own task in a JoinSet
// 3. A task waits for a slot in the concurrency budget, then
//    fetches -> (rewrites, if it is an HTML page) -> saves
// 4. When a task finishes, the links it discovered are offered for admission
// 5. The crawl is over when the JoinSet is empty: nothing running, nothing
//    waiting, nothing left to admit
//
// Admission rules (checked in this order):
// - The operator has not cancelled the crawl
// - The target is not deeper than max_depth (resources inherit their page's
//   depth, so a resource linked from an admitted page always passes)
// - Nobody has claimed this URL before (atomic check-and-insert)
//
// Failures stay local: a target that cannot be fetched or saved is recorded
// in the report and the rest of the crawl carries on.
//
// Rust concepts:
// - JoinSet: a set of spawned tasks we can await one at a time
// - Semaphore: a counting permit; the permit is released when it is dropped,
//   which happens on every way out of a function (including early returns
//   and panics)
// - Arc: shares the fetcher, budget and visited set between tasks
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

use super::report::{CrawlReport, FailureStage};
use super::target::CrawlTarget;
use super::visited::VisitedSet;
use crate::config::CrawlConfig;
use crate::error::error_chain;
use crate::fetch::{body_from_bytes, collect_body, Fetcher};
use crate::markup::{self, DiscoveredLink, LinkKind};
use crate::mirror::{MirrorWriter, SavedFile};

/// Cooperative stop signal.
///
/// Once set, no new targets are admitted. Work already admitted runs to
/// completion so every budget slot is released normally.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How one target ended
#[derive(Debug)]
pub enum TargetOutcome {
    Saved(SavedFile),
    Failed { stage: FailureStage, message: String },
}

/// What a worker hands back to the engine
#[derive(Debug)]
pub struct CompletedTarget {
    pub target: CrawlTarget,
    pub outcome: TargetOutcome,
    /// The page was HTML but could not be processed; saved unmodified
    pub parse_fallback: bool,
    /// Same-site links found on the page (empty for resources and failures)
    pub discovered: Vec<DiscoveredLink>,
}

impl CompletedTarget {
    fn failed(target: CrawlTarget, stage: FailureStage, message: String) -> Self {
        Self {
            target,
            outcome: TargetOutcome::Failed { stage, message },
            parse_fallback: false,
            discovered: Vec::new(),
        }
    }
}

pub struct Crawler<F> {
    fetcher: Arc<F>,
    writer: MirrorWriter,
    visited: VisitedSet,
    budget: Arc<Semaphore>,
    cancel: CancellationFlag,
    max_depth: usize,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(config: &CrawlConfig, fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            writer: MirrorWriter::new(&config.output_dir),
            visited: VisitedSet::new(),
            budget: Arc::new(Semaphore::new(config.max_concurrency)),
            cancel: CancellationFlag::default(),
            max_depth: config.max_depth,
        }
    }

    /// Handle for stopping the crawl from elsewhere (e.g. a Ctrl-C listener)
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    // Crawls from `seed` until the frontier is exhausted
    //
    // Returns: the report; per-target failures are inside it, never an Err
    pub async fn run(&self, seed: &Url) -> CrawlReport {
        let started = Instant::now();
        let mut report = CrawlReport::default();
        let mut in_flight: JoinSet<CompletedTarget> = JoinSet::new();

        self.admit(CrawlTarget::seed(seed), &mut in_flight, &mut report);

        // The JoinSet length is the outstanding-work counter: admission adds
        // one, every completion (success, failure or panic) removes one
        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(completed) => {
                    report.record(&completed);
                    let CompletedTarget {
                        target,
                        mut discovered,
                        ..
                    } = completed;
                    // Pages claim first: a URL that is both a page and a
                    // resource of this page must be crawled (and named) as a page
                    discovered.sort_by_key(|link| link.kind != LinkKind::Page);
                    for link in discovered {
                        self.admit(target.child(link), &mut in_flight, &mut report);
                    }
                }
                Err(join_error) => {
                    error!(error = %join_error, "crawl worker died");
                    report.record_worker_failure(join_error.to_string());
                }
            }
        }

        report.finish(started.elapsed());
        info!(
            saved = report.saved,
            failed = report.failed(),
            visited = self.visited.len(),
            elapsed_secs = report.elapsed_secs,
            "crawl finished"
        );
        report
    }

    fn admit(
        &self,
        target: CrawlTarget,
        in_flight: &mut JoinSet<CompletedTarget>,
        report: &mut CrawlReport,
    ) {
        if self.cancel.is_cancelled() {
            debug!(url = %target.url(), "crawl cancelled, not admitting");
            report.skipped_after_cancel += 1;
            return;
        }

        // Depth before claim: a link seen too deep must not block the same
        // URL from being admitted later through a shorter path
        if target.depth() > self.max_depth {
            debug!(url = %target.url(), depth = target.depth(), "beyond max depth");
            report.beyond_depth += 1;
            return;
        }

        if !self.visited.claim(target.url()) {
            report.duplicates_skipped += 1;
            return;
        }

        debug!(
            url = %target.url(),
            depth = target.depth(),
            kind = ?target.kind(),
            "admitted"
        );
        report.admitted += 1;

        let worker = Worker {
            fetcher: Arc::clone(&self.fetcher),
            writer: self.writer.clone(),
            budget: Arc::clone(&self.budget),
        };
        in_flight.spawn(worker.process(target));
    }
}

// Everything one task needs, cloned out of the Crawler
struct Worker<F> {
    fetcher: Arc<F>,
    writer: MirrorWriter,
    budget: Arc<Semaphore>,
}

impl<F: Fetcher> Worker<F> {
    // Fetch, optionally rewrite, save. Never returns early without the
    // permit being dropped.
    async fn process(self, target: CrawlTarget) -> CompletedTarget {
        let _permit = match Arc::clone(&self.budget).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                return CompletedTarget::failed(
                    target,
                    FailureStage::Fetch,
                    "concurrency budget closed".to_string(),
                )
            }
        };

        let url = target.url().clone();
        info!(url = %url, depth = target.depth(), "downloading");

        let response = match self.fetcher.fetch(&url).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %url, error = %err, "fetch failed");
                return CompletedTarget::failed(target, FailureStage::Fetch, err.to_string());
            }
        };

        debug!(
            url = %url,
            status = response.status,
            content_type = %response.content_type,
            final_url = %response.final_url,
            "fetched"
        );

        // Resources are leaves: stored verbatim under the non-markup name,
        // which is the name the referring page was rewritten to use
        let is_markup = target.kind() == LinkKind::Page && response.is_markup();

        let mut discovered = Vec::new();
        let mut parse_fallback = false;

        let body = if is_markup {
            let raw = match collect_body(response.body).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(url = %url, error = %err, "reading page body failed");
                    return CompletedTarget::failed(target, FailureStage::Fetch, err.to_string());
                }
            };

            match markup::process(&url, &raw, &response.content_type) {
                Ok(page) => {
                    debug!(url = %url, links = page.links.len(), "page rewritten");
                    discovered = page.links;
                    body_from_bytes(page.html)
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "markup not processed, saving original bytes");
                    parse_fallback = true;
                    body_from_bytes(raw)
                }
            }
        } else {
            response.body
        };

        let outcome = match self.writer.save(&url, body, is_markup).await {
            Ok(saved) => {
                info!(url = %url, path = %saved.local_path.display(), "saved");
                TargetOutcome::Saved(saved)
            }
            Err(err) => {
                let message = error_chain(&err);
                warn!(url = %url, error = %message, "save failed");
                TargetOutcome::Failed {
                    stage: FailureStage::Persist,
                    message,
                }
            }
        };

        // Discovered links survive a failed save: discovery happened at parse time
        CompletedTarget {
            target,
            outcome,
            parse_fallback,
            discovered,
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does the engine, not the worker, admit children?
//    - Only the engine owns the JoinSet, so only it can spawn
//    - Children are admitted the moment their parent's task completes, so
//      the frontier still grows while other pages are downloading
//
// 2. Why acquire the permit inside the task?
//    - Admission must never block: the engine keeps draining completions
//    - Excess tasks simply wait in acquire_owned() before any network I/O
//
// 3. Why `_permit` and not `_`?
//    - `let _ = ...` drops the value immediately, releasing the slot at once
//    - `let _permit = ...` keeps it alive until the function returns
// -----------------------------------------------------------------------------

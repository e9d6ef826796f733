// src/crawl/mod.rs
// =============================================================================
// This module drives the recursive crawl.
//
// Submodules:
// - engine:  admission, the worker pool and the termination wait
// - target:  one URL + depth + kind, the unit of work
// - visited: the atomic "already dispatched?" set
// - report:  what happened, for printing at the end
// =============================================================================

mod engine;
mod report;
mod target;
mod visited;

// Re-export what main.rs needs
pub use engine::Crawler;
pub use report::CrawlReport;

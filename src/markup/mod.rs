// src/markup/mod.rs
// =============================================================================
// HTML processing: rewrite same-site links to local paths, report what to
// crawl next.
//
// Which elements carry links, and in which attribute:
//   <a href>        -> a page (the crawler may go deeper from it)
//   <link href>     -> a resource for rel=stylesheet/icon/preload/...,
//                      a page for rel=next/canonical/alternate/...
//   <script src>    -> a resource
//   <img src>       -> a resource
//
// Resources are leaves: they are downloaded but never parsed for more links.
// =============================================================================

mod rewrite;

use url::Url;

pub use rewrite::process;

/// What a discovered link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Hyperlink target; counts against the depth limit
    Page,
    /// Stylesheet, script or image; fetched at the referring page's depth
    Resource,
}

impl LinkKind {
    /// Hint for the path mapper before the content type is known:
    /// pages are assumed to be HTML, resources are not.
    pub fn is_markup_hint(self) -> bool {
        matches!(self, LinkKind::Page)
    }
}

/// A same-site link found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Absolute URL, fragment removed
    pub url: Url,
    pub kind: LinkKind,
}

/// Output of processing one page
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    /// The page with same-site links rewritten
    pub html: Vec<u8>,
    /// Same-site links in document order, without duplicates
    pub links: Vec<DiscoveredLink>,
}

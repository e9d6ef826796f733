// src/crawl/target.rs
// =============================================================================
// A unit of crawl work: one normalized URL at one depth.
// =============================================================================

use url::Url;

use crate::markup::{DiscoveredLink, LinkKind};

/// A URL waiting to be (or being) crawled.
///
/// The URL is normalized on construction (fragment removed); its string form
/// is the identity used by the visited set. Targets are never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    url: Url,
    depth: usize,
    kind: LinkKind,
}

impl CrawlTarget {
    pub fn new(mut url: Url, depth: usize, kind: LinkKind) -> Self {
        url.set_fragment(None);
        Self { url, depth, kind }
    }

    /// The starting page, at depth 0
    pub fn seed(url: &Url) -> Self {
        Self::new(url.clone(), 0, LinkKind::Page)
    }

    // Builds the target for a link found on this page.
    // Pages go one level deeper; resources stay at this page's depth.
    pub fn child(&self, link: DiscoveredLink) -> Self {
        let depth = match link.kind {
            LinkKind::Page => self.depth + 1,
            LinkKind::Resource => self.depth,
        };
        Self::new(link.url, depth, link.kind)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_is_stripped() {
        let target = CrawlTarget::new(
            Url::parse("http://x/a#section").unwrap(),
            1,
            LinkKind::Page,
        );
        assert_eq!(target.url().as_str(), "http://x/a");
    }

    #[test]
    fn test_child_depths() {
        let page = CrawlTarget::new(Url::parse("http://x/a").unwrap(), 2, LinkKind::Page);

        let deeper = page.child(DiscoveredLink {
            url: Url::parse("http://x/b").unwrap(),
            kind: LinkKind::Page,
        });
        let image = page.child(DiscoveredLink {
            url: Url::parse("http://x/b.png").unwrap(),
            kind: LinkKind::Resource,
        });

        assert_eq!(deeper.depth(), 3);
        assert_eq!(image.depth(), 2);
        assert_eq!(image.kind(), LinkKind::Resource);
    }
}

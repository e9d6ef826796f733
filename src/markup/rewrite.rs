// src/markup/rewrite.rs
// =============================================================================
// Rewrites links inside one HTML page.
//
// How it works:
// 1. Stream the document through lol_html's rewriter, in the page's own
//    character encoding (Content-Type charset, <meta> charset, else UTF-8)
// 2. For each link-bearing element, resolve the attribute against the page URL
// 3. Same host? Replace the attribute with the relative path of the local copy
//    and remember the absolute URL for crawling
// 4. Different host, or not http(s)? Leave the attribute exactly as it was
//
// The rewritten page is the only copy ever written to disk, so this runs
// before any of the discovered links are fetched.
//
// Rust concepts:
// - RefCell: four element handlers share one collector; RefCell hands out
//   the mutable borrow at runtime, one handler at a time
// - macro_rules!: stamps out the four nearly identical handlers
// =============================================================================

use encoding_rs::Encoding;
use lol_html::{element, AsciiCompatibleEncoding, HtmlRewriter, Settings};
use std::cell::RefCell;
use std::collections::HashSet;
use url::Url;

use super::{DiscoveredLink, LinkKind, ProcessedPage};
use crate::error::ParseError;
use crate::mirror::relative_link;

// How far into a document a <meta charset> declaration is looked for
const META_PRESCAN_BYTES: usize = 1024;

// <link rel=...> values that load something into the page rather than
// point at another document
const RESOURCE_RELS: &[&str] = &[
    "stylesheet",
    "icon",
    "apple-touch-icon",
    "mask-icon",
    "manifest",
    "preload",
    "prefetch",
    "modulepreload",
];

// Processes one HTML page
//
// Parameters:
//   base_url: the URL the page was fetched from (links resolve against it)
//   html: the raw page bytes
//   content_type: the response's Content-Type header (may carry a charset)
//
// Returns: the rewritten page plus the same-site links it contains,
// or ParseError when the document cannot be processed (the caller then
// keeps the original bytes)
pub fn process(
    base_url: &Url,
    html: &[u8],
    content_type: &str,
) -> Result<ProcessedPage, ParseError> {
    let encoding = document_encoding(content_type, html);
    if encoding
        .decode_without_bom_handling_and_without_replacement(html)
        .is_none()
    {
        return Err(ParseError::Undecodable {
            encoding: encoding.name(),
        });
    }

    let collector = RefCell::new(LinkCollector::new(base_url));
    let mut output = Vec::with_capacity(html.len());

    macro_rules! link_handler {
        ($selector:literal, $attribute:literal) => {
            element!($selector, |el| {
                let kind = link_kind(&el.tag_name(), el.get_attribute("rel").as_deref());
                let local = collector
                    .borrow_mut()
                    .visit(el.get_attribute($attribute), kind);
                if let Some(local) = local {
                    el.set_attribute($attribute, &local)?;
                }
                Ok(())
            })
        };
    }

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                link_handler!("a[href]", "href"),
                link_handler!("link[href]", "href"),
                link_handler!("script[src]", "src"),
                link_handler!("img[src]", "src"),
            ],
            encoding: AsciiCompatibleEncoding::new(encoding)
                .unwrap_or_else(AsciiCompatibleEncoding::utf_8),
            ..Settings::default()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter
        .write(html)
        .map_err(|e| ParseError::Rewrite(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| ParseError::Rewrite(e.to_string()))?;

    Ok(ProcessedPage {
        html: output,
        links: collector.into_inner().links,
    })
}

// Decides what an element's link points at
//
// <a> is always a page. <link> is a resource only for the rels that pull
// content into the page (stylesheet, icon, preload, ...); rel=next,
// canonical, alternate and friends point at other documents, so they are
// pages. <script> and <img> are resources.
fn link_kind(tag_name: &str, rel: Option<&str>) -> LinkKind {
    if tag_name.eq_ignore_ascii_case("a") {
        return LinkKind::Page;
    }
    if !tag_name.eq_ignore_ascii_case("link") {
        return LinkKind::Resource;
    }

    let loads_resource = rel.unwrap_or_default().split_ascii_whitespace().any(|token| {
        RESOURCE_RELS
            .iter()
            .any(|resource| token.eq_ignore_ascii_case(resource))
    });
    if loads_resource {
        LinkKind::Resource
    } else {
        LinkKind::Page
    }
}

// Picks the character encoding of a page
//
// Order: charset in the Content-Type header, then a charset declared in a
// <meta> tag near the top of the document, then UTF-8. Encodings lol_html
// cannot stream (UTF-16 and other non-ASCII-compatible ones) fall back to UTF-8.
fn document_encoding(content_type: &str, html: &[u8]) -> &'static Encoding {
    let from_header =
        charset_label(content_type.as_bytes()).and_then(Encoding::for_label_no_replacement);

    from_header
        .or_else(|| meta_charset(html).and_then(Encoding::for_label_no_replacement))
        .filter(|encoding| encoding.is_ascii_compatible())
        .unwrap_or(encoding_rs::UTF_8)
}

// Finds the charset declared by the first <meta> tag in the document head
// (<meta charset="..."> or <meta http-equiv content="text/html; charset=...">)
fn meta_charset(html: &[u8]) -> Option<&[u8]> {
    let head = &html[..html.len().min(META_PRESCAN_BYTES)];
    let meta = find_ascii_case_insensitive(head, b"<meta")?;
    charset_label(&head[meta..])
}

// Extracts the value following "charset=" ("iso-8859-1" from
// "text/html; charset=\"iso-8859-1\"")
fn charset_label(text: &[u8]) -> Option<&[u8]> {
    const KEY: &[u8] = b"charset";

    let start = find_ascii_case_insensitive(text, KEY)? + KEY.len();
    let rest = text[start..].trim_ascii_start();
    let rest = rest.strip_prefix(b"=")?.trim_ascii_start();
    let rest = rest
        .strip_prefix(b"\"")
        .or_else(|| rest.strip_prefix(b"'"))
        .unwrap_or(rest);

    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
        .unwrap_or(rest.len());

    (end > 0).then(|| &rest[..end])
}

fn find_ascii_case_insensitive(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

// Collects same-site links while the document streams past
struct LinkCollector<'a> {
    base: &'a Url,
    links: Vec<DiscoveredLink>,
    seen: HashSet<(String, LinkKind)>,
}

impl<'a> LinkCollector<'a> {
    fn new(base: &'a Url) -> Self {
        Self {
            base,
            links: Vec::new(),
            seen: HashSet::new(),
        }
    }

    // Looks at one attribute value
    //
    // Returns: Some(new attribute value) when the link is same-site,
    // None when the attribute must stay untouched
    fn visit(&mut self, raw: Option<String>, kind: LinkKind) -> Option<String> {
        let raw = raw?;
        let mut target = resolve_url(self.base, &raw)?;

        if !is_crawlable(&target) || target.host_str() != self.base.host_str() {
            return None;
        }

        let fragment = target.fragment().map(str::to_owned);
        target.set_fragment(None);

        let mut local = relative_link(self.base, &target, kind.is_markup_hint());
        if let Some(fragment) = fragment {
            local.push('#');
            local.push_str(&fragment);
        }

        if self.seen.insert((target.as_str().to_owned(), kind)) {
            self.links.push(DiscoveredLink { url: target, kind });
        }

        Some(local)
    }
}

// Resolves a possibly-relative attribute value against the page URL
//
// Examples (base = "https://example.com/docs/page"):
//   "/about"     -> Some("https://example.com/about")
//   "intro"      -> Some("https://example.com/docs/intro")
//   "#section"   -> None (same document, nothing to fetch)
//   ""           -> None
fn resolve_url(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    base.join(raw).ok()
}

// Only http/https targets can be fetched
// (mailto:, tel:, javascript:, data: all resolve to other schemes)
fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

// src/mirror/path.rs
// =============================================================================
// Maps URLs onto the local mirror layout.
//
// Layout rules:
// - The host name is the top-level directory: http://example.com/a -> example.com/a
// - An empty path or a path ending in '/' maps to index.html in that directory
// - A path that already has an extension is used as-is
// - An extensionless path gets ".html" appended when the content is markup
//
// Both functions here are pure: same input, same output. That matters because a
// page's links are rewritten BEFORE the linked file is downloaded, so the
// rewritten href and the later save must independently land on the same file.
// =============================================================================

use std::path::{Component, Path, PathBuf};
use url::Url;

/// File name used for directory-style URLs ("/", "/docs/")
pub const INDEX_DOCUMENT: &str = "index.html";

/// Extension appended to extensionless markup pages
pub const MARKUP_EXTENSION: &str = "html";

// Directory used when a URL has no host at all (never happens for crawled
// http/https URLs, but the mapping must stay total)
const NO_HOST_DIR: &str = "_";

// Computes the mirror-relative file path for a URL
//
// Parameters:
//   url: absolute URL (query and fragment are ignored)
//   is_markup: whether the content is (or will be treated as) HTML
//
// Returns: relative path such as "example.com/docs/intro.html"
pub fn local_path(url: &Url, is_markup: bool) -> PathBuf {
    let mut path = PathBuf::from(url.host_str().unwrap_or(NO_HOST_DIR));

    let raw_path = url.path();
    let segments: Vec<String> = raw_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(decode_segment)
        .collect();

    let is_directory = segments.is_empty() || raw_path.ends_with('/');

    for segment in &segments {
        path.push(segment);
    }

    if is_directory {
        path.push(INDEX_DOCUMENT);
    } else if is_markup && path.extension().is_none() {
        path.set_extension(MARKUP_EXTENSION);
    }

    path
}

// Computes the link to write into an href/src attribute so that the page
// mirrored for `from` points at the file mirrored for `to`.
//
// The source is always a markup page (only pages get rewritten).
// Separators are always '/', whatever the host OS: this string goes into HTML.
//
// Returns: e.g. "../images/logo.png". Never fails; when no relative path can be
// computed the host-relative path ("/images/logo.png") is returned instead.
pub fn relative_link(from: &Url, to: &Url, to_is_markup: bool) -> String {
    let source = local_path(from, true);
    let target = local_path(to, to_is_markup);
    let source_dir = source.parent().unwrap_or_else(|| Path::new(""));

    match pathdiff::diff_paths(&target, source_dir) {
        Some(relative) if !relative.as_os_str().is_empty() => encode_components(&relative),
        _ => host_relative(&target),
    }
}

// Percent-decodes one URL path segment for use as a file name.
// Decoded separators and dot segments are neutralised so a mapped path can
// never climb out of its host directory.
fn decode_segment(segment: &str) -> String {
    let decoded = urlencoding::decode(segment)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    match decoded.as_str() {
        "." | ".." => "_".to_string(),
        _ => decoded.replace(['/', '\\'], "_"),
    }
}

// Joins path components with '/' and re-encodes each one for a URL
fn encode_components(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir => Some(".".to_string()),
            Component::Normal(name) => {
                Some(urlencoding::encode(&name.to_string_lossy()).into_owned())
            }
            Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();

    parts.join("/")
}

// "/" followed by the mapped path without its host directory
fn host_relative(target: &Path) -> String {
    let mut components = target.components();
    components.next();
    format!("/{}", encode_components(components.as_path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(
            local_path(&url("http://example.com"), true),
            PathBuf::from("example.com/index.html")
        );
        assert_eq!(
            local_path(&url("http://example.com/"), false),
            PathBuf::from("example.com/index.html")
        );
    }

    #[test]
    fn test_trailing_slash_maps_to_index() {
        assert_eq!(
            local_path(&url("https://example.com/docs/"), true),
            PathBuf::from("example.com/docs/index.html")
        );
    }

    #[test]
    fn test_extensionless_markup_gets_html() {
        assert_eq!(
            local_path(&url("http://example.com/about"), true),
            PathBuf::from("example.com/about.html")
        );
        // Not markup: left alone
        assert_eq!(
            local_path(&url("http://example.com/download"), false),
            PathBuf::from("example.com/download")
        );
    }

    #[test]
    fn test_existing_extension_kept() {
        assert_eq!(
            local_path(&url("http://example.com/css/site.css"), false),
            PathBuf::from("example.com/css/site.css")
        );
        assert_eq!(
            local_path(&url("http://example.com/page.php"), true),
            PathBuf::from("example.com/page.php")
        );
    }

    #[test]
    fn test_query_fragment_and_port_ignored() {
        assert_eq!(
            local_path(&url("http://example.com:8080/a?x=1#top"), true),
            PathBuf::from("example.com/a.html")
        );
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let u = url("http://example.com/blog/post");
        assert_eq!(local_path(&u, true), local_path(&u, true));
        assert_eq!(local_path(&u, false), local_path(&u, false));
    }

    #[test]
    fn test_encoded_segments_cannot_escape_host_dir() {
        let path = local_path(&url("http://example.com/a%2F..%2Fb/%2e%2e/c.txt"), false);
        assert!(path.starts_with("example.com"));
        assert!(!path.components().any(|c| c == Component::ParentDir));
    }

    #[test]
    fn test_decoded_segments_on_disk() {
        assert_eq!(
            local_path(&url("http://example.com/my%20file.pdf"), false),
            PathBuf::from("example.com/my file.pdf")
        );
    }

    #[test]
    fn test_relative_link_same_directory() {
        let from = url("http://x/");
        assert_eq!(relative_link(&from, &url("http://x/a"), true), "a.html");
        assert_eq!(relative_link(&from, &url("http://x/b.png"), false), "b.png");
    }

    #[test]
    fn test_relative_link_across_directories() {
        let from = url("http://x/blog/post");
        assert_eq!(
            relative_link(&from, &url("http://x/img/logo.png"), false),
            "../img/logo.png"
        );
        let from = url("http://x/blog/");
        assert_eq!(relative_link(&from, &url("http://x/"), true), "../index.html");
    }

    #[test]
    fn test_relative_link_reencodes_segments() {
        let from = url("http://x/");
        assert_eq!(
            relative_link(&from, &url("http://x/my%20file.pdf"), false),
            "my%20file.pdf"
        );
    }

    #[test]
    fn test_relative_link_to_itself() {
        let page = url("http://x/docs/");
        assert_eq!(relative_link(&page, &page, true), "index.html");
    }
}

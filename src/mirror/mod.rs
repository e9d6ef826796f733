// src/mirror/mod.rs
// =============================================================================
// The local mirror: where files go and how they get there.
//
// Submodules:
// - path: pure URL -> file path mapping, plus relative links between files
// - writer: streams fetched content into the mirror root
// =============================================================================

mod path;
mod writer;

pub use path::{local_path, relative_link};
pub use writer::{MirrorWriter, SavedFile};

// src/mirror/writer.rs
// =============================================================================
// Persists fetched content into the mirror directory.
//
// The writer never decides WHERE a file goes on its own: it asks path.rs, the
// same function the link rewriter uses. Whatever a page was rewritten to point
// at is exactly where the file ends up.
//
// Content arrives as a byte stream so large resources (images, archives) go to
// disk chunk by chunk instead of being buffered whole.
// =============================================================================

use futures::StreamExt;
use std::path::PathBuf;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use url::Url;

use super::local_path;
use crate::error::PersistError;
use crate::fetch::BodyStream;

/// A file that was written successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Path relative to the mirror root (e.g. "example.com/index.html")
    pub local_path: PathBuf,
    /// Number of bytes written
    pub bytes: u64,
}

// Writes files below a fixed mirror root
#[derive(Debug, Clone)]
pub struct MirrorWriter {
    root: PathBuf,
}

impl MirrorWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // Saves one resource
    //
    // Creates any missing parent directories, creates or truncates the file and
    // copies the whole stream into it.
    //
    // Parameters:
    //   url: the URL the content was fetched from
    //   body: the content
    //   is_markup: whether this is an HTML page (affects the file name)
    pub async fn save(
        &self,
        url: &Url,
        mut body: BodyStream,
        is_markup: bool,
    ) -> Result<SavedFile, PersistError> {
        let relative = local_path(url, is_markup);
        let absolute = self.root.join(&relative);

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| PersistError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut file = File::create(&absolute)
            .await
            .map_err(|source| PersistError::CreateFile {
                path: absolute.clone(),
                source,
            })?;

        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|source| PersistError::Body {
                path: absolute.clone(),
                source,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|source| PersistError::Write {
                    path: absolute.clone(),
                    source,
                })?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|source| PersistError::Write {
            path: absolute.clone(),
            source,
        })?;

        Ok(SavedFile {
            local_path: relative,
            bytes: written,
        })
    }
}

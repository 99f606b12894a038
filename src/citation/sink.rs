//! File system artifact sink.

use std::fs;
use std::path::Path;

use crate::promotion::error::SinkError;
use crate::promotion::traits::ArtifactSink;

/// Writes artifacts to disk, creating parent directories. Existing files at
/// the same path are replaced without warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsArtifactSink;

impl FsArtifactSink {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactSink for FsArtifactSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SinkError> {
        let sink_err = |source| SinkError {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(sink_err)?;
        }
        fs::write(path, bytes).map_err(sink_err)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Artifact written");
        Ok(())
    }
}

//! Filesystem adapters for EchoTwin.
//!
//! Resolves the data directory and implements the `TranscriptSource` trait
//! from `echotwin-core` over a directory of exported `.txt` transcripts.

use std::path::{Path, PathBuf};

use echotwin_core::transcript::source::TranscriptSource;

/// Transcript files end in this extension; everything else is ignored.
const TRANSCRIPT_EXTENSION: &str = "txt";

/// A directory of exported chat transcripts.
///
/// All operations go through `tokio::fs` for async I/O.
#[derive(Debug, Clone)]
pub struct DirectoryTranscriptSource {
    dir: PathBuf,
}

impl DirectoryTranscriptSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TranscriptSource for DirectoryTranscriptSource {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    async fn list_files(&self) -> Result<Vec<String>, std::io::Error> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_transcript = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(TRANSCRIPT_EXTENSION));
            if !is_transcript || !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn read(&self, file_name: &str) -> Result<String, std::io::Error> {
        tokio::fs::read_to_string(self.dir.join(file_name)).await
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `ECHOTWIN_DATA_DIR` environment variable
/// 2. `~/.echotwin`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ECHOTWIN_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".echotwin");
    }

    PathBuf::from(".echotwin")
}

/// Resolve a configured path: absolute paths stay, relative ones hang off `base`.
pub fn resolve_relative(base: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

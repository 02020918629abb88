//! TranscriptSource trait for abstracting where exported transcripts live.
//!
//! The `DirectoryTranscriptSource` adapter lives in echotwin-infra.

/// A collection of named transcript files.
pub trait TranscriptSource: Send + Sync {
    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> String;

    /// Names of the transcript files, in a stable order.
    fn list_files(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, std::io::Error>> + Send;

    /// Read one transcript file as UTF-8 text.
    fn read(
        &self,
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<String, std::io::Error>> + Send;
}

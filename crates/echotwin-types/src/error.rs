use thiserror::Error;

/// Errors from repository operations (used by trait definitions in echotwin-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the dual-store write path.
///
/// The variants record how far the write got. `Structured` means nothing was
/// written. `Embedding` and `Vector` mean the relational row exists without a
/// vector twin; `DualStore::reconcile` repairs that drift.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("structured store write failed: {0}")]
    Structured(RepositoryError),

    #[error("embedding failed: {0}")]
    Embedding(RepositoryError),

    #[error("vector index write failed for '{id}': {source}")]
    Vector {
        id: String,
        #[source]
        source: RepositoryError,
    },
}

impl StoreError {
    /// Whether a relational row was written before the failure.
    pub fn left_drift(&self) -> bool {
        !matches!(self, StoreError::Structured(_))
    }
}

/// Errors related to transcript ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to list transcripts in '{dir}': {reason}")]
    ListFailed { dir: String, reason: String },

    #[error("failed to read transcript '{file}': {reason}")]
    ReadFailed { file: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors related to loading the persona document.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("failed to read persona file '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("invalid persona document: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_store_error_drift() {
        let structured = StoreError::Structured(RepositoryError::Connection);
        assert!(!structured.left_drift());

        let vector = StoreError::Vector {
            id: "abc".to_string(),
            source: RepositoryError::Query("lance down".to_string()),
        };
        assert!(vector.left_drift());
        assert!(vector.to_string().contains("abc"));
        assert!(vector.to_string().contains("lance down"));
    }

    #[test]
    fn test_ingest_error_display() {
        let err = IngestError::ReadFailed {
            file: "chat.txt".to_string(),
            reason: "invalid utf-8".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to read transcript 'chat.txt': invalid utf-8"
        );
    }
}

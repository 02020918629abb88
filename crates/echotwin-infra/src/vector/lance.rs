//! Shared LanceDB connection for the exchange and transcript indexes.

use std::path::Path;
use std::sync::Arc;

use arrow_schema::Schema;

/// One LanceDB database directory. Cloning shares the connection.
#[derive(Clone)]
pub struct LanceVectorStore {
    db: lancedb::Connection,
}

impl LanceVectorStore {
    /// Connect to the database at `dir`, creating the directory if needed.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, lancedb::Error> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| lancedb::Error::CreateDir {
            path: dir.display().to_string(),
            source: e,
        })?;

        let uri = dir.to_str().ok_or_else(|| lancedb::Error::InvalidInput {
            message: format!("vector dir is not UTF-8: {}", dir.display()),
        })?;

        Ok(Self {
            db: lancedb::connect(uri).execute().await?,
        })
    }

    /// Open `name`, or create it empty with `schema` on first use.
    pub async fn ensure_table(
        &self,
        name: &str,
        schema: Arc<Schema>,
    ) -> Result<lancedb::Table, lancedb::Error> {
        match self.db.open_table(name).execute().await {
            Err(lancedb::Error::TableNotFound { .. }) => {
                self.db.create_empty_table(name, schema).execute().await
            }
            opened => opened,
        }
    }

    /// Drop `name`. A missing table is not an error.
    pub async fn drop_table(&self, name: &str) -> Result<(), lancedb::Error> {
        match self.db.drop_table(name, &[]).await {
            Err(lancedb::Error::TableNotFound { .. }) => Ok(()),
            other => other,
        }
    }
}

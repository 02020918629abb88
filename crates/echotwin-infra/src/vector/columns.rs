//! Arrow column helpers shared by the LanceDB indexes.

use std::sync::Arc;

use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};

use echotwin_types::error::RepositoryError;

/// Build a FixedSizeList vector column from row-major embeddings.
///
/// Every embedding must have exactly `dimension` values.
pub(crate) fn vector_column(
    embeddings: &[&[f32]],
    dimension: i32,
) -> Result<FixedSizeListArray, RepositoryError> {
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension as usize) {
        return Err(RepositoryError::Query(format!(
            "embedding has {} values, index expects {dimension}",
            bad.len()
        )));
    }

    let values = Float32Array::from(embeddings.concat());
    let field = Arc::new(Field::new("item", DataType::Float32, true));
    FixedSizeListArray::try_new(field, dimension, Arc::new(values), None)
        .map_err(|e| RepositoryError::Query(format!("Failed to build vector column: {e}")))
}

pub(crate) fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a StringArray, RepositoryError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| RepositoryError::Query(format!("missing string column '{name}'")))
}

/// Every value of the `id` column in `table`.
pub(crate) async fn scan_ids(table: &lancedb::Table) -> Result<Vec<String>, RepositoryError> {
    let batches: Vec<RecordBatch> = table
        .query()
        .select(Select::columns(&["id"]))
        .execute()
        .await
        .map_err(|e| RepositoryError::Query(format!("Id scan failed: {e}")))?
        .try_collect()
        .await
        .map_err(|e| RepositoryError::Query(format!("Failed to collect ids: {e}")))?;

    let mut ids = Vec::new();
    for batch in &batches {
        let column = string_column(batch, "id")?;
        ids.extend((0..column.len()).map(|i| column.value(i).to_string()));
    }
    Ok(ids)
}

/// The `_distance` column LanceDB adds to vector search results.
pub(crate) fn distance_column(batch: &RecordBatch) -> Result<&Float32Array, RepositoryError> {
    batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| RepositoryError::Query("missing _distance column".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_column_rejects_wrong_width() {
        let short = [0.1_f32, 0.2];
        let err = vector_column(&[&short], 3).unwrap_err();
        assert!(err.to_string().contains("index expects 3"));
    }

    #[test]
    fn test_vector_column_shape() {
        let a = [0.1_f32, 0.2, 0.3];
        let b = [0.4_f32, 0.5, 0.6];
        let column = vector_column(&[&a, &b], 3).unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(column.value_length(), 3);
    }
}

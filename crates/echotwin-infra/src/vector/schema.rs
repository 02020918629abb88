//! Arrow schema definitions for LanceDB vector tables.
//!
//! Both tables carry a float32 vector column whose width is the embedding
//! model's dimension, fixed when the table is first created.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// Table holding the embedding twin of every stored exchange.
pub const CONVERSATIONS_TABLE: &str = "conversations";

/// Table holding embedded transcript messages.
pub const CHAT_HISTORY_TABLE: &str = "chat_history";

pub(crate) fn vector_field(dimension: i32) -> Field {
    Field::new(
        "vector",
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float32, true)),
            dimension,
        ),
        false,
    )
}

/// Schema for the `conversations` table.
///
/// `date` is `YYYY-MM-DD`, so the retrieval window filter can compare it as
/// a string.
pub fn conversation_schema(dimension: i32) -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("document", DataType::Utf8, false),
        Field::new("timestamp", DataType::Utf8, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("mood", DataType::Utf8, false),
        Field::new("language_mix", DataType::Utf8, false),
        Field::new("context", DataType::Utf8, false),
        vector_field(dimension),
    ])
}

/// Schema for the `chat_history` table.
pub fn chat_history_schema(dimension: i32) -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("file_name", DataType::Utf8, false),
        Field::new("sender", DataType::Utf8, false),
        Field::new("is_subject", DataType::Boolean, false),
        Field::new("document", DataType::Utf8, false),
        vector_field(dimension),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_schema_has_correct_fields() {
        let schema = conversation_schema(768);
        assert_eq!(schema.fields().len(), 8);
        assert!(schema.field_with_name("date").is_ok());
        assert!(schema.field_with_name("language_mix").is_ok());

        let vector_field = schema.field_with_name("vector").unwrap();
        match vector_field.data_type() {
            DataType::FixedSizeList(_, size) => assert_eq!(*size, 768),
            other => panic!("Expected FixedSizeList, got {:?}", other),
        }
    }

    #[test]
    fn test_chat_history_schema_has_correct_fields() {
        let schema = chat_history_schema(384);
        assert_eq!(schema.fields().len(), 6);
        assert_eq!(
            schema.field_with_name("is_subject").unwrap().data_type(),
            &DataType::Boolean
        );
    }
}

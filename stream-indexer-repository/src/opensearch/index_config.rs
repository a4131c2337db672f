//! OpenSearch index configuration and mappings.
//!
//! This module defines the minimal mapping the stream index is created with.

use serde_json::{json, Value};

/// Index name used when none is configured.
pub const DEFAULT_INDEX_NAME: &str = "dynamodb-data";

/// Configuration for the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// The index all operations target.
    pub name: String,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

/// Get the mappings the stream index is created with.
///
/// Only the identifier and the change timestamp are declared:
/// - **id**: `keyword`, for exact-match lookups
/// - **timestamp**: `date`, holding epoch milliseconds
///
/// Every other field is left to dynamic mapping, since record images carry
/// whatever attributes the source table holds.
pub fn get_index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": {
                    "type": "keyword"
                },
                "timestamp": {
                    "type": "date"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings();

        assert_eq!(settings["mappings"]["properties"]["id"]["type"], "keyword");
        assert_eq!(
            settings["mappings"]["properties"]["timestamp"]["type"],
            "date"
        );
        assert_eq!(
            settings["mappings"]["properties"]
                .as_object()
                .map(|p| p.len()),
            Some(2)
        );
        assert!(settings["mappings"].get("dynamic").is_none());
    }

    #[test]
    fn test_default_index_name() {
        assert_eq!(IndexConfig::default().name, "dynamodb-data");
        assert_eq!(IndexConfig::new("todos").name, "todos");
    }
}

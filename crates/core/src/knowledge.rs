//! Knowledge document domain type.
//!
//! Two independent collections of these exist: the session-scoped project
//! files and the persistent global knowledge base. Both are owned by the
//! knowledge aggregator; this crate only defines the value type.

use serde::{Deserialize, Serialize};

/// A supplementary text document fed to every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeDocument {
    /// Opaque id, unique within its collection.
    pub id: String,
    pub name: String,
    /// MIME-like type tag (e.g. "text/markdown").
    #[serde(rename = "type")]
    pub doc_type: String,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: u64,
}

impl KnowledgeDocument {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        doc_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            doc_type: doc_type.into(),
            content: content.into(),
            timestamp: crate::message::now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_field() {
        let doc = KnowledgeDocument::new("1", "spec.md", "text/markdown", "# Spec");
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""type":"text/markdown""#));
        let back: KnowledgeDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}

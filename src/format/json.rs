// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bulk JSON import/export of a whole [`Document`].
//!
//! The blob is the same shape the storages write: an array of speakers.

use crate::model::{Document, DocumentError};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid document json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document failed validation: {0}")]
    Invalid(#[from] DocumentError),
}

/// Pretty-printed JSON for the whole document.
pub fn export_document_json(document: &Document) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parses and validates a document blob.
///
/// Unlike the startup load, an invalid blob is an error: the caller still holds the current
/// document and nothing is replaced.
pub fn import_document_json(input: &str) -> Result<Document, FormatError> {
    let document: Document = serde_json::from_str(input)?;
    document.validate()?;
    Ok(document)
}

/// JSON Schema of the interchange blob.
pub fn document_schema() -> schemars::Schema {
    schemars::schema_for!(Document)
}

#[cfg(test)]
mod tests {
    use super::{document_schema, export_document_json, import_document_json, FormatError};
    use crate::model::fixtures::guard_document;
    use crate::model::DocumentError;

    #[test]
    fn export_then_import_reproduces_the_document() {
        let document = guard_document();
        let json = export_document_json(&document).expect("export");
        let imported = import_document_json(&json).expect("import");
        assert_eq!(imported, document);
    }

    #[test]
    fn exported_nodes_use_the_wire_shape() {
        let json = export_document_json(&guard_document()).expect("export");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");

        let speaker = &value[0];
        assert_eq!(speaker["id"], "npc-1");
        assert_eq!(speaker["name"], "Guard");

        let node = &speaker["conversations"][0]["nodes"][1];
        assert_eq!(node["kind"], "actor-line");
        assert_eq!(node["position"]["y"], 200.0);
        assert_eq!(node["data"]["label"], "Hello");
        assert_eq!(node["data"]["text"], "Halt! Who goes there?");

        let edge = &speaker["conversations"][0]["edges"][0];
        assert_eq!(edge["source"], "node-1");
        assert_eq!(edge["target"], "node-2");
    }

    #[test]
    fn import_rejects_malformed_json() {
        let err = import_document_json("[{").unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }

    #[test]
    fn import_rejects_structurally_invalid_documents() {
        let json = r#"[{
            "id": "npc-1",
            "name": "Guard",
            "conversations": [{
                "id": "conv-1",
                "name": "Greeting",
                "nodes": [{
                    "id": "node-1",
                    "kind": "generic",
                    "position": {"x": 0, "y": 0},
                    "data": {"label": "x", "text": ""}
                }],
                "edges": []
            }]
        }]"#;
        let err = import_document_json(json).unwrap_err();
        match err {
            FormatError::Invalid(DocumentError::AnchorCount { count, .. }) => assert_eq!(count, 0),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn schema_describes_node_kinds() {
        let schema = serde_json::to_string(&document_schema()).expect("schema json");
        assert!(schema.contains("\"array\""));
        assert!(schema.contains("\"actor-line\""));
    }
}

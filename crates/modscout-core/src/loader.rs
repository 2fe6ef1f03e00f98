//! Reading the favorites JSON document
//!
//! Records are decoded one at a time so a single bad entry costs us that
//! entry and nothing else. Only a document we can't read at all is fatal.

use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::{
    models::{Item, RawRecord, RunMetadata},
    Error, Result,
};

/// A record that didn't make it into the item list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    /// Position in the source list
    pub index: usize,
    pub reason: String,
}

/// What came out of a favorites document
#[derive(Debug, Clone, Default)]
pub struct LoadedFavorites {
    pub metadata: Option<RunMetadata>,
    pub items: Vec<Item>,
    pub dropped: Vec<DroppedRecord>,
}

impl LoadedFavorites {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Load and normalize a favorites document from disk
pub fn load_document(path: &Path, base_url: &str) -> Result<LoadedFavorites> {
    let contents = std::fs::read_to_string(path)?;
    let loaded = parse_document(&contents, base_url)?;
    info!(
        "Loaded {} mods from {}",
        loaded.items.len(),
        path.display()
    );
    Ok(loaded)
}

/// Parse a favorites document from a string
///
/// Accepts `{"metadata": {...}, "favorites": [...]}` or a bare array of
/// records. A missing `favorites` key means an empty list.
pub fn parse_document(contents: &str, base_url: &str) -> Result<LoadedFavorites> {
    let document: Value = serde_json::from_str(contents)
        .map_err(|e| Error::MalformedInput(format!("Invalid JSON: {}", e)))?;

    let (metadata, records) = match document {
        Value::Array(records) => (None, records),
        Value::Object(mut root) => {
            let metadata = match root.remove("metadata") {
                None | Some(Value::Null) => None,
                Some(meta) => match serde_json::from_value::<RunMetadata>(meta) {
                    Ok(meta) => Some(meta),
                    Err(e) => {
                        // Header only, not worth failing the run over
                        warn!("Ignoring unreadable metadata block: {}", e);
                        None
                    }
                },
            };

            let records = match root.remove("favorites") {
                Some(Value::Array(records)) => records,
                None | Some(Value::Null) => {
                    warn!("Document has no `favorites` list, treating it as empty");
                    Vec::new()
                }
                Some(other) => {
                    return Err(Error::MalformedInput(format!(
                        "`favorites` must be a list, found {}",
                        json_kind(&other)
                    )))
                }
            };

            (metadata, records)
        }
        other => {
            return Err(Error::MalformedInput(format!(
                "Expected an object or a list at the top level, found {}",
                json_kind(&other)
            )))
        }
    };

    let (items, dropped) = normalize_records(records, base_url);
    Ok(LoadedFavorites {
        metadata,
        items,
        dropped,
    })
}

/// Turn raw JSON values into items, collecting the ones that don't make it
pub fn normalize_records(records: Vec<Value>, base_url: &str) -> (Vec<Item>, Vec<DroppedRecord>) {
    let mut items = Vec::with_capacity(records.len());
    let mut dropped = Vec::new();

    for (index, value) in records.into_iter().enumerate() {
        let outcome = serde_json::from_value::<RawRecord>(value)
            .map_err(Error::from)
            .and_then(|raw| raw.into_item(base_url));

        match outcome {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!("Skipping record #{}: {}", index, e);
                dropped.push(DroppedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    (items, dropped)
}

/// Same as `normalize_records`, for records that are already typed
pub fn normalize_raw_records(
    records: Vec<RawRecord>,
    base_url: &str,
) -> (Vec<Item>, Vec<DroppedRecord>) {
    let mut items = Vec::with_capacity(records.len());
    let mut dropped = Vec::new();

    for (index, raw) in records.into_iter().enumerate() {
        match raw.into_item(base_url) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!("Skipping record #{}: {}", index, e);
                dropped.push(DroppedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    (items, dropped)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.curseforge.com";

    #[test]
    fn test_parse_full_document() {
        let doc = r#"{
            "metadata": {
                "username": "kirbskyer",
                "modpack_version": "1.20.1",
                "forge_version": "47.4.5",
                "last_updated": "2025-01-15"
            },
            "favorites": [
                {
                    "name": "Waystones",
                    "url": "https://www.curseforge.com/minecraft/mc-mods/waystones",
                    "description": "Teleport back to activated waystones.",
                    "game_versions": ["1.20.1", "1.19.2"],
                    "mod_type": "mod",
                    "categories": ["Transportation"]
                },
                {
                    "name": "Faithful 32x",
                    "url": "/minecraft/texture-packs/faithful-32x",
                    "mod_type": "resourcepack"
                }
            ]
        }"#;

        let loaded = parse_document(doc, BASE).unwrap();
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.dropped_count(), 0);

        let meta = loaded.metadata.unwrap();
        assert_eq!(meta.username.as_deref(), Some("kirbskyer"));
        assert_eq!(meta.last_updated.as_deref(), Some("2025-01-15"));

        assert_eq!(
            loaded.items[1].link(),
            "https://www.curseforge.com/minecraft/texture-packs/faithful-32x"
        );
        assert_eq!(loaded.items[1].content_type(), "resourcepack");
    }

    #[test]
    fn test_bad_records_are_dropped_not_fatal() {
        let doc = r#"{
            "favorites": [
                {"name": "Good", "url": "https://example.com/good"},
                {"url": "https://example.com/nameless"},
                {"name": "Linkless"},
                "not even an object",
                {"name": 42, "url": "https://example.com/typed"},
                {"name": "Also Good", "link": "https://example.com/also", "game_versions": null}
            ]
        }"#;

        let loaded = parse_document(doc, BASE).unwrap();
        let names: Vec<_> = loaded.items.iter().map(Item::name).collect();
        assert_eq!(names, vec!["Good", "Also Good"]);

        let indices: Vec<_> = loaded.dropped.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(loaded.dropped[0].reason.contains("name"));
        assert!(loaded.dropped[1].reason.contains("link"));
    }

    #[test]
    fn test_bare_array_document() {
        let loaded = parse_document(
            r#"[{"name": "Jade", "link": "https://example.com/jade"}]"#,
            BASE,
        )
        .unwrap();
        assert!(loaded.metadata.is_none());
        assert_eq!(loaded.items.len(), 1);
    }

    #[test]
    fn test_missing_favorites_is_empty() {
        let loaded = parse_document(r#"{"metadata": {"username": "someone"}}"#, BASE).unwrap();
        assert!(loaded.items.is_empty());
        assert!(loaded.metadata.is_some());
    }

    #[test]
    fn test_malformed_documents() {
        for doc in ["{not json", r#"{"favorites": {"name": "x"}}"#, "42", r#""text""#] {
            assert!(
                matches!(parse_document(doc, BASE), Err(Error::MalformedInput(_))),
                "{} should be malformed",
                doc
            );
        }
    }

    #[test]
    fn test_bad_metadata_is_ignored() {
        let loaded = parse_document(
            r#"{"metadata": "oops", "favorites": [{"name": "A", "url": "https://example.com/a"}]}"#,
            BASE,
        )
        .unwrap();
        assert!(loaded.metadata.is_none());
        assert_eq!(loaded.items.len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = load_document(&dir.path().join("favorites-data.json"), BASE);
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_normalize_raw_records() {
        let records = vec![
            RawRecord {
                name: Some("Kept".into()),
                url: Some("/minecraft/mc-mods/kept".into()),
                ..Default::default()
            },
            RawRecord::default(),
        ];
        let (items, dropped) = normalize_raw_records(records, BASE);
        assert_eq!(items.len(), 1);
        assert_eq!(dropped.len(), 1);
        assert_eq!(items[0].link(), "https://www.curseforge.com/minecraft/mc-mods/kept");
    }
}

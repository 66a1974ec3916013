//! Customize store: the user-editable `entity_id -> attributes` document
//!
//! Two on-disk shapes are accepted. The current one is a mapping keyed by
//! entity id. The legacy one is a sequence of attribute maps that each
//! carry their own `entity_id`; it is upgraded in memory on load and never
//! written back.

use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{CustomizeError, CustomizeResult};

/// Key embedded in each record of the legacy sequence format
const LEGACY_ID_KEY: &str = "entity_id";

/// Shape the store was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// Mapping keyed by entity id
    Mapping,
    /// Sequence of records embedding `entity_id`
    LegacySequence,
    /// Empty document
    Empty,
}

/// Entity customizations keyed by entity id, iterated in sorted order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomizeStore {
    entries: BTreeMap<String, Mapping>,
}

impl CustomizeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a file
    pub async fn load(path: &Path) -> CustomizeResult<(Self, StoreFormat)> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| CustomizeError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;

        let loaded = Self::parse(&content, path)?;
        debug!("Loaded existing customize data from {:?}", path);
        Ok(loaded)
    }

    /// Parse store content; `origin` is only used in error messages
    pub fn parse(content: &str, origin: &Path) -> CustomizeResult<(Self, StoreFormat)> {
        if is_blank_document(content) {
            return Ok((Self::new(), StoreFormat::Empty));
        }

        let value: Value = serde_yaml::from_str(content).map_err(|e| CustomizeError::ParseYaml {
            path: origin.to_path_buf(),
            source: e,
        })?;

        Self::from_value(value).map_err(|reason| CustomizeError::InvalidStore {
            path: origin.to_path_buf(),
            reason,
        })
    }

    /// Parse store content from a string with no file behind it
    pub fn from_yaml_str(content: &str) -> CustomizeResult<(Self, StoreFormat)> {
        Self::parse(content, Path::new("<string>"))
    }

    fn from_value(value: Value) -> Result<(Self, StoreFormat), String> {
        match value {
            Value::Null => Ok((Self::new(), StoreFormat::Empty)),
            Value::Mapping(map) => {
                let mut store = Self::new();
                for (key, attributes) in map {
                    let entity_id = match key {
                        Value::String(s) => s,
                        other => return Err(format!("entity id {:?} is not a string", other)),
                    };
                    let attributes = entry_attributes(&entity_id, attributes)?;
                    store.insert(entity_id, attributes);
                }
                Ok((store, StoreFormat::Mapping))
            }
            Value::Sequence(records) => {
                warn!("Legacy customize format detected, the mapping format will be used for output");
                let mut store = Self::new();
                for (index, record) in records.into_iter().enumerate() {
                    let mut record = match record {
                        Value::Mapping(record) => record,
                        _ => return Err(format!("record {} is not a mapping", index)),
                    };
                    let entity_id = match record.remove(LEGACY_ID_KEY) {
                        Some(Value::String(id)) => id,
                        _ => return Err(format!("record {} has no string `entity_id`", index)),
                    };
                    store.insert(entity_id, record);
                }
                Ok((store, StoreFormat::LegacySequence))
            }
            _ => Err("expected a mapping of entity ids or a list of records".to_string()),
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<&Mapping> {
        self.entries.get(entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.entries.contains_key(entity_id)
    }

    /// Insert or replace an entity's attributes
    pub fn insert(&mut self, entity_id: impl Into<String>, attributes: Mapping) {
        self.entries.insert(entity_id.into(), attributes);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Mapping> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Mapping> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, String, Mapping> {
        self.entries.iter_mut()
    }
}

/// True when the document holds nothing but blank lines and comments
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// An entry's attribute map; a bare `entity_id:` line means no attributes
fn entry_attributes(entity_id: &str, value: Value) -> Result<Mapping, String> {
    match value {
        Value::Mapping(attributes) => Ok(attributes),
        Value::Null => Ok(Mapping::new()),
        _ => Err(format!("attributes of {} must be a mapping", entity_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_mapping_format() {
        let (store, format) = CustomizeStore::from_yaml_str(
            "light.x:\n  friendly_name: X\nswitch.y:\n  haaska_hidden: false\n",
        )
        .unwrap();

        assert_eq!(format, StoreFormat::Mapping);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("light.x").unwrap().get("friendly_name"), Some(&string("X")));
    }

    #[test]
    fn test_legacy_format_upgrade() {
        let (store, format) =
            CustomizeStore::from_yaml_str("- entity_id: light.x\n  friendly_name: X\n").unwrap();

        let mut expected_attributes = Mapping::new();
        expected_attributes.insert(string("friendly_name"), string("X"));
        let mut expected = CustomizeStore::new();
        expected.insert("light.x", expected_attributes);

        assert_eq!(format, StoreFormat::LegacySequence);
        assert_eq!(store, expected);
    }

    #[test]
    fn test_legacy_record_without_id() {
        let result = CustomizeStore::from_yaml_str("- friendly_name: X\n");
        assert!(matches!(result, Err(CustomizeError::InvalidStore { .. })));
    }

    #[test]
    fn test_empty_document() {
        let (store, format) = CustomizeStore::from_yaml_str("\n").unwrap();
        assert!(store.is_empty());
        assert_eq!(format, StoreFormat::Empty);

        let (store, _) = CustomizeStore::from_yaml_str("# only a comment\n").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_bare_entry_is_empty_mapping() {
        let (store, _) = CustomizeStore::from_yaml_str("light.x:\n").unwrap();
        assert_eq!(store.get("light.x"), Some(&Mapping::new()));
    }

    #[test]
    fn test_scalar_entry_rejected() {
        let result = CustomizeStore::from_yaml_str("light.x: on\n");
        assert!(matches!(result, Err(CustomizeError::InvalidStore { .. })));
    }

    #[test]
    fn test_scalar_document_rejected() {
        let result = CustomizeStore::from_yaml_str("just text\n");
        assert!(matches!(result, Err(CustomizeError::InvalidStore { .. })));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = CustomizeStore::from_yaml_str("light.x: [unclosed\n");
        assert!(matches!(result, Err(CustomizeError::ParseYaml { .. })));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("customize.yaml");
        std::fs::write(&path, "light.x:\n  icon: mdi:lamp\n").unwrap();

        let (store, format) = CustomizeStore::load(&path).await.unwrap();
        assert_eq!(format, StoreFormat::Mapping);
        assert!(store.contains("light.x"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = CustomizeStore::load(&dir.path().join("missing.yaml")).await;
        assert!(matches!(result, Err(CustomizeError::ReadFile { .. })));
    }

    #[test]
    fn test_iteration_sorted() {
        let (store, _) =
            CustomizeStore::from_yaml_str("switch.b: {}\nlight.a: {}\nautomation.c: {}\n").unwrap();
        let keys: Vec<&String> = store.keys().collect();
        assert_eq!(keys, vec!["automation.c", "light.a", "switch.b"]);
    }
}

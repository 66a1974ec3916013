//! Entity record as reported by the `/api/states` endpoint

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entity as reported by the hub's state API
///
/// Only the entity id and attributes are kept. The state value, timestamps
/// and context that the hub also sends are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity id in `domain.name` form
    pub entity_id: String,

    /// Attributes reported by the hub (friendly_name, hidden, icon, ...)
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl EntityRecord {
    /// Create a record from an id and its attributes
    pub fn new(entity_id: impl Into<String>, attributes: HashMap<String, Value>) -> Self {
        Self {
            entity_id: entity_id.into(),
            attributes,
        }
    }

    /// Domain part of the entity id (everything before the first '.')
    ///
    /// An id without a separator is treated as all domain.
    pub fn domain(&self) -> &str {
        split_entity_id(&self.entity_id).0
    }

    /// Object name part of the entity id (everything after the first '.')
    ///
    /// Further dots are kept, so `sensor.a.b` has the name `a.b`.
    pub fn object_name(&self) -> &str {
        split_entity_id(&self.entity_id).1
    }

    /// Get a raw attribute value, `None` when the key is absent
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Split an entity id into domain and object name at the first '.'
pub fn split_entity_id(entity_id: &str) -> (&str, &str) {
    entity_id.split_once('.').unwrap_or((entity_id, ""))
}

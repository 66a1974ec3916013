//! Merge engine
//!
//! Combines derived defaults for live entities with the existing customize
//! store. Store values always win; nested mappings merge key by key.

use serde_yaml::{Mapping, Value};

use crate::store::CustomizeStore;

/// Which timestamp attributes to maintain; `None` disables one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub key_date_added: Option<String>,
    pub key_date_updated: Option<String>,
}

impl MergeOptions {
    fn is_timestamp_key(&self, key: &Value) -> bool {
        let key = match key.as_str() {
            Some(key) => key,
            None => return false,
        };
        self.key_date_added.as_deref() == Some(key) || self.key_date_updated.as_deref() == Some(key)
    }

    /// Copy of `attributes` without the timestamp keys
    fn without_timestamps(&self, attributes: &Mapping) -> Mapping {
        attributes
            .iter()
            .filter(|(k, _)| !self.is_timestamp_key(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Counts describing what a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Entities reported by the hub
    pub live: usize,
    /// Entities not previously in the store
    pub added: usize,
    /// Previously stored entities whose attributes changed
    pub updated: usize,
    /// Previously stored entities left as they were
    pub unchanged: usize,
    /// Stored entities the hub no longer reports
    pub retained: usize,
}

/// Result of merging defaults with the store
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: CustomizeStore,
    pub summary: MergeSummary,
}

/// Combine two values, with `overrides` taking precedence
///
/// Mappings are merged recursively. Any other override value, including
/// sequences and null, replaces the default outright.
pub fn deep_merge(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Mapping(defaults), Value::Mapping(overrides)) => {
            Value::Mapping(merge_mappings(defaults, overrides))
        }
        (_, overrides) => overrides.clone(),
    }
}

/// Key-wise [`deep_merge`] of two mappings, keeping the order of `defaults`
/// and appending keys only present in `overrides`
pub fn merge_mappings(defaults: &Mapping, overrides: &Mapping) -> Mapping {
    let mut result = defaults.clone();
    for (key, value) in overrides {
        let merged = match result.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}

/// Merge per-entity defaults beneath the store and stamp timestamps
///
/// `defaults` holds one entry per live entity, in fetch order; a repeated
/// entity id replaces the earlier entry. `now` is stamped verbatim into
/// every timestamp written by this call.
pub fn merge<I>(
    defaults: I,
    store: &CustomizeStore,
    options: &MergeOptions,
    now: &str,
) -> MergeOutcome
where
    I: IntoIterator<Item = (String, Mapping)>,
{
    let mut merged = CustomizeStore::new();
    for (entity_id, attributes) in defaults {
        merged.insert(entity_id, attributes);
    }

    let live = merged.len();
    let retained = store.keys().filter(|id| !merged.contains(id)).count();

    for (entity_id, stored) in store.iter() {
        let combined = match merged.get(entity_id) {
            Some(derived) => merge_mappings(derived, stored),
            None => stored.clone(),
        };
        merged.insert(entity_id.clone(), combined);
    }

    let mut summary = MergeSummary {
        live,
        retained,
        ..Default::default()
    };

    for (entity_id, attributes) in merged.iter_mut() {
        let previous = store.get(entity_id);
        let changed = match previous {
            None => true,
            Some(previous) => {
                options.without_timestamps(previous) != options.without_timestamps(attributes)
            }
        };

        match (previous.is_some(), changed) {
            (false, _) => summary.added += 1,
            (true, true) => summary.updated += 1,
            (true, false) => summary.unchanged += 1,
        }

        if previous.is_none() {
            if let Some(ref key) = options.key_date_added {
                attributes.insert(Value::String(key.clone()), Value::String(now.to_string()));
            }
        }

        if changed {
            if let Some(ref key) = options.key_date_updated {
                attributes.insert(Value::String(key.clone()), Value::String(now.to_string()));
            }
        }
    }

    MergeOutcome { merged, summary }
}

//! Classifier, merge engine and renderer wired together

use ha_core::EntityRecord;
use serde_yaml::Mapping;

use crate::classifier::Classifier;
use crate::error::CustomizeResult;
use crate::merge::{self, MergeOptions, MergeOutcome};
use crate::render::Renderer;
use crate::store::CustomizeStore;
use crate::timestamp::RunTimestamp;

/// The merge-and-render pipeline for one run
#[derive(Debug, Clone)]
pub struct Customizer {
    classifier: Classifier,
    merge_options: MergeOptions,
    renderer: Renderer,
}

impl Customizer {
    pub fn new(classifier: Classifier, merge_options: MergeOptions, renderer: Renderer) -> Self {
        Self {
            classifier,
            merge_options,
            renderer,
        }
    }

    /// Derived defaults for each live entity, in fetch order
    pub fn derive_defaults(&self, entities: &[EntityRecord]) -> Vec<(String, Mapping)> {
        entities
            .iter()
            .map(|entity| (entity.entity_id.clone(), self.classifier.derive_defaults(entity)))
            .collect()
    }

    /// Merge live entities into the store, stamping with `now.stamp`
    pub fn merge(
        &self,
        entities: &[EntityRecord],
        store: &CustomizeStore,
        now: &RunTimestamp,
    ) -> MergeOutcome {
        merge::merge(
            self.derive_defaults(entities),
            store,
            &self.merge_options,
            &now.stamp,
        )
    }

    /// Render a merged store with `now.generated` in the footer
    pub fn render(&self, merged: &CustomizeStore, now: &RunTimestamp) -> CustomizeResult<String> {
        self.renderer.render(merged, &now.generated)
    }
}

//! Core types for the Home Assistant customizer
//!
//! This crate provides the entity record reported by the Home Assistant
//! state API and the domain metadata shared by the rest of the workspace.

pub mod domains;
mod entity;

pub use entity::{split_entity_id, EntityRecord};

/// Attribute holding a user-facing display name
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

/// Attribute holding the global hidden flag
pub const ATTR_HIDDEN: &str = "hidden";

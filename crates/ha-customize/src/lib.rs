//! Merge-and-render engine for Home Assistant `customize.yaml`
//!
//! Data flows one way through three stages:
//!
//! 1. [`Classifier`] derives default attributes (per-integration hidden
//!    flags, a friendly name) from each live entity.
//! 2. [`merge()`] lays the existing [`CustomizeStore`] over those defaults,
//!    keeping every user value, and stamps added/updated timestamps.
//! 3. [`Renderer`] writes the result as sorted YAML grouped into
//!    per-domain sections by the [`BannerFormatter`].

pub mod banner;
pub mod classifier;
mod customizer;
mod error;
pub mod merge;
pub mod persist;
pub mod render;
pub mod store;
pub mod timestamp;

pub use banner::{BannerFormatter, EntityBlock};
pub use classifier::{Classifier, Integration};
pub use customizer::Customizer;
pub use error::{CustomizeError, CustomizeResult};
pub use merge::{deep_merge, merge, MergeOptions, MergeOutcome, MergeSummary};
pub use render::{RenderOptions, Renderer};
pub use store::{CustomizeStore, StoreFormat};
pub use timestamp::RunTimestamp;

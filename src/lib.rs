//! `rootrouter`: plant moisture logging service and segmentation metadata store.
//!
//! Two independent components share this crate:
//! - the readings service (`routes`, `readings`, `models`): devices POST
//!   moisture readings, the dashboard lists them with a wetness status
//! - the segmentation metadata store (`segmentation`): images, cubes,
//!   detected cells and the current viewer layer for an external pipeline
//!
//! Configuration parsing lives in `config`, table creation in `schema`, and
//! route registration in `routes`; the binary in `main.rs` only wires them.

pub mod config;
pub mod models;
pub mod readings;
pub mod routes;
pub mod schema;
pub mod segmentation;

pub use config::Config;

// Re-exported so routes/*.rs only depend on the crate root, not on models.rs
pub use models::{MoistureStatus, MoistureThresholds, NewReading, PayloadError, Reading, ReadingView};
pub use segmentation::{SegmentationKind, SegmentationStore, StoreError, StoreResult};

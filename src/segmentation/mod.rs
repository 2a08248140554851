//! Segmentation metadata store.
//!
//! Tracks the images fed to the external segmentation pipeline, the cubes
//! each image is split into, the cells detected in them and the file path
//! currently shown in the viewer. Everything lives in one SQLite database
//! behind a [`SqlitePool`].
//!
//! Natural keys (image file triple, cube bounds, cell position) are UNIQUE
//! constraints. Inserts resolve conflicts in a single statement and return
//! the id of whichever row holds the key, so concurrent writers cannot
//! produce duplicates.
//!
//! Operations are split by entity:
//! - `images.rs` – image rows and their cube count
//! - `cubes.rs` – cube rows, progress flags and segmentation payloads
//! - `cells.rs` – detected cell positions and crops
//! - `layer.rs` – the current viewer layer slot

use std::{fmt, str::FromStr};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

mod cells;
mod cubes;
mod error;
mod images;
mod layer;

pub use cells::{CellPatch, DetectedCell, NewCell};
pub use cubes::{Cube, CubeBounds, CubePatch, CubeRef, CubeStatus, NewCube};
pub use error::{StoreError, StoreResult};
pub use images::{Image, NewImage};

use crate::schema;

// ---

/// Which of the two per-cube segmentation results an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationKind {
    Soma,
    Branch,
}

impl SegmentationKind {
    /// Column holding the "result received" flag for this kind.
    pub(crate) fn received_column(self) -> &'static str {
        match self {
            SegmentationKind::Soma => "soma_received",
            SegmentationKind::Branch => "branch_received",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentationKind::Soma => "soma",
            SegmentationKind::Branch => "branch",
        }
    }
}

impl FromStr for SegmentationKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soma" => Ok(SegmentationKind::Soma),
            "branch" => Ok(SegmentationKind::Branch),
            other => Err(StoreError::InvalidSegmentationKind(other.to_string())),
        }
    }
}

impl fmt::Display for SegmentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to the segmentation metadata database.
#[derive(Debug, Clone)]
pub struct SegmentationStore {
    pool: SqlitePool,
}

impl SegmentationStore {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: &str, max_connections: u32) -> StoreResult<Self> {
        // ---
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        tracing::info!("Opened segmentation store at {}", path);
        Self::new(pool).await
    }

    /// Wrap an existing pool, creating the schema if needed.
    pub async fn new(pool: SqlitePool) -> StoreResult<Self> {
        schema::create_segmentation_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_kind_parsing() {
        // ---
        assert_eq!("soma".parse::<SegmentationKind>().unwrap(), SegmentationKind::Soma);
        assert_eq!("branch".parse::<SegmentationKind>().unwrap(), SegmentationKind::Branch);

        for bad in ["Soma", "axon", "", "soma "] {
            let err = bad.parse::<SegmentationKind>().unwrap_err();
            assert!(matches!(err, StoreError::InvalidSegmentationKind(ref k) if k == bad));
        }
    }

    #[test]
    fn test_kind_columns() {
        assert_eq!(SegmentationKind::Soma.received_column(), "soma_received");
        assert_eq!(SegmentationKind::Branch.received_column(), "branch_received");
        assert_eq!(SegmentationKind::Branch.to_string(), "branch");
    }
}

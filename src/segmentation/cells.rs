//! Detected cell rows.

use tracing::debug;

use super::{SegmentationStore, StoreResult};

// ---

/// A cell detected at a point of an image.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DetectedCell {
    pub id: i64,
    pub image_id: i64,
    pub soma_x_pos: i64,
    pub soma_y_pos: i64,
    pub soma_z_pos: i64,
    pub cube_over_cell: Option<Vec<u8>>,
    pub segmented_cube_over_cell: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCell {
    pub image_id: i64,
    pub soma_x_pos: i64,
    pub soma_y_pos: i64,
    pub soma_z_pos: i64,
    pub cube_over_cell: Option<Vec<u8>>,
    pub segmented_cube_over_cell: Option<Vec<u8>>,
}

/// Partial cell update. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellPatch {
    pub soma_x_pos: Option<i64>,
    pub soma_y_pos: Option<i64>,
    pub soma_z_pos: Option<i64>,
    pub cube_over_cell: Option<Vec<u8>>,
    pub segmented_cube_over_cell: Option<Vec<u8>>,
}

impl SegmentationStore {
    /// Register a cell, or return the id of the cell already stored at the
    /// same position of the same image.
    pub async fn insert_cell(&self, cell: &NewCell) -> StoreResult<i64> {
        // ---
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO detected_cells (image_id, soma_x_pos, soma_y_pos, soma_z_pos,
                                        cube_over_cell, segmented_cube_over_cell)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (image_id, soma_x_pos, soma_y_pos, soma_z_pos)
                DO UPDATE SET image_id = excluded.image_id
            RETURNING id
            "#,
        )
        .bind(cell.image_id)
        .bind(cell.soma_x_pos)
        .bind(cell.soma_y_pos)
        .bind(cell.soma_z_pos)
        .bind(cell.cube_over_cell.as_deref())
        .bind(cell.segmented_cube_over_cell.as_deref())
        .fetch_one(&self.pool)
        .await?;

        debug!(
            "Cell ({}, {}, {}) of image {} -> id {}",
            cell.soma_x_pos, cell.soma_y_pos, cell.soma_z_pos, cell.image_id, id
        );
        Ok(id)
    }

    pub async fn check_cell_exists(
        &self,
        image_id: i64,
        x: i64,
        y: i64,
        z: i64,
    ) -> StoreResult<Option<i64>> {
        // ---
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM detected_cells
            WHERE image_id = ? AND soma_x_pos = ? AND soma_y_pos = ? AND soma_z_pos = ?
            "#,
        )
        .bind(image_id)
        .bind(x)
        .bind(y)
        .bind(z)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get_cell(&self, cell_id: i64, image_id: i64) -> StoreResult<Option<DetectedCell>> {
        // ---
        let cell = sqlx::query_as::<_, DetectedCell>(
            r#"
            SELECT id, image_id, soma_x_pos, soma_y_pos, soma_z_pos,
                   cube_over_cell, segmented_cube_over_cell
            FROM detected_cells
            WHERE id = ? AND image_id = ?
            "#,
        )
        .bind(cell_id)
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cell)
    }

    pub async fn get_cells_by_image_id(&self, image_id: i64) -> StoreResult<Vec<DetectedCell>> {
        // ---
        let cells = sqlx::query_as::<_, DetectedCell>(
            r#"
            SELECT id, image_id, soma_x_pos, soma_y_pos, soma_z_pos,
                   cube_over_cell, segmented_cube_over_cell
            FROM detected_cells
            WHERE image_id = ?
            ORDER BY id
            "#,
        )
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cells)
    }

    /// Apply `patch` to a cell in one statement.
    ///
    /// Returns `None` when no cell matches `(cell_id, image_id)`. Moving a
    /// cell onto a position already taken in the same image fails with a
    /// database error.
    pub async fn update_cell(
        &self,
        cell_id: i64,
        image_id: i64,
        patch: &CellPatch,
    ) -> StoreResult<Option<i64>> {
        // ---
        let result = sqlx::query(
            r#"
            UPDATE detected_cells SET
                soma_x_pos               = COALESCE(?, soma_x_pos),
                soma_y_pos               = COALESCE(?, soma_y_pos),
                soma_z_pos               = COALESCE(?, soma_z_pos),
                cube_over_cell           = COALESCE(?, cube_over_cell),
                segmented_cube_over_cell = COALESCE(?, segmented_cube_over_cell)
            WHERE id = ? AND image_id = ?
            "#,
        )
        .bind(patch.soma_x_pos)
        .bind(patch.soma_y_pos)
        .bind(patch.soma_z_pos)
        .bind(patch.cube_over_cell.as_deref())
        .bind(patch.segmented_cube_over_cell.as_deref())
        .bind(cell_id)
        .bind(image_id)
        .execute(&self.pool)
        .await?;

        Ok((result.rows_affected() > 0).then_some(cell_id))
    }
}

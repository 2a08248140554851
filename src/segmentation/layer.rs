//! The viewer's current layer.
//!
//! Stored as a single-row slot (`slot = 0`), so there is never more than
//! one current path, not even transiently.

use super::{SegmentationStore, StoreResult};

impl SegmentationStore {
    pub async fn update_napari_current_layer(&self, file_path: &str) -> StoreResult<()> {
        // ---
        sqlx::query(
            r#"
            INSERT INTO current_layer_napari (slot, file_path)
            VALUES (0, ?)
            ON CONFLICT (slot) DO UPDATE SET file_path = excluded.file_path
            "#,
        )
        .bind(file_path)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Current layer set to {}", file_path);
        Ok(())
    }

    pub async fn get_napari_current_layer(&self) -> StoreResult<Option<String>> {
        // ---
        let path = sqlx::query_scalar::<_, String>(
            "SELECT file_path FROM current_layer_napari WHERE slot = 0",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(path)
    }
}

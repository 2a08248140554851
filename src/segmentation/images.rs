//! Image rows.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{SegmentationStore, StoreResult};

// ---

/// An image registered with the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Image {
    pub id: i64,
    pub file_path: String,
    pub file_size: f64,
    pub file_format: String,
    pub img_size_x: i64,
    pub img_size_y: i64,
    pub img_size_z: i64,
    pub number_of_cubes: i64,
    pub unique_id: Uuid,
}

/// Fields needed to register an image.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub file_path: String,
    pub file_size: f64,
    pub file_format: String,
    pub img_size_x: i64,
    pub img_size_y: i64,
    pub img_size_z: i64,
}

impl SegmentationStore {
    /// Register an image, or return the id of the image already registered
    /// under the same `(file_path, file_size, file_format)`.
    ///
    /// Fresh rows get a new v4 `unique_id`; an existing row is left untouched.
    pub async fn insert_image(&self, image: &NewImage) -> StoreResult<i64> {
        // ---
        // The no-op DO UPDATE makes RETURNING yield the existing row's id
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO images (file_path, file_size, file_format,
                                img_size_x, img_size_y, img_size_z, unique_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (file_path, file_size, file_format)
                DO UPDATE SET file_path = excluded.file_path
            RETURNING id
            "#,
        )
        .bind(&image.file_path)
        .bind(image.file_size)
        .bind(&image.file_format)
        .bind(image.img_size_x)
        .bind(image.img_size_y)
        .bind(image.img_size_z)
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await?;

        debug!("Image {} -> id {}", image.file_path, id);
        Ok(id)
    }

    pub async fn check_image_exists(
        &self,
        file_path: &str,
        file_size: f64,
        file_format: &str,
    ) -> StoreResult<Option<i64>> {
        // ---
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM images WHERE file_path = ? AND file_size = ? AND file_format = ?",
        )
        .bind(file_path)
        .bind(file_size)
        .bind(file_format)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get_image(&self, image_id: i64) -> StoreResult<Option<Image>> {
        // ---
        let image = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, file_path, file_size, file_format,
                   img_size_x, img_size_y, img_size_z, number_of_cubes, unique_id
            FROM images
            WHERE id = ?
            "#,
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    /// Image dimensions as `(x, y, z)`.
    pub async fn get_image_size(&self, image_id: i64) -> StoreResult<Option<(i64, i64, i64)>> {
        // ---
        let size = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT img_size_x, img_size_y, img_size_z FROM images WHERE id = ?",
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(size)
    }

    pub async fn get_image_path(&self, image_id: i64) -> StoreResult<Option<String>> {
        // ---
        let path = sqlx::query_scalar::<_, String>("SELECT file_path FROM images WHERE id = ?")
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(path)
    }

    pub async fn get_unique_id_from_id(&self, image_id: i64) -> StoreResult<Option<Uuid>> {
        // ---
        let unique_id = sqlx::query_scalar::<_, Uuid>("SELECT unique_id FROM images WHERE id = ?")
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(unique_id)
    }

    /// Record how many cubes the image was split into.
    ///
    /// Returns `None` when no image has `image_id`.
    pub async fn update_image(&self, image_id: i64, number_of_cubes: i64) -> StoreResult<Option<i64>> {
        // ---
        let result = sqlx::query("UPDATE images SET number_of_cubes = ? WHERE id = ?")
            .bind(number_of_cubes)
            .bind(image_id)
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected() > 0).then_some(image_id))
    }
}

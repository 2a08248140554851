//! Cube rows: sub-volumes of an image and their pipeline progress.
//!
//! Each cube moves through four independent flags as the pipeline runs:
//! its info is sent, its data is sent, and the soma and branch results come
//! back. Flags only ever move forward, but the store does not police that;
//! it applies whatever patch it is given.

use tracing::debug;

use super::{SegmentationKind, SegmentationStore, StoreResult};

// ---

macro_rules! cube_columns {
    () => {
        "id, image_id, x_start, x_end, y_start, y_end, z_start, z_end, cube_size_bytes, \
         cube_data, info_sent, data_sent, soma_received, branch_received, \
         soma_segmentation, branch_segmentation"
    };
}

/// Axis-aligned bounds of a cube inside its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct CubeBounds {
    pub x_start: i64,
    pub x_end: i64,
    pub y_start: i64,
    pub y_end: i64,
    pub z_start: i64,
    pub z_end: i64,
}

/// A stored cube with its payloads.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Cube {
    pub id: i64,
    pub image_id: i64,
    #[sqlx(flatten)]
    pub bounds: CubeBounds,
    pub cube_size_bytes: i64,
    pub cube_data: Option<Vec<u8>>,
    pub info_sent: bool,
    pub data_sent: bool,
    pub soma_received: bool,
    pub branch_received: bool,
    pub soma_segmentation: Option<Vec<u8>>,
    pub branch_segmentation: Option<Vec<u8>>,
}

/// Fields needed to register a cube.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCube {
    pub image_id: i64,
    pub bounds: CubeBounds,
    pub cube_size_bytes: i64,
    pub cube_data: Vec<u8>,
    pub info_sent: bool,
    pub data_sent: bool,
}

/// Partial cube update. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CubePatch {
    pub info_sent: Option<bool>,
    pub data_sent: Option<bool>,
    pub soma_received: Option<bool>,
    pub branch_received: Option<bool>,
    pub soma_segmentation: Option<Vec<u8>>,
    pub branch_segmentation: Option<Vec<u8>>,
}

/// Progress flags of a single cube.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CubeStatus {
    pub info_sent: bool,
    pub data_sent: bool,
    pub soma_received: bool,
    pub branch_received: bool,
}

/// Identifies a cube awaiting results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct CubeRef {
    pub id: i64,
    pub image_id: i64,
}

impl SegmentationStore {
    /// Register a cube, or return the id of the cube already stored for the
    /// same image and bounds.
    pub async fn insert_cube(&self, cube: &NewCube) -> StoreResult<i64> {
        // ---
        let b = &cube.bounds;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO cubes (image_id, x_start, x_end, y_start, y_end, z_start, z_end,
                               cube_size_bytes, cube_data, info_sent, data_sent)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (image_id, x_start, x_end, y_start, y_end, z_start, z_end)
                DO UPDATE SET image_id = excluded.image_id
            RETURNING id
            "#,
        )
        .bind(cube.image_id)
        .bind(b.x_start)
        .bind(b.x_end)
        .bind(b.y_start)
        .bind(b.y_end)
        .bind(b.z_start)
        .bind(b.z_end)
        .bind(cube.cube_size_bytes)
        .bind(cube.cube_data.as_slice())
        .bind(cube.info_sent)
        .bind(cube.data_sent)
        .fetch_one(&self.pool)
        .await?;

        debug!("Cube {:?} of image {} -> id {}", b, cube.image_id, id);
        Ok(id)
    }

    pub async fn check_cube_exists(
        &self,
        image_id: i64,
        bounds: &CubeBounds,
    ) -> StoreResult<Option<i64>> {
        // ---
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM cubes
            WHERE image_id = ?
              AND x_start = ? AND x_end = ?
              AND y_start = ? AND y_end = ?
              AND z_start = ? AND z_end = ?
            "#,
        )
        .bind(image_id)
        .bind(bounds.x_start)
        .bind(bounds.x_end)
        .bind(bounds.y_start)
        .bind(bounds.y_end)
        .bind(bounds.z_start)
        .bind(bounds.z_end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// Apply `patch` to a cube in one statement.
    ///
    /// Returns `None` when no cube matches `(cube_id, image_id)`.
    pub async fn update_cube(
        &self,
        cube_id: i64,
        image_id: i64,
        patch: &CubePatch,
    ) -> StoreResult<Option<i64>> {
        // ---
        let result = sqlx::query(
            r#"
            UPDATE cubes SET
                info_sent           = COALESCE(?, info_sent),
                data_sent           = COALESCE(?, data_sent),
                soma_received       = COALESCE(?, soma_received),
                branch_received     = COALESCE(?, branch_received),
                soma_segmentation   = COALESCE(?, soma_segmentation),
                branch_segmentation = COALESCE(?, branch_segmentation)
            WHERE id = ? AND image_id = ?
            "#,
        )
        .bind(patch.info_sent)
        .bind(patch.data_sent)
        .bind(patch.soma_received)
        .bind(patch.branch_received)
        .bind(patch.soma_segmentation.as_deref())
        .bind(patch.branch_segmentation.as_deref())
        .bind(cube_id)
        .bind(image_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("update_cube: no cube {} in image {}", cube_id, image_id);
            return Ok(None);
        }
        Ok(Some(cube_id))
    }

    pub async fn get_cube_status(
        &self,
        cube_id: i64,
        image_id: i64,
    ) -> StoreResult<Option<CubeStatus>> {
        // ---
        let status = sqlx::query_as::<_, CubeStatus>(
            r#"
            SELECT info_sent, data_sent, soma_received, branch_received
            FROM cubes
            WHERE id = ? AND image_id = ?
            "#,
        )
        .bind(cube_id)
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(status)
    }

    /// Cubes whose data went out but whose `kind` result has not come back.
    pub async fn get_cubes_to_get_segmentation_results(
        &self,
        kind: SegmentationKind,
    ) -> StoreResult<Vec<CubeRef>> {
        // ---
        let sql = format!(
            "SELECT id, image_id FROM cubes WHERE data_sent = 1 AND {} = 0 ORDER BY id",
            kind.received_column()
        );
        let cubes = sqlx::query_as::<_, CubeRef>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!("{} cubes awaiting {} results", cubes.len(), kind);
        Ok(cubes)
    }

    pub async fn get_cubes_not_sent_to_server_by_image_id(
        &self,
        image_id: i64,
    ) -> StoreResult<Vec<Cube>> {
        // ---
        let cubes = sqlx::query_as::<_, Cube>(concat!(
            "SELECT ",
            cube_columns!(),
            " FROM cubes WHERE image_id = ? AND data_sent = 0 ORDER BY id"
        ))
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cubes)
    }

    pub async fn get_cubes_number_by_image_id(&self, image_id: i64) -> StoreResult<i64> {
        // ---
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cubes WHERE image_id = ?")
            .bind(image_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Number of cubes of the image whose soma result has been received.
    pub async fn get_cubes_number_by_image_id_and_soma_segmentation(
        &self,
        image_id: i64,
    ) -> StoreResult<i64> {
        // ---
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cubes WHERE image_id = ? AND soma_received = 1",
        )
        .bind(image_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn get_all_segmented_cubes_by_image_id(
        &self,
        image_id: i64,
        kind: SegmentationKind,
    ) -> StoreResult<Vec<Cube>> {
        // ---
        let sql = format!(
            "SELECT {} FROM cubes WHERE image_id = ? AND {} = 1 ORDER BY id",
            cube_columns!(),
            kind.received_column()
        );
        let cubes = sqlx::query_as::<_, Cube>(&sql)
            .bind(image_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(cubes)
    }

    pub async fn get_all_cubes_by_image_id(&self, image_id: i64) -> StoreResult<Vec<Cube>> {
        // ---
        let cubes = sqlx::query_as::<_, Cube>(concat!(
            "SELECT ",
            cube_columns!(),
            " FROM cubes WHERE image_id = ? ORDER BY id"
        ))
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cubes)
    }

    /// Whether the cube's data has been sent. Unknown cubes count as not sent.
    pub async fn check_cube_sent_to_server(
        &self,
        image_id: i64,
        bounds: &CubeBounds,
    ) -> StoreResult<bool> {
        // ---
        let sent = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT data_sent FROM cubes
            WHERE image_id = ?
              AND x_start = ? AND x_end = ?
              AND y_start = ? AND y_end = ?
              AND z_start = ? AND z_end = ?
            "#,
        )
        .bind(image_id)
        .bind(bounds.x_start)
        .bind(bounds.x_end)
        .bind(bounds.y_start)
        .bind(bounds.y_end)
        .bind(bounds.z_start)
        .bind(bounds.z_end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sent.unwrap_or(false))
    }
}

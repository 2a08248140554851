//! Database schema management for `rootrouter`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! The readings schema is applied once on startup from `main.rs`; the
//! segmentation schema is applied whenever a `SegmentationStore` is opened.

use sqlx::SqlitePool;

// ---

/// Create the readings schema (idempotent).
///
/// Safe to call on every startup; no-op if objects already exist.
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plant_data (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            plant_name     TEXT    NOT NULL,
            location       TEXT    NOT NULL,
            moisture_value INTEGER NOT NULL,
            timestamp      TEXT    NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Dashboard always sorts and filters on time
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_plant_data_timestamp
            ON plant_data (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Create the segmentation metadata schema (idempotent).
///
/// Natural keys are UNIQUE constraints so inserts can resolve conflicts
/// atomically. `current_layer_napari` is a single-row slot: its primary key
/// is pinned to 0.
pub async fn create_segmentation_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS images (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            file_path       TEXT    NOT NULL,
            file_size       REAL    NOT NULL,
            file_format     TEXT    NOT NULL,
            img_size_x      INTEGER NOT NULL DEFAULT 0,
            img_size_y      INTEGER NOT NULL DEFAULT 0,
            img_size_z      INTEGER NOT NULL DEFAULT 0,
            number_of_cubes INTEGER NOT NULL DEFAULT 0,
            unique_id       BLOB    NOT NULL,
            UNIQUE (file_path, file_size, file_format)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cubes (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            image_id            INTEGER NOT NULL REFERENCES images (id),
            x_start             INTEGER NOT NULL,
            x_end               INTEGER NOT NULL,
            y_start             INTEGER NOT NULL,
            y_end               INTEGER NOT NULL,
            z_start             INTEGER NOT NULL,
            z_end               INTEGER NOT NULL,
            cube_size_bytes     INTEGER NOT NULL,
            cube_data           BLOB,
            info_sent           BOOLEAN NOT NULL DEFAULT 0,
            data_sent           BOOLEAN NOT NULL DEFAULT 0,
            soma_received       BOOLEAN NOT NULL DEFAULT 0,
            branch_received     BOOLEAN NOT NULL DEFAULT 0,
            soma_segmentation   BLOB,
            branch_segmentation BLOB,
            UNIQUE (image_id, x_start, x_end, y_start, y_end, z_start, z_end)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS detected_cells (
            id                       INTEGER PRIMARY KEY AUTOINCREMENT,
            image_id                 INTEGER NOT NULL REFERENCES images (id),
            soma_x_pos               INTEGER NOT NULL,
            soma_y_pos               INTEGER NOT NULL,
            soma_z_pos               INTEGER NOT NULL,
            cube_over_cell           BLOB,
            segmented_cube_over_cell BLOB,
            UNIQUE (image_id, soma_x_pos, soma_y_pos, soma_z_pos)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS current_layer_napari (
            slot      INTEGER PRIMARY KEY CHECK (slot = 0),
            file_path TEXT    NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Pipeline polling filters by progress flags
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_cubes_data_sent
            ON cubes (data_sent, soma_received, branch_received);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

use chrono::NaiveDateTime;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use sodasync_config::shared::PgConnectionConfig;

use crate::error::{ErrorKind, SyncError, SyncResult};
use crate::state::store::base::CursorStore;
use crate::sync_error;
use crate::types::{PipelineId, Watermark};

/// A [`CursorStore`] backed by a Postgres table.
///
/// Cursors live in `sodasync_cursor` next to the destination data, one row per
/// pipeline.
#[derive(Debug, Clone)]
pub struct PostgresCursorStore {
    pool: PgPool,
}

impl PostgresCursorStore {
    /// Connects to the database and creates the cursor table if it does not
    /// exist yet.
    pub async fn connect(config: &PgConnectionConfig) -> SyncResult<Self> {
        let options = config.with_db();

        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(2)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_table().await?;

        Ok(store)
    }

    /// Reuses an existing pool, sharing connections with the destination.
    pub async fn with_pool(pool: PgPool) -> SyncResult<Self> {
        let store = Self { pool };
        store.ensure_table().await?;

        Ok(store)
    }

    /// Converts the pipeline id into the `bigint` key column type.
    ///
    /// Ids above `i64::MAX` cannot be represented in the column; rejecting
    /// them beats an `as` cast that would silently wrap and collide with
    /// another pipeline's cursor.
    fn cursor_key(pipeline_id: PipelineId) -> SyncResult<i64> {
        i64::try_from(pipeline_id).map_err(|_| {
            sync_error!(
                ErrorKind::ConfigError,
                "Pipeline id is out of range for the cursor store",
                format!("pipeline id {pipeline_id} does not fit in a bigint key")
            )
        })
    }

    async fn ensure_table(&self) -> SyncResult<()> {
        sqlx::query(
            r#"
            create table if not exists sodasync_cursor (
                pipeline_id bigint primary key,
                watermark timestamp not null,
                updated_at timestamptz not null default now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl CursorStore for PostgresCursorStore {
    async fn load_cursor(&self, pipeline_id: PipelineId) -> SyncResult<Option<Watermark>> {
        let key = Self::cursor_key(pipeline_id)?;

        let watermark: Option<NaiveDateTime> = sqlx::query_scalar(
            r#"
            select watermark from sodasync_cursor
            where pipeline_id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(watermark.map(Watermark::from))
    }

    async fn store_cursor(&self, pipeline_id: PipelineId, watermark: Watermark) -> SyncResult<()> {
        let key = Self::cursor_key(pipeline_id)?;

        sqlx::query(
            r#"
            insert into sodasync_cursor (pipeline_id, watermark)
            values ($1, $2)
            on conflict (pipeline_id) do update
            set watermark = excluded.watermark,
                updated_at = now()
            "#,
        )
        .bind(key)
        .bind(watermark.into_inner())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_key_accepts_representable_ids() {
        assert_eq!(PostgresCursorStore::cursor_key(1).unwrap(), 1);
        assert_eq!(
            PostgresCursorStore::cursor_key(i64::MAX as u64).unwrap(),
            i64::MAX
        );
    }

    #[test]
    fn cursor_key_rejects_ids_above_the_bigint_range() {
        let err = PostgresCursorStore::cursor_key(u64::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
    }
}

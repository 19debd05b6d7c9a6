use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;

use sodasync_config::shared::PgConnectionConfig;

use crate::destination::base::Destination;
use crate::error::SyncResult;
use crate::types::{LoadId, MergeStats, Record, Watermark};

/// A [`Destination`] backed by a Postgres table.
///
/// Records land in a table keyed on `id`, with the change payload stored as
/// `jsonb` and a `load_id` column tagging the run that last changed each row.
#[derive(Debug, Clone)]
pub struct PostgresDestination {
    pool: PgPool,
    table: String,
}

impl PostgresDestination {
    /// Connects to the database and creates the destination table if it does
    /// not exist yet.
    ///
    /// The table name must already be validated as a plain identifier, it is
    /// interpolated into DDL and DML below.
    pub async fn connect(config: &PgConnectionConfig, table: String) -> SyncResult<Self> {
        let options = config.with_db();

        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await?;

        let destination = Self { pool, table };
        destination.ensure_table().await?;

        Ok(destination)
    }

    /// Returns the underlying pool, so collaborators like the cursor store can
    /// share connections instead of opening their own.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_table(&self) -> SyncResult<()> {
        sqlx::query(&format!(
            r#"
            create table if not exists "{}" (
                id text primary key,
                updated_on timestamp not null,
                payload jsonb not null,
                load_id text not null,
                loaded_at timestamptz not null default now()
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;

        info!(table = %self.table, "destination table ready");

        Ok(())
    }
}

impl Destination for PostgresDestination {
    async fn max_updated_on(&self) -> SyncResult<Option<Watermark>> {
        let max: Option<NaiveDateTime> =
            sqlx::query_scalar(&format!(r#"select max(updated_on) from "{}""#, self.table))
                .fetch_one(&self.pool)
                .await?;

        Ok(max.map(Watermark::from))
    }

    async fn merge(&self, load_id: &LoadId, records: &[Record]) -> SyncResult<MergeStats> {
        // The upsert only fires when the incoming row actually differs, so
        // replaying a batch after a partial failure neither bumps counters nor
        // rewrites load_id on rows that already landed unchanged.
        let upsert = format!(
            r#"
            insert into "{table}" (id, updated_on, payload, load_id)
            values ($1, $2, $3, $4)
            on conflict (id) do update
            set updated_on = excluded.updated_on,
                payload = excluded.payload,
                load_id = excluded.load_id,
                loaded_at = now()
            where ("{table}".updated_on, "{table}".payload)
                is distinct from (excluded.updated_on, excluded.payload)
            returning (xmax = 0) as inserted
            "#,
            table = self.table
        );

        let mut tx = self.pool.begin().await?;
        let mut stats = MergeStats::default();

        for record in records {
            let row = sqlx::query(&upsert)
                .bind(&record.id)
                .bind(record.updated_on.into_inner())
                .bind(Value::Object(record.payload.clone()))
                .bind(load_id.as_str())
                .fetch_optional(&mut *tx)
                .await?;

            // No row back means the conflict target matched an identical row.
            match row {
                Some(row) if row.try_get::<bool, _>("inserted")? => stats.inserted += 1,
                Some(_) => stats.updated += 1,
                None => {}
            }
        }

        tx.commit().await?;

        Ok(stats)
    }
}

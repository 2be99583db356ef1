//! Postgres-backed profile store.
//!
//! Profiles are kept as JSONB documents in the `profiles` table, one row per
//! user id (see `sql/schema.sql`).

use super::{Profile, ProfileStore, ProfileUpdate, StoreError};
use crate::BoxFuture;
use anyhow::{Context, Result};
use sqlx::{Connection, PgPool, Row, postgres::PgPoolOptions, types::Json};
use std::time::Duration;
use tracing::{Instrument, info_span};

const UPSERT: &str = "INSERT INTO profiles (user_id, document) VALUES ($1, $2) \
     ON CONFLICT (user_id) DO UPDATE SET document = EXCLUDED.document, updated_at = NOW()";
const SELECT: &str = "SELECT document FROM profiles WHERE user_id = $1";
const SELECT_FOR_UPDATE: &str = "SELECT document FROM profiles WHERE user_id = $1 FOR UPDATE";
const UPDATE: &str = "UPDATE profiles SET document = $2, updated_at = NOW() WHERE user_id = $1";

#[derive(Debug, Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small pool to the profile database.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self::new(pool))
    }

    async fn put_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let span = query_span("INSERT", UPSERT);
        sqlx::query(UPSERT)
            .bind(&profile.user_id)
            .bind(Json(profile))
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let span = query_span("SELECT", SELECT);
        let row = sqlx::query(SELECT)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        match row {
            Some(row) => {
                let Json(profile): Json<Profile> = row.try_get("document")?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let span = query_span("SELECT", SELECT_FOR_UPDATE);
        let row = sqlx::query(SELECT_FOR_UPDATE)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .instrument(span)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Json(mut profile): Json<Profile> = row.try_get("document")?;
        profile.apply(update);

        let span = query_span("UPDATE", UPDATE);
        sqlx::query(UPDATE)
            .bind(user_id)
            .bind(Json(&profile))
            .execute(&mut *tx)
            .instrument(span)
            .await?;

        tx.commit().await?;

        Ok(Some(profile))
    }

    async fn ping_pool(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}

fn query_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

impl ProfileStore for PgProfileStore {
    fn put<'a>(&'a self, profile: &'a Profile) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(self.put_profile(profile))
    }

    fn get<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<Profile>, StoreError>> {
        Box::pin(self.get_profile(user_id))
    }

    fn update<'a>(
        &'a self,
        user_id: &'a str,
        update: &'a ProfileUpdate,
    ) -> BoxFuture<'a, Result<Option<Profile>, StoreError>> {
        Box::pin(self.update_profile(user_id, update))
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(self.ping_pool())
    }
}

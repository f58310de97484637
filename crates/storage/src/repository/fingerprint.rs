use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::FingerprintLink;

pub struct FingerprintRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FingerprintRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record that `user_id` was seen on `fingerprint_id`
    pub async fn record(&self, fingerprint_id: &str, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO device_fingerprints (fingerprint_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (fingerprint_id, user_id)
            DO UPDATE SET last_seen = now()
            "#,
        )
        .bind(fingerprint_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Every account seen on a fingerprint, oldest first
    pub async fn links(&self, fingerprint_id: &str) -> Result<Vec<FingerprintLink>> {
        let links = sqlx::query_as::<_, FingerprintLink>(
            r#"
            SELECT fingerprint_id, user_id, first_seen, last_seen
            FROM device_fingerprints
            WHERE fingerprint_id = $1
            ORDER BY first_seen ASC
            "#,
        )
        .bind(fingerprint_id)
        .fetch_all(self.pool)
        .await?;

        Ok(links)
    }
}

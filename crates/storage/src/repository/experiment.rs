use sqlx::PgPool;

use crate::error::Result;

/// Sticky A/B assignments in `ab_assignments`
pub struct ExperimentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExperimentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store `variant` unless an assignment already exists, and return the
    /// assignment that is in effect.
    pub async fn get_or_assign(&self, test_key: &str, identity: &str, variant: &str) -> Result<String> {
        let assigned = sqlx::query_scalar::<_, String>(
            r#"
            WITH inserted AS (
                INSERT INTO ab_assignments (test_key, identity, variant)
                VALUES ($1, $2, $3)
                ON CONFLICT (test_key, identity) DO NOTHING
                RETURNING variant
            )
            SELECT variant FROM inserted
            UNION ALL
            SELECT variant FROM ab_assignments WHERE test_key = $1 AND identity = $2
            LIMIT 1
            "#,
        )
        .bind(test_key)
        .bind(identity)
        .bind(variant)
        .fetch_one(self.pool)
        .await?;

        Ok(assigned)
    }
}

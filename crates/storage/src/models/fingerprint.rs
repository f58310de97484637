use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A user account seen behind a device fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FingerprintLink {
    pub fingerprint_id: String,
    pub user_id: Uuid,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

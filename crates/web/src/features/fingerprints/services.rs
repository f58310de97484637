use storage::{
    ContestStore,
    dto::fingerprint::{FingerprintResponse, FingerprintSignals, LinkedAccountsResponse},
};

use crate::error::{WebError, WebResult};
use crate::middleware::auth::AuthUser;

/// Hex SHA-256 of the canonical signal string
pub fn fingerprint_id(signals: &FingerprintSignals) -> String {
    sha256::digest(signals.canonical())
}

fn is_fingerprint_id(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Link the caller to the device and report how many accounts share it
pub async fn record_fingerprint(
    store: &dyn ContestStore,
    multi_account_threshold: usize,
    user: &AuthUser,
    signals: &FingerprintSignals,
) -> WebResult<FingerprintResponse> {
    let fingerprint_id = fingerprint_id(signals);

    store.record_fingerprint(&fingerprint_id, user.id).await?;
    let linked_accounts = store.fingerprint_links(&fingerprint_id).await?.len();
    let suspicious = linked_accounts >= multi_account_threshold;

    if suspicious {
        tracing::warn!(
            user_id = %user.id,
            fingerprint_id = %fingerprint_id,
            linked_accounts,
            "Device shared by several accounts"
        );
    }

    Ok(FingerprintResponse {
        fingerprint_id,
        linked_accounts,
        suspicious,
    })
}

pub async fn linked_accounts(
    store: &dyn ContestStore,
    admin: &AuthUser,
    fingerprint_id: &str,
) -> WebResult<LinkedAccountsResponse> {
    admin.require_admin()?;

    let fingerprint_id = fingerprint_id.to_ascii_lowercase();
    if !is_fingerprint_id(&fingerprint_id) {
        return Err(WebError::BadRequest(
            "fingerprint_id must be 64 hex characters".to_string(),
        ));
    }

    let links = store.fingerprint_links(&fingerprint_id).await?;
    if links.is_empty() {
        return Err(WebError::NotFound);
    }

    Ok(LinkedAccountsResponse {
        fingerprint_id,
        user_ids: links.into_iter().map(|link| link.user_id).collect(),
    })
}

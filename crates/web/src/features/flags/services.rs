use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use storage::ContestStore;
use utoipa::ToSchema;

use crate::error::{WebError, WebResult};
use crate::flags::{FeatureFlags, FlagSubject};
use crate::middleware::auth::AuthUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlagEvaluation {
    pub key: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlagsResponse {
    pub flags: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VariantAssignment {
    pub test_key: String,
    pub variant: String,
}

pub fn evaluate(flags: &FeatureFlags, key: &str, user: &AuthUser) -> FlagEvaluation {
    let identity = user.id.to_string();
    let subject = FlagSubject {
        identity: Some(&identity),
        role: user.role.as_deref(),
        email: user.email.as_deref(),
    };

    FlagEvaluation {
        key: key.to_string(),
        enabled: flags.is_enabled(key, subject),
    }
}

pub fn evaluate_all(flags: &FeatureFlags, user: &AuthUser) -> FlagsResponse {
    let evaluated = flags
        .keys()
        .into_iter()
        .map(|key| (key.to_string(), evaluate(flags, key, user).enabled))
        .collect();

    FlagsResponse { flags: evaluated }
}

/// Variant for the caller; the first assignment is persisted and wins forever after
pub async fn assign_variant(
    store: &dyn ContestStore,
    flags: &FeatureFlags,
    test_key: &str,
    user: &AuthUser,
) -> WebResult<VariantAssignment> {
    let identity = user.id.to_string();
    let candidate = flags
        .bucket_variant(test_key, &identity)
        .ok_or(WebError::NotFound)?;

    let variant = store
        .get_or_assign_variant(test_key, &identity, &candidate.name)
        .await?;

    Ok(VariantAssignment {
        test_key: test_key.to_string(),
        variant,
    })
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Browser and device signals collected by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct FingerprintSignals {
    #[validate(length(min = 1, max = 512))]
    pub user_agent: String,
    #[validate(length(max = 64))]
    pub language: Option<String>,
    #[validate(length(max = 64))]
    pub platform: Option<String>,
    #[validate(length(max = 32))]
    pub screen: Option<String>,
    #[validate(length(max = 64))]
    pub timezone: Option<String>,
    #[validate(length(max = 128))]
    pub canvas_hash: Option<String>,
    #[validate(length(max = 256))]
    pub webgl_vendor: Option<String>,
    #[validate(length(max = 256))]
    pub webgl_renderer: Option<String>,
    pub hardware_concurrency: Option<u16>,
}

impl FingerprintSignals {
    /// Stable, order-fixed representation that the fingerprint id is derived from.
    pub fn canonical(&self) -> String {
        let opt = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").to_string();

        [
            self.user_agent.trim().to_string(),
            opt(&self.language).to_lowercase(),
            opt(&self.platform),
            opt(&self.screen),
            opt(&self.timezone),
            opt(&self.canvas_hash),
            opt(&self.webgl_vendor),
            opt(&self.webgl_renderer),
            self.hardware_concurrency
                .map(|c| c.to_string())
                .unwrap_or_default(),
        ]
        .join("|")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FingerprintResponse {
    pub fingerprint_id: String,
    pub linked_accounts: usize,
    pub suspicious: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkedAccountsResponse {
    pub fingerprint_id: String,
    pub user_ids: Vec<Uuid>,
}

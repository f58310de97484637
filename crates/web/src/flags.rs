//! Static feature flags and deterministic A/B bucketing.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Enablement conditions for one flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlagRule {
    pub key: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    /// User ids or e-mail addresses
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub rollout_percentage: u8,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub name: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AbTest {
    pub key: String,
    #[serde(default)]
    pub enabled: bool,
    pub variants: Vec<Variant>,
}

impl AbTest {
    /// Pick a variant for a bucket in `0..100`, scaling weights to 100.
    pub fn variant_for_bucket(&self, bucket: u32) -> Option<&Variant> {
        let total: u64 = self.variants.iter().map(|v| u64::from(v.weight)).sum();
        if total == 0 {
            return self.variants.first();
        }

        let mut cumulative = 0u64;
        for variant in &self.variants {
            cumulative += u64::from(variant.weight);
            if u64::from(bucket) * total < cumulative * 100 {
                return Some(variant);
            }
        }

        self.variants.last()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FlagFile {
    #[serde(default)]
    flags: Vec<FlagRule>,
    #[serde(default)]
    experiments: Vec<AbTest>,
}

/// Who a flag is being evaluated for.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagSubject<'a> {
    pub identity: Option<&'a str>,
    pub role: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Immutable rule table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    flags: HashMap<String, FlagRule>,
    experiments: HashMap<String, AbTest>,
}

impl FeatureFlags {
    pub fn new(flags: Vec<FlagRule>, experiments: Vec<AbTest>) -> Self {
        Self {
            flags: flags.into_iter().map(|f| (f.key.clone(), f)).collect(),
            experiments: experiments.into_iter().map(|e| (e.key.clone(), e)).collect(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: FlagFile = serde_json::from_str(raw).context("Invalid feature flag file")?;
        Ok(Self::new(file.flags, file.experiments))
    }

    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(Path::new(path))
                    .with_context(|| format!("Cannot read feature flags from {}", path))?;
                let flags = Self::from_json(&raw)?;
                tracing::info!(
                    flags = flags.flags.len(),
                    experiments = flags.experiments.len(),
                    "Loaded feature flags from {}",
                    path
                );
                Ok(flags)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// Defaults shipped with the build.
    pub fn builtin() -> Self {
        Self::new(
            vec![
                FlagRule {
                    key: "messaging".to_string(),
                    enabled: true,
                    roles: vec![],
                    users: vec![],
                    rollout_percentage: 100,
                    description: Some("Direct messages between users".to_string()),
                },
                FlagRule {
                    key: "contest_comments".to_string(),
                    enabled: true,
                    roles: vec!["admin".to_string(), "moderator".to_string()],
                    users: vec![],
                    rollout_percentage: 25,
                    description: Some("Comments under contest entries".to_string()),
                },
                FlagRule {
                    key: "fraud_dashboard".to_string(),
                    enabled: true,
                    roles: vec!["admin".to_string()],
                    users: vec![],
                    rollout_percentage: 0,
                    description: Some("Fingerprint based multi-account review".to_string()),
                },
            ],
            vec![AbTest {
                key: "voting_layout".to_string(),
                enabled: true,
                variants: vec![
                    Variant {
                        name: "grid".to_string(),
                        weight: 50,
                    },
                    Variant {
                        name: "swipe".to_string(),
                        weight: 50,
                    },
                ],
            }],
        )
    }

    pub fn rule(&self, key: &str) -> Option<&FlagRule> {
        self.flags.get(key)
    }

    pub fn experiment(&self, key: &str) -> Option<&AbTest> {
        self.experiments.get(key)
    }

    /// Flag keys in a stable order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.flags.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Allowlist first, then role, then the percentage rollout on the identity bucket.
    pub fn is_enabled(&self, key: &str, subject: FlagSubject<'_>) -> bool {
        let Some(rule) = self.flags.get(key) else {
            return false;
        };
        if !rule.enabled {
            return false;
        }

        let listed = rule.users.iter().any(|entry| {
            subject.identity == Some(entry.as_str())
                || subject
                    .email
                    .is_some_and(|email| email.eq_ignore_ascii_case(entry))
        });
        if listed {
            return true;
        }

        if let Some(role) = subject.role {
            if rule.roles.iter().any(|r| r == role) {
                return true;
            }
        }

        if rule.rollout_percentage >= 100 {
            return true;
        }

        subject
            .identity
            .is_some_and(|identity| bucket(identity) < u32::from(rule.rollout_percentage))
    }

    /// Deterministic variant for `identity`, before any persisted assignment is consulted.
    pub fn bucket_variant(&self, test_key: &str, identity: &str) -> Option<&Variant> {
        let test = self.experiments.get(test_key).filter(|t| t.enabled)?;
        test.variant_for_bucket(bucket(&format!("{}:{}", test_key, identity)))
    }
}

/// 32-bit multiplicative string hash (`h = h * 31 + unit`) over UTF-16 code
/// units, wrapping on overflow. Not cryptographic.
pub fn string_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Rollout bucket in `0..100`.
pub fn bucket(input: &str) -> u32 {
    string_hash(input).unsigned_abs() % 100
}

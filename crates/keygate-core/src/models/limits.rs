//! Quota limits attached to a permission.

use serde::{Deserialize, Serialize};

use crate::error::{KeygateError, KeygateResult};

pub const DEFAULT_IP_LIMIT: i64 = 7200;
pub const DEFAULT_DOCS_LIMIT: i64 = 30;
pub const DEFAULT_SEARCH_LIMIT: i64 = 30;
pub const DEFAULT_INDICES_LIMIT: i64 = 30;
pub const DEFAULT_CAT_LIMIT: i64 = 30;
pub const DEFAULT_CLUSTERS_LIMIT: i64 = 30;
pub const DEFAULT_MISC_LIMIT: i64 = 30;

/// Longest accepted credential lifetime: 100 years.
pub const MAX_TTL_SEC: i64 = 100 * 365 * 24 * 60 * 60;

/// Rate and lifetime limits for a derived credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Requests per hour from a single client IP.
    pub ip_limit: i64,
    /// Requests per second against document endpoints.
    pub docs_limit: i64,
    pub search_limit: i64,
    pub indices_limit: i64,
    pub cat_limit: i64,
    pub clusters_limit: i64,
    pub misc_limit: i64,
    /// Credential lifetime in seconds from creation. `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_sec: Option<i64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            ip_limit: DEFAULT_IP_LIMIT,
            docs_limit: DEFAULT_DOCS_LIMIT,
            search_limit: DEFAULT_SEARCH_LIMIT,
            indices_limit: DEFAULT_INDICES_LIMIT,
            cat_limit: DEFAULT_CAT_LIMIT,
            clusters_limit: DEFAULT_CLUSTERS_LIMIT,
            misc_limit: DEFAULT_MISC_LIMIT,
            ttl_sec: None,
        }
    }
}

/// Sparse limits as sent by a client. Absent keys are `None`;
/// `ttl_sec` distinguishes absent (`None`) from explicit `null`
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsInput {
    pub ip_limit: Option<i64>,
    pub docs_limit: Option<i64>,
    pub search_limit: Option<i64>,
    pub indices_limit: Option<i64>,
    pub cat_limit: Option<i64>,
    pub clusters_limit: Option<i64>,
    pub misc_limit: Option<i64>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub ttl_sec: Option<Option<i64>>,
}

fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

impl LimitsInput {
    /// Parse a JSON value into sparse limits. Wrong shapes and unknown
    /// keys are validation errors on `limits`.
    pub fn from_json(value: &serde_json::Value) -> KeygateResult<Self> {
        let input = Self::deserialize(value)
            .map_err(|e| KeygateError::validation("limits", e.to_string()))?;
        input.validate()?;
        Ok(input)
    }

    /// Provided `(key, value)` pairs for the rate limits, in declaration
    /// order.
    pub fn rate_entries(&self) -> [(&'static str, Option<i64>); 7] {
        [
            ("ip_limit", self.ip_limit),
            ("docs_limit", self.docs_limit),
            ("search_limit", self.search_limit),
            ("indices_limit", self.indices_limit),
            ("cat_limit", self.cat_limit),
            ("clusters_limit", self.clusters_limit),
            ("misc_limit", self.misc_limit),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.rate_entries().iter().all(|(_, v)| v.is_none()) && self.ttl_sec.is_none()
    }

    fn validate(&self) -> KeygateResult<()> {
        for (key, value) in self.rate_entries() {
            if let Some(v) = value
                && v < 0
            {
                return Err(KeygateError::validation(
                    format!("limits.{key}"),
                    format!("must be non-negative, got {v}"),
                ));
            }
        }
        if let Some(Some(ttl)) = self.ttl_sec {
            if ttl <= 0 {
                return Err(KeygateError::validation(
                    "limits.ttl_sec",
                    format!("must be positive, got {ttl}"),
                ));
            }
            if ttl > MAX_TTL_SEC {
                return Err(KeygateError::validation(
                    "limits.ttl_sec",
                    format!("must be at most {MAX_TTL_SEC}, got {ttl}"),
                ));
            }
        }
        Ok(())
    }

    /// Overlay the provided keys onto `base`.
    pub fn apply_to(&self, base: &mut Limits) {
        let slots: [(&mut i64, Option<i64>); 7] = [
            (&mut base.ip_limit, self.ip_limit),
            (&mut base.docs_limit, self.docs_limit),
            (&mut base.search_limit, self.search_limit),
            (&mut base.indices_limit, self.indices_limit),
            (&mut base.cat_limit, self.cat_limit),
            (&mut base.clusters_limit, self.clusters_limit),
            (&mut base.misc_limit, self.misc_limit),
        ];
        for (slot, value) in slots {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(ttl) = self.ttl_sec {
            base.ttl_sec = ttl;
        }
    }
}

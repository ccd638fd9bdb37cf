//! Client configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! overrides:
//!
//! ```json
//! { "registry_address": "0x5fbdb2315678afecb367f032d93f642f64180aa3" }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use secret_santa_core::{Address, DraftPolicy, ACTIVE_WINDOW_SECS};

use crate::error::ConfigError;
use crate::tracker::StatusDelays;

// ============================================================================
// Defaults
// ============================================================================

const DEFAULT_SUCCESS_CLEAR_MS: u64 = 2_000;
const DEFAULT_ERROR_CLEAR_MS: u64 = 3_000;
const DEFAULT_PENDING_CLEAR_MS: u64 = 3_000;

/// Category label attached to every entry this client creates.
pub const DEFAULT_CATEGORY: &str = "Secret Santa Gift Exchange";

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Address of the registry contract.
    pub registry_address: Address,

    /// Entries created within this many seconds are active.
    pub active_window_secs: u64,

    pub success_clear_delay_ms: u64,
    pub error_clear_delay_ms: u64,

    /// `None` keeps pending statuses on screen until replaced.
    pub pending_clear_delay_ms: Option<u64>,

    /// Category label sent with every new entry.
    pub category: String,

    /// Reject unparsable numeric drafts instead of coercing them to zero.
    pub strict_drafts: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_address: Address::from_bytes([0u8; Address::LEN]),
            active_window_secs: ACTIVE_WINDOW_SECS,
            success_clear_delay_ms: DEFAULT_SUCCESS_CLEAR_MS,
            error_clear_delay_ms: DEFAULT_ERROR_CLEAR_MS,
            pending_clear_delay_ms: Some(DEFAULT_PENDING_CLEAR_MS),
            category: DEFAULT_CATEGORY.into(),
            strict_drafts: true,
        }
    }
}

impl RegistryConfig {
    /// Default configuration for the registry at `address`.
    pub fn for_registry(address: Address) -> Self {
        Self {
            registry_address: address,
            ..Self::default()
        }
    }

    /// Load from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no registry could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.active_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "active_window_secs must be positive".into(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(ConfigError::Invalid("category must not be empty".into()));
        }
        Ok(())
    }

    pub fn draft_policy(&self) -> DraftPolicy {
        if self.strict_drafts {
            DraftPolicy::Strict
        } else {
            DraftPolicy::Lenient
        }
    }

    pub fn status_delays(&self) -> StatusDelays {
        StatusDelays {
            success: Duration::from_millis(self.success_clear_delay_ms),
            error: Duration::from_millis(self.error_clear_delay_ms),
            pending: self.pending_clear_delay_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.active_window_secs, 30 * 86_400);
        assert_eq!(config.category, "Secret Santa Gift Exchange");
        assert_eq!(config.draft_policy(), DraftPolicy::Strict);

        let delays = config.status_delays();
        assert_eq!(delays.success, Duration::from_secs(2));
        assert_eq!(delays.error, Duration::from_secs(3));
        assert_eq!(delays.pending, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_from_json_partial() {
        let config = RegistryConfig::from_json(
            r#"{
                "registry_address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "pending_clear_delay_ms": null,
                "strict_drafts": false
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.registry_address,
            Address::parse("0x5fbdb2315678afecb367f032d93f642f64180aa3").unwrap()
        );
        assert_eq!(config.status_delays().pending, None);
        assert_eq!(config.draft_policy(), DraftPolicy::Lenient);
        assert_eq!(config.error_clear_delay_ms, 3_000);
    }

    #[test]
    fn test_from_json_rejects_bad_address() {
        let err = RegistryConfig::from_json(r#"{ "registry_address": "0x1234" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_json_rejects_zero_window() {
        let err = RegistryConfig::from_json(r#"{ "active_window_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = RegistryConfig::for_registry(Address::from_bytes([0x11; 20]));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RegistryConfig::from_json(&json).unwrap(), config);
    }
}

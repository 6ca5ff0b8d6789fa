use crate::errors::HookError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Upper bound on chained exchange continuations for one dispatch.
    #[serde(default = "default_followup_chain_cap")]
    pub followup_chain_cap: u32,

    #[serde(default = "default_exchange_timeout_ms")]
    pub exchange_timeout_ms: u64,

    /// Translation prefix used when a hook requests AAAA synthesis
    /// without supplying one.
    #[serde(default = "default_nat64_prefix")]
    pub nat64_prefix: String,

    #[serde(default = "default_true")]
    pub packet_filter_enabled: bool,

    #[serde(default = "default_true")]
    pub classifier_enabled: bool,
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, HookError> {
        toml::from_str(input).map_err(|e| HookError::ConfigError(e.to_string()))
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_millis(self.exchange_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            followup_chain_cap: default_followup_chain_cap(),
            exchange_timeout_ms: default_exchange_timeout_ms(),
            nat64_prefix: default_nat64_prefix(),
            packet_filter_enabled: default_true(),
            classifier_enabled: default_true(),
        }
    }
}

fn default_followup_chain_cap() -> u32 {
    10
}

fn default_exchange_timeout_ms() -> u64 {
    2000
}

fn default_nat64_prefix() -> String {
    "64:ff9b::".to_string()
}

fn default_true() -> bool {
    true
}

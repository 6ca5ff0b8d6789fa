use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum HookError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("No hook bound under name '{0}'")]
    MissingBinding(String),

    #[error("Resolve failed: {0}")]
    ResolveFailure(String),

    #[error("Exchange with {dest} failed: {reason}")]
    ExchangeFailure { dest: String, reason: String },

    #[error("Followup chain exceeded {cap} steps")]
    FollowupOverflow { cap: u32 },

    #[error("Invalid domain name: {0}")]
    InvalidName(String),

    #[error("Invalid translation prefix: {0}")]
    InvalidPrefix(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

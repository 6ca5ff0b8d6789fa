use crate::errors::HookError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A validated domain name in canonical form: lowercased, no trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(Arc<str>);

impl DomainName {
    pub fn parse(input: &str) -> Result<Self, HookError> {
        let trimmed = input.strip_suffix('.').unwrap_or(input);
        if trimmed.is_empty() {
            return Err(HookError::InvalidName("empty name".to_string()));
        }
        if trimmed.len() > MAX_NAME_LEN {
            return Err(HookError::InvalidName(format!(
                "name exceeds {} octets: {}",
                MAX_NAME_LEN, input
            )));
        }
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(HookError::InvalidName(format!("empty label in '{}'", input)));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(HookError::InvalidName(format!(
                    "label exceeds {} octets in '{}'",
                    MAX_LABEL_LEN, input
                )));
            }
        }
        Ok(Self(trimmed.to_ascii_lowercase().into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Labels in presentation order, most specific first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn label_count(&self) -> usize {
        self.labels().count()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DomainName {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainName::parse(s)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

use std::sync::Arc;

/// What a matched policy asks the resolver to do with the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    NoAction,
    Drop,
    Nxdomain,
    Nodata,
    Truncate,
    Custom,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::NoAction => "NoAction",
            PolicyKind::Drop => "Drop",
            PolicyKind::Nxdomain => "NXDOMAIN",
            PolicyKind::Nodata => "NODATA",
            PolicyKind::Truncate => "Truncate",
            PolicyKind::Custom => "Custom",
        }
    }
}

/// The policy applied to a query. Opaque to the engine beyond these four
/// fields; produced and consumed but never interpreted here.
#[derive(Debug, Clone, Default)]
pub struct AppliedPolicy {
    pub kind: PolicyKind,
    pub name: Option<Arc<str>>,
    pub ttl: u32,
    custom: Option<String>,
}

impl AppliedPolicy {
    /// Presentation content of the custom record, when the kind is Custom.
    pub fn custom_content(&self) -> Option<&str> {
        self.custom.as_deref()
    }

    /// Custom content is CNAME presentation data.
    pub fn set_custom_content(&mut self, content: impl Into<String>) {
        self.custom = Some(content.into());
    }
}

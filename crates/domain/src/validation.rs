/// DNSSEC trust classification of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationState {
    #[default]
    Indeterminate,
    Bogus,
    Insecure,
    Secure,
}

impl ValidationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::Indeterminate => "Indeterminate",
            ValidationState::Bogus => "Bogus",
            ValidationState::Insecure => "Insecure",
            ValidationState::Secure => "Secure",
        }
    }
}

use bytes::Bytes;
use ipnetwork::IpNetwork;

/// Option code for the EDNS Client Subnet option (RFC 7871).
pub const OPT_CLIENT_SUBNET: u16 = 8;

/// One EDNS option as received, payload undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Bytes,
}

impl EdnsOption {
    pub fn new(code: u16, data: impl Into<Bytes>) -> Self {
        Self {
            code,
            data: data.into(),
        }
    }
}

/// The EDNS state of one query as presented to hook code: the ordered
/// option list, the DO flag, and the client subnet already decoded by the
/// message parser.
#[derive(Debug, Clone, Default)]
pub struct EdnsView {
    options: Vec<EdnsOption>,
    dnssec_ok: bool,
    client_subnet: Option<IpNetwork>,
}

impl EdnsView {
    pub fn new(
        options: Vec<EdnsOption>,
        dnssec_ok: bool,
        client_subnet: Option<IpNetwork>,
    ) -> Self {
        Self {
            options,
            dnssec_ok,
            client_subnet,
        }
    }

    /// All options in the order they appeared in the message.
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Payload of the first option carrying `code`.
    pub fn option(&self, code: u16) -> Option<&Bytes> {
        self.options.iter().find(|o| o.code == code).map(|o| &o.data)
    }

    pub fn dnssec_ok(&self) -> bool {
        self.dnssec_ok
    }

    pub fn client_subnet(&self) -> Option<IpNetwork> {
        self.client_subnet
    }
}

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Ns,
    Cname,
    Soa,
    Ptr,
    Mx,
    Txt,
    Aaaa,
    Srv,
    Any,
    Other(u16),
}

impl RecordType {
    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
            RecordType::Srv => 33,
            RecordType::Any => 255,
            RecordType::Other(code) => *code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            1 => RecordType::A,
            2 => RecordType::Ns,
            5 => RecordType::Cname,
            6 => RecordType::Soa,
            12 => RecordType::Ptr,
            15 => RecordType::Mx,
            16 => RecordType::Txt,
            28 => RecordType::Aaaa,
            33 => RecordType::Srv,
            255 => RecordType::Any,
            other => RecordType::Other(other),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::Ns => write!(f, "NS"),
            RecordType::Cname => write!(f, "CNAME"),
            RecordType::Soa => write!(f, "SOA"),
            RecordType::Ptr => write!(f, "PTR"),
            RecordType::Mx => write!(f, "MX"),
            RecordType::Txt => write!(f, "TXT"),
            RecordType::Aaaa => write!(f, "AAAA"),
            RecordType::Srv => write!(f, "SRV"),
            RecordType::Any => write!(f, "ANY"),
            RecordType::Other(code) => write!(f, "TYPE{}", code),
        }
    }
}

/// Which part of a DNS message a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSection {
    Answer,
    Authority,
    Additional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DnsClass {
    #[default]
    In,
    Other(u16),
}

impl DnsClass {
    pub fn code(&self) -> u16 {
        match self {
            DnsClass::In => 1,
            DnsClass::Other(code) => *code,
        }
    }
}

/// One resource record as seen by hook code. Content is carried in its
/// presentation format; the record keeps no wire representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: Arc<str>,
    pub rtype: RecordType,
    pub ttl: u32,
    pub section: RecordSection,
    pub content: String,
}

impl DnsRecord {
    pub fn new(
        name: impl Into<Arc<str>>,
        rtype: RecordType,
        ttl: u32,
        section: RecordSection,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rtype,
            ttl,
            section,
            content: content.into(),
        }
    }

    /// Replace type and content together, e.g. turning an A record into
    /// the AAAA record for a translated address. Name, ttl and section
    /// are preserved.
    pub fn rewrite(&mut self, rtype: RecordType, content: impl Into<String>) {
        self.rtype = rtype;
        self.content = content.into();
    }

    /// The address carried by an A or AAAA record, if the content parses
    /// as one. Other record types yield `None`.
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self.rtype {
            RecordType::A => self.content.parse::<Ipv4Addr>().ok().map(IpAddr::V4),
            RecordType::Aaaa => self.content.parse::<Ipv6Addr>().ok().map(IpAddr::V6),
            _ => None,
        }
    }
}

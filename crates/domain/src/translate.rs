//! Pure address-translation helpers for NAT64/DNS64-style synthesis.
//!
//! A translation prefix is a /96: the mapped IPv6 address carries the
//! original IPv4 address in its low 32 bits.

use crate::errors::HookError;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Parse a textual translation prefix such as `64:ff9b::` or
/// `64:ff9b::/96`. Any mask other than /96 is rejected.
pub fn parse_nat64_prefix(prefix: &str) -> Result<Ipv6Addr, HookError> {
    let (addr_part, mask_part) = match prefix.split_once('/') {
        Some((addr, mask)) => (addr, Some(mask)),
        None => (prefix, None),
    };
    if let Some(mask) = mask_part {
        if mask != "96" {
            return Err(HookError::InvalidPrefix(format!(
                "translation prefix must be /96, got /{}",
                mask
            )));
        }
    }
    addr_part
        .parse::<Ipv6Addr>()
        .map_err(|e| HookError::InvalidPrefix(format!("{}: {}", prefix, e)))
}

/// Embed an IPv4 address in the low 32 bits of a /96 prefix.
pub fn embed_ipv4(prefix: Ipv6Addr, addr: Ipv4Addr) -> Ipv6Addr {
    let mut octets = prefix.octets();
    octets[12..16].copy_from_slice(&addr.octets());
    Ipv6Addr::from(octets)
}

/// Recover the IPv4 address embedded in the low 32 bits of a mapped
/// IPv6 address.
pub fn extract_ipv4(mapped: Ipv6Addr) -> Ipv4Addr {
    let octets = mapped.octets();
    Ipv4Addr::new(octets[12], octets[13], octets[14], octets[15])
}

/// Convert an IPv6 reverse-lookup name whose low 32 bits embed an IPv4
/// address into the corresponding IPv4 reverse name.
///
/// The first eight labels are taken pairwise; each pair is the low and
/// high hex nibble of one address byte. The four decoded octets keep
/// their label order and `in-addr.arpa.` is appended. A name with fewer
/// than eight labels is malformed.
pub fn reverse6_to_reverse4(name: &str) -> Result<String, HookError> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    let labels: Vec<&str> = trimmed.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 8 {
        return Err(HookError::MalformedInput(format!(
            "reverse name '{}' has fewer than 8 labels",
            name
        )));
    }

    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        let low = parse_nibble(labels[i * 2], name)?;
        let high = parse_nibble(labels[i * 2 + 1], name)?;
        *octet = low + 16 * high;
    }

    Ok(format!(
        "{}.{}.{}.{}.in-addr.arpa.",
        octets[0], octets[1], octets[2], octets[3]
    ))
}

fn parse_nibble(label: &str, name: &str) -> Result<u8, HookError> {
    if label.len() != 1 {
        return Err(HookError::MalformedInput(format!(
            "label '{}' in reverse name '{}' is not a single hex digit",
            label, name
        )));
    }
    label
        .chars()
        .next()
        .and_then(|c| c.to_digit(16))
        .map(|d| d as u8)
        .ok_or_else(|| {
            HookError::MalformedInput(format!(
                "label '{}' in reverse name '{}' is not a hex digit",
                label, name
            ))
        })
}

//! Gateway address helpers for the legacy DHCP path.

use std::net::Ipv4Addr;

/// Decode the gateway address from a raw DHCP info word.
///
/// Platforms that predate link-properties expose the gateway as a u32 in
/// native byte order, so on little-endian hosts the octets arrive
/// reversed and must be swapped before interpretation.
pub fn gateway_from_dhcp(raw: u32) -> Ipv4Addr {
    let raw = if cfg!(target_endian = "little") {
        raw.swap_bytes()
    } else {
        raw
    };
    Ipv4Addr::from(raw)
}

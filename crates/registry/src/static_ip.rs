//! Static IP assignment for mirror containers connecting to a cluster
//! network, from the high end of the subnet.
//!
//! Node IPs start at `.2`; assigning mirrors from `.250` downward avoids
//! collisions for any `/24` with up to 248 mirrors. Hand-rolled bit
//! arithmetic over the CIDR, mirroring this workspace's own
//! `allocate_next_private_ip` subnet math rather than pulling in a CIDR
//! crate for one function.

use std::collections::HashSet;
use std::net::Ipv4Addr;

const HIGH_WATERMARK: u32 = 250;
const LOW_WATERMARK: u32 = 2;

/// Parse an IPv4 CIDR string (`a.b.c.d/n`) into a (base, prefix) pair.
fn parse_ipv4_cidr(cidr: &str) -> Option<(u32, u8)> {
    let (addr_part, prefix_part) = cidr.split_once('/')?;
    let addr: Ipv4Addr = addr_part.parse().ok()?;
    let prefix: u8 = prefix_part.parse().ok()?;
    if prefix > 32 {
        return None;
    }
    Some((u32::from(addr), prefix))
}

/// Assign the next unused address from the high end of `cidr`'s host
/// range (`.250, .249, ...` down to `.2`). Returns `None` when the CIDR is
/// unparseable, not IPv4, too small to have a meaningful high end, or
/// exhausted — callers should fall back to DHCP in all of these cases.
#[must_use]
pub fn allocate_high_end_ip(cidr: &str, used: &HashSet<Ipv4Addr>) -> Option<Ipv4Addr> {
    let (base, prefix) = parse_ipv4_cidr(cidr)?;
    if prefix > 30 {
        // /31, /32: no meaningful host range to carve a high end from.
        return None;
    }
    let host_bits = 32 - u32::from(prefix);
    let network_base = base & (u32::MAX << host_bits);
    let broadcast_offset = (1u32 << host_bits) - 1;

    // Start at .250 (or one below the broadcast address, whichever is
    // lower) and walk down to .2, skipping addresses already in use.
    let mut offset = HIGH_WATERMARK.min(broadcast_offset.saturating_sub(1));
    loop {
        if offset < LOW_WATERMARK {
            return None;
        }
        let candidate = Ipv4Addr::from(network_base + offset);
        if !used.contains(&candidate) {
            return Some(candidate);
        }
        offset -= 1;
    }
}

//! Network scalar families: inet, cidr, macaddr, macaddr8.
//!
//! inet/cidr share the `ipnet::IpNet` payload; cidr additionally zeroes
//! host bits. MAC addresses are fixed-size byte arrays accepting the usual
//! six text shapes.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::error::{GraphError, Result};

// ── inet / cidr ────────────────────────────────────────────────────

fn bad_inet(target: &'static str, s: &str) -> GraphError {
    GraphError::InvalidInput {
        target,
        input: s.to_string(),
    }
}

/// Parse an inet literal: address with optional `/mask`.
pub fn parse_inet(s: &str) -> Result<IpNet> {
    let s = s.trim();
    if s.contains('/') {
        s.parse::<IpNet>().map_err(|_| bad_inet("inet", s))
    } else {
        let addr: IpAddr = s.parse().map_err(|_| bad_inet("inet", s))?;
        Ok(host_net(addr))
    }
}

/// Parse a cidr literal; host bits below the mask must be zero.
pub fn parse_cidr(s: &str) -> Result<IpNet> {
    let net = parse_inet(s).map_err(|_| bad_inet("cidr", s))?;
    if net.addr() != net.network() {
        return Err(GraphError::Domain(format!(
            "cidr has nonzero host bits: {}",
            s
        )));
    }
    Ok(net)
}

fn host_net(addr: IpAddr) -> IpNet {
    match addr {
        IpAddr::V4(a) => IpNet::V4(Ipv4Net::new(a, 32).unwrap()),
        IpAddr::V6(a) => IpNet::V6(Ipv6Net::new(a, 128).unwrap()),
    }
}

/// Render: host-width inet drops the `/mask` suffix, cidr always keeps it.
pub fn render_inet(net: &IpNet) -> String {
    if net.prefix_len() == net.max_prefix_len() {
        net.addr().to_string()
    } else {
        net.to_string()
    }
}

pub fn render_cidr(net: &IpNet) -> String {
    net.to_string()
}

/// `abbrev`: the display form with the mask kept only when it truncates.
pub fn abbrev(net: &IpNet) -> String {
    render_inet(net)
}

pub fn family(net: &IpNet) -> i64 {
    match net {
        IpNet::V4(_) => 4,
        IpNet::V6(_) => 6,
    }
}

pub fn masklen(net: &IpNet) -> i64 {
    net.prefix_len() as i64
}

pub fn host(net: &IpNet) -> String {
    net.addr().to_string()
}

pub fn broadcast(net: &IpNet) -> IpNet {
    with_addr(net, net.broadcast())
}

pub fn network(net: &IpNet) -> IpNet {
    with_addr(net, net.network())
}

pub fn netmask(net: &IpNet) -> IpNet {
    with_addr(net, net.netmask())
}

pub fn hostmask(net: &IpNet) -> IpNet {
    with_addr(net, net.hostmask())
}

fn with_addr(net: &IpNet, addr: IpAddr) -> IpNet {
    match (net, addr) {
        (IpNet::V4(n), IpAddr::V4(a)) => IpNet::V4(Ipv4Net::new(a, n.prefix_len()).unwrap()),
        (IpNet::V6(n), IpAddr::V6(a)) => IpNet::V6(Ipv6Net::new(a, n.prefix_len()).unwrap()),
        // families cannot diverge: addr is derived from net itself
        _ => *net,
    }
}

pub fn set_masklen(net: &IpNet, len: i64) -> Result<IpNet> {
    if len < 0 || len > net.max_prefix_len() as i64 {
        return Err(GraphError::Domain(format!(
            "invalid mask length: {}",
            len
        )));
    }
    let out = match net {
        IpNet::V4(n) => IpNet::V4(Ipv4Net::new(n.addr(), len as u8).unwrap()),
        IpNet::V6(n) => IpNet::V6(Ipv6Net::new(n.addr(), len as u8).unwrap()),
    };
    Ok(out)
}

pub fn same_family(a: &IpNet, b: &IpNet) -> bool {
    family(a) == family(b)
}

/// Smallest network containing both operands. Errors on mixed families.
pub fn merge(a: &IpNet, b: &IpNet) -> Result<IpNet> {
    if !same_family(a, b) {
        return Err(GraphError::TypeMismatch {
            op: "inet_merge",
            left: "inet",
            right: "inet",
        });
    }
    let mut len = a.prefix_len().min(b.prefix_len());
    loop {
        let na = truncate(a, len);
        let nb = truncate(b, len);
        if na.network() == nb.network() {
            return Ok(na);
        }
        if len == 0 {
            return Ok(na);
        }
        len -= 1;
    }
}

fn truncate(net: &IpNet, len: u8) -> IpNet {
    match net {
        IpNet::V4(n) => {
            IpNet::V4(Ipv4Net::new(n.addr(), len).unwrap().trunc())
        }
        IpNet::V6(n) => {
            IpNet::V6(Ipv6Net::new(n.addr(), len).unwrap().trunc())
        }
    }
}

/// Subnet containment: `sub << sup` — strictly contained.
pub fn contained_in(sub: &IpNet, sup: &IpNet) -> bool {
    same_family(sub, sup) && sup.prefix_len() < sub.prefix_len() && sup.contains(&sub.network())
}

/// `sub <<= sup` — contained or equal.
pub fn contained_in_or_eq(sub: &IpNet, sup: &IpNet) -> bool {
    same_family(sub, sup)
        && sup.prefix_len() <= sub.prefix_len()
        && sup.contains(&sub.network())
}

/// `sup >> sub` — strictly contains.
pub fn contains_net(sup: &IpNet, sub: &IpNet) -> bool {
    contained_in(sub, sup)
}

/// `sup >>= sub` — contains or equal.
pub fn contains_net_or_eq(sup: &IpNet, sub: &IpNet) -> bool {
    contained_in_or_eq(sub, sup)
}

/// `a && b` — either contains the other.
pub fn overlaps(a: &IpNet, b: &IpNet) -> bool {
    contained_in_or_eq(a, b) || contained_in_or_eq(b, a)
}

// ── inet bitwise / integer arithmetic ──────────────────────────────

fn addr_to_u128(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(a) => u32::from(a) as u128,
        IpAddr::V6(a) => u128::from(a),
    }
}

fn u128_to_addr(net: &IpNet, bits: u128) -> Result<IpAddr> {
    match net {
        IpNet::V4(_) => {
            if bits > u32::MAX as u128 {
                return Err(GraphError::Overflow("inet arithmetic"));
            }
            Ok(IpAddr::V4(Ipv4Addr::from(bits as u32)))
        }
        IpNet::V6(_) => Ok(IpAddr::V6(Ipv6Addr::from(bits))),
    }
}

/// `inet + integer` / `inet - integer`.
pub fn inet_add(net: &IpNet, delta: i64) -> Result<IpNet> {
    let bits = addr_to_u128(net.addr());
    let next = if delta >= 0 {
        bits.checked_add(delta as u128)
    } else {
        bits.checked_sub(delta.unsigned_abs() as u128)
    }
    .ok_or(GraphError::Overflow("inet arithmetic"))?;
    Ok(with_addr(net, u128_to_addr(net, next)?))
}

/// `inet - inet` — address difference as an integer.
pub fn inet_diff(a: &IpNet, b: &IpNet) -> Result<i64> {
    if !same_family(a, b) {
        return Err(GraphError::TypeMismatch {
            op: "-",
            left: "inet",
            right: "inet",
        });
    }
    let d = addr_to_u128(a.addr()) as i128 - addr_to_u128(b.addr()) as i128;
    i64::try_from(d).map_err(|_| GraphError::Overflow("inet difference"))
}

pub fn bit_not(net: &IpNet) -> Result<IpNet> {
    let bits = !addr_to_u128(net.addr());
    let masked = match net {
        IpNet::V4(_) => bits & u32::MAX as u128,
        IpNet::V6(_) => bits,
    };
    Ok(with_addr(net, u128_to_addr(net, masked)?))
}

pub fn bit_and(a: &IpNet, b: &IpNet) -> Result<IpNet> {
    bit_op(a, b, "&", |x, y| x & y)
}

pub fn bit_or(a: &IpNet, b: &IpNet) -> Result<IpNet> {
    bit_op(a, b, "|", |x, y| x | y)
}

fn bit_op(a: &IpNet, b: &IpNet, op: &'static str, f: impl Fn(u128, u128) -> u128) -> Result<IpNet> {
    if !same_family(a, b) {
        return Err(GraphError::TypeMismatch {
            op,
            left: "inet",
            right: "inet",
        });
    }
    let bits = f(addr_to_u128(a.addr()), addr_to_u128(b.addr()));
    Ok(with_addr(a, u128_to_addr(a, bits)?))
}

// ── macaddr / macaddr8 ─────────────────────────────────────────────

pub type Mac = [u8; 6];
pub type Mac8 = [u8; 8];

fn hex_pairs(target: &'static str, input: &str, digits: &str, out: &mut [u8]) -> Result<()> {
    if digits.len() != out.len() * 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GraphError::InvalidInput {
            target,
            input: input.to_string(),
        });
    }
    for (i, chunk) in out.iter_mut().enumerate() {
        *chunk = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| {
            GraphError::InvalidInput {
                target,
                input: input.to_string(),
            }
        })?;
    }
    Ok(())
}

/// Accepts `:`/`-`-separated pairs, `.`-separated quads, one interior
/// separator, or a bare hex run.
fn parse_mac_bytes(target: &'static str, s: &str, out: &mut [u8]) -> Result<()> {
    let digits: String = s.chars().filter(|c| !matches!(c, ':' | '-' | '.')).collect();
    let separators = s.chars().filter(|c| matches!(c, ':' | '-' | '.')).count();
    let valid_shape = matches!(separators, 0 | 1 | 2 | 3 | 5 | 7);
    if !valid_shape {
        return Err(GraphError::InvalidInput {
            target,
            input: s.to_string(),
        });
    }
    hex_pairs(target, s, &digits, out)
}

pub fn parse_mac(s: &str) -> Result<Mac> {
    let mut out = [0u8; 6];
    parse_mac_bytes("macaddr", s.trim(), &mut out)?;
    Ok(out)
}

pub fn parse_mac8(s: &str) -> Result<Mac8> {
    let mut out = [0u8; 8];
    parse_mac_bytes("macaddr8", s.trim(), &mut out)?;
    Ok(out)
}

pub fn render_mac(m: &Mac) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        m[0], m[1], m[2], m[3], m[4], m[5]
    )
}

pub fn render_mac8(m: &Mac8) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7]
    )
}

/// Zero the low three bytes (keep the vendor OUI).
pub fn mac_trunc(m: &Mac) -> Mac {
    [m[0], m[1], m[2], 0, 0, 0]
}

pub fn mac8_trunc(m: &Mac8) -> Mac8 {
    [m[0], m[1], m[2], m[3], m[4], 0, 0, 0]
}

/// EUI-48 → EUI-64 with the FF:FE filler.
pub fn mac_to_mac8(m: &Mac) -> Mac8 {
    [m[0], m[1], m[2], 0xff, 0xfe, m[3], m[4], m[5]]
}

/// EUI-64 → EUI-48 when the filler bytes are present.
pub fn mac8_to_mac(m: &Mac8) -> Result<Mac> {
    if m[3] != 0xff || m[4] != 0xfe {
        return Err(GraphError::Domain(
            "macaddr8 data out of range to convert to macaddr".into(),
        ));
    }
    Ok([m[0], m[1], m[2], m[5], m[6], m[7]])
}

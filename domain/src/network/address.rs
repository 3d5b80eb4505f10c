//! IP address classification
//!
//! Remote agents may only live at publicly routable addresses. Anything that
//! could reach the host itself, the local network or a cloud metadata
//! service is forbidden.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressClass {
    Public,
    Loopback,
    Unspecified,
    LinkLocal,
    Private,
    /// 100.64.0.0/10 carrier-grade NAT
    SharedAddressSpace,
    Broadcast,
    Documentation,
    Multicast,
    CloudMetadata,
    Reserved,
}

impl AddressClass {
    pub fn as_str(&self) -> &str {
        match self {
            AddressClass::Public => "public",
            AddressClass::Loopback => "loopback",
            AddressClass::Unspecified => "unspecified",
            AddressClass::LinkLocal => "link-local",
            AddressClass::Private => "private",
            AddressClass::SharedAddressSpace => "shared address space",
            AddressClass::Broadcast => "broadcast",
            AddressClass::Documentation => "documentation",
            AddressClass::Multicast => "multicast",
            AddressClass::CloudMetadata => "cloud metadata",
            AddressClass::Reserved => "reserved",
        }
    }
}

impl fmt::Display for AddressClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const METADATA_V4: Ipv4Addr = Ipv4Addr::new(169, 254, 169, 254);
const METADATA_V6: Ipv6Addr = Ipv6Addr::new(0xfd00, 0x0ec2, 0, 0, 0, 0, 0, 0x0254);

/// Classify an address.
///
/// # Example
///
/// ```
/// use roundtable_domain::network::{AddressClass, classify};
///
/// assert_eq!(classify("169.254.169.254".parse().unwrap()), AddressClass::CloudMetadata);
/// assert_eq!(classify("8.8.8.8".parse().unwrap()), AddressClass::Public);
/// ```
pub fn classify(ip: IpAddr) -> AddressClass {
    match ip {
        IpAddr::V4(v4) => classify_v4(v4),
        IpAddr::V6(v6) => classify_v6(v6),
    }
}

/// Whether an address must never be contacted.
pub fn is_forbidden(ip: IpAddr) -> bool {
    classify(ip) != AddressClass::Public
}

fn classify_v4(ip: Ipv4Addr) -> AddressClass {
    let [a, b, c, _] = ip.octets();

    if ip == METADATA_V4 {
        return AddressClass::CloudMetadata;
    }
    if ip.is_loopback() {
        return AddressClass::Loopback;
    }
    if a == 0 {
        return AddressClass::Unspecified;
    }
    if ip.is_link_local() {
        return AddressClass::LinkLocal;
    }
    if ip.is_private() {
        return AddressClass::Private;
    }
    if a == 100 && (b & 0b1100_0000) == 64 {
        return AddressClass::SharedAddressSpace;
    }
    if ip.is_broadcast() {
        return AddressClass::Broadcast;
    }
    if ip.is_documentation() {
        return AddressClass::Documentation;
    }
    if ip.is_multicast() {
        return AddressClass::Multicast;
    }
    // 192.0.0.0/24 protocol assignments, 198.18.0.0/15 benchmarking, 240.0.0.0/4
    if (a == 192 && b == 0 && c == 0) || (a == 198 && (b & 0xfe) == 18) || a >= 240 {
        return AddressClass::Reserved;
    }
    AddressClass::Public
}

fn classify_v6(ip: Ipv6Addr) -> AddressClass {
    if ip == METADATA_V6 {
        return AddressClass::CloudMetadata;
    }
    if let Some(v4) = ip.to_ipv4_mapped() {
        return classify_v4(v4);
    }
    if ip.is_loopback() {
        return AddressClass::Loopback;
    }
    if ip.is_unspecified() {
        return AddressClass::Unspecified;
    }
    if ip.is_multicast() {
        return AddressClass::Multicast;
    }

    let segments = ip.segments();
    // 64:ff9b::/96 NAT64 embeds an IPv4 destination
    if segments[0] == 0x0064 && segments[1] == 0xff9b && segments[2..6] == [0, 0, 0, 0] {
        let [a, b] = segments[6].to_be_bytes();
        let [c, d] = segments[7].to_be_bytes();
        return classify_v4(Ipv4Addr::new(a, b, c, d));
    }
    if (segments[0] & 0xffc0) == 0xfe80 {
        return AddressClass::LinkLocal;
    }
    if (segments[0] & 0xfe00) == 0xfc00 {
        return AddressClass::Private;
    }
    if segments[0] == 0x2001 && segments[1] == 0x0db8 {
        return AddressClass::Documentation;
    }
    // Deprecated IPv4-compatible form ::a.b.c.d
    if segments[0..6] == [0, 0, 0, 0, 0, 0] {
        return AddressClass::Reserved;
    }
    AddressClass::Public
}

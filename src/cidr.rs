//! IPv4 CIDR membership tests.
//!
//! Every check here fails closed: a malformed address or prefix simply does not
//! match, so callers never have to special-case parse errors.

use std::net::Ipv4Addr;

/// A parsed `a.b.c.d/n` block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cidr {
	network: u32,
	mask: u32,
}

impl Cidr {
	/// Parse `address/prefixLength`. Returns `None` for anything that is not a
	/// dotted quad followed by a prefix in `0..=32`.
	pub fn parse(cidr: &str) -> Option<Self> {
		let (address, prefix) = cidr.trim().split_once('/')?;
		let prefix: u32 = prefix.trim().parse().ok()?;
		if prefix > 32 {
			return None;
		}
		let network = parse_ipv4(address)?;
		Some(Self {
			network,
			mask: mask_for(prefix),
		})
	}

	/// Whether the 32-bit address falls inside this block.
	pub fn contains_addr(&self, addr: u32) -> bool {
		(addr & self.mask) == (self.network & self.mask)
	}

	/// Whether a dotted-quad string falls inside this block.
	pub fn contains(&self, ip: &str) -> bool {
		parse_ipv4(ip).is_some_and(|addr| self.contains_addr(addr))
	}

	/// The network address as written (host bits are not cleared).
	pub fn network(&self) -> Ipv4Addr {
		Ipv4Addr::from(self.network)
	}
}

/// `true` iff `ip` lies in `cidr`. Malformed input on either side yields `false`.
pub fn contains(ip: &str, cidr: &str) -> bool {
	Cidr::parse(cidr).is_some_and(|block| block.contains(ip))
}

/// `true` iff `ip` lies in at least one of `cidrs`.
pub fn contained_in_any<'a, I>(ip: &str, cidrs: I) -> bool
where
	I: IntoIterator<Item = &'a str>,
{
	let Some(addr) = parse_ipv4(ip) else {
		return false;
	};
	cidrs
		.into_iter()
		.filter_map(Cidr::parse)
		.any(|block| block.contains_addr(addr))
}

fn mask_for(prefix: u32) -> u32 {
	if prefix == 0 {
		0
	} else {
		u32::MAX << (32 - prefix)
	}
}

/// Fold four decimal octets into a big-endian `u32`.
fn parse_ipv4(ip: &str) -> Option<u32> {
	let mut octets = ip.trim().split('.');
	let mut value: u32 = 0;
	for _ in 0..4 {
		let octet: u8 = octets.next()?.parse().ok()?;
		value = (value << 8) | u32::from(octet);
	}
	if octets.next().is_some() {
		return None;
	}
	Some(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn network_address_is_contained_in_its_own_block() {
		for cidr in ["10.0.5.0/24", "192.168.1.0/24", "172.16.0.0/12", "8.8.8.8/32"] {
			let block = Cidr::parse(cidr).unwrap();
			assert!(contains(&block.network().to_string(), cidr), "{cidr}");
		}
	}

	#[test]
	fn addresses_outside_the_mask_are_rejected() {
		assert!(contains("10.0.5.1", "10.0.5.0/24"));
		assert!(contains("10.0.5.255", "10.0.5.0/24"));
		assert!(!contains("10.0.6.1", "10.0.5.0/24"));
		assert!(!contains("192.168.1.1", "10.0.0.0/8"));
		assert!(contains("172.31.255.1", "172.16.0.0/12"));
		assert!(!contains("172.32.0.1", "172.16.0.0/12"));
	}

	#[test]
	fn zero_prefix_matches_everything() {
		assert!(contains("1.2.3.4", "0.0.0.0/0"));
		assert!(contains("255.255.255.255", "10.0.0.0/0"));
	}

	#[test]
	fn host_prefix_matches_only_itself() {
		assert!(contains("10.0.0.7", "10.0.0.7/32"));
		assert!(!contains("10.0.0.8", "10.0.0.7/32"));
	}

	#[test]
	fn malformed_input_fails_closed() {
		assert!(!contains("10.0.5.1", "10.0.5.0"));
		assert!(!contains("10.0.5.1", "10.0.5.0/abc"));
		assert!(!contains("10.0.5.1", "10.0.5.0/33"));
		assert!(!contains("10.0.5.1", "10.0.5/24"));
		assert!(!contains("10.0.5.1", "bluetooth"));
		assert!(!contains("10.0.5.1", ""));
		assert!(!contains("10.0.5", "10.0.5.0/24"));
		assert!(!contains("10.0.5.1.9", "10.0.5.0/24"));
		assert!(!contains("bt:AA:BB:CC:DD:EE:FF", "0.0.0.0/0"));
		assert!(!contains("10.0.5.300", "10.0.5.0/24"));
	}

	#[test]
	fn any_of_several_blocks() {
		let active = ["192.168.0.0/24", "garbage", "10.1.0.0/16"];
		assert!(contained_in_any("10.1.2.3", active));
		assert!(!contained_in_any("10.2.2.3", active));
		assert!(!contained_in_any("", active));
		assert!(!contained_in_any("10.1.2.3", std::iter::empty()));
	}
}

//! Scalar identifiers shared across the core, kept as newtypes so callers
//! can't accidentally swap an EBI for a PTI at a call site.

use std::fmt;

/// 3GPP-reserved EBI space: 0-4 reserved, 5-15 assignable per UE.
pub const EBI_MIN: u8 = 5;
pub const EBI_MAX: u8 = 15;

/// PTI 0 means "no procedure transaction identity assigned" (network-initiated).
pub const PTI_UNASSIGNED: u8 = 0;

pub const MAX_EPS_AUTH_VECTORS: usize = 5;

/// 24.301 8.3.20: on the 5th expiry of T3485 the MME aborts dedicated
/// bearer activation.
pub const DEDICATED_EPS_BEARER_ACTIVATE_COUNTER_MAX: u8 = 5;

/// Max size of an encoded NAS ESM PDU retained for retransmission or replay.
pub const MAX_NAS_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MmeUeS1apId(pub u32);

impl fmt::Display for MmeUeS1apId {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u32> for MmeUeS1apId {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ebi(pub u8);

impl fmt::Display for Ebi {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Procedure Transaction Identity. `Pti(PTI_UNASSIGNED)` marks a
/// network-initiated (non-UE-triggered) transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pti(pub u8);

impl Pti {
	pub fn is_assigned(&self) -> bool {
		self.0 != PTI_UNASSIGNED
	}
}

/// PDN context identifier, scoped per UE (not globally unique).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid(pub u8);

impl fmt::Display for Cid {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qci(pub u8);

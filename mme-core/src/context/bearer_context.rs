//! Bearer context (spec.md §3 "Bearer context (per PDN)").

use bytes::Bytes;
use derive_new::new;

use crate::bearer::ebr::EbrState;
use crate::timer::RetryTimer;
use crate::types::{Ebi, Qci};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerQos {
	pub priority_level: u8,
	/// Pre-emption Capability.
	pub pci: bool,
	/// Pre-emption Vulnerability.
	pub pvi: bool,
	pub mbr_up: u64,
	pub mbr_down: u64,
	pub gbr_up: u64,
	pub gbr_down: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FteId {
	pub teid: u32,
	pub ipv4: Option<std::net::Ipv4Addr>,
	pub ipv6: Option<std::net::Ipv6Addr>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FteIdSet {
	pub s1u: FteId,
	pub s5s8: FteId,
}

#[derive(new)]
pub struct BearerContext {
	pub ebi: Ebi,
	pub qci: Qci,
	pub qos: BearerQos,
	pub fteids: FteIdSet,
	#[new(default)]
	pub tft: Option<Bytes>,
	#[new(default)]
	pub pco: Option<Bytes>,
	pub is_default: bool,
	#[new(value = "EbrState::Inactive")]
	pub ebr_state: EbrState,
	#[new(default)]
	pub retained_message: Option<Bytes>,
	#[new(default)]
	pub timer: RetryTimer,
	#[new(default)]
	pub t3485_retry_count: u8,
}

impl std::fmt::Debug for BearerContext {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("BearerContext")
			.field("ebi", &self.ebi)
			.field("qci", &self.qci)
			.field("is_default", &self.is_default)
			.field("ebr_state", &self.ebr_state)
			.field("has_retained_message", &self.retained_message.is_some())
			.field("t3485_retry_count", &self.t3485_retry_count)
			.finish()
	}
}

impl BearerContext {
	/// Invariant I3: a bearer in ACTIVE_PENDING has either a running T3485
	/// with a retained message, or a teardown already under way. Checked by
	/// callers that are about to leave a bearer in ACTIVE_PENDING.
	pub fn upholds_active_pending_invariant(&self) -> bool {
		if self.ebr_state != EbrState::ActivePending {
			return true;
		}
		self.timer.is_running() && self.retained_message.is_some()
	}
}

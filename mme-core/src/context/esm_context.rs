//! ESM context (spec.md §3 "ESM context (per UE)").

use bytes::Bytes;

use crate::bearer::ebr::EbrState;
use crate::context::bearer_context::BearerQos;
use crate::context::pdn_context::{PdnAddress, PdnType};
use crate::esm_sap::messages::RequestType;
use crate::types::Pti;

/// The pending ESM transaction's working data, carried across the
/// request/response steps of PDN connectivity establishment.
#[derive(Debug, Clone, Default)]
pub struct EsmProcData {
	pub pti: Option<Pti>,
	pub apn: Option<String>,
	pub pdn_type: Option<PdnType>,
	pub pdn_address: Option<PdnAddress>,
	pub requested_qos: Option<BearerQos>,
	pub pco: Option<Bytes>,
	pub request_type: Option<RequestType>,
}

impl EsmProcData {
	pub fn clear(&mut self) {
		*self = EsmProcData::default();
	}
}

#[derive(Debug, Default)]
pub struct EsmContext {
	pub esm_proc_data: EsmProcData,
	/// Inbound ESM message retained for deferred replay during attach
	/// (spec.md §3).
	pub retained_inbound: Option<Bytes>,
}

impl EsmContext {
	pub fn retain_inbound(
		&mut self,
		message: Bytes,
	) {
		self.retained_inbound = Some(message);
	}

	pub fn take_retained_inbound(&mut self) -> Option<Bytes> {
		self.retained_inbound.take()
	}
}

// Re-exported so `bearer_context`/`pdn_context` modules don't need to know
// about EBR's internal state enum when a caller only wants to read it off a
// freshly-built bearer.
pub type DefaultBearerState = EbrState;

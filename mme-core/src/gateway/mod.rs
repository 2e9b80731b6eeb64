//! C6 — Outbound Message Gateway (spec.md §4.6). Pure constructors that
//! take a UE-id and structured parameters and produce an abstract outbound
//! message record for an [`crate::collaborators::OutboundTransport`] to
//! send; this module never touches a socket.

use bytes::Bytes;
use non_empty_string::NonEmptyString;

use crate::collaborators::KeyDerivation;
use crate::context::bearer_context::BearerQos;
use crate::context::emm_context::EmmContext;
use crate::context::pdn_context::{PdnAddress, PdnType};
use crate::esm_sap::messages::RequestType;
use crate::types::{Cid, Ebi, MmeUeS1apId, Pti, Qci};

/// 15-digit IMSI carried both in binary TBCD form and as ASCII, per
/// spec.md §6's "IMSI (binary + 15-digit ASCII)".
#[derive(Debug, Clone)]
pub struct Imsi {
	pub ascii: NonEmptyString,
	pub binary: Bytes,
}

#[derive(Debug, Clone, Copy)]
pub struct QosProfile {
	pub qci: Qci,
	pub mbr_up: u64,
	pub mbr_down: u64,
	pub gbr_up: u64,
	pub gbr_down: u64,
}

impl From<(Qci, BearerQos)> for QosProfile {
	fn from((qci, qos): (Qci, BearerQos)) -> Self {
		Self {
			qci,
			mbr_up: qos.mbr_up,
			mbr_down: qos.mbr_down,
			gbr_up: qos.gbr_up,
			gbr_down: qos.gbr_down,
		}
	}
}

#[derive(Debug, Clone)]
pub struct PdnConfigParams {
	pub imsi: Imsi,
	pub apn: NonEmptyString,
	pub pdn_type: PdnType,
	pub request_type: RequestType,
	pub pti: Pti,
}

#[derive(Debug, Clone)]
pub struct PdnConnectivityParams {
	pub imsi: Imsi,
	pub apn: NonEmptyString,
	pub pdn_address: Option<PdnAddress>,
	pub pdn_type: PdnType,
	pub qos: QosProfile,
	pub pco: Option<Bytes>,
	pub request_type: RequestType,
	pub pti: Pti,
	pub default_ebi: Ebi,
	pub cid: Cid,
}

#[derive(Debug, Clone)]
pub struct ContextRequestParams {
	pub old_guti: NonEmptyString,
	pub originating_tai: u32,
}

#[derive(Debug, Clone)]
pub struct AuthInfoParams {
	pub imsi: Imsi,
	pub visited_plmn: [u8; 3],
	pub n_vectors: u8,
	pub resync: Option<[u8; 14]>,
}

/// Abstract outbound message record, §4.6's recognized kinds.
#[derive(Debug, Clone, enum_as_inner::EnumAsInner)]
pub enum OutboundMessage {
	DlDataReq {
		ebi: Ebi,
		nas_pdu: Bytes,
	},
	ErabSetupReq {
		ebi: Ebi,
		qos: QosProfile,
		nas_pdu: Bytes,
	},
	ErabReleaseReq {
		ebi: Ebi,
	},
	PdnConfigReq(PdnConfigParams),
	PdnConnectivityReq(PdnConnectivityParams),
	PdnDisconnectReq {
		cid: Cid,
		default_ebi: Ebi,
		local_delete: bool,
	},
	ContextReq(ContextRequestParams),
	AuthInfoReq(AuthInfoParams),
	DetachReq {
		switch_off: bool,
	},
	ActivateBearerCnf {
		ebi: Ebi,
	},
	ActivateBearerRej {
		ebi: Ebi,
		cause: crate::cause::EsmCause,
	},
	DeactivateBearerCnf {
		ebi: Ebi,
	},
	ConnEstCnf {
		nas_pdu: Bytes,
	},
	AuthParamReq,
}

pub fn dl_data_req(
	ebi: Ebi,
	nas_pdu: Bytes,
) -> OutboundMessage {
	OutboundMessage::DlDataReq { ebi, nas_pdu }
}

pub fn erab_setup_req(
	ebi: Ebi,
	qos: QosProfile,
	nas_pdu: Bytes,
) -> OutboundMessage {
	OutboundMessage::ErabSetupReq { ebi, qos, nas_pdu }
}

pub fn erab_release_req(ebi: Ebi) -> OutboundMessage {
	OutboundMessage::ErabReleaseReq { ebi }
}

pub fn pdn_config_req(params: PdnConfigParams) -> OutboundMessage {
	OutboundMessage::PdnConfigReq(params)
}

pub fn pdn_connectivity_req(params: PdnConnectivityParams) -> OutboundMessage {
	OutboundMessage::PdnConnectivityReq(params)
}

pub fn pdn_disconnect_req(
	cid: Cid,
	default_ebi: Ebi,
	local_delete: bool,
) -> OutboundMessage {
	OutboundMessage::PdnDisconnectReq {
		cid,
		default_ebi,
		local_delete,
	}
}

pub fn context_req(params: ContextRequestParams) -> OutboundMessage {
	OutboundMessage::ContextReq(params)
}

pub fn auth_info_req(params: AuthInfoParams) -> OutboundMessage {
	OutboundMessage::AuthInfoReq(params)
}

pub fn detach_req(switch_off: bool) -> OutboundMessage {
	OutboundMessage::DetachReq { switch_off }
}

pub fn activate_bearer_cnf(ebi: Ebi) -> OutboundMessage {
	OutboundMessage::ActivateBearerCnf { ebi }
}

pub fn activate_bearer_rej(
	ebi: Ebi,
	cause: crate::cause::EsmCause,
) -> OutboundMessage {
	OutboundMessage::ActivateBearerRej { ebi, cause }
}

pub fn deactivate_bearer_cnf(ebi: Ebi) -> OutboundMessage {
	OutboundMessage::DeactivateBearerCnf { ebi }
}

/// On CONN_EST_CNF the gateway derives KeNB from the current auth vector
/// and NAS UL count, initializes NH from KeNB when NH hasn't been derived
/// yet, and resets NCC to 0 (spec.md §4.6) — the security side effects
/// that must accompany this particular outbound message.
pub fn conn_est_cnf(
	ue: &mut EmmContext,
	nas_pdu: Bytes,
	keys: &dyn KeyDerivation,
) -> OutboundMessage {
	if let Some(vector) = ue.security.current_vector().cloned() {
		let kenb = keys.derive_kenb(&vector.kasme, ue.security.nas_ul_count.increment());
		if ue.security.nh.is_none() {
			ue.security.nh = Some(keys.derive_nh(&vector.kasme, &kenb));
		}
		ue.security.ncc = 0;
	}
	OutboundMessage::ConnEstCnf { nas_pdu }
}

pub fn auth_param_req() -> OutboundMessage {
	OutboundMessage::AuthParamReq
}

//! ESM NAS message shapes the core branches on (spec.md §4.4). The full IE
//! catalog for each message is owned by the external codec; these are just
//! enough to dispatch on and to build outbound requests from.

use bytes::Bytes;

use crate::cause::EsmCause;
use crate::context::bearer_context::BearerQos;
use crate::context::pdn_context::{PdnAddress, PdnType};
use crate::types::{Ebi, Pti, Qci};

/// 24.301 §9.9.4.9 PDN Request Type, abstracted to the values the core
/// branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
	InitialRequest,
	HandoverRequest,
	EmergencyRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEsmMessageType {
	ActivateDefaultEpsBearerAccept,
	ActivateDefaultEpsBearerReject,
	DeactivateEpsBearerAccept,
	ActivateDedicatedEpsBearerAccept,
	ActivateDedicatedEpsBearerReject,
	PdnConnectivityRequest,
	PdnDisconnectRequest,
	EsmInformationResponse,
	EsmStatus,
}

/// Outbound ESM message the codec is asked to encode (spec.md §4.4's
/// "Outbound `send(msg_type, ...)`").
#[derive(Debug, Clone)]
pub enum OutboundEsmMessage {
	ActivateDefaultEpsBearerRequest {
		pti: Pti,
		ebi: Ebi,
		apn: String,
		pdn_type: PdnType,
		pdn_address: Option<PdnAddress>,
		qos: BearerQos,
		qci: Qci,
		pco: Option<Bytes>,
	},
	ActivateDedicatedEpsBearerRequest {
		pti: Pti,
		ebi: Ebi,
		linked_ebi: Ebi,
		qos: BearerQos,
		qci: Qci,
		tft: Option<Bytes>,
	},
	DeactivateEpsBearerRequest {
		ebi: Ebi,
		cause: EsmCause,
	},
	PdnConnectivityReject {
		pti: Pti,
		cause: EsmCause,
	},
	PdnDisconnectReject {
		pti: Pti,
		cause: EsmCause,
	},
	EsmStatus {
		pti: Pti,
		ebi: Option<Ebi>,
		cause: EsmCause,
	},
}

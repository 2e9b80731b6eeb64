//! C4 — ESM-SAP (spec.md §4.4). Decodes inbound ESM NAS PDUs, dispatches
//! by message kind, drives bearer/PDN procedures, and encodes outbound ESM
//! NAS. The external [`crate::collaborators::NasEsmCodec`] owns the wire
//! format; this module only ever sees the decoded shape in
//! [`crate::collaborators::EsmDecoded`]. Outbound `send` ([`send_dedicated_bearer_activate`],
//! [`send_deactivate`]) is driven by the EMMCN-SAP, which owns the timer
//! durations and the downlink transport handle.

pub mod dedicated_bearer;
pub mod messages;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::bearer;
use crate::bearer::ebr::EbrState;
use crate::cause::EsmCause;
use crate::collaborators::{DecodedEsmMessage, NasEsmCodec};
use crate::context::bearer_context::{BearerQos, FteIdSet};
use crate::context::emm_context::EmmContext;
use crate::error::{CoreError, ProtocolError};
use crate::esm_sap::messages::{InboundEsmMessageType, OutboundEsmMessage};
use crate::timer::TimerToken;
use crate::types::{Cid, Ebi, MAX_NAS_MESSAGE_LEN, Pti, Qci};

/// Outcome of [`recv`]: either the inbound PDU drove a state change (and
/// possibly produced a reply to encode), or it was discarded per spec.md
/// §4.4 step 5/error policy, with the ESM-STATUS reply, if any, already in
/// `response`.
#[derive(Debug)]
pub struct RecvResult {
	pub discarded: bool,
	pub response: Option<OutboundEsmMessage>,
}

impl RecvResult {
	pub(crate) fn discard() -> Self {
		Self {
			discarded: true,
			response: None,
		}
	}

	pub(crate) fn handled() -> Self {
		Self {
			discarded: false,
			response: None,
		}
	}

	pub(crate) fn with_response(response: OutboundEsmMessage) -> Self {
		Self {
			discarded: false,
			response: Some(response),
		}
	}
}

/// spec.md §4.4 steps 1-6. `expected`, when present, is the message type
/// the installed procedure (if any) is waiting on; a mismatch other than
/// ESM-STATUS is `SemanticallyIncorrect`.
pub fn recv(
	ue: &mut EmmContext,
	expected: Option<InboundEsmMessageType>,
	req_bytes: &[u8],
	codec: &dyn NasEsmCodec,
) -> Result<RecvResult, CoreError> {
	let decoded = match codec.decode(req_bytes) {
		DecodedEsmMessage::TooShort => return Ok(RecvResult::discard()),
		DecodedEsmMessage::WrongType => {
			return Err(CoreError::Protocol(ProtocolError::MessageTypeNotImplemented));
		}
		DecodedEsmMessage::UnexpectedIe => {
			return Err(CoreError::Protocol(ProtocolError::ConditionalIeError));
		}
		DecodedEsmMessage::Protocol => return Err(CoreError::Protocol(ProtocolError::Protocol)),
		DecodedEsmMessage::Ok(decoded) => decoded,
	};
	ue.security.nas_dl_count.increment();

	if let Some(expected) = expected {
		if decoded.message_type != expected && decoded.message_type != InboundEsmMessageType::EsmStatus
		{
			return Err(CoreError::Protocol(ProtocolError::SemanticallyIncorrect));
		}
	}

	let triggered_by_ue = decoded.pti.is_assigned();
	let _ = triggered_by_ue;

	let cause = decoded.cause;
	let result = match decoded.message_type {
		InboundEsmMessageType::ActivateDefaultEpsBearerAccept => {
			on_default_bearer_accept(ue, decoded.ebi)
		}
		InboundEsmMessageType::ActivateDefaultEpsBearerReject => {
			on_bearer_reject(ue, decoded.ebi)
		}
		InboundEsmMessageType::DeactivateEpsBearerAccept => on_deactivate_accept(ue, decoded.ebi),
		InboundEsmMessageType::ActivateDedicatedEpsBearerAccept => {
			dedicated_bearer::on_activate_accept(ue, decoded.ebi)
		}
		InboundEsmMessageType::ActivateDedicatedEpsBearerReject => {
			dedicated_bearer::on_activate_reject(ue, decoded.ebi, cause.unwrap_or(EsmCause::NetworkFailure))
		}
		InboundEsmMessageType::PdnConnectivityRequest => on_pdn_connectivity_request(ue, &decoded),
		InboundEsmMessageType::PdnDisconnectRequest => on_pdn_disconnect_request(ue, &decoded),
		InboundEsmMessageType::EsmInformationResponse => {
			ue.esm.esm_proc_data.apn = decoded.payload.apn.clone();
			ue.esm.esm_proc_data.pco = decoded.payload.pco.clone();
			Ok(RecvResult::handled())
		}
		InboundEsmMessageType::EsmStatus => {
			tracing::info!(ue_id = %ue.ue_id, "received ESM-STATUS");
			Ok(RecvResult::handled())
		}
	}?;

	// Step 5: an ESM cause other than SUCCESS with nothing having claimed a
	// response yields a discarded ESM-STATUS echo.
	if let Some(cause) = cause {
		if cause != EsmCause::Success && result.response.is_none() {
			return Ok(RecvResult::with_response(OutboundEsmMessage::EsmStatus {
				pti: decoded.pti,
				ebi: decoded.ebi,
				cause,
			}));
		}
	}

	Ok(result)
}

fn on_default_bearer_accept(
	ue: &mut EmmContext,
	ebi: Option<crate::types::Ebi>,
) -> Result<RecvResult, CoreError> {
	let Some(ebi) = ebi else {
		return Ok(RecvResult::discard());
	};
	if bearer::set_status(ue, ebi, EbrState::Active).is_err() {
		return Ok(RecvResult::discard());
	}
	Ok(RecvResult::handled())
}

fn on_bearer_reject(
	ue: &mut EmmContext,
	ebi: Option<crate::types::Ebi>,
) -> Result<RecvResult, CoreError> {
	let Some(ebi) = ebi else {
		return Ok(RecvResult::discard());
	};
	let _ = bearer::release(ue, ebi, true);
	Ok(RecvResult::handled())
}

fn on_deactivate_accept(
	ue: &mut EmmContext,
	ebi: Option<crate::types::Ebi>,
) -> Result<RecvResult, CoreError> {
	let Some(ebi) = ebi else {
		return Ok(RecvResult::discard());
	};
	let _ = bearer::release(ue, ebi, true);
	Ok(RecvResult::handled())
}

fn on_pdn_connectivity_request(
	ue: &mut EmmContext,
	decoded: &crate::collaborators::EsmDecoded,
) -> Result<RecvResult, CoreError> {
	// Multi-APN on the same UE: if the APN is already connected, the
	// default-bearer request can be answered immediately without a round
	// trip through PDN config.
	if let Some(pdn) = ue.find_pdn_by_apn_or_first(decoded.payload.apn.as_deref()) {
		let apn = pdn.apn.as_str().to_owned();
		let pdn_type = pdn.pdn_type;
		let pdn_address = pdn.paa;
		let default_ebi = pdn.default_ebi;
		let bearer = pdn.bearers.get(&default_ebi);
		let (qos, qci) = bearer
			.map(|b| (b.qos, b.qci))
			.unwrap_or((crate::context::bearer_context::BearerQos {
				priority_level: 1,
				pci: false,
				pvi: false,
				mbr_up: 0,
				mbr_down: 0,
				gbr_up: 0,
				gbr_down: 0,
			}, crate::types::Qci(9)));
		return Ok(RecvResult::with_response(
			OutboundEsmMessage::ActivateDefaultEpsBearerRequest {
				pti: decoded.pti,
				ebi: default_ebi,
				apn,
				pdn_type,
				pdn_address,
				qos,
				qci,
				pco: decoded.payload.pco.clone(),
			},
		));
	}

	ue.esm.esm_proc_data.pti = Some(decoded.pti);
	ue.esm.esm_proc_data.apn = decoded.payload.apn.clone();
	ue.esm.esm_proc_data.pdn_type = decoded.payload.pdn_type;
	ue.esm.esm_proc_data.pco = decoded.payload.pco.clone();
	ue.esm.esm_proc_data.request_type = decoded.payload.request_type;
	// PDN_CONFIG_REQ is emitted by the caller once this returns, which owns
	// the outbound transport handle; this module only prepares the pending
	// state the EMMCN-SAP's PDN_CONFIG_RES handler resumes from.
	Ok(RecvResult::handled())
}

fn on_pdn_disconnect_request(
	ue: &mut EmmContext,
	decoded: &crate::collaborators::EsmDecoded,
) -> Result<RecvResult, CoreError> {
	let Some(ebi) = decoded.ebi else {
		return Ok(RecvResult::with_response(OutboundEsmMessage::PdnDisconnectReject {
			pti: decoded.pti,
			cause: EsmCause::RequestRejectedByGw,
		}));
	};
	let Some((cid, bearer)) = ue.find_bearer_any(ebi) else {
		return Ok(RecvResult::with_response(OutboundEsmMessage::PdnDisconnectReject {
			pti: decoded.pti,
			cause: EsmCause::RequestRejectedByGw,
		}));
	};
	if !bearer.is_default {
		return Ok(RecvResult::with_response(OutboundEsmMessage::PdnDisconnectReject {
			pti: decoded.pti,
			cause: EsmCause::RequestRejectedByGw,
		}));
	}
	let _ = cid;
	// Driving the actual PDN disconnect procedure (PDN_DISCONNECT_REQ
	// outbound, PDN_DISCONNECT_RES handling) belongs to the EMMCN-SAP side,
	// which owns the procedure registry slot; this validates the linked
	// EBI and hands control back to the caller.
	Ok(RecvResult::handled())
}

/// Outbound `send`: allocates and creates a new dedicated bearer off
/// `linked_ebi`'s PDN, encodes ACTIVATE-DEDICATED-EPS-BEARER REQUEST, and
/// registers `esm_proc_dedicated_eps_bearer_context_request` (starts T3485,
/// moves the bearer to `ACTIVE_PENDING`) — spec.md §4.4's per-bearer
/// activation half of the outbound `send` operation. Returns the allocated
/// EBI and the encoded PDU so the caller can build the downlink message.
#[allow(clippy::too_many_arguments)]
pub fn send_dedicated_bearer_activate<F, Fut>(
	ue: &mut EmmContext,
	cid: Cid,
	linked_ebi: Ebi,
	pti: Pti,
	qos: BearerQos,
	qci: Qci,
	tft: Option<Bytes>,
	codec: &dyn NasEsmCodec,
	duration: Duration,
	rearm: F,
) -> Result<(Ebi, Bytes), CoreError>
where
	F: FnOnce(TimerToken) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let ebi = bearer::assign(ue, None)?;
	bearer::create(ue, cid, ebi, FteIdSet::default(), false, qos, qci, tft.clone(), None)?;
	let message = OutboundEsmMessage::ActivateDedicatedEpsBearerRequest {
		pti,
		ebi,
		linked_ebi,
		qos,
		qci,
		tft,
	};
	let encoded = encode_bounded(&message, codec)?;
	dedicated_bearer::start(ue, ebi, encoded.clone(), duration, rearm);
	Ok((ebi, encoded))
}

/// Outbound `send`: encodes DEACTIVATE-EPS-BEARER REQUEST (cause
/// REGULAR_DEACTIVATION or as given), then runs
/// `esm_proc_eps_bearer_context_deactivate_request` — starts the bearer's
/// retransmission timer against the encoded request and moves it to
/// `INACTIVE_PENDING` — the other half of spec.md §4.4's outbound `send`.
pub fn send_deactivate<F, Fut>(
	ue: &mut EmmContext,
	ebi: Ebi,
	cause: EsmCause,
	codec: &dyn NasEsmCodec,
	duration: Duration,
	rearm: F,
) -> Result<Bytes, CoreError>
where
	F: FnOnce(TimerToken) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let message = OutboundEsmMessage::DeactivateEpsBearerRequest { ebi, cause };
	let encoded = encode_bounded(&message, codec)?;
	bearer::start_timer(ue, ebi, encoded.clone(), duration, rearm);
	let _ = bearer::set_status(ue, ebi, EbrState::InactivePending);
	Ok(encoded)
}

/// Encodes `message` into a buffer bounded at [`MAX_NAS_MESSAGE_LEN`]
/// (spec.md §4.4 step 6).
pub fn encode_bounded(
	message: &OutboundEsmMessage,
	codec: &dyn NasEsmCodec,
) -> Result<Bytes, ProtocolError> {
	let bytes = codec.encode(message)?;
	if bytes.len() > MAX_NAS_MESSAGE_LEN {
		return Err(ProtocolError::Protocol);
	}
	Ok(bytes)
}

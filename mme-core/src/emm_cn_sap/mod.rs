//! C5 — EMMCN-SAP (spec.md §4.5). Single dispatcher fanning core-network
//! primitives out to EMM/ESM procedures. Returns the bounded set of
//! outbound messages the primitive produced; the caller (which owns the
//! [`crate::collaborators::OutboundTransport`]) is responsible for sending
//! them.

pub mod primitives;

use std::future::Future;

use crate::bearer;
use crate::cause::{EmmCause, EsmCause, map_s11_cause_to_esm};
use crate::collaborators::NasEsmCodec;
use crate::config::CoreConfig;
use crate::context::bearer_context::{BearerContext, FteIdSet};
use crate::context::emm_context::EmmContext;
use crate::context::emm_fsm::EmmEvent;
use crate::context::pdn_context::{PdnContext, PdnType};
use crate::emm_cn_sap::primitives::EmmCnPrimitive;
use crate::error::CoreError;
use crate::esm_sap::messages::{OutboundEsmMessage, RequestType};
use crate::gateway::{self, OutboundMessage, PdnConnectivityParams, QosProfile};
use crate::procedure::kinds::EncodedEsmPayload;
use crate::timer::TimerToken;
use crate::types::{Ebi, Pti, Qci};

/// `emm_cn_send` mutates `ue` in place and hands back what should go out.
/// `codec` and `config` are needed by the two primitives that drive a fresh
/// outbound `send` (dedicated-bearer activate/deactivate): `rearm` is the
/// timer re-entry closure those sends arm, following the same generic
/// `FnOnce(TimerToken) -> Fut` idiom as `RetryTimer::start`. Primitives that
/// don't touch a timer simply leave it unused.
pub async fn emm_cn_send<F, Fut>(
	ue: &mut EmmContext,
	primitive: EmmCnPrimitive,
	codec: &dyn NasEsmCodec,
	config: &CoreConfig,
	rearm: F,
) -> Result<Vec<OutboundMessage>, CoreError>
where
	F: FnOnce(TimerToken) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	match primitive {
		EmmCnPrimitive::AuthParamRes { vectors, .. } => {
			ue.security.absorb_auth_vectors(vectors)?;
			if let Some(proc) = ue.procedures.delete_auth_info() {
				(proc.on_success)(ue);
			}
			Ok(vec![])
		}

		EmmCnPrimitive::AuthParamFail { cause, .. } => {
			if let Some(proc) = ue.procedures.delete_auth_info() {
				(proc.on_failure)(ue, cause);
			}
			Ok(vec![])
		}

		EmmCnPrimitive::ContextRes { .. } => {
			if let Some(proc) = ue.procedures.delete_context_request() {
				(proc.on_success)(ue);
			}
			Ok(vec![])
		}

		EmmCnPrimitive::ContextFail { cause, .. } => {
			if let Some(proc) = ue.procedures.delete_context_request() {
				(proc.on_failure)(ue, cause);
			}
			Ok(vec![])
		}

		EmmCnPrimitive::DeregisterUe { .. } => {
			ue.apply_emm_event(EmmEvent::DetachRequested { switch_off: false })
				.await;
			Ok(vec![gateway::detach_req(false)])
		}

		EmmCnPrimitive::PdnConfigRes { apn, .. } => handle_pdn_config_res(ue, apn),

		EmmCnPrimitive::PdnConfigFail { .. } => handle_pdn_config_fail(ue, codec),

		EmmCnPrimitive::PdnConnectivityRes {
			cid,
			pdn_type,
			pdn_address,
			qos,
			qci,
			..
		} => handle_pdn_connectivity_res(ue, cid, pdn_type, pdn_address, qos, qci),

		EmmCnPrimitive::PdnConnectivityFail { cause, .. } => {
			handle_pdn_connectivity_fail(ue, cause, codec)
		}

		EmmCnPrimitive::PdnDisconnectRes { cid, .. } => handle_pdn_disconnect_res(ue, cid).await,

		EmmCnPrimitive::ActivateDedicatedBearerReq {
			cid,
			linked_ebi,
			pti,
			qos,
			qci,
			tft,
			..
		} => {
			let (ebi, encoded) = crate::esm_sap::send_dedicated_bearer_activate(
				ue,
				cid,
				linked_ebi,
				pti,
				qos,
				qci,
				tft,
				codec,
				config.t3485.duration(),
				rearm,
			)?;
			Ok(vec![OutboundMessage::DlDataReq { ebi, nas_pdu: encoded }])
		}

		EmmCnPrimitive::DeactivateDedicatedBearerReq { ebi, cause, .. } => {
			let encoded = crate::esm_sap::send_deactivate(
				ue,
				ebi,
				cause,
				codec,
				config.bearer_deactivate_timer.duration(),
				rearm,
			)?;
			Ok(vec![OutboundMessage::DlDataReq { ebi, nas_pdu: encoded }])
		}

		EmmCnPrimitive::ImplicitDetach { .. } => {
			ue.apply_emm_event(EmmEvent::ImplicitDetach).await;
			Ok(vec![])
		}

		EmmCnPrimitive::SmcProcFail { cause, .. } => {
			if let Some(proc) = ue.procedures.delete_attach() {
				(proc.on_failure)(ue, cause, EncodedEsmPayload::default());
			}
			Ok(vec![])
		}
	}
}

fn handle_pdn_config_res(
	ue: &mut EmmContext,
	apn: Option<String>,
) -> Result<Vec<OutboundMessage>, CoreError> {
	// Pending ESM proc-data (carried from the PDN-connectivity request that
	// triggered this PDN-config round trip) names the target APN when
	// present; the primitive's own `apn` is only the default-subscribed
	// fallback (spec.md §4.5's PDN_CONFIG_RES row).
	let target_apn = ue.esm.esm_proc_data.apn.clone().or(apn);
	ue.esm.esm_proc_data.apn = target_apn.clone();
	let no_prior_connectivity = ue.find_pdn_by_apn_or_first(target_apn.as_deref()).is_none();

	if no_prior_connectivity {
		let pti = ue.esm.esm_proc_data.pti.unwrap_or(Pti(crate::types::PTI_UNASSIGNED));
		return Ok(vec![OutboundMessage::PdnConnectivityReq(
			PdnConnectivityParams {
				imsi: require_imsi(ue)?,
				apn: non_empty(target_apn.unwrap_or_default())?,
				pdn_address: None,
				pdn_type: ue.esm.esm_proc_data.pdn_type.unwrap_or(PdnType::Ipv4),
				qos: QosProfile {
					qci: crate::types::Qci(9),
					mbr_up: 0,
					mbr_down: 0,
					gbr_up: 0,
					gbr_down: 0,
				},
				pco: ue.esm.esm_proc_data.pco.clone(),
				request_type: ue
					.esm
					.esm_proc_data
					.request_type
					.unwrap_or(RequestType::InitialRequest),
				pti,
				default_ebi: Ebi(crate::types::EBI_MIN),
				cid: crate::types::Cid(1),
			},
		)]);
	}

	if ue.procedures.is_tau_running() {
		if let Some(proc) = ue.procedures.delete_tau() {
			(proc.on_success)(ue);
		}
		return Ok(vec![]);
	}

	Err(CoreError::Fatal(
		"PDN_CONFIG_RES with prior connectivity and no TAU running",
	))
}

/// Builds and encodes a PDN-CONNECTIVITY REJECT against the pending ESM
/// transaction's PTI, for embedding into an attach/TAU procedure's failure
/// continuation (spec.md §4.5's PDN_CONFIG_FAIL/PDN_CONNECTIVITY_FAIL rows).
/// A codec failure degrades to an empty payload rather than failing the
/// whole primitive — the outer EMM cause still carries the failure.
fn build_pdn_reject(
	ue: &EmmContext,
	esm_cause: EsmCause,
	codec: &dyn NasEsmCodec,
) -> EncodedEsmPayload {
	let pti = ue.esm.esm_proc_data.pti.unwrap_or(Pti(crate::types::PTI_UNASSIGNED));
	let message = OutboundEsmMessage::PdnConnectivityReject {
		pti,
		cause: esm_cause,
	};
	match crate::esm_sap::encode_bounded(&message, codec) {
		Ok(bytes) => EncodedEsmPayload(Some(bytes)),
		Err(_) => EncodedEsmPayload(None),
	}
}

fn handle_pdn_config_fail(
	ue: &mut EmmContext,
	codec: &dyn NasEsmCodec,
) -> Result<Vec<OutboundMessage>, CoreError> {
	if ue.procedures.is_attach_running() {
		let payload = build_pdn_reject(ue, EsmCause::NetworkFailure, codec);
		if let Some(proc) = ue.procedures.delete_attach() {
			(proc.on_failure)(ue, EmmCause::EsmFailure, payload);
		}
		return Ok(vec![]);
	}
	if ue.procedures.is_tau_running() {
		let payload = build_pdn_reject(ue, EsmCause::NetworkFailure, codec);
		if let Some(proc) = ue.procedures.delete_tau() {
			(proc.on_failure)(ue, EmmCause::EsmFailure, payload);
		}
		return Ok(vec![]);
	}
	Err(CoreError::unresolved_dev_assert(
		ue.ue_id,
		"PDN_CONFIG_FAIL with neither attach nor TAU running",
	))
}

fn handle_pdn_connectivity_res(
	ue: &mut EmmContext,
	cid: crate::types::Cid,
	pdn_type: PdnType,
	pdn_address: Option<crate::context::pdn_context::PdnAddress>,
	qos: crate::context::bearer_context::BearerQos,
	qci: Qci,
) -> Result<Vec<OutboundMessage>, CoreError> {
	// Invariant I2 requires a PDN's default EBI to name an existing bearer
	// for as long as the PDN exists, so the PDN context can't be built until
	// a default EBI is known — this is the point that happens, not
	// PDN_CONFIG_RES (see DESIGN.md).
	if ue.find_pdn(cid).is_none() {
		let apn = ue.esm.esm_proc_data.apn.clone().ok_or(CoreError::Fatal(
			"PDN_CONNECTIVITY_RES with no pending APN to name the new PDN context",
		))?;
		let apn = non_empty(apn)?;
		let default_ebi = bearer::assign(ue, None)?;
		let mut pdn = PdnContext::new(cid, apn, pdn_type, default_ebi);
		pdn.paa = pdn_address;
		pdn.insert_bearer(BearerContext::new(default_ebi, qci, qos, FteIdSet::default(), true));
		ue.pdns.insert(cid, pdn);
	}

	let pdn = ue.find_pdn(cid).ok_or(CoreError::StaleCorrelation(ue.ue_id))?;
	let default_ebi = pdn.default_ebi;
	let apn = pdn.apn.as_str().to_owned();

	let request = OutboundEsmMessage::ActivateDefaultEpsBearerRequest {
		pti: crate::bearer::network_initiated_pti(),
		ebi: default_ebi,
		apn,
		pdn_type,
		pdn_address,
		qos,
		qci,
		pco: None,
	};
	let _ = bearer::set_status(ue, default_ebi, crate::bearer::ebr::EbrState::ActivePending);

	if ue.procedures.is_attach_running() {
		if let Some(proc) = ue.procedures.delete_attach() {
			(proc.on_success)(ue);
		}
	} else if ue.procedures.is_tau_running() {
		if let Some(proc) = ue.procedures.delete_tau() {
			(proc.on_success)(ue);
		}
	}

	Ok(vec![OutboundMessage::DlDataReq {
		ebi: default_ebi,
		nas_pdu: bytes::Bytes::from(format!("{request:?}")),
	}])
}

fn handle_pdn_connectivity_fail(
	ue: &mut EmmContext,
	cause: crate::cause::S11Cause,
	codec: &dyn NasEsmCodec,
) -> Result<Vec<OutboundMessage>, CoreError> {
	let esm_cause = map_s11_cause_to_esm(cause);
	let payload = build_pdn_reject(ue, esm_cause, codec);
	if ue.procedures.is_attach_running() {
		if let Some(proc) = ue.procedures.delete_attach() {
			(proc.on_failure)(ue, EmmCause::EsmFailure, payload);
		}
		return Ok(vec![]);
	}
	if ue.procedures.is_tau_running() {
		if let Some(proc) = ue.procedures.delete_tau() {
			(proc.on_failure)(ue, EmmCause::EsmFailure, payload);
		}
		return Ok(vec![]);
	}
	Err(CoreError::unresolved_dev_assert(
		ue.ue_id,
		"PDN_CONNECTIVITY_FAIL with neither attach nor TAU running",
	))
}

async fn handle_pdn_disconnect_res(
	ue: &mut EmmContext,
	cid: crate::types::Cid,
) -> Result<Vec<OutboundMessage>, CoreError> {
	ue.pdns.remove(&cid);

	if ue.pdns.is_empty() {
		let Some(switch_off) = ue.procedures.get_detach().map(|proc| proc.switch_off) else {
			return Ok(vec![]);
		};
		// Finalize the detach either way; a Detach Accept downlink is only
		// owed to the UE when it didn't just switch off.
		let messages = if switch_off {
			vec![]
		} else {
			vec![gateway::dl_data_req(Ebi(crate::types::EBI_MIN), bytes::Bytes::new())]
		};
		if let Some(proc) = ue.procedures.delete_detach() {
			(proc.on_success)(ue);
		}
		ue.apply_emm_event(EmmEvent::DetachAccepted).await;
		return Ok(messages);
	}

	// PDNs remain: the source's exact disconnect-closure semantics here are
	// ambiguous (spec.md §9); re-issue a local-delete disconnect against
	// every remaining PDN rather than guessing at a network-visible path.
	let messages = ue
		.pdns
		.values()
		.map(|pdn| gateway::pdn_disconnect_req(pdn.cid, pdn.default_ebi, true))
		.collect();
	Ok(messages)
}

fn require_imsi(ue: &EmmContext) -> Result<gateway::Imsi, CoreError> {
	let ascii = ue
		.identity
		.imsi
		.clone()
		.ok_or(CoreError::Fatal("PDN config requires a known IMSI"))?;
	Ok(gateway::Imsi {
		ascii,
		binary: bytes::Bytes::new(),
	})
}

fn non_empty(value: String) -> Result<non_empty_string::NonEmptyString, CoreError> {
	non_empty_string::NonEmptyString::new(value)
		.map_err(|_| CoreError::Fatal("PDN config requires a non-empty APN"))
}


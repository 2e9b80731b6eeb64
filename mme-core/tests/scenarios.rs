//! End-to-end seed scenarios (spec.md §8 S1-S6), driven against the public
//! module surface rather than a real NAS codec: a minimal fake
//! [`NasEsmCodec`] stands in for the external collaborator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use mme_core::bearer::ebr::{EbrState, TransitionOutcome};
use mme_core::cause::EmmCause;
use mme_core::collaborators::{DecodedEsmMessage, EsmDecoded, EsmPayload, NasEsmCodec};
use mme_core::config::CoreConfig;
use mme_core::context::bearer_context::{BearerContext, BearerQos, FteIdSet};
use mme_core::context::emm_context::EmmContext;
use mme_core::context::pdn_context::{PdnContext, PdnType};
use mme_core::emm_cn_sap::primitives::EmmCnPrimitive;
use mme_core::emm_cn_sap::emm_cn_send;
use mme_core::error::{CoreError, ProtocolError};
use mme_core::esm_sap::dedicated_bearer::{self, ExpiryOutcome};
use mme_core::esm_sap::messages::InboundEsmMessageType;
use mme_core::esm_sap::recv;
use mme_core::procedure::kinds::{AttachProcedure, ContextRequestProcedure, EncodedEsmPayload};
use mme_core::types::{Cid, Ebi, MmeUeS1apId, Qci};

fn noop_rearm(_token: mme_core::timer::TimerToken) -> impl std::future::Future<Output = ()> {
	async {}
}

struct FakeCodec;

impl NasEsmCodec for FakeCodec {
	fn decode(
		&self,
		bytes: &[u8],
	) -> DecodedEsmMessage {
		if bytes.len() < 4 {
			return DecodedEsmMessage::TooShort;
		}
		DecodedEsmMessage::Ok(EsmDecoded {
			message_type: InboundEsmMessageType::ActivateDedicatedEpsBearerAccept,
			pti: mme_core::types::Pti(0),
			ebi: Some(Ebi(6)),
			cause: None,
			payload: EsmPayload::default(),
		})
	}

	fn encode(
		&self,
		_message: &mme_core::esm_sap::messages::OutboundEsmMessage,
	) -> Result<Bytes, ProtocolError> {
		Ok(Bytes::from_static(b"encoded"))
	}
}

fn qos() -> BearerQos {
	BearerQos {
		priority_level: 1,
		pci: false,
		pvi: false,
		mbr_up: 0,
		mbr_down: 0,
		gbr_up: 0,
		gbr_down: 0,
	}
}

fn ue_with_pdn(
	cid: u8,
	default_ebi: u8,
) -> EmmContext {
	let mut ue = EmmContext::new(MmeUeS1apId(1));
	let mut pdn = PdnContext::new(
		Cid(cid),
		non_empty_string::NonEmptyString::new("internet".to_owned()).unwrap(),
		PdnType::Ipv4,
		Ebi(default_ebi),
	);
	pdn.insert_bearer(BearerContext::new(
		Ebi(default_ebi),
		Qci(9),
		qos(),
		FteIdSet::default(),
		true,
	));
	ue.pdns.insert(Cid(cid), pdn);
	ue
}

/// S6 — malformed ESM PDU: decode reports too-short, the inbound is
/// discarded, and no outbound is produced.
#[test]
fn s6_malformed_esm_pdu_is_discarded() {
	let mut ue = ue_with_pdn(1, 5);
	let codec = FakeCodec;
	let result = recv(&mut ue, None, &[0u8, 1, 2], &codec).unwrap();
	assert!(result.discarded);
	assert!(result.response.is_none());
}

/// S1 (bearer-activation tail) — PDN_CONNECTIVITY_RES drives the default
/// bearer to ACTIVE_PENDING, and the subsequent ACCEPT moves it to ACTIVE.
#[tokio::test]
async fn s1_default_bearer_activates_after_connectivity_res() {
	let mut ue = ue_with_pdn(1, 5);
	ue.identity.imsi = Some(non_empty_string::NonEmptyString::new("001010000000001".to_owned()).unwrap());

	let codec = FakeCodec;
	let config = CoreConfig::default();
	let messages = emm_cn_send(
		&mut ue,
		EmmCnPrimitive::PdnConnectivityRes {
			ue_id: ue.ue_id,
			cid: Cid(1),
			pdn_type: PdnType::Ipv4,
			pdn_address: None,
			qos: qos(),
			qci: Qci(9),
		},
		&codec,
		&config,
		noop_rearm,
	)
	.await
	.unwrap();
	assert_eq!(messages.len(), 1);

	let (_, bearer) = ue.find_bearer_any(Ebi(5)).unwrap();
	assert_eq!(bearer.ebr_state, EbrState::ActivePending);

	let outcome = mme_core::bearer::set_status(&mut ue, Ebi(5), EbrState::Active).unwrap();
	assert_eq!(outcome, TransitionOutcome::Transitioned);
}

/// S2 — dedicated-bearer T3485 exhaustion: four resends, then release on
/// the fifth expiry with the retry budget exhausted.
#[tokio::test]
async fn s2_t3485_exhausts_after_five_expiries() {
	let mut ue = ue_with_pdn(1, 5);
	mme_core::bearer::create(
		&mut ue,
		Cid(1),
		Ebi(6),
		FteIdSet::default(),
		false,
		qos(),
		Qci(8),
		None,
		None,
	)
	.unwrap();

	dedicated_bearer::start(
		&mut ue,
		Ebi(6),
		Bytes::from_static(b"activate-dedicated"),
		std::time::Duration::from_secs(8),
		|_token| async {},
	);
	assert_eq!(
		ue.find_bearer_any(Ebi(6)).unwrap().1.ebr_state,
		EbrState::ActivePending
	);

	let mut outcomes = Vec::new();
	for _ in 0..5 {
		let token = ue.find_bearer_any(Ebi(6)).unwrap().1.timer.current_token();
		let outcome = dedicated_bearer::on_t3485_expiry(
			&mut ue,
			Ebi(6),
			token,
			std::time::Duration::from_secs(8),
			|_token| async {},
		);
		outcomes.push(outcome);
	}

	let retained = Bytes::from_static(b"activate-dedicated");
	assert_eq!(
		outcomes,
		vec![
			ExpiryOutcome::Resent(retained.clone()),
			ExpiryOutcome::Resent(retained.clone()),
			ExpiryOutcome::Resent(retained.clone()),
			ExpiryOutcome::Resent(retained),
			ExpiryOutcome::Exhausted,
		]
	);
	assert!(ue.find_bearer_any(Ebi(6)).is_none());
	assert!(ue.find_pdn(Cid(1)).is_some());
}

/// S3 — detach with two PDNs: each PDN_DISCONNECT_RES tears down one PDN;
/// once the last one clears, the detach procedure's success continuation
/// fires exactly once.
#[tokio::test]
async fn s3_detach_with_two_pdns_fires_once_all_clear() {
	let mut ue = ue_with_pdn(1, 5);
	let mut second = PdnContext::new(
		Cid(2),
		non_empty_string::NonEmptyString::new("ims".to_owned()).unwrap(),
		PdnType::Ipv4,
		Ebi(6),
	);
	second.insert_bearer(BearerContext::new(Ebi(6), Qci(9), qos(), FteIdSet::default(), true));
	ue.pdns.insert(Cid(2), second);

	let fired = Arc::new(AtomicBool::new(false));
	let fired_clone = fired.clone();
	ue.procedures.install_detach(mme_core::procedure::kinds::DetachProcedure {
		switch_off: false,
		on_success: Box::new(move |_ue| fired_clone.store(true, Ordering::SeqCst)),
	});

	let codec = FakeCodec;
	let config = CoreConfig::default();
	emm_cn_send(
		&mut ue,
		EmmCnPrimitive::PdnDisconnectRes {
			ue_id: ue.ue_id,
			cid: Cid(1),
		},
		&codec,
		&config,
		noop_rearm,
	)
	.await
	.unwrap();
	assert!(!fired.load(Ordering::SeqCst));
	assert_eq!(ue.n_pdns(), 1);

	let messages = emm_cn_send(
		&mut ue,
		EmmCnPrimitive::PdnDisconnectRes {
			ue_id: ue.ue_id,
			cid: Cid(2),
		},
		&codec,
		&config,
		noop_rearm,
	)
	.await
	.unwrap();
	assert!(fired.load(Ordering::SeqCst));
	assert_eq!(ue.n_pdns(), 0);
	assert!(messages.iter().any(|m| m.as_dl_data_req().is_some()));
}

/// S4 — PDN_CONFIG_FAIL during attach: the attach procedure's failure
/// continuation runs with EMM cause ESM_FAILURE.
#[tokio::test]
async fn s4_pdn_config_fail_during_attach_rejects_with_esm_failure() {
	let mut ue = EmmContext::new(MmeUeS1apId(1));
	let observed = Arc::new(std::sync::Mutex::new(None));
	let observed_clone = observed.clone();
	ue.procedures.install_attach(AttachProcedure {
		pti: mme_core::types::Pti(1),
		on_success: Box::new(|_| {}),
		on_failure: Box::new(move |_ue, cause, _reject: EncodedEsmPayload| {
			*observed_clone.lock().unwrap() = Some(cause);
		}),
	});

	let codec = FakeCodec;
	let config = CoreConfig::default();
	emm_cn_send(
		&mut ue,
		EmmCnPrimitive::PdnConfigFail { ue_id: ue.ue_id },
		&codec,
		&config,
		noop_rearm,
	)
	.await
	.unwrap();

	assert_eq!(*observed.lock().unwrap(), Some(EmmCause::EsmFailure));
	assert!(!ue.procedures.is_attach_running());
}

/// S5 — S10 context-request timeout (modeled as CONTEXT_FAIL arriving with
/// NETWORK_FAILURE): the failure continuation runs and the procedure is
/// deleted, never to fire again.
#[tokio::test]
async fn s5_context_request_failure_runs_once_and_deletes_procedure() {
	let mut ue = EmmContext::new(MmeUeS1apId(1));
	let calls = Arc::new(std::sync::atomic::AtomicU8::new(0));
	let calls_clone = calls.clone();
	ue.procedures.install_context_request(ContextRequestProcedure {
		on_success: Box::new(|_| {}),
		on_failure: Box::new(move |_ue, _cause| {
			calls_clone.fetch_add(1, Ordering::SeqCst);
		}),
		timer: mme_core::timer::RetryTimer::new(),
	});

	let codec = FakeCodec;
	let config = CoreConfig::default();
	emm_cn_send(
		&mut ue,
		EmmCnPrimitive::ContextFail {
			ue_id: ue.ue_id,
			cause: EmmCause::NetworkFailure,
		},
		&codec,
		&config,
		noop_rearm,
	)
	.await
	.unwrap();

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert!(!ue.procedures.is_context_request_running());

	// A second, spurious CONTEXT_FAIL after the procedure is gone must not
	// panic or invoke anything else (invariant I6).
	let err = emm_cn_send(
		&mut ue,
		EmmCnPrimitive::ContextFail {
			ue_id: ue.ue_id,
			cause: EmmCause::NetworkFailure,
		},
		&codec,
		&config,
		noop_rearm,
	)
	.await;
	assert!(err.is_ok());
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// CoreError::unresolved_dev_assert resolves to Fatal in debug builds
/// (spec.md §9's DevAssert(0) resolution; this crate is only ever tested
/// as a debug build).
#[test]
fn dev_assert_is_fatal_in_debug_builds() {
	let err = CoreError::unresolved_dev_assert(MmeUeS1apId(7), "unit-test-site");
	assert!(matches!(err, CoreError::Fatal("unit-test-site")));
}

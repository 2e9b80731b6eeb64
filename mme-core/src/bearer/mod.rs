//! C2 — EPS Bearer Resource machine operations (spec.md §4.2). These are
//! free functions over `&mut EmmContext` rather than methods on
//! `BearerContext` itself, because several of them (EBI allocation,
//! default-bearer release cascading into PDN teardown) need to see every
//! bearer/PDN under the UE, not just one.

pub mod ebr;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::bearer::ebr::{EbrState, TransitionOutcome};
use crate::timer::TimerToken;
use crate::context::bearer_context::{BearerContext, BearerQos, FteIdSet};
use crate::context::emm_context::EmmContext;
use crate::error::CoreError;
use crate::types::{Cid, EBI_MAX, EBI_MIN, Ebi, Pti, Qci};

/// Allocates an EBI within the 3GPP-reserved space not already bound to a
/// bearer under this UE. `preferred` is honored if free; otherwise the
/// first free value in range is returned.
pub fn assign(
	ue: &EmmContext,
	preferred: Option<Ebi>,
) -> Result<Ebi, CoreError> {
	let taken: rustc_hash::FxHashSet<Ebi> = ue
		.pdns
		.values()
		.flat_map(|pdn| pdn.bearers.keys().copied())
		.collect();

	if let Some(ebi) = preferred {
		if (EBI_MIN..=EBI_MAX).contains(&ebi.0) && !taken.contains(&ebi) {
			return Ok(ebi);
		}
	}

	(EBI_MIN..=EBI_MAX)
		.map(Ebi)
		.find(|ebi| !taken.contains(ebi))
		.ok_or(CoreError::ResourceExhaustion(
			"no free EBI in the 3GPP-reserved space for this UE",
		))
}

/// Constructs a bearer record and inserts it into the PDN's bearer set,
/// starting in `INACTIVE`.
#[allow(clippy::too_many_arguments)]
pub fn create(
	ue: &mut EmmContext,
	cid: Cid,
	ebi: Ebi,
	fteids: FteIdSet,
	is_default: bool,
	qos: BearerQos,
	qci: Qci,
	tft: Option<Bytes>,
	pco: Option<Bytes>,
) -> Result<Ebi, CoreError> {
	let pdn = ue
		.find_pdn_mut(cid)
		.ok_or(CoreError::Fatal("create: no PDN context for the given cid"))?;
	let mut bearer = BearerContext::new(ebi, qci, qos, fteids, is_default);
	bearer.tft = tft;
	bearer.pco = pco;
	pdn.insert_bearer(bearer);
	Ok(ebi)
}

/// Enforces legal EBR transitions; returns `AlreadyInTarget` (a non-fatal
/// warning, not an error) if the bearer was already there.
pub fn set_status(
	ue: &mut EmmContext,
	ebi: Ebi,
	target: EbrState,
) -> Result<TransitionOutcome, CoreError> {
	let (_, bearer) = ue
		.find_bearer_any_mut(ebi)
		.ok_or(CoreError::StaleCorrelation(ue.ue_id))?;
	Ok(bearer.ebr_state.set_status(target))
}

/// Registers a retransmission timer against a bearer's retained message.
/// Idempotent/no-op if the bearer is absent: messages arriving after an
/// E-RAB failure are silently dropped, per 24.301.
pub fn start_timer<F, Fut>(
	ue: &mut EmmContext,
	ebi: Ebi,
	retained_message: Bytes,
	duration: Duration,
	on_expiry: F,
) where
	F: FnOnce(TimerToken) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	if let Some((_, bearer)) = ue.find_bearer_any_mut(ebi) {
		bearer.retained_message = Some(retained_message);
		bearer.timer.start(duration, on_expiry);
	}
}

/// Cancels a bearer's retransmission timer and releases the retained
/// message. Idempotent on an absent bearer.
pub fn stop_timer(
	ue: &mut EmmContext,
	ebi: Ebi,
) {
	if let Some((_, bearer)) = ue.find_bearer_any_mut(ebi) {
		bearer.timer.stop();
		bearer.retained_message = None;
	}
}

/// Removes a bearer. If it was its PDN's default bearer, the whole PDN is
/// torn down too and the freed cid is returned.
pub fn release(
	ue: &mut EmmContext,
	ebi: Ebi,
	_ue_requested: bool,
) -> Result<Option<Cid>, CoreError> {
	let (cid, is_default) = {
		let (cid, bearer) = ue
			.find_bearer_any(ebi)
			.ok_or(CoreError::StaleCorrelation(ue.ue_id))?;
		(cid, bearer.is_default)
	};

	if is_default {
		ue.pdns.remove(&cid);
		Ok(Some(cid))
	} else {
		let pdn = ue
			.find_pdn_mut(cid)
			.ok_or(CoreError::Fatal("release: PDN vanished under a non-default bearer"))?;
		pdn.remove_bearer(ebi);
		Ok(None)
	}
}

/// Picks the PTI to stamp on a network-initiated transaction — `Pti(0)`,
/// per spec.md's `triggered_by_ue = (pti != UNASSIGNED)`.
pub fn network_initiated_pti() -> Pti {
	Pti(crate::types::PTI_UNASSIGNED)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::pdn_context::{PdnContext, PdnType};
	use crate::types::MmeUeS1apId;

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

	fn ue_with_default_bearer() -> EmmContext {
		let mut ue = EmmContext::new(MmeUeS1apId(1));
		let cid = Cid(1);
		let default_ebi = Ebi(5);
		let mut pdn = PdnContext::new(
			cid,
			non_empty_string::NonEmptyString::new("internet".to_owned()).unwrap(),
			PdnType::Ipv4,
			default_ebi,
		);
		pdn.insert_bearer(BearerContext::new(
			default_ebi,
			Qci(9),
			qos(),
			FteIdSet::default(),
			true,
		));
		ue.pdns.insert(cid, pdn);
		ue
	}

	#[test]
	fn assign_skips_taken_ebis() {
		let ue = ue_with_default_bearer();
		let ebi = assign(&ue, None).unwrap();
		assert_eq!(ebi, Ebi(6));
	}

	#[test]
	fn assign_honors_free_preference() {
		let ue = ue_with_default_bearer();
		let ebi = assign(&ue, Some(Ebi(10))).unwrap();
		assert_eq!(ebi, Ebi(10));
	}

	#[test]
	fn release_of_default_bearer_tears_down_pdn() {
		let mut ue = ue_with_default_bearer();
		let freed_cid = release(&mut ue, Ebi(5), false).unwrap();
		assert_eq!(freed_cid, Some(Cid(1)));
		assert!(ue.pdns.is_empty());
	}

	#[test]
	fn release_of_dedicated_bearer_keeps_pdn() {
		let mut ue = ue_with_default_bearer();
		create(
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
		let freed_cid = release(&mut ue, Ebi(6), false).unwrap();
		assert_eq!(freed_cid, None);
		assert!(ue.find_pdn(Cid(1)).is_some());
		assert!(ue.find_bearer_any(Ebi(6)).is_none());
	}
}

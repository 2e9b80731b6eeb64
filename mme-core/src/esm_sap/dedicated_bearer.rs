//! `esm_proc_dedicated_eps_bearer_context_request` (spec.md §4.4) and its
//! T3485 expiry handler. State lives directly on the `BearerContext`
//! (`retained_message`, `timer`, `t3485_retry_count`) rather than in the
//! procedure registry — T3485 is inherently per-bearer, unlike the
//! singleton procedures C3 tracks.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::bearer;
use crate::bearer::ebr::EbrState;
use crate::cause::EsmCause;
use crate::context::emm_context::EmmContext;
use crate::error::CoreError;
use crate::esm_sap::RecvResult;
use crate::timer::TimerToken;
use crate::types::{DEDICATED_EPS_BEARER_ACTIVATE_COUNTER_MAX, Ebi};

/// Starts the dedicated-bearer activation procedure for an already-created
/// `INACTIVE` bearer: starts T3485 against a *duplicate* of the encoded
/// request (the original is consumed by the EMM-SAP send path) and moves
/// the bearer to `ACTIVE_PENDING`, idempotently.
pub fn start<F, Fut>(
	ue: &mut EmmContext,
	ebi: Ebi,
	encoded_request: Bytes,
	duration: Duration,
	on_expiry: F,
) where
	F: FnOnce(TimerToken) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	bearer::start_timer(ue, ebi, encoded_request.clone(), duration, on_expiry);
	let _ = bearer::set_status(ue, ebi, EbrState::ActivePending);
}

/// ACTIVATE-DEDICATED-EPS-BEARER ACCEPT: stop T3485, move to `ACTIVE`, emit
/// the activation confirmation upstream.
pub fn on_activate_accept(
	ue: &mut EmmContext,
	ebi: Option<Ebi>,
) -> Result<RecvResult, CoreError> {
	let Some(ebi) = ebi else {
		return Ok(RecvResult::discard());
	};
	bearer::stop_timer(ue, ebi);
	if let Some((_, bearer)) = ue.find_bearer_any_mut(ebi) {
		bearer.t3485_retry_count = 0;
	}
	if bearer::set_status(ue, ebi, EbrState::Active).is_err() {
		return Ok(RecvResult::discard());
	}
	Ok(RecvResult::handled())
}

/// ACTIVATE-DEDICATED-EPS-BEARER REJECT: stop T3485, release the bearer.
pub fn on_activate_reject(
	ue: &mut EmmContext,
	ebi: Option<Ebi>,
	_cause: EsmCause,
) -> Result<RecvResult, CoreError> {
	let Some(ebi) = ebi else {
		return Ok(RecvResult::discard());
	};
	bearer::stop_timer(ue, ebi);
	let _ = bearer::release(ue, ebi, false);
	Ok(RecvResult::handled())
}

/// Outcome of a T3485 expiry, resolved by [`on_t3485_expiry`].
#[derive(Debug, PartialEq, Eq)]
pub enum ExpiryOutcome {
	/// Stale token: the timer was restarted or stopped since this closure
	/// was captured. No-op, per spec.md §5 "spurious expiries".
	Stale,
	/// Retransmitted the retained request and rearmed the timer; carries the
	/// retained bytes so the caller can build the downlink outbound message.
	Resent(Bytes),
	/// Hit the retry budget; the bearer was driven into deactivation.
	Exhausted,
}

/// Runs within the owning task, already holding the UE's context lock. On
/// a live token: if the retry budget has not been exhausted, resends the
/// retained message and rearms the timer via `rearm`; on the final expiry,
/// deactivates the bearer and releases the retained message.
pub fn on_t3485_expiry<F, Fut>(
	ue: &mut EmmContext,
	ebi: Ebi,
	expired_token: TimerToken,
	duration: Duration,
	rearm: F,
) -> ExpiryOutcome
where
	F: FnOnce(TimerToken) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let Some((_, bearer)) = ue.find_bearer_any_mut(ebi) else {
		return ExpiryOutcome::Stale;
	};
	if bearer.timer.current_token() != expired_token {
		return ExpiryOutcome::Stale;
	}

	bearer.t3485_retry_count += 1;
	if bearer.t3485_retry_count < DEDICATED_EPS_BEARER_ACTIVATE_COUNTER_MAX {
		let Some(retained) = bearer.retained_message.clone() else {
			bearer.timer.stop();
			return ExpiryOutcome::Stale;
		};
		bearer.timer.start(duration, rearm);
		ExpiryOutcome::Resent(retained)
	} else {
		bearer.timer.stop();
		bearer.retained_message = None;
		let _ = bearer::release(ue, ebi, false);
		ExpiryOutcome::Exhausted
	}
}

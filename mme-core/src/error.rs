use thiserror::Error;

use crate::cause::{EsmCause, S11Cause};
use crate::types::{Ebi, MmeUeS1apId};

/// Top-level error policy, one variant per §7 error kind. Dispatch code maps
/// these onto the reply policy described there (surfaced reject, swallowed
/// warning, deactivation, or process abort) rather than propagating them
/// as-is to a caller.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("protocol error: {0}")]
	Protocol(#[from] ProtocolError),

	#[error("cause mapping error from S11 cause {0:?}")]
	CauseMapping(S11Cause),

	#[error("resource exhaustion: {0}")]
	ResourceExhaustion(&'static str),

	#[error("stale correlation: no context for ue {0}")]
	StaleCorrelation(MmeUeS1apId),

	#[error("timer expiry: retransmission budget exhausted for bearer {0}")]
	TimerExpiry(Ebi),

	#[error("fatal invariant violation: {0}")]
	Fatal(&'static str),
}

/// Decode-time and message-level protocol errors (spec.md §4.4 steps 1-2).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
	#[error("ESM PDU shorter than the minimum NAS header")]
	TooShort,
	#[error("message type not implemented")]
	MessageTypeNotImplemented,
	#[error("unexpected or out-of-sequence information element")]
	ConditionalIeError,
	#[error("malformed NAS ESM PDU")]
	Protocol,
	#[error("decoded message type did not match the expected procedure")]
	SemanticallyIncorrect,
}

impl CoreError {
	/// Development builds treat an unspecified `DevAssert(0)` site as fatal;
	/// production builds swallow it as a stale correlation, per spec.md §9's
	/// resolution of the `DevAssert(0)` open question.
	pub fn unresolved_dev_assert(
		ue_id: MmeUeS1apId,
		site: &'static str,
	) -> Self {
		if cfg!(debug_assertions) {
			Self::Fatal(site)
		} else {
			tracing::warn!(%ue_id, site, "unresolved DevAssert site hit in production, swallowing");
			Self::StaleCorrelation(ue_id)
		}
	}
}

pub fn esm_cause_for_error(err: &CoreError) -> Option<EsmCause> {
	match err {
		CoreError::Protocol(_) => Some(EsmCause::RequestRejectedByGw),
		CoreError::CauseMapping(cause) => Some(crate::cause::map_s11_cause_to_esm(*cause)),
		CoreError::ResourceExhaustion(_) => Some(EsmCause::InsufficientResources),
		CoreError::StaleCorrelation(_) | CoreError::TimerExpiry(_) | CoreError::Fatal(_) => None,
	}
}

//! Tagged procedure records (spec.md §3 "Procedure objects", §4.3). Each
//! kind is its own struct rather than one heterogeneous record: the
//! registry stores `Option<T>` per kind instead of dynamic casts, per
//! spec.md §9's "tagged-variant procedures" redesign note.

use bytes::Bytes;

use crate::cause::{EmmCause, EsmCause};
use crate::context::emm_context::EmmContext;
use crate::timer::RetryTimer;
use crate::types::{Ebi, Pti};

/// `on_success`/`on_failure` run synchronously because completion always
/// happens from inside an already-acquired `UeContextStore::with_mut`
/// closure (spec.md §5: no suspension points inside a handler).
pub type SuccessCont = Box<dyn FnOnce(&mut EmmContext) + Send>;
pub type FailureCont = Box<dyn FnOnce(&mut EmmContext, EmmCause) + Send>;

/// The payload an installed attach/TAU procedure's failure continuation
/// still needs once a PDN-config/connectivity failure resolves: the encoded
/// ESM PDU to nest inside the eventual Attach-Reject/TAU-Reject NAS message,
/// if one was built.
#[derive(Debug, Clone, Default)]
pub struct EncodedEsmPayload(pub Option<Bytes>);

/// Like [`FailureCont`], but carries the rejected ESM container alongside
/// the outer EMM cause — only attach/TAU failures embed a PDN-level reject,
/// so this doesn't widen `FailureCont` itself for the kinds that never do.
pub type EsmRejectCont = Box<dyn FnOnce(&mut EmmContext, EmmCause, EncodedEsmPayload) + Send>;

pub struct AuthInfoProcedure {
	pub on_success: SuccessCont,
	pub on_failure: FailureCont,
	pub timer: RetryTimer,
}

pub struct ContextRequestProcedure {
	pub on_success: SuccessCont,
	pub on_failure: FailureCont,
	pub timer: RetryTimer,
}

pub struct AttachProcedure {
	pub pti: Pti,
	pub on_success: SuccessCont,
	pub on_failure: EsmRejectCont,
}

pub struct TauProcedure {
	pub on_success: SuccessCont,
	pub on_failure: EsmRejectCont,
}

pub struct DetachProcedure {
	pub switch_off: bool,
	pub on_success: SuccessCont,
}

/// One outstanding ESM transaction (attach-embedded PDN connectivity,
/// standalone PDN connectivity, bearer resource modification, ...),
/// correlated by PTI rather than by a singleton slot since several may be
/// outstanding per UE.
pub struct EsmTransactionProcedure {
	pub pti: Pti,
	pub ebi: Option<Ebi>,
	pub on_success: SuccessCont,
	pub on_failure: Box<dyn FnOnce(&mut EmmContext, EsmCause) + Send>,
	pub timer: RetryTimer,
}

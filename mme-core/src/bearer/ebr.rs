//! C2 — EPS Bearer Resource state. A plain state/transition table rather
//! than a `statig` machine: EBR has five states and edge-triggered,
//! single-step transitions with no useful superstate grouping, unlike EMM's
//! registration flow (see `crate::context::emm_context`, which does use
//! `statig`). DESIGN.md records this choice.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EbrState {
	Inactive,
	ActivePending,
	ModifyPending,
	InactivePending,
	Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
	Transitioned,
	/// Non-fatal: the bearer was already in the requested state.
	AlreadyInTarget,
}

impl EbrState {
	/// Legal edges per spec.md §4.2. Any transition not explicitly listed
	/// (other than self-transitions, handled by the caller) is a logic
	/// error in the driving procedure, not a protocol event, so it is left
	/// to debug assertions rather than encoded as a runtime error: the SAP
	/// dispatchers only ever request edges that exist below.
	fn is_legal(
		from: EbrState,
		to: EbrState,
	) -> bool {
		use EbrState::*;
		matches!(
			(from, to),
			(Inactive, ActivePending)
				| (ActivePending, Active)
				| (ActivePending, Inactive)
				| (Active, ModifyPending)
				| (Active, InactivePending)
				| (ModifyPending, Active)
				| (ModifyPending, Inactive)
				| (InactivePending, Inactive)
		)
	}

	pub fn set_status(
		&mut self,
		target: EbrState,
	) -> TransitionOutcome {
		if *self == target {
			return TransitionOutcome::AlreadyInTarget;
		}
		debug_assert!(
			Self::is_legal(*self, target),
			"illegal EBR transition {:?} -> {:?}",
			*self,
			target
		);
		*self = target;
		TransitionOutcome::Transitioned
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn repeated_target_is_non_fatal_warning() {
		let mut state = EbrState::Active;
		assert_eq!(
			state.set_status(EbrState::Active),
			TransitionOutcome::AlreadyInTarget
		);
	}

	#[test]
	fn activate_then_accept_reaches_active() {
		let mut state = EbrState::Inactive;
		assert_eq!(
			state.set_status(EbrState::ActivePending),
			TransitionOutcome::Transitioned
		);
		assert_eq!(
			state.set_status(EbrState::Active),
			TransitionOutcome::Transitioned
		);
	}
}

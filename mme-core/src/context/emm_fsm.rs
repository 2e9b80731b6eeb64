//! EMM registration state machine, `statig`-based per the teacher's
//! `app/src/nas/gmm.rs` (`#[state_machine]`/`#[superstate]` over an
//! awaitable `StateMachine<T>`). Unlike the GMM machine there (which reacts
//! to decoded NAS messages directly), this one reacts to the abstract
//! [`EmmEvent`]s the SAP dispatchers raise once a primitive has already been
//! classified — the NAS message decode itself is the external codec's job.

use statig::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmmEvent {
	AttachRequested,
	AuthenticationSuccess,
	AuthenticationFailure,
	SecurityModeComplete,
	SecurityModeFailure,
	TrackingAreaUpdateRequested,
	DetachRequested { switch_off: bool },
	DetachAccepted,
	ImplicitDetach,
}

#[derive(Debug, Default)]
pub struct EmmFsm;

#[state_machine(
	initial = "State::deregistered()",
	state(derive(Debug, Clone, PartialEq, Eq)),
	superstate(derive(Debug, Clone, PartialEq, Eq))
)]
impl EmmFsm {
	/// Groups the two states in which the UE has an active NAS signalling
	/// connection, so an implicit detach (raised regardless of which of the
	/// two we're in) only needs to be handled once.
	#[superstate]
	async fn connected(
		&mut self,
		event: &EmmEvent,
	) -> Response<State> {
		match event {
			EmmEvent::ImplicitDetach => Transition(State::deregistered_initiated()),
			_ => Super,
		}
	}

	#[state(superstate = "connected")]
	async fn common_proc_initiated(
		&mut self,
		event: &EmmEvent,
	) -> Response<State> {
		match event {
			EmmEvent::SecurityModeComplete => Transition(State::registered()),
			EmmEvent::AuthenticationFailure | EmmEvent::SecurityModeFailure => {
				Transition(State::deregistered())
			}
			_ => Super,
		}
	}

	#[state(superstate = "connected")]
	async fn registered(
		&mut self,
		event: &EmmEvent,
	) -> Response<State> {
		match event {
			EmmEvent::DetachRequested { .. } => Transition(State::deregistered_initiated()),
			EmmEvent::TrackingAreaUpdateRequested => Transition(State::common_proc_initiated()),
			_ => Super,
		}
	}

	#[state]
	async fn deregistered_initiated(
		&mut self,
		event: &EmmEvent,
	) -> Response<State> {
		match event {
			EmmEvent::DetachAccepted => Transition(State::deregistered()),
			_ => Handled,
		}
	}

	#[state]
	async fn deregistered(
		&mut self,
		event: &EmmEvent,
	) -> Response<State> {
		match event {
			EmmEvent::AttachRequested => Transition(State::common_proc_initiated()),
			_ => Handled,
		}
	}
}

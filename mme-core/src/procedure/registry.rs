//! C3 — Procedure Registry (spec.md §4.3). At most one of each singleton
//! kind per UE; ESM transactions are a list, correlated by PTI, since
//! several can be outstanding (attach-embedded default bearer plus a
//! standalone dedicated-bearer request, for instance).

use crate::procedure::kinds::{
	AttachProcedure, AuthInfoProcedure, ContextRequestProcedure, DetachProcedure,
	EsmTransactionProcedure, TauProcedure,
};
use crate::types::Pti;

#[derive(Default)]
pub struct ProcedureRegistry {
	auth_info: Option<AuthInfoProcedure>,
	context_request: Option<ContextRequestProcedure>,
	attach: Option<AttachProcedure>,
	tau: Option<TauProcedure>,
	detach: Option<DetachProcedure>,
	esm_transactions: Vec<EsmTransactionProcedure>,
}

impl std::fmt::Debug for ProcedureRegistry {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("ProcedureRegistry")
			.field("auth_info_running", &self.auth_info.is_some())
			.field("context_request_running", &self.context_request.is_some())
			.field("attach_running", &self.attach.is_some())
			.field("tau_running", &self.tau.is_some())
			.field("detach_running", &self.detach.is_some())
			.field("n_esm_transactions", &self.esm_transactions.len())
			.finish()
	}
}

macro_rules! singleton_slot {
	($install:ident, $get:ident, $get_mut:ident, $delete:ident, $is_running:ident, $field:ident, $ty:ty) => {
		/// Installs a new procedure of this kind. A prior one, if any, is
		/// dropped without invoking either continuation — callers must not
		/// install over a still-pending procedure of the same kind.
		pub fn $install(
			&mut self,
			proc: $ty,
		) {
			self.$field = Some(proc);
		}

		pub fn $get(&self) -> Option<&$ty> {
			self.$field.as_ref()
		}

		pub fn $get_mut(&mut self) -> Option<&mut $ty> {
			self.$field.as_mut()
		}

		pub fn $is_running(&self) -> bool {
			self.$field.is_some()
		}

		pub fn $delete(&mut self) -> Option<$ty> {
			self.$field.take()
		}
	};
}

impl ProcedureRegistry {
	singleton_slot!(
		install_auth_info,
		get_auth_info,
		get_auth_info_mut,
		delete_auth_info,
		is_auth_info_running,
		auth_info,
		AuthInfoProcedure
	);
	singleton_slot!(
		install_context_request,
		get_context_request,
		get_context_request_mut,
		delete_context_request,
		is_context_request_running,
		context_request,
		ContextRequestProcedure
	);
	singleton_slot!(
		install_attach,
		get_attach,
		get_attach_mut,
		delete_attach,
		is_attach_running,
		attach,
		AttachProcedure
	);
	singleton_slot!(
		install_tau,
		get_tau,
		get_tau_mut,
		delete_tau,
		is_tau_running,
		tau,
		TauProcedure
	);
	singleton_slot!(
		install_detach,
		get_detach,
		get_detach_mut,
		delete_detach,
		is_detach_running,
		detach,
		DetachProcedure
	);

	/// `delete_auth_info`/`delete_context_request` hand the whole procedure
	/// struct back rather than stopping its timer here — the caller is
	/// already holding the UE context and stops it inline, same as
	/// [`Self::delete_esm_transaction`] does for the list-backed kind.
	pub fn install_esm_transaction(
		&mut self,
		proc: EsmTransactionProcedure,
	) {
		self.esm_transactions.push(proc);
	}

	pub fn get_esm_transaction(
		&self,
		pti: Pti,
	) -> Option<&EsmTransactionProcedure> {
		self.esm_transactions.iter().find(|p| p.pti == pti)
	}

	pub fn get_esm_transaction_mut(
		&mut self,
		pti: Pti,
	) -> Option<&mut EsmTransactionProcedure> {
		self.esm_transactions.iter_mut().find(|p| p.pti == pti)
	}

	pub fn is_esm_transaction_running(
		&self,
		pti: Pti,
	) -> bool {
		self.esm_transactions.iter().any(|p| p.pti == pti)
	}

	/// Removes and returns the transaction with this PTI, cancelling its
	/// timer first (invariant I6: callbacks fire at most once, so a
	/// cancelled timer can never race a resolution already under way).
	pub fn delete_esm_transaction(
		&mut self,
		pti: Pti,
	) -> Option<EsmTransactionProcedure> {
		let idx = self.esm_transactions.iter().position(|p| p.pti == pti)?;
		let mut proc = self.esm_transactions.remove(idx);
		proc.timer.stop();
		Some(proc)
	}
}

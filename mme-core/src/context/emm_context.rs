//! EMM data context (spec.md §3 "EMM data context (per UE)").

use std::collections::BTreeMap;

use counter::CounterU32;
use non_empty_string::NonEmptyString;
use statig::awaitable::StateMachine;

use crate::context::emm_fsm::{EmmEvent, EmmFsm};
use crate::context::esm_context::EsmContext;
use crate::context::pdn_context::PdnContext;
use crate::procedure::registry::ProcedureRegistry;
use crate::types::{Cid, MAX_EPS_AUTH_VECTORS, MmeUeS1apId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipheringAlgorithm {
	Eea0,
	Eea1,
	Eea2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAlgorithm {
	Eia0,
	Eia1,
	Eia2,
}

#[derive(Debug, Clone)]
pub struct AuthVector {
	pub rand: [u8; 16],
	pub xres: Vec<u8>,
	pub autn: [u8; 16],
	pub kasme: [u8; 32],
}

#[derive(Debug, Default)]
pub struct Identity {
	pub imsi: Option<NonEmptyString>,
	pub guti: Option<NonEmptyString>,
	pub old_guti: Option<NonEmptyString>,
}

#[derive(Debug, Default)]
pub struct SecurityContext {
	pub selected_eea: Option<CipheringAlgorithm>,
	pub selected_eia: Option<IntegrityAlgorithm>,
	/// Monotonic NAS COUNT sequence per direction (24.301 §4.4.3.1); both
	/// start at 1, matching `CounterU32`'s reset-on-new-security-context
	/// convention.
	pub nas_ul_count: CounterU32,
	pub nas_dl_count: CounterU32,
	pub kasme: Option<[u8; 32]>,
	/// Invariant I4: index is always within `[0, MAX_EPS_AUTH_VECTORS)`.
	pub auth_vectors: Vec<AuthVector>,
	pub current_vector_index: usize,
	pub ncc: u8,
	/// `None` iff NH has never been derived (invariant I4).
	pub nh: Option<[u8; 32]>,
}

impl SecurityContext {
	pub fn absorb_auth_vectors(
		&mut self,
		vectors: Vec<AuthVector>,
	) -> Result<(), crate::error::CoreError> {
		if vectors.len() > MAX_EPS_AUTH_VECTORS {
			return Err(crate::error::CoreError::ResourceExhaustion(
				"auth vector count exceeds MAX_EPS_AUTH_VECTORS",
			));
		}
		self.auth_vectors = vectors;
		self.current_vector_index = 0;
		Ok(())
	}

	pub fn current_vector(&self) -> Option<&AuthVector> {
		self.auth_vectors.get(self.current_vector_index)
	}
}

pub struct EmmContext {
	pub ue_id: MmeUeS1apId,
	pub identity: Identity,
	pub security: SecurityContext,
	pub fsm: StateMachine<EmmFsm>,
	pub esm: EsmContext,
	/// Ordered by cid so "first PDN in cid order" tie-breaks (spec.md §9)
	/// are a plain forward iteration.
	pub pdns: BTreeMap<Cid, PdnContext>,
	pub procedures: ProcedureRegistry,
}

impl std::fmt::Debug for EmmContext {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("EmmContext")
			.field("ue_id", &self.ue_id)
			.field("identity", &self.identity)
			.field("fsm_state", &self.fsm.state())
			.field("n_pdns", &self.n_pdns())
			.finish()
	}
}

impl EmmContext {
	pub fn new(ue_id: MmeUeS1apId) -> Self {
		Self {
			ue_id,
			identity: Identity::default(),
			security: SecurityContext::default(),
			fsm: EmmFsm.state_machine(),
			esm: EsmContext::default(),
			pdns: BTreeMap::new(),
			procedures: ProcedureRegistry::default(),
		}
	}

	/// Invariant I5: `n_pdns == |PDN contexts|`, derived rather than
	/// tracked separately so the invariant can't drift.
	pub fn n_pdns(&self) -> usize {
		self.pdns.len()
	}

	pub async fn apply_emm_event(
		&mut self,
		event: EmmEvent,
	) {
		self.fsm.handle(&event).await;
	}

	/// First PDN in cid order whose APN matches, or — when `apn` is `None`
	/// — the first PDN overall. This is the deterministic tie-break spec.md
	/// §9 asks be resolved rather than guessed (see DESIGN.md).
	pub fn find_pdn_by_apn_or_first(
		&self,
		apn: Option<&str>,
	) -> Option<&PdnContext> {
		match apn {
			Some(apn) => self.pdns.values().find(|pdn| pdn.apn.as_str() == apn),
			None => self.pdns.values().next(),
		}
	}

	pub fn find_pdn(
		&self,
		cid: Cid,
	) -> Option<&PdnContext> {
		self.pdns.get(&cid)
	}

	pub fn find_pdn_mut(
		&mut self,
		cid: Cid,
	) -> Option<&mut PdnContext> {
		self.pdns.get_mut(&cid)
	}

	/// Finds whichever PDN owns the given EBI, default or dedicated bearer
	/// alike (spec.md §4.1 `find_bearer_any`).
	pub fn find_bearer_any(
		&self,
		ebi: crate::types::Ebi,
	) -> Option<(Cid, &crate::context::bearer_context::BearerContext)> {
		self.pdns
			.iter()
			.find_map(|(cid, pdn)| pdn.bearers.get(&ebi).map(|bearer| (*cid, bearer)))
	}

	pub fn find_bearer_any_mut(
		&mut self,
		ebi: crate::types::Ebi,
	) -> Option<(Cid, &mut crate::context::bearer_context::BearerContext)> {
		self.pdns
			.iter_mut()
			.find_map(|(cid, pdn)| pdn.bearers.get_mut(&ebi).map(|bearer| (*cid, bearer)))
	}
}

//! C1 — UE Context Store. Adapted from the teacher's `ContextManager`
//! (`app/src/ngap/manager/context_manager.rs`): an `scc::HashMap` keyed by
//! the UE identifier, each entry wrapped in a [`ContextQueue`] so
//! concurrent operations against the same UE are serialized, and distinct
//! UEs never contend with each other. Policy (spec.md §4.1): no operation
//! ever acquires two UE locks at once, so there is no cross-UE deadlock by
//! construction — callers that need two UEs (none currently do) must not
//! nest `with_mut` calls.

use std::future::Future;
use std::hash::BuildHasherDefault;
use std::pin::Pin;
use std::sync::Arc;

use scc::hash_map::HashMap as SccHashMap;
use solana_nohash_hasher::NoHashHasher;

use crate::context::emm_context::EmmContext;
use crate::context::queue::ContextQueue;
use crate::error::CoreError;
use crate::types::MmeUeS1apId;

type UnitHasher = BuildHasherDefault<NoHashHasher<u32>>;

pub type BoxFuture<'a, O> = Pin<Box<dyn Future<Output = O> + Send + Sync + 'a>>;

pub struct UeContextStore {
	contexts: SccHashMap<u32, Arc<ContextQueue<EmmContext>>, UnitHasher>,
}

impl Default for UeContextStore {
	fn default() -> Self {
		Self::new()
	}
}

impl UeContextStore {
	pub fn new() -> Self {
		Self {
			contexts: SccHashMap::with_hasher(UnitHasher::default()),
		}
	}

	/// Creates a fresh EMM context for `ue_id`. Returns
	/// `CoreError::Fatal` if one already exists (invariant I1: exactly one
	/// EMM context per active UE-id).
	pub async fn create(
		&self,
		ue_id: MmeUeS1apId,
	) -> Result<(), CoreError> {
		let queue = Arc::new(ContextQueue::new(EmmContext::new(ue_id)));
		self.contexts
			.insert_async(ue_id.0, queue)
			.await
			.map_err(|_| CoreError::Fatal("EMM context already exists for this UE-id"))
	}

	pub async fn contains(
		&self,
		ue_id: MmeUeS1apId,
	) -> bool {
		self.contexts.contains_async(&ue_id.0).await
	}

	/// Destroys the EMM context for `ue_id`, e.g. on detach-accept,
	/// implicit detach, or context-transfer failure.
	pub async fn drop_context(
		&self,
		ue_id: MmeUeS1apId,
	) {
		self.contexts.remove_async(&ue_id.0).await;
	}

	/// Executes `f` with exclusive access to the context, serialized
	/// against every other operation queued for this UE. A missing
	/// context is `StaleCorrelation`: the caller must treat it as a no-op,
	/// per spec.md §4.1.
	pub async fn with_mut<F, O>(
		&self,
		ue_id: MmeUeS1apId,
		f: F,
	) -> Result<O, CoreError>
	where
		F: FnOnce(&mut EmmContext) -> BoxFuture<'static, O> + Send + Sync + 'static,
		O: Send + Sync + 'static,
	{
		let queue = self
			.contexts
			.read_async(&ue_id.0, |_, queue| queue.clone())
			.await
			.ok_or(CoreError::StaleCorrelation(ue_id))?;
		Ok(queue.schedule_and_wait(f).await)
	}
}

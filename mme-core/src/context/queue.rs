//! Per-UE serialized access, adapted from the teacher's
//! `ngap/src/context_queue.rs`. A context wrapped in a `ContextQueue` is
//! mutated only through [`ContextQueue::schedule_and_wait`], which holds a
//! write lock for the whole closure — this is the mechanism behind
//! `UeContextStore::with_mut`'s "no suspension points inside a handler"
//! guarantee (spec.md §5).

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock, oneshot};

pub(crate) struct ContextQueue<T> {
	inner: Arc<RwLock<T>>,
	queue: Arc<Mutex<VecDeque<Pin<Box<dyn Future<Output = ()> + Send + 'static>>>>>,
	processor_active: AtomicBool,
}

impl<T> ContextQueue<T> {
	pub fn new(context: T) -> Self {
		ContextQueue {
			inner: Arc::new(RwLock::new(context)),
			queue: Arc::new(Mutex::new(VecDeque::new())),
			processor_active: AtomicBool::new(false),
		}
	}

	/// Only used when a just-created queue failed to ever enter the store
	/// (see `UeContextStore::create`): at that point we hold the only
	/// reference, so unwrapping the `Arc`/`RwLock` back into `T` is safe.
	pub fn into_inner(self) -> T {
		Arc::try_unwrap(self.inner)
			.unwrap_or_else(|_| panic!("ContextQueue dropped with outstanding references"))
			.into_inner()
	}
}

impl<T> ContextQueue<T>
where
	T: Send + Sync + 'static,
{
	async fn push_future(
		self: Arc<Self>,
		future: Pin<Box<dyn Future<Output = ()> + Send + Sync + 'static>>,
	) {
		let mut queue = self.queue.lock().await;
		queue.push_back(future);

		if !self.processor_active.load(Ordering::SeqCst) {
			self.processor_active.store(true, Ordering::SeqCst);
			let self_clone = self.clone();
			tokio::spawn(async move {
				self_clone.process_queue().await;
			});
		}
	}

	async fn process_queue(&self) {
		loop {
			let mut queue = self.queue.lock().await;
			if queue.is_empty() {
				self.processor_active.store(false, Ordering::SeqCst);
				break;
			}
			// Safety: the check for `queue.is_empty()` is performed above.
			let fut = queue.pop_front().unwrap();
			drop(queue);
			fut.await;
		}
	}

	async fn enqueue_and_get_result<F, O>(
		&self,
		closure: F,
		tx: oneshot::Sender<O>,
	) -> Pin<Box<dyn Future<Output = ()> + Send + Sync + 'static>>
	where
		F: FnOnce(&mut T) -> Pin<Box<dyn Future<Output = O> + Send + Sync + 'static>>
			+ Send
			+ Sync
			+ 'static,
		O: Send + Sync + 'static,
	{
		let context = self.inner.clone();
		Box::pin(async move {
			let mut context = context.write().await;
			let future = closure(&mut context);
			let output = future.await;
			// The receiver may have been dropped if the caller's future was
			// cancelled; that just means the result is no longer needed.
			let _ = tx.send(output);
		})
	}

	/// Runs `closure` with exclusive access to `T`, serialized against every
	/// other operation scheduled on this queue, and returns its result.
	pub async fn schedule_and_wait<F, O>(
		self: Arc<Self>,
		closure: F,
	) -> O
	where
		F: FnOnce(&mut T) -> Pin<Box<dyn Future<Output = O> + Send + Sync + 'static>>
			+ Send
			+ Sync
			+ 'static,
		O: Send + Sync + 'static,
	{
		let (tx, rx) = oneshot::channel::<O>();
		let future = self.enqueue_and_get_result(closure, tx).await;
		self.push_future(future).await;

		// Safety: `tx` is moved into the future pushed above, which the
		// processor task is guaranteed to eventually run to completion
		// (or the process is aborting anyway), so `tx.send` always happens
		// unless the closure panics.
		rx.await.unwrap()
	}
}

//! Retransmission timer plumbing shared by T3485 (dedicated bearer
//! activation) and the deactivate-request timer. Because primitive
//! handling is single-threaded-per-task cooperative dispatch (spec.md §5),
//! an expired timer cannot mutate a `UeContext` directly — it has to
//! re-enter the owning task's serialized queue, same as any other inbound
//! primitive. `RetryTimer` only owns the `tokio::time` scheduling and a
//! generation token; the actual re-entry closure is supplied by the caller.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Monotonically increasing token identifying one "arming" of the timer.
/// An expiry handler must check its captured token against
/// [`RetryTimer::current_token`] before acting: a stale token means the
/// timer was stopped (or restarted) before this expiry ran, so the
/// expiry is a no-op per spec.md §5 "spurious expiries".
pub type TimerToken = u64;

#[derive(Debug, Default)]
pub struct RetryTimer {
	token: Arc<AtomicU64>,
	handle: Option<JoinHandle<()>>,
}

impl RetryTimer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_running(&self) -> bool {
		self.handle.is_some()
	}

	pub fn current_token(&self) -> TimerToken {
		self.token.load(Ordering::SeqCst)
	}

	/// Arms the timer, cancelling any previous arming first. `on_expiry` is
	/// spawned as a detached task and receives the token this arming was
	/// assigned; it must re-enter the owning `UeContextStore` itself.
	pub fn start<F, Fut>(
		&mut self,
		duration: Duration,
		on_expiry: F,
	) where
		F: FnOnce(TimerToken) -> Fut + Send + 'static,
		Fut: Future<Output = ()> + Send + 'static,
	{
		self.stop();
		let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
		self.handle = Some(tokio::spawn(async move {
			tokio::time::sleep(duration).await;
			on_expiry(token).await;
		}));
	}

	/// Cancels the timer. Idempotent: calling it on an absent/already
	/// stopped timer is a no-op, matching spec.md §4.2's
	/// "idempotent on absent bearer" requirement.
	pub fn stop(&mut self) {
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
		self.token.fetch_add(1, Ordering::SeqCst);
	}
}

impl Drop for RetryTimer {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;

	use super::*;

	#[tokio::test(start_paused = true)]
	async fn stale_token_after_restart_is_detectable() {
		let mut timer = RetryTimer::new();
		let fired = Arc::new(AtomicBool::new(false));
		let fired_clone = fired.clone();
		timer.start(Duration::from_millis(100), move |_token| async move {
			fired_clone.store(true, Ordering::SeqCst);
		});
		let first_token = timer.current_token();
		// Restarting before expiry bumps the token; the first closure, if it
		// still ran, would observe a stale token.
		timer.start(Duration::from_millis(100), |_| async {});
		assert_ne!(first_token, timer.current_token());
	}

	#[tokio::test]
	async fn stop_is_idempotent_on_unstarted_timer() {
		let mut timer = RetryTimer::new();
		timer.stop();
		timer.stop();
		assert!(!timer.is_running());
	}
}

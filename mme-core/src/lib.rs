pub mod bearer;
pub mod cause;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod emm_cn_sap;
pub mod error;
pub mod esm_sap;
pub mod gateway;
pub mod procedure;
pub mod timer;
pub mod types;

pub use context::{EmmContext, UeContextStore};
pub use error::CoreError;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs the process-wide `tracing` subscriber. Call once at process
/// start; a second call is a no-op (the underlying `set_global_default`
/// error is swallowed, matching the usual "someone already initialized
/// logging" situation in an embedding binary's test harness).
pub fn init_tracing(config: &LoggingConfig) {
	if !config.enable {
		return;
	}
	let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
	let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
	let _ = tracing::subscriber::set_global_default(subscriber);
}

//! Configuration loading & validation, following the teacher's
//! `OmniPathConfig`/`SerdeValidated` shape: `serde` for deserialization,
//! `serde_valid` for cross-field validation, `arc_swap` for hot-swappable
//! runtime access.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use smart_default::SmartDefault;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Validate, SmartDefault)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
	#[default(true)]
	pub enable: bool,
	#[validate(minimum = 1)]
	#[default(8_000)]
	pub expire_time_ms: u32,
	#[default(5)]
	pub max_retry_times: u8,
}

impl Timer {
	pub fn duration(&self) -> Duration {
		Duration::from_millis(self.expire_time_ms as u64)
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, SmartDefault)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
	#[default(true)]
	pub enable: bool,
	#[default("info".to_owned())]
	pub level: String,
	pub report_caller: bool,
}

/// Timer durations and retry budgets this core owns. Everything the spec's
/// §6 "configuration loading" treats as an external collaborator (SBI/NGAP
/// listener addresses, PLMN/TAI lists, NRF registration) lives outside this
/// crate; only the knobs the state machines themselves consult are here.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
	pub logger: LoggingConfig,

	/// T3485 — dedicated EPS bearer activation retransmission.
	pub t3485: Timer,
	/// S6a authentication-info request timeout.
	pub s6a_auth_info_timeout: Timer,
	/// S10 context-request (inter-MME TAU) timeout.
	pub s10_context_request_timeout: Timer,
	/// T3495-equivalent: EPS bearer deactivation request retransmission.
	pub bearer_deactivate_timer: Timer,

	#[validate(minimum = 1)]
	#[validate(maximum = 16)]
	pub max_pdns_per_ue: u8,
}

impl Default for CoreConfig {
	fn default() -> Self {
		Self {
			logger: LoggingConfig::default(),
			t3485: Timer::default(),
			s6a_auth_info_timeout: Timer {
				expire_time_ms: 6_000,
				max_retry_times: 3,
				..Timer::default()
			},
			s10_context_request_timeout: Timer {
				expire_time_ms: 6_000,
				max_retry_times: 3,
				..Timer::default()
			},
			bearer_deactivate_timer: Timer::default(),
			max_pdns_per_ue: 11,
		}
	}
}

pub struct SerdeValidated<T>(T);

impl<T: Validate> SerdeValidated<T> {
	pub fn new(value: T) -> Result<Self, serde_valid::validation::Errors> {
		value.validate()?;
		Ok(SerdeValidated(value))
	}

	pub fn inner(&self) -> &T {
		&self.0
	}

	pub fn into_inner(self) -> T {
		self.0
	}
}

/// Hot-swappable handle, mirroring the teacher's `AppContextInner`: readers
/// take a short-lived `Guard`, writers swap in a whole new `Arc`.
#[derive(Debug)]
pub struct CoreConfigHandle {
	inner: ArcSwap<CoreConfig>,
}

impl CoreConfigHandle {
	pub fn new(config: CoreConfig) -> Self {
		Self {
			inner: ArcSwap::new(Arc::new(config)),
		}
	}

	/// Retrieves short-lived access to the configuration. Avoid storing the
	/// returned reference.
	pub fn get(&self) -> Arc<CoreConfig> {
		self.inner.load_full()
	}

	pub fn replace(
		&self,
		config: CoreConfig,
	) {
		self.inner.store(Arc::new(config));
	}
}

impl Default for CoreConfigHandle {
	fn default() -> Self {
		Self::new(CoreConfig::default())
	}
}

pub fn load_from_yaml(yaml: &str) -> Result<SerdeValidated<CoreConfig>, ConfigLoadError> {
	let config: CoreConfig = serde_yaml::from_str(yaml)?;
	SerdeValidated::new(config).map_err(ConfigLoadError::Invalid)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
	#[error("invalid configuration YAML")]
	Parse(#[from] serde_yaml::Error),
	#[error("configuration failed validation")]
	Invalid(#[source] serde_valid::validation::Errors),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_validates() {
		let validated = SerdeValidated::new(CoreConfig::default());
		assert!(validated.is_ok());
	}

	#[test]
	fn zero_max_pdns_fails_validation() {
		let mut config = CoreConfig::default();
		config.max_pdns_per_ue = 0;
		assert!(SerdeValidated::new(config).is_err());
	}
}

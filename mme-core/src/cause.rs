//! Cause values exchanged across the SAPs. These mirror the subset of
//! 24.301 ESM/EMM cause codes and 29.274 S11 cause codes this core actually
//! produces or consumes; the full IE catalogs live in the (external) NAS
//! codec.

/// ESM cause values (24.301 §9.9.4.4), the subset the core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsmCause {
	Success,
	RequestRejectedByGw,
	ServiceOptionNotSupported,
	NetworkFailure,
	InsufficientResources,
	RegularDeactivation,
}

/// EMM cause values (24.301 §9.9.3.9), the subset the core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmmCause {
	EsmFailure,
	NetworkFailure,
	IllegalUe,
}

/// S11 cause values (29.274 §8.4) as reported by PDN_CONNECTIVITY_FAIL /
/// PDN_CONFIG_FAIL primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S11Cause {
	ContextNotFound,
	InvalidMessageFormat,
	ServiceNotSupported,
	SystemFailure,
	NoResourcesAvailable,
	AllDynamicAddressesOccupied,
	Other,
}

/// spec.md §4.5 cause-mapping table.
pub fn map_s11_cause_to_esm(cause: S11Cause) -> EsmCause {
	match cause {
		S11Cause::ContextNotFound | S11Cause::InvalidMessageFormat => {
			EsmCause::RequestRejectedByGw
		}
		S11Cause::ServiceNotSupported => EsmCause::ServiceOptionNotSupported,
		S11Cause::SystemFailure => EsmCause::NetworkFailure,
		S11Cause::NoResourcesAvailable | S11Cause::AllDynamicAddressesOccupied => {
			EsmCause::InsufficientResources
		}
		S11Cause::Other => EsmCause::RequestRejectedByGw,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_resource_causes_to_insufficient_resources() {
		assert_eq!(
			map_s11_cause_to_esm(S11Cause::NoResourcesAvailable),
			EsmCause::InsufficientResources
		);
		assert_eq!(
			map_s11_cause_to_esm(S11Cause::AllDynamicAddressesOccupied),
			EsmCause::InsufficientResources
		);
	}

	#[test]
	fn unrecognized_and_format_causes_fall_back_to_reject_by_gw() {
		assert_eq!(
			map_s11_cause_to_esm(S11Cause::ContextNotFound),
			EsmCause::RequestRejectedByGw
		);
		assert_eq!(
			map_s11_cause_to_esm(S11Cause::Other),
			EsmCause::RequestRejectedByGw
		);
	}
}

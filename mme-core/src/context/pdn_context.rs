//! PDN context (spec.md §3 "PDN context (per UE, keyed by cid; ordered
//! set)").

use std::collections::BTreeMap;

use bytes::Bytes;
use derive_new::new;
use non_empty_string::NonEmptyString;

use crate::context::bearer_context::BearerContext;
use crate::types::{Cid, Ebi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdnType {
	Ipv4,
	Ipv6,
	Ipv4v6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdnAddress {
	V4(std::net::Ipv4Addr),
	V6(std::net::Ipv6Addr),
	V4v6(std::net::Ipv4Addr, std::net::Ipv6Addr),
}

#[derive(new)]
pub struct PdnContext {
	pub cid: Cid,
	pub apn: NonEmptyString,
	pub pdn_type: PdnType,
	#[new(default)]
	pub paa: Option<PdnAddress>,
	#[new(default)]
	pub pco: Option<Bytes>,
	pub default_ebi: Ebi,
	/// `BTreeMap` keyed by EBI so "first PDN in cid order" / "first bearer in
	/// EBI order" tie-breaks (spec.md §9 open question resolution, see
	/// DESIGN.md) are a plain ordered iteration, not a separate sort step.
	#[new(value = "BTreeMap::new()")]
	pub bearers: BTreeMap<Ebi, BearerContext>,
}

impl std::fmt::Debug for PdnContext {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("PdnContext")
			.field("cid", &self.cid)
			.field("apn", &self.apn.as_str())
			.field("pdn_type", &self.pdn_type)
			.field("default_ebi", &self.default_ebi)
			.field("bearer_count", &self.bearers.len())
			.finish()
	}
}

impl PdnContext {
	/// Invariant I2: the PDN's default EBI always names an existing bearer
	/// in its bearer set while the PDN exists.
	pub fn upholds_default_bearer_invariant(&self) -> bool {
		self.bearers.contains_key(&self.default_ebi)
	}

	pub fn insert_bearer(
		&mut self,
		bearer: BearerContext,
	) {
		self.bearers.insert(bearer.ebi, bearer);
	}

	pub fn remove_bearer(
		&mut self,
		ebi: Ebi,
	) -> Option<BearerContext> {
		self.bearers.remove(&ebi)
	}

	pub fn is_default_bearer(
		&self,
		ebi: Ebi,
	) -> bool {
		self.default_ebi == ebi
	}
}

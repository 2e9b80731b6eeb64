//! Trait seams for the external collaborators spec.md §1/§6 places out of
//! scope: the NAS ESM codec, the S1AP/S11/S6a/S10 transport, and key
//! derivation. The core depends only on these traits; a concrete NAS stack
//! is wired in by the binary that embeds this crate.

use bytes::Bytes;

use crate::error::ProtocolError;
use crate::gateway::OutboundMessage;
use crate::types::MmeUeS1apId;

/// Outcome of decoding an inbound ESM NAS PDU (spec.md §4.4 step 1).
#[derive(Debug, Clone)]
pub enum DecodedEsmMessage {
	Ok(EsmDecoded),
	TooShort,
	WrongType,
	UnexpectedIe,
	Protocol,
}

/// Just enough of a decoded ESM message for the dispatcher to act on;
/// the concrete field catalog (QoS IEs, PCO, TFT bytes, ...) is owned by the
/// external codec and handed through as opaque payload plus the handful of
/// fields the core's state machines branch on.
#[derive(Debug, Clone)]
pub struct EsmDecoded {
	pub message_type: crate::esm_sap::messages::InboundEsmMessageType,
	pub pti: crate::types::Pti,
	pub ebi: Option<crate::types::Ebi>,
	pub cause: Option<crate::cause::EsmCause>,
	pub payload: EsmPayload,
}

/// Fields the dispatcher needs out of specific inbound message kinds,
/// decoded by the external codec into a typed shape per message.
#[derive(Debug, Clone, Default)]
pub struct EsmPayload {
	pub apn: Option<String>,
	pub pdn_type: Option<crate::context::pdn_context::PdnType>,
	pub pco: Option<Bytes>,
	pub request_type: Option<crate::esm_sap::messages::RequestType>,
}

/// Decodes and encodes ESM NAS PDUs. Implemented outside this crate by the
/// concrete NAS codec; the core only ever sees the decoded shape above and
/// hands back opaque, bounded byte buffers to encode.
pub trait NasEsmCodec: Send + Sync {
	fn decode(
		&self,
		bytes: &[u8],
	) -> DecodedEsmMessage;

	/// Encodes an outbound message into a buffer bounded at
	/// [`crate::types::MAX_NAS_MESSAGE_LEN`]. Returns `ProtocolError::Protocol`
	/// if the encoded form would not fit.
	fn encode(
		&self,
		message: &crate::esm_sap::messages::OutboundEsmMessage,
	) -> Result<Bytes, ProtocolError>;
}

/// Sends an abstract outbound message to its S1AP/S11/S6a/S10 destination.
/// The core never touches a socket; it only ever calls through this trait.
pub trait OutboundTransport: Send + Sync {
	fn send(
		&self,
		ue_id: MmeUeS1apId,
		message: OutboundMessage,
	);
}

/// KeNB/NH derivation, delegated to the crypto collaborator per spec.md §4.6.
pub trait KeyDerivation: Send + Sync {
	fn derive_kenb(
		&self,
		kasme: &[u8; 32],
		nas_ul_count: u32,
	) -> [u8; 32];

	fn derive_nh(
		&self,
		kasme: &[u8; 32],
		sync_input: &[u8; 32],
	) -> [u8; 32];
}

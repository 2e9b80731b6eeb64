//! EMMCN-SAP primitive set (spec.md §4.5): the coupling interface from the
//! core-network side into EMM/ESM.

use bytes::Bytes;

use crate::cause::{EmmCause, S11Cause};
use crate::context::bearer_context::BearerQos;
use crate::context::emm_context::AuthVector;
use crate::context::pdn_context::{PdnAddress, PdnType};
use crate::esm_sap::messages::RequestType;
use crate::types::{Cid, Ebi, MmeUeS1apId, Pti, Qci};

#[derive(Debug)]
pub enum EmmCnPrimitive {
	AuthParamRes {
		ue_id: MmeUeS1apId,
		vectors: Vec<AuthVector>,
	},
	AuthParamFail {
		ue_id: MmeUeS1apId,
		cause: EmmCause,
	},
	ContextRes {
		ue_id: MmeUeS1apId,
	},
	ContextFail {
		ue_id: MmeUeS1apId,
		cause: EmmCause,
	},
	DeregisterUe {
		ue_id: MmeUeS1apId,
	},
	PdnConfigRes {
		ue_id: MmeUeS1apId,
		apn: Option<String>,
	},
	PdnConfigFail {
		ue_id: MmeUeS1apId,
	},
	PdnConnectivityRes {
		ue_id: MmeUeS1apId,
		cid: Cid,
		pdn_type: PdnType,
		pdn_address: Option<PdnAddress>,
		qos: BearerQos,
		qci: Qci,
	},
	PdnConnectivityFail {
		ue_id: MmeUeS1apId,
		cause: S11Cause,
	},
	PdnDisconnectRes {
		ue_id: MmeUeS1apId,
		cid: Cid,
	},
	ActivateDedicatedBearerReq {
		ue_id: MmeUeS1apId,
		cid: Cid,
		linked_ebi: Ebi,
		pti: Pti,
		qos: BearerQos,
		qci: Qci,
		tft: Option<Bytes>,
	},
	DeactivateDedicatedBearerReq {
		ue_id: MmeUeS1apId,
		ebi: Ebi,
		cause: crate::cause::EsmCause,
	},
	ImplicitDetach {
		ue_id: MmeUeS1apId,
	},
	SmcProcFail {
		ue_id: MmeUeS1apId,
		cause: EmmCause,
	},
}

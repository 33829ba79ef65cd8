//! TSBK LCO byte values and reason codes.
//!
//! Each constant is this crate's own stable assignment within the 6-bit
//! LCO field, grounded in the catalogue and the Motorola MFID remap table
//! described for the opcode handler; see `DESIGN.md` for the full
//! provenance notes and the Motorola-remap rationale.

use crate::consts::{MFID_MOTOROLA, MFID_STANDARD};

pub const IOSP_GRP_VCH: u8 = 0x00;
pub const OSP_GRP_VCH_GRANT_UPD: u8 = 0x02;
pub const IOSP_UU_VCH: u8 = 0x04;
pub const IOSP_UU_ANS: u8 = 0x05;
pub const OSP_UU_VCH_GRANT_UPD: u8 = 0x06;
pub const IOSP_TELE_INT_DIAL: u8 = 0x08;
pub const IOSP_TELE_INT_ANS: u8 = 0x09;
pub const OSP_SNDCP_CH_GNT: u8 = 0x14;
pub const IOSP_STS_UPDT: u8 = 0x18;
pub const OSP_SNDCP_CH_ANN: u8 = 0x1B;
pub const IOSP_MSG_UPDT: u8 = 0x1C;
pub const IOSP_CALL_ALRT: u8 = 0x1F;
pub const IOSP_ACK_RSP: u8 = 0x20;
pub const ISP_CAN_SRV_REQ: u8 = 0x21;
pub const ISP_EMERG_ALRM_REQ: u8 = 0x22;
pub const OSP_DENY_RSP: u8 = 0x23;
pub const IOSP_EXT_FNCT: u8 = 0x24;
pub const OSP_QUE_RSP: u8 = 0x25;
pub const IOSP_GRP_AFF: u8 = 0x28;
pub const ISP_GRP_AFF_Q_RSP: u8 = 0x29;
pub const OSP_GRP_AFF_Q: u8 = 0x2A;
pub const ISP_U_DEREG_REQ: u8 = 0x2B;
pub const IOSP_U_REG: u8 = 0x2C;
pub const OSP_U_REG_CMD: u8 = 0x2D;
pub const OSP_U_DEREG_ACK: u8 = 0x2E;
pub const IOSP_RAD_MON: u8 = 0x2F;
pub const ISP_LOC_REG_REQ: u8 = 0x30;
pub const OSP_LOC_REG_RSP: u8 = 0x31;
pub const OSP_SCCB_EXP: u8 = 0x32;
pub const OSP_RFSS_STS_BCAST: u8 = 0x33;
pub const OSP_NET_STS_BCAST: u8 = 0x34;
pub const OSP_ADJ_STS_BCAST: u8 = 0x35;
pub const OSP_SYNC_BCAST: u8 = 0x36;
pub const OSP_TIME_DATE_ANN: u8 = 0x37;
pub const OSP_IDEN_UP: u8 = 0x38;
pub const OSP_IDEN_UP_VU: u8 = 0x39;
pub const OSP_SYS_SRV_BCAST: u8 = 0x3A;
pub const ISP_SNDCP_CH_REQ: u8 = 0x3D;

/// Motorola (MFID 0x90) opcodes that reuse standard LCO slots.
pub const MOT_GRG_ADD: u8 = 0x00;
pub const MOT_GRG_DEL: u8 = 0x01;
pub const MOT_GRG_VCH_GRANT: u8 = 0x02;
pub const MOT_GRG_VCH_UPD: u8 = 0x03;
pub const MOT_CC_BSI: u8 = 0x0B;
pub const MOT_PSH_CCH: u8 = 0x0E;

/// Internal DVM-extension opcode (MFID 0xFE), never transmitted over RF;
/// used only for host-to-host call-termination signalling. Gated behind
/// `dvmExtensions` — see `DESIGN.md` "Open Question decisions".
pub const DVM_LC_CALL_TERM: u8 = 0x0F;

/// Re-map a Motorola-MFID (LCO, MFID) pair onto the standard opcode it
/// shares a field layout with. Returns `None` for Motorola opcodes with
/// no standard-MFID equivalent (e.g. `GRG_ADD`/`GRG_DEL`/`CC_BSI`/`PSH_CCH`,
/// which are genuinely Motorola-only).
pub fn normalize_mfid(mfid: u8, lco: u8) -> (u8, u8) {
    if mfid != MFID_MOTOROLA {
        return (mfid, lco);
    }

    match lco {
        MOT_GRG_VCH_GRANT => (MFID_STANDARD, OSP_GRP_VCH_GRANT_UPD),
        MOT_GRG_VCH_UPD => (MFID_STANDARD, OSP_GRP_VCH_GRANT_UPD),
        _ => (mfid, lco),
    }
}

/// DENY_RSP / ISP_ACK response reason codes (`P25_DENY_RSN_*`).
pub mod deny {
    pub const REQ_UNIT_NOT_VALID: u8 = 0x10;
    pub const REQ_UNIT_NOT_AUTH: u8 = 0x11;
    pub const TGT_UNIT_NOT_VALID: u8 = 0x20;
    pub const TGT_UNIT_NOT_AUTH: u8 = 0x21;
    pub const TGT_UNIT_REFUSED: u8 = 0x22;
    pub const TGT_GROUP_NOT_VALID: u8 = 0x30;
    pub const TGT_GROUP_NOT_AUTH: u8 = 0x31;
    pub const SITE_ACCESS_DENIAL: u8 = 0x40;
    pub const PTT_COLLIDE: u8 = 0x50;
    pub const PTT_BONK: u8 = 0x51;
    pub const SYS_UNSUPPORTED_SVC: u8 = 0x60;
    pub const NO_NET_RSRC_AVAIL: u8 = 0x61;
    pub const NO_RF_RSRC_AVAIL: u8 = 0x62;
    pub const SVC_IN_USE: u8 = 0x63;
}

/// QUE_RSP queue reason codes (`P25_QUE_RSN_*`).
pub mod queue {
    pub const REQ_ACTIVE_SERVICE: u8 = 0x10;
    pub const TGT_ACTIVE_SERVICE: u8 = 0x11;
    pub const TGT_UNIT_QUEUED: u8 = 0x12;
    pub const CHN_RESOURCE_NOT_AVAIL: u8 = 0x20;
}

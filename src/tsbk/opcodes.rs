//! Typed TSBK opcode payloads.
//!
//! Every opcode's 64-bit argument area (the block's 96 bits minus the
//! 8-bit LCO/flags byte, 8-bit MFID byte, and 16-bit CRC) is addressed by
//! the same `get_bits`/`set_bits` bit-range helpers used elsewhere, so a
//! variant's decode and encode read as mirror images of each other.

use crate::bitbuf::{get_bits, set_bits};

/// A 4-bit identifier / 12-bit channel-number pair, the unit every
/// channel-bearing opcode grants or announces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct Channel {
    pub id: u8,
    pub no: u16,
}

impl Channel {
    /// Decode a 16-bit {id:4, no:12} pair starting at bit `start` of `args`.
    pub(crate) fn decode(args: &[u8], start: usize) -> Channel {
        Channel {
            id: get_bits(args, start, 4) as u8,
            no: get_bits(args, start + 4, 12) as u16,
        }
    }

    /// Encode into a 16-bit {id:4, no:12} pair starting at bit `start` of `args`.
    pub(crate) fn encode(self, args: &mut [u8], start: usize) {
        set_bits(args, start, 4, self.id as u32);
        set_bits(args, start + 4, 12, self.no as u32);
    }
}

macro_rules! field_get {
    ($args:expr, $start:expr, $width:expr) => {
        get_bits($args, $start, $width)
    };
}

macro_rules! field_set {
    ($args:expr, $start:expr, $width:expr, $val:expr) => {
        set_bits($args, $start, $width, $val)
    };
}

/// Decoded TSBK opcode payload.
///
/// Opcodes central to grant, registration, and scheduling logic carry
/// typed fields; the remainder are modeled with their raw 8-byte argument
/// area, still fully round-trippable through `decode`/`encode`.
#[derive(Clone, Debug, PartialEq)]
pub enum Opcode {
    GrpVchGrant { svc_options: u8, channel: Channel, group_id: u16, source_id: u32 },
    GrpVchGrantUpd { channel_a: Channel, group_a: u16, channel_b: Channel, group_b: u16 },
    UuVch { svc_options: u8, channel: Channel, target_id: u32, source_id: u16 },
    UuAns { response: u8, target_id: u32, source_id: u32 },
    UuVchGrantUpd { channel: Channel, target_id: u32, source_id: u32 },
    TeleIntDial { args: [u8; 8] },
    TeleIntAns { args: [u8; 8] },
    SndcpChReq { data_service_options: u8, nsapi: u8, source_id: u32 },
    SndcpChGnt { channel: Channel, data_service_options: u8, source_id: u32 },
    SndcpChAnn { channel: Channel, nsapi: u8, autonomous: bool },
    StsUpdt { args: [u8; 8] },
    MsgUpdt { args: [u8; 8] },
    CallAlrt { target_id: u32, source_id: u32 },
    AckRsp { aiv: bool, ex: bool, service_type: u8, src_id: u32, dst_id: u32 },
    ExtFnct { args: [u8; 8] },
    DenyRsp { service_type: u8, reason: u8, target_id: u32, source_id: u32 },
    QueRsp { service_type: u8, reason: u8, target_id: u32, source_id: u32 },
    GrpAff { announce_group: u16, group_id: u16, source_id: u32 },
    GrpAffQ { target_id: u32 },
    GrpAffQRsp { args: [u8; 8] },
    UReg { source_id: u32, unit_id: u32 },
    URegCmd { target_id: u32 },
    UDeregReq { source_id: u32 },
    UDeregAck { source_id: u32 },
    LocRegReq { source_id: u32, group_id: u16 },
    LocRegRsp { response: u8, group_id: u16, source_id: u32 },
    RadMon { args: [u8; 8] },
    CanSrvReq { args: [u8; 8] },
    EmergAlrmReq { source_id: u32, group_id: u16 },
    SccbExp { rfss_id: u8, site_id: u8, channel: Channel },
    RfssStsBcast { lra: u8, sys_id: u16, rfss_id: u8, site_id: u8, channel: Channel, service_class: u8 },
    NetStsBcast { wacn: u32, sys_id: u16, channel: Channel, service_class: u8 },
    AdjStsBcast { sys_id: u16, rfss_id: u8, site_id: u8, channel: Channel, service_class: u8, cfva: u8 },
    SyncBcast { microslot: u16 },
    TimeDateAnn { year: u8, month: u8, day: u8, hour: u8, minute: u8 },
    IdenUp { channel_id: u8, bandwidth: u16, tx_offset: u16, base_freq: u32 },
    IdenUpVu { args: [u8; 8] },
    SysSrvBcast { services_available: u16 },
    MotGrgAdd { group_id: u16, source_id: u32 },
    MotGrgDel { group_id: u16 },
    MotCcBsi { args: [u8; 8] },
    MotPshCch { channel: Channel },
    /// DVM-extension call-termination notice (MFID 0xFE); never carried
    /// over the air, only between a host and its network peers.
    DvmLcCallTerm { channel: Channel, dst_id: u32, src_id: u32 },
}

/// Failure bit-set in an adjacent-site broadcast's CFVA field (Conventional
/// channel / Failure / Valid information / Active network connection).
pub const CFVA_FAILURE: u8 = 0b0010;

impl Opcode {
    /// Decode the 8-byte argument area for `lco` (already MFID-normalized)
    /// into a typed opcode. `None` for an LCO this catalogue does not know.
    pub fn decode(lco: u8, args: [u8; 8]) -> Option<Opcode> {
        use crate::tsbk::consts::*;

        Some(match lco {
            IOSP_GRP_VCH => Opcode::GrpVchGrant {
                svc_options: field_get!(&args, 0, 8) as u8,
                channel: Channel::decode(&args, 8),
                group_id: field_get!(&args, 24, 16) as u16,
                source_id: field_get!(&args, 40, 24),
            },
            OSP_GRP_VCH_GRANT_UPD => Opcode::GrpVchGrantUpd {
                channel_a: Channel::decode(&args, 0),
                group_a: field_get!(&args, 16, 16) as u16,
                channel_b: Channel::decode(&args, 32),
                group_b: field_get!(&args, 48, 16) as u16,
            },
            IOSP_UU_VCH => Opcode::UuVch {
                svc_options: field_get!(&args, 0, 8) as u8,
                channel: Channel::decode(&args, 8),
                target_id: field_get!(&args, 24, 24),
                source_id: field_get!(&args, 48, 16) as u16,
            },
            IOSP_UU_ANS => Opcode::UuAns {
                response: field_get!(&args, 0, 8) as u8,
                target_id: field_get!(&args, 8, 24),
                source_id: field_get!(&args, 32, 24),
            },
            OSP_UU_VCH_GRANT_UPD => Opcode::UuVchGrantUpd {
                channel: Channel::decode(&args, 0),
                target_id: field_get!(&args, 16, 24),
                source_id: field_get!(&args, 40, 24),
            },
            IOSP_TELE_INT_DIAL => Opcode::TeleIntDial { args },
            IOSP_TELE_INT_ANS => Opcode::TeleIntAns { args },
            ISP_SNDCP_CH_REQ => Opcode::SndcpChReq {
                data_service_options: field_get!(&args, 0, 8) as u8,
                nsapi: field_get!(&args, 8, 8) as u8,
                source_id: field_get!(&args, 16, 24),
            },
            OSP_SNDCP_CH_GNT => Opcode::SndcpChGnt {
                channel: Channel::decode(&args, 0),
                data_service_options: field_get!(&args, 16, 8) as u8,
                source_id: field_get!(&args, 24, 24),
            },
            OSP_SNDCP_CH_ANN => Opcode::SndcpChAnn {
                channel: Channel::decode(&args, 0),
                nsapi: field_get!(&args, 17, 7) as u8,
                autonomous: field_get!(&args, 16, 1) != 0,
            },
            IOSP_STS_UPDT => Opcode::StsUpdt { args },
            IOSP_MSG_UPDT => Opcode::MsgUpdt { args },
            IOSP_CALL_ALRT => Opcode::CallAlrt {
                target_id: field_get!(&args, 0, 24),
                source_id: field_get!(&args, 24, 24),
            },
            IOSP_ACK_RSP => Opcode::AckRsp {
                aiv: field_get!(&args, 0, 1) != 0,
                ex: field_get!(&args, 1, 1) != 0,
                service_type: field_get!(&args, 8, 8) as u8,
                src_id: field_get!(&args, 16, 24),
                dst_id: field_get!(&args, 40, 24),
            },
            IOSP_EXT_FNCT => Opcode::ExtFnct { args },
            OSP_DENY_RSP => Opcode::DenyRsp {
                service_type: field_get!(&args, 0, 8) as u8,
                reason: field_get!(&args, 8, 8) as u8,
                target_id: field_get!(&args, 16, 24),
                source_id: field_get!(&args, 40, 24),
            },
            OSP_QUE_RSP => Opcode::QueRsp {
                service_type: field_get!(&args, 0, 8) as u8,
                reason: field_get!(&args, 8, 8) as u8,
                target_id: field_get!(&args, 16, 24),
                source_id: field_get!(&args, 40, 24),
            },
            IOSP_GRP_AFF => Opcode::GrpAff {
                announce_group: field_get!(&args, 0, 16) as u16,
                group_id: field_get!(&args, 16, 16) as u16,
                source_id: field_get!(&args, 32, 24),
            },
            OSP_GRP_AFF_Q => Opcode::GrpAffQ { target_id: field_get!(&args, 0, 24) },
            ISP_GRP_AFF_Q_RSP => Opcode::GrpAffQRsp { args },
            IOSP_U_REG => Opcode::UReg {
                source_id: field_get!(&args, 0, 24),
                unit_id: field_get!(&args, 24, 24),
            },
            OSP_U_REG_CMD => Opcode::URegCmd { target_id: field_get!(&args, 0, 24) },
            ISP_U_DEREG_REQ => Opcode::UDeregReq { source_id: field_get!(&args, 0, 24) },
            OSP_U_DEREG_ACK => Opcode::UDeregAck { source_id: field_get!(&args, 0, 24) },
            ISP_LOC_REG_REQ => Opcode::LocRegReq {
                source_id: field_get!(&args, 0, 24),
                group_id: field_get!(&args, 24, 16) as u16,
            },
            OSP_LOC_REG_RSP => Opcode::LocRegRsp {
                response: field_get!(&args, 0, 8) as u8,
                group_id: field_get!(&args, 8, 16) as u16,
                source_id: field_get!(&args, 24, 24),
            },
            IOSP_RAD_MON => Opcode::RadMon { args },
            ISP_CAN_SRV_REQ => Opcode::CanSrvReq { args },
            ISP_EMERG_ALRM_REQ => Opcode::EmergAlrmReq {
                source_id: field_get!(&args, 0, 24),
                group_id: field_get!(&args, 24, 16) as u16,
            },
            OSP_SCCB_EXP => Opcode::SccbExp {
                rfss_id: field_get!(&args, 0, 8) as u8,
                site_id: field_get!(&args, 8, 8) as u8,
                channel: Channel::decode(&args, 16),
            },
            OSP_RFSS_STS_BCAST => Opcode::RfssStsBcast {
                lra: field_get!(&args, 0, 8) as u8,
                sys_id: field_get!(&args, 8, 16) as u16,
                rfss_id: field_get!(&args, 24, 8) as u8,
                site_id: field_get!(&args, 32, 8) as u8,
                channel: Channel::decode(&args, 40),
                service_class: field_get!(&args, 56, 8) as u8,
            },
            OSP_NET_STS_BCAST => Opcode::NetStsBcast {
                wacn: field_get!(&args, 0, 24),
                sys_id: field_get!(&args, 24, 16) as u16,
                channel: Channel::decode(&args, 40),
                service_class: field_get!(&args, 56, 8) as u8,
            },
            OSP_ADJ_STS_BCAST => Opcode::AdjStsBcast {
                sys_id: field_get!(&args, 0, 16) as u16,
                rfss_id: field_get!(&args, 16, 8) as u8,
                site_id: field_get!(&args, 24, 8) as u8,
                channel: Channel::decode(&args, 32),
                service_class: field_get!(&args, 48, 8) as u8,
                cfva: field_get!(&args, 56, 8) as u8,
            },
            OSP_SYNC_BCAST => Opcode::SyncBcast { microslot: field_get!(&args, 0, 16) as u16 },
            OSP_TIME_DATE_ANN => Opcode::TimeDateAnn {
                year: field_get!(&args, 0, 8) as u8,
                month: field_get!(&args, 8, 8) as u8,
                day: field_get!(&args, 16, 8) as u8,
                hour: field_get!(&args, 24, 8) as u8,
                minute: field_get!(&args, 32, 8) as u8,
            },
            OSP_IDEN_UP => Opcode::IdenUp {
                channel_id: field_get!(&args, 0, 8) as u8,
                bandwidth: field_get!(&args, 8, 16) as u16,
                tx_offset: field_get!(&args, 24, 16) as u16,
                base_freq: field_get!(&args, 40, 24),
            },
            OSP_IDEN_UP_VU => Opcode::IdenUpVu { args },
            OSP_SYS_SRV_BCAST => Opcode::SysSrvBcast {
                services_available: field_get!(&args, 0, 16) as u16,
            },
            MOT_GRG_ADD => Opcode::MotGrgAdd {
                group_id: field_get!(&args, 0, 16) as u16,
                source_id: field_get!(&args, 16, 24),
            },
            MOT_GRG_DEL => Opcode::MotGrgDel { group_id: field_get!(&args, 0, 16) as u16 },
            MOT_CC_BSI => Opcode::MotCcBsi { args },
            MOT_PSH_CCH => Opcode::MotPshCch { channel: Channel::decode(&args, 0) },
            DVM_LC_CALL_TERM => Opcode::DvmLcCallTerm {
                channel: Channel::decode(&args, 0),
                dst_id: field_get!(&args, 16, 24),
                src_id: field_get!(&args, 40, 24),
            },
            _ => return None,
        })
    }

    /// Encode this opcode's fields back into its 8-byte argument area.
    pub fn encode(&self) -> [u8; 8] {
        let mut args = [0u8; 8];

        match *self {
            Opcode::GrpVchGrant { svc_options, channel, group_id, source_id } => {
                field_set!(&mut args, 0, 8, svc_options as u32);
                channel.encode(&mut args, 8);
                field_set!(&mut args, 24, 16, group_id as u32);
                field_set!(&mut args, 40, 24, source_id);
            }
            Opcode::GrpVchGrantUpd { channel_a, group_a, channel_b, group_b } => {
                channel_a.encode(&mut args, 0);
                field_set!(&mut args, 16, 16, group_a as u32);
                channel_b.encode(&mut args, 32);
                field_set!(&mut args, 48, 16, group_b as u32);
            }
            Opcode::UuVch { svc_options, channel, target_id, source_id } => {
                field_set!(&mut args, 0, 8, svc_options as u32);
                channel.encode(&mut args, 8);
                field_set!(&mut args, 24, 24, target_id);
                field_set!(&mut args, 48, 16, source_id as u32);
            }
            Opcode::UuAns { response, target_id, source_id } => {
                field_set!(&mut args, 0, 8, response as u32);
                field_set!(&mut args, 8, 24, target_id);
                field_set!(&mut args, 32, 24, source_id);
            }
            Opcode::UuVchGrantUpd { channel, target_id, source_id } => {
                channel.encode(&mut args, 0);
                field_set!(&mut args, 16, 24, target_id);
                field_set!(&mut args, 40, 24, source_id);
            }
            Opcode::TeleIntDial { args: a } | Opcode::TeleIntAns { args: a } => args = a,
            Opcode::SndcpChReq { data_service_options, nsapi, source_id } => {
                field_set!(&mut args, 0, 8, data_service_options as u32);
                field_set!(&mut args, 8, 8, nsapi as u32);
                field_set!(&mut args, 16, 24, source_id);
            }
            Opcode::SndcpChGnt { channel, data_service_options, source_id } => {
                channel.encode(&mut args, 0);
                field_set!(&mut args, 16, 8, data_service_options as u32);
                field_set!(&mut args, 24, 24, source_id);
            }
            Opcode::SndcpChAnn { channel, nsapi, autonomous } => {
                channel.encode(&mut args, 0);
                field_set!(&mut args, 16, 1, autonomous as u32);
                field_set!(&mut args, 17, 7, nsapi as u32);
            }
            Opcode::StsUpdt { args: a } | Opcode::MsgUpdt { args: a } => args = a,
            Opcode::CallAlrt { target_id, source_id } => {
                field_set!(&mut args, 0, 24, target_id);
                field_set!(&mut args, 24, 24, source_id);
            }
            Opcode::AckRsp { aiv, ex, service_type, src_id, dst_id } => {
                field_set!(&mut args, 0, 1, aiv as u32);
                field_set!(&mut args, 1, 1, ex as u32);
                field_set!(&mut args, 8, 8, service_type as u32);
                field_set!(&mut args, 16, 24, src_id);
                field_set!(&mut args, 40, 24, dst_id);
            }
            Opcode::ExtFnct { args: a } => args = a,
            Opcode::DenyRsp { service_type, reason, target_id, source_id } => {
                field_set!(&mut args, 0, 8, service_type as u32);
                field_set!(&mut args, 8, 8, reason as u32);
                field_set!(&mut args, 16, 24, target_id);
                field_set!(&mut args, 40, 24, source_id);
            }
            Opcode::QueRsp { service_type, reason, target_id, source_id } => {
                field_set!(&mut args, 0, 8, service_type as u32);
                field_set!(&mut args, 8, 8, reason as u32);
                field_set!(&mut args, 16, 24, target_id);
                field_set!(&mut args, 40, 24, source_id);
            }
            Opcode::GrpAff { announce_group, group_id, source_id } => {
                field_set!(&mut args, 0, 16, announce_group as u32);
                field_set!(&mut args, 16, 16, group_id as u32);
                field_set!(&mut args, 32, 24, source_id);
            }
            Opcode::GrpAffQ { target_id } => field_set!(&mut args, 0, 24, target_id),
            Opcode::GrpAffQRsp { args: a } => args = a,
            Opcode::UReg { source_id, unit_id } => {
                field_set!(&mut args, 0, 24, source_id);
                field_set!(&mut args, 24, 24, unit_id);
            }
            Opcode::URegCmd { target_id } => field_set!(&mut args, 0, 24, target_id),
            Opcode::UDeregReq { source_id } => field_set!(&mut args, 0, 24, source_id),
            Opcode::UDeregAck { source_id } => field_set!(&mut args, 0, 24, source_id),
            Opcode::LocRegReq { source_id, group_id } => {
                field_set!(&mut args, 0, 24, source_id);
                field_set!(&mut args, 24, 16, group_id as u32);
            }
            Opcode::LocRegRsp { response, group_id, source_id } => {
                field_set!(&mut args, 0, 8, response as u32);
                field_set!(&mut args, 8, 16, group_id as u32);
                field_set!(&mut args, 24, 24, source_id);
            }
            Opcode::RadMon { args: a } | Opcode::CanSrvReq { args: a } => args = a,
            Opcode::EmergAlrmReq { source_id, group_id } => {
                field_set!(&mut args, 0, 24, source_id);
                field_set!(&mut args, 24, 16, group_id as u32);
            }
            Opcode::SccbExp { rfss_id, site_id, channel } => {
                field_set!(&mut args, 0, 8, rfss_id as u32);
                field_set!(&mut args, 8, 8, site_id as u32);
                channel.encode(&mut args, 16);
            }
            Opcode::RfssStsBcast { lra, sys_id, rfss_id, site_id, channel, service_class } => {
                field_set!(&mut args, 0, 8, lra as u32);
                field_set!(&mut args, 8, 16, sys_id as u32);
                field_set!(&mut args, 24, 8, rfss_id as u32);
                field_set!(&mut args, 32, 8, site_id as u32);
                channel.encode(&mut args, 40);
                field_set!(&mut args, 56, 8, service_class as u32);
            }
            Opcode::NetStsBcast { wacn, sys_id, channel, service_class } => {
                field_set!(&mut args, 0, 24, wacn);
                field_set!(&mut args, 24, 16, sys_id as u32);
                channel.encode(&mut args, 40);
                field_set!(&mut args, 56, 8, service_class as u32);
            }
            Opcode::AdjStsBcast { sys_id, rfss_id, site_id, channel, service_class, cfva } => {
                field_set!(&mut args, 0, 16, sys_id as u32);
                field_set!(&mut args, 16, 8, rfss_id as u32);
                field_set!(&mut args, 24, 8, site_id as u32);
                channel.encode(&mut args, 32);
                field_set!(&mut args, 48, 8, service_class as u32);
                field_set!(&mut args, 56, 8, cfva as u32);
            }
            Opcode::SyncBcast { microslot } => field_set!(&mut args, 0, 16, microslot as u32),
            Opcode::TimeDateAnn { year, month, day, hour, minute } => {
                field_set!(&mut args, 0, 8, year as u32);
                field_set!(&mut args, 8, 8, month as u32);
                field_set!(&mut args, 16, 8, day as u32);
                field_set!(&mut args, 24, 8, hour as u32);
                field_set!(&mut args, 32, 8, minute as u32);
            }
            Opcode::IdenUp { channel_id, bandwidth, tx_offset, base_freq } => {
                field_set!(&mut args, 0, 8, channel_id as u32);
                field_set!(&mut args, 8, 16, bandwidth as u32);
                field_set!(&mut args, 24, 16, tx_offset as u32);
                field_set!(&mut args, 40, 24, base_freq);
            }
            Opcode::IdenUpVu { args: a } => args = a,
            Opcode::SysSrvBcast { services_available } => {
                field_set!(&mut args, 0, 16, services_available as u32)
            }
            Opcode::MotGrgAdd { group_id, source_id } => {
                field_set!(&mut args, 0, 16, group_id as u32);
                field_set!(&mut args, 16, 24, source_id);
            }
            Opcode::MotGrgDel { group_id } => field_set!(&mut args, 0, 16, group_id as u32),
            Opcode::MotCcBsi { args: a } => args = a,
            Opcode::MotPshCch { channel } => channel.encode(&mut args, 0),
            Opcode::DvmLcCallTerm { channel, dst_id, src_id } => {
                channel.encode(&mut args, 0);
                field_set!(&mut args, 16, 24, dst_id);
                field_set!(&mut args, 40, 24, src_id);
            }
        }

        args
    }

    /// The LCO this opcode encodes as, under the standard MFID.
    pub fn lco(&self) -> u8 {
        use crate::tsbk::consts::*;

        match self {
            Opcode::GrpVchGrant { .. } => IOSP_GRP_VCH,
            Opcode::GrpVchGrantUpd { .. } => OSP_GRP_VCH_GRANT_UPD,
            Opcode::UuVch { .. } => IOSP_UU_VCH,
            Opcode::UuAns { .. } => IOSP_UU_ANS,
            Opcode::UuVchGrantUpd { .. } => OSP_UU_VCH_GRANT_UPD,
            Opcode::TeleIntDial { .. } => IOSP_TELE_INT_DIAL,
            Opcode::TeleIntAns { .. } => IOSP_TELE_INT_ANS,
            Opcode::SndcpChReq { .. } => ISP_SNDCP_CH_REQ,
            Opcode::SndcpChGnt { .. } => OSP_SNDCP_CH_GNT,
            Opcode::SndcpChAnn { .. } => OSP_SNDCP_CH_ANN,
            Opcode::StsUpdt { .. } => IOSP_STS_UPDT,
            Opcode::MsgUpdt { .. } => IOSP_MSG_UPDT,
            Opcode::CallAlrt { .. } => IOSP_CALL_ALRT,
            Opcode::AckRsp { .. } => IOSP_ACK_RSP,
            Opcode::ExtFnct { .. } => IOSP_EXT_FNCT,
            Opcode::DenyRsp { .. } => OSP_DENY_RSP,
            Opcode::QueRsp { .. } => OSP_QUE_RSP,
            Opcode::GrpAff { .. } => IOSP_GRP_AFF,
            Opcode::GrpAffQ { .. } => OSP_GRP_AFF_Q,
            Opcode::GrpAffQRsp { .. } => ISP_GRP_AFF_Q_RSP,
            Opcode::UReg { .. } => IOSP_U_REG,
            Opcode::URegCmd { .. } => OSP_U_REG_CMD,
            Opcode::UDeregReq { .. } => ISP_U_DEREG_REQ,
            Opcode::UDeregAck { .. } => OSP_U_DEREG_ACK,
            Opcode::LocRegReq { .. } => ISP_LOC_REG_REQ,
            Opcode::LocRegRsp { .. } => OSP_LOC_REG_RSP,
            Opcode::RadMon { .. } => IOSP_RAD_MON,
            Opcode::CanSrvReq { .. } => ISP_CAN_SRV_REQ,
            Opcode::EmergAlrmReq { .. } => ISP_EMERG_ALRM_REQ,
            Opcode::SccbExp { .. } => OSP_SCCB_EXP,
            Opcode::RfssStsBcast { .. } => OSP_RFSS_STS_BCAST,
            Opcode::NetStsBcast { .. } => OSP_NET_STS_BCAST,
            Opcode::AdjStsBcast { .. } => OSP_ADJ_STS_BCAST,
            Opcode::SyncBcast { .. } => OSP_SYNC_BCAST,
            Opcode::TimeDateAnn { .. } => OSP_TIME_DATE_ANN,
            Opcode::IdenUp { .. } => OSP_IDEN_UP,
            Opcode::IdenUpVu { .. } => OSP_IDEN_UP_VU,
            Opcode::SysSrvBcast { .. } => OSP_SYS_SRV_BCAST,
            Opcode::MotGrgAdd { .. } => MOT_GRG_ADD,
            Opcode::MotGrgDel { .. } => MOT_GRG_DEL,
            Opcode::MotCcBsi { .. } => MOT_CC_BSI,
            Opcode::MotPshCch { .. } => MOT_PSH_CCH,
            Opcode::DvmLcCallTerm { .. } => DVM_LC_CALL_TERM,
        }
    }

    /// Whether this opcode is only meaningful under the Motorola MFID.
    pub fn is_motorola(&self) -> bool {
        matches!(self,
            Opcode::MotGrgAdd { .. } | Opcode::MotGrgDel { .. } |
            Opcode::MotCcBsi { .. } | Opcode::MotPshCch { .. })
    }

    /// Whether this opcode is the internal DVM-extension MFID (0xFE),
    /// never transmitted over RF.
    pub fn is_dvm(&self) -> bool {
        matches!(self, Opcode::DvmLcCallTerm { .. })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_channel_round_trip() {
        let mut args = [0u8; 8];
        let ch = Channel { id: 7, no: 0xABC };
        ch.encode(&mut args, 0);
        assert_eq!(Channel::decode(&args, 0), ch);
    }

    #[test]
    fn test_grp_vch_grant_round_trip() {
        let op = Opcode::GrpVchGrant {
            svc_options: 0xE3,
            channel: Channel { id: 1, no: 0x101 },
            group_id: 5000,
            source_id: 1001,
        };
        let args = op.encode();
        let back = Opcode::decode(op.lco(), args).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_deny_rsp_round_trip() {
        let op = Opcode::DenyRsp {
            service_type: 0x00,
            reason: crate::tsbk::consts::deny::TGT_GROUP_NOT_VALID,
            target_id: 9999,
            source_id: 1001,
        };
        let args = op.encode();
        assert_eq!(Opcode::decode(op.lco(), args).unwrap(), op);
    }

    #[test]
    fn test_ack_rsp_round_trip() {
        let op = Opcode::AckRsp { aiv: false, ex: true, service_type: 0x20, src_id: 42, dst_id: 99 };
        let args = op.encode();
        assert_eq!(Opcode::decode(op.lco(), args).unwrap(), op);
    }

    #[test]
    fn test_unknown_lco_returns_none() {
        assert!(Opcode::decode(0x3F, [0u8; 8]).is_none());
    }
}

//! Trunking opcode handler: gates incoming TSBKs on policy, drives grant
//! decisions, and handles unit registration/affiliation/location-reg.

use crate::config::EngineConfig;
use crate::grant::{AffiliationState, GrantDenial, GrantOutcome};
use crate::lookups::{RadioIdTable, TalkgroupTable};
use crate::tsbk::consts::deny;
use crate::tsbk::opcodes::Opcode;
use crate::tsbk::Channel;

/// Whether a unit/site is currently carrying traffic that would collide
/// with a new grant. Provided by the caller, which tracks the network
/// hang window.
pub struct RfState {
    pub listening_or_data: bool,
    pub colliding_talkgroup: Option<u32>,
}

/// What the handler decided to do with an incoming opcode.
pub enum HandlerAction {
    /// Emit these opcodes as a single-block TSDU (the common reply path).
    Reply(Vec<Opcode>),
    /// Deny or queue back to the source, and (if `inhibit_illegal`) also
    /// send an inhibit to that source.
    DenyAndInhibit(Opcode, Opcode),
    /// Nothing to send.
    Drop,
}

fn deny_rsp(service_type: u8, reason: u8, target_id: u32, source_id: u32) -> Opcode {
    Opcode::DenyRsp { service_type, reason, target_id, source_id }
}

fn inhibit(source_id: u32) -> Opcode {
    Opcode::ExtFnct { args: [0x7F, 0, 0, 0, (source_id >> 16) as u8, (source_id >> 8) as u8, source_id as u8, 0] }
}

/// Notifies the voice channel assigned `channel` that it is permitted to
/// carry `dst_id`. The core only needs success/failure; resolving a
/// channel number to a REST address is the caller's job (see
/// `crate::rest::permit_tg` for the wire contract this wraps).
pub trait PermitNotifier {
    fn permit_tg(&self, channel: Channel, dst_id: u32) -> bool;
}

/// Used when this host is not `authoritative`/`supervisor`: no REST call
/// is made and every grant is assumed already permitted elsewhere.
pub struct NoopNotifier;

impl PermitNotifier for NoopNotifier {
    fn permit_tg(&self, _channel: Channel, _dst_id: u32) -> bool {
        true
    }
}

pub struct TrunkingHandler<'a> {
    pub config: &'a EngineConfig,
    pub radio_ids: &'a RadioIdTable,
    pub talkgroups: &'a TalkgroupTable,
}

impl<'a> TrunkingHandler<'a> {
    /// Run the `VALID_SRCID`/`VALID_DSTID`/registration/affiliation gates
    /// common to every service request. `dst_is_group` selects whether
    /// `dst_id` is checked against the talkgroup ACL (group calls) or
    /// treated as just another radio ID (unit-to-unit).
    fn check_policy(
        &self,
        aff: &AffiliationState,
        service_type: u8,
        src_id: u32,
        dst_id: u32,
        dst_is_group: bool,
    ) -> Option<Opcode> {
        if !self.radio_ids.is_valid(src_id) {
            return Some(deny_rsp(service_type, deny::REQ_UNIT_NOT_VALID, dst_id, src_id));
        }

        if dst_is_group {
            if !self.talkgroups.is_valid(dst_id) {
                return Some(deny_rsp(service_type, deny::TGT_GROUP_NOT_VALID, dst_id, src_id));
            }
        } else if !self.radio_ids.is_valid(dst_id) {
            return Some(deny_rsp(service_type, deny::TGT_UNIT_NOT_VALID, dst_id, src_id));
        }

        if self.config.verify_reg && !aff.is_registered(src_id) {
            return Some(deny_rsp(service_type, deny::REQ_UNIT_NOT_VALID, dst_id, src_id));
        }

        if self.config.verify_aff && dst_is_group && aff.affiliation(src_id) != Some(dst_id) {
            return Some(deny_rsp(service_type, deny::REQ_UNIT_NOT_VALID, dst_id, src_id));
        }

        None
    }

    fn policy_gated(
        &self,
        aff: &AffiliationState,
        service_type: u8,
        src_id: u32,
        dst_id: u32,
        dst_is_group: bool,
    ) -> Option<HandlerAction> {
        self.check_policy(aff, service_type, src_id, dst_id, dst_is_group).map(|deny| {
            if self.config.inhibit_illegal {
                HandlerAction::DenyAndInhibit(deny, inhibit(src_id))
            } else {
                HandlerAction::Reply(vec![deny])
            }
        })
    }

    /// Group or unit-to-unit voice-channel grant request.
    pub fn handle_grant_request(
        &self,
        aff: &mut AffiliationState,
        rf: &RfState,
        notifier: &dyn PermitNotifier,
        service_type: u8,
        svc_options: u8,
        src_id: u32,
        dst_id: u32,
        dst_is_group: bool,
    ) -> HandlerAction {
        if let Some(action) = self.policy_gated(aff, service_type, src_id, dst_id, dst_is_group) {
            return action;
        }

        if !rf.listening_or_data {
            return HandlerAction::Reply(vec![deny_rsp(service_type, deny::SYS_UNSUPPORTED_SVC, dst_id, src_id)]);
        }

        if rf.colliding_talkgroup.is_some() && rf.colliding_talkgroup != Some(dst_id) {
            return HandlerAction::Reply(vec![deny_rsp(service_type, deny::PTT_COLLIDE, dst_id, src_id)]);
        }

        let colliding = rf.colliding_talkgroup.is_some() && rf.colliding_talkgroup != Some(dst_id);
        match aff.request_grant(dst_id, colliding) {
            GrantOutcome::Granted(channel) => {
                if self.config.authoritative && self.config.supervisor && !notifier.permit_tg(channel, dst_id) {
                    aff.release_grant(dst_id);
                    return HandlerAction::Reply(vec![deny_rsp(service_type, deny::PTT_BONK, dst_id, src_id)]);
                }

                HandlerAction::Reply(vec![self.grant_opcode(dst_is_group, svc_options, channel, dst_id, src_id)])
            }
            GrantOutcome::Denied(GrantDenial::Collide) => {
                HandlerAction::Reply(vec![deny_rsp(service_type, deny::PTT_COLLIDE, dst_id, src_id)])
            }
            GrantOutcome::Denied(GrantDenial::ResourceNotAvailable) => HandlerAction::Reply(vec![
                Opcode::QueRsp { service_type, reason: crate::tsbk::consts::queue::CHN_RESOURCE_NOT_AVAIL, target_id: dst_id, source_id: src_id },
            ]),
        }
    }

    fn grant_opcode(&self, dst_is_group: bool, svc_options: u8, channel: Channel, dst_id: u32, src_id: u32) -> Opcode {
        if dst_is_group {
            Opcode::GrpVchGrant { svc_options, channel, group_id: dst_id as u16, source_id: src_id }
        } else {
            Opcode::UuVch { svc_options, channel, target_id: dst_id, source_id: src_id as u16 }
        }
    }

    pub fn handle_unit_reg(&self, aff: &mut AffiliationState, our_sys_id: u16, req_sys_id: u16, source_id: u32) -> HandlerAction {
        if req_sys_id != our_sys_id {
            return HandlerAction::Reply(vec![deny_rsp(0, deny::SITE_ACCESS_DENIAL, source_id, source_id)]);
        }

        if !self.radio_ids.is_valid(source_id) {
            let deny = deny_rsp(0, deny::REQ_UNIT_NOT_AUTH, source_id, source_id);
            return if self.config.inhibit_illegal {
                HandlerAction::DenyAndInhibit(deny, inhibit(source_id))
            } else {
                HandlerAction::Reply(vec![deny])
            };
        }

        aff.register_unit(source_id);
        HandlerAction::Reply(vec![Opcode::UReg { source_id, unit_id: source_id }])
    }

    pub fn handle_unit_dereg(&self, aff: &mut AffiliationState, source_id: u32) -> HandlerAction {
        if aff.deregister_unit(source_id) {
            HandlerAction::Reply(vec![Opcode::UDeregAck { source_id }])
        } else {
            HandlerAction::Drop
        }
    }

    pub fn handle_group_affiliation(&self, aff: &mut AffiliationState, source_id: u32, dst_group_id: u16) -> HandlerAction {
        if let Some(deny) = self.check_policy(aff, 0, source_id, dst_group_id as u32, true) {
            return HandlerAction::Reply(vec![deny]);
        }

        aff.affiliate(source_id, dst_group_id as u32);
        HandlerAction::Reply(vec![Opcode::GrpAff { announce_group: dst_group_id, group_id: dst_group_id, source_id }])
    }

    pub fn handle_location_reg(&self, aff: &mut AffiliationState, source_id: u32, group_id: u16) -> HandlerAction {
        if let Some(deny) = self.check_policy(aff, 0, source_id, group_id as u32, true) {
            return HandlerAction::Reply(vec![deny]);
        }

        HandlerAction::Reply(vec![Opcode::LocRegRsp { response: 0, group_id, source_id }])
    }

    /// Process an incoming `IOSP_ACK_RSP`, applying the vendor-compatibility
    /// srcId/dstId swap when `ack_rsp_swap_ids` is set and the opcode looks
    /// like it came from a unit that mixed the two up (`aiv=false` and
    /// `dst_id != 0`). See "Open Question decisions" in DESIGN.md.
    pub fn handle_ack_rsp(&self, opcode: &Opcode) -> Opcode {
        match *opcode {
            Opcode::AckRsp { aiv, ex, service_type, src_id, dst_id }
                if self.config.ack_rsp_swap_ids && !aiv && dst_id != 0 =>
            {
                Opcode::AckRsp { aiv, ex, service_type, src_id: dst_id, dst_id: src_id }
            }
            other => other,
        }
    }

    /// Build the DVM-extension call-termination notice for `channel`,
    /// only when `dvm_extensions` is enabled; this is a non-standard
    /// internal signal, never transmitted over RF. See "Open Question
    /// decisions" in DESIGN.md.
    pub fn call_term_opcode(&self, channel: Channel, dst_id: u32, src_id: u32) -> Option<Opcode> {
        if !self.config.dvm_extensions {
            return None;
        }
        Some(Opcode::DvmLcCallTerm { channel, dst_id, src_id })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn handler<'a>(cfg: &'a EngineConfig, radios: &'a RadioIdTable, tgs: &'a TalkgroupTable) -> TrunkingHandler<'a> {
        TrunkingHandler { config: cfg, radio_ids: radios, talkgroups: tgs }
    }

    #[test]
    fn test_grant_denied_for_unknown_source() {
        let cfg = EngineConfig::default();
        let radios = RadioIdTable::new();
        let tgs = TalkgroupTable::new();
        let h = handler(&cfg, &radios, &tgs);

        let mut aff = AffiliationState::new();
        let rf = RfState { listening_or_data: true, colliding_talkgroup: None };

        match h.handle_grant_request(&mut aff, &rf, &NoopNotifier, 0, 0, 999, 4001, true) {
            HandlerAction::Reply(opcodes) => {
                assert!(matches!(opcodes[0], Opcode::DenyRsp { reason, .. } if reason == deny::REQ_UNIT_NOT_VALID));
            }
            _ => panic!("expected a deny reply"),
        }
    }

    #[test]
    fn test_grant_succeeds_and_pops_channel() {
        let cfg = EngineConfig::default();
        let radios = RadioIdTable::load(vec![crate::lookups::RadioIdEntry { radio_id: 555, enabled: true, alias: None }]);
        let tgs = TalkgroupTable::load(vec![crate::lookups::TalkgroupEntry { talkgroup_id: 4001, enabled: true, affiliated_only: false }]);
        let h = handler(&cfg, &radios, &tgs);

        let mut aff = AffiliationState::new();
        aff.add_voice_channel(Channel { id: 1, no: 100 });
        let rf = RfState { listening_or_data: true, colliding_talkgroup: None };

        match h.handle_grant_request(&mut aff, &rf, &NoopNotifier, 0, 0xE0, 555, 4001, true) {
            HandlerAction::Reply(opcodes) => {
                assert!(matches!(opcodes[0], Opcode::GrpVchGrant { group_id: 4001, source_id: 555, .. }));
            }
            _ => panic!("expected a grant reply"),
        }
    }

    struct FailingNotifier;
    impl PermitNotifier for FailingNotifier {
        fn permit_tg(&self, _channel: Channel, _dst_id: u32) -> bool {
            false
        }
    }

    #[test]
    fn test_grant_released_and_bonked_on_permit_failure() {
        let cfg = EngineConfig::default();
        let radios = RadioIdTable::load(vec![crate::lookups::RadioIdEntry { radio_id: 555, enabled: true, alias: None }]);
        let tgs = TalkgroupTable::load(vec![crate::lookups::TalkgroupEntry { talkgroup_id: 4001, enabled: true, affiliated_only: false }]);
        let h = handler(&cfg, &radios, &tgs);

        let mut aff = AffiliationState::new();
        aff.add_voice_channel(Channel { id: 1, no: 100 });
        let rf = RfState { listening_or_data: true, colliding_talkgroup: None };

        match h.handle_grant_request(&mut aff, &rf, &FailingNotifier, 0, 0xE0, 555, 4001, true) {
            HandlerAction::Reply(opcodes) => {
                assert!(matches!(opcodes[0], Opcode::DenyRsp { reason, .. } if reason == deny::PTT_BONK));
            }
            _ => panic!("expected a PTT_BONK deny reply"),
        }
        assert_eq!(aff.free_channel_count(), 1);
    }

    #[test]
    fn test_grant_skips_notifier_when_not_authoritative() {
        let mut cfg = EngineConfig::default();
        cfg.authoritative = false;
        let radios = RadioIdTable::load(vec![crate::lookups::RadioIdEntry { radio_id: 555, enabled: true, alias: None }]);
        let tgs = TalkgroupTable::load(vec![crate::lookups::TalkgroupEntry { talkgroup_id: 4001, enabled: true, affiliated_only: false }]);
        let h = handler(&cfg, &radios, &tgs);

        let mut aff = AffiliationState::new();
        aff.add_voice_channel(Channel { id: 1, no: 100 });
        let rf = RfState { listening_or_data: true, colliding_talkgroup: None };

        match h.handle_grant_request(&mut aff, &rf, &FailingNotifier, 0, 0xE0, 555, 4001, true) {
            HandlerAction::Reply(opcodes) => {
                assert!(matches!(opcodes[0], Opcode::GrpVchGrant { .. }));
            }
            _ => panic!("expected a grant reply"),
        }
    }

    #[test]
    fn test_unit_registration_mismatched_system() {
        let cfg = EngineConfig::default();
        let radios = RadioIdTable::new();
        let tgs = TalkgroupTable::new();
        let h = handler(&cfg, &radios, &tgs);
        let mut aff = AffiliationState::new();

        match h.handle_unit_reg(&mut aff, 1, 2, 100) {
            HandlerAction::Reply(opcodes) => {
                assert!(matches!(opcodes[0], Opcode::DenyRsp { reason, .. } if reason == deny::SITE_ACCESS_DENIAL));
            }
            _ => panic!("expected deny"),
        }
    }

    #[test]
    fn test_ack_rsp_swap_ids_when_enabled() {
        let mut cfg = EngineConfig::default();
        cfg.ack_rsp_swap_ids = true;
        let radios = RadioIdTable::new();
        let tgs = TalkgroupTable::new();
        let h = handler(&cfg, &radios, &tgs);

        let incoming = Opcode::AckRsp { aiv: false, ex: false, service_type: 0, src_id: 100, dst_id: 200 };
        match h.handle_ack_rsp(&incoming) {
            Opcode::AckRsp { src_id, dst_id, .. } => {
                assert_eq!(src_id, 200);
                assert_eq!(dst_id, 100);
            }
            _ => panic!("expected AckRsp"),
        }
    }

    #[test]
    fn test_ack_rsp_untouched_when_swap_disabled() {
        let cfg = EngineConfig::default();
        let radios = RadioIdTable::new();
        let tgs = TalkgroupTable::new();
        let h = handler(&cfg, &radios, &tgs);

        let incoming = Opcode::AckRsp { aiv: false, ex: false, service_type: 0, src_id: 100, dst_id: 200 };
        match h.handle_ack_rsp(&incoming) {
            Opcode::AckRsp { src_id, dst_id, .. } => {
                assert_eq!(src_id, 100);
                assert_eq!(dst_id, 200);
            }
            _ => panic!("expected AckRsp"),
        }
    }

    #[test]
    fn test_call_term_opcode_gated_by_dvm_extensions() {
        let cfg = EngineConfig::default();
        let radios = RadioIdTable::new();
        let tgs = TalkgroupTable::new();
        let h = handler(&cfg, &radios, &tgs);
        assert!(h.call_term_opcode(Channel { id: 1, no: 5 }, 4001, 555).is_none());

        let mut cfg = EngineConfig::default();
        cfg.dvm_extensions = true;
        let h = handler(&cfg, &radios, &tgs);
        assert!(matches!(h.call_term_opcode(Channel { id: 1, no: 5 }, 4001, 555), Some(Opcode::DvmLcCallTerm { .. })));
    }

    #[test]
    fn test_unit_deregistration_unknown_is_dropped() {
        let cfg = EngineConfig::default();
        let radios = RadioIdTable::new();
        let tgs = TalkgroupTable::new();
        let h = handler(&cfg, &radios, &tgs);
        let mut aff = AffiliationState::new();

        assert!(matches!(h.handle_unit_dereg(&mut aff, 42), HandlerAction::Drop));
    }
}

//! Top-level engine: owns the per-site state and the single cooperative
//! `clock(ms)` pass that drives every timer-backed subsystem.

use crate::config::EngineConfig;
use crate::consts::timing::CONV_REG_WAIT_TIMEOUT;
use crate::grant::AffiliationState;
use crate::lookups::{RadioIdTable, TalkgroupTable};
use crate::mbf::Scheduler;
use crate::packetdata::{ArpTable, PacketDataHandler, VtunBridge};
use crate::site::SiteData;
use crate::sndcp::SndcpTable;
use crate::timers::Timer;

/// A pending conventional-registration decision, held for
/// `CONV_REG_WAIT_TIMEOUT` before the engine answers ACCEPT/DENY.
struct PendingConvReg {
    source_id: u32,
    timer: Timer,
    accept: bool,
}

/// Outcome of one `clock(ms)` pass, collecting everything the caller (the
/// modem/peer-network adapters) needs to act on.
#[derive(Default)]
pub struct ClockEvents {
    pub expired_grants: Vec<u32>,
    pub expired_sndcp_llids: Vec<u32>,
    pub conv_reg_decisions: Vec<(u32, bool)>,
}

/// One site's full runtime state: configuration, affiliation/grant
/// tables, lookups, the SNDCP context table, the control-channel
/// scheduler, and the packet-data/VTUN bridge.
pub struct Engine {
    pub config: EngineConfig,
    pub site: SiteData,
    pub affiliation: AffiliationState,
    pub radio_ids: RadioIdTable,
    pub talkgroups: TalkgroupTable,
    pub sndcp: SndcpTable,
    pub scheduler: Scheduler,
    pub packet_data: PacketDataHandler,
    pub arp: ArpTable,
    pub vtun: VtunBridge,

    adj_site_age_timer: Timer,
    pending_conv_reg: Vec<PendingConvReg>,
}

impl Engine {
    pub fn new(config: EngineConfig, site: SiteData) -> Engine {
        let mut adj_site_age_timer = Timer::new(std::time::Duration::from_secs(config.adj_site_update_interval as u64));
        adj_site_age_timer.start();

        let mut scheduler = Scheduler::new();
        scheduler.set_dvm_extensions(config.dvm_extensions);

        Engine {
            config,
            site,
            affiliation: AffiliationState::new(),
            radio_ids: RadioIdTable::new(),
            talkgroups: TalkgroupTable::new(),
            sndcp: SndcpTable::new(),
            scheduler,
            packet_data: PacketDataHandler::new(),
            arp: ArpTable::new(),
            vtun: VtunBridge::new(),
            adj_site_age_timer,
            pending_conv_reg: Vec::new(),
        }
    }

    /// Queue a conventional-registration decision, answered after
    /// `CONV_REG_WAIT_TIMEOUT` has elapsed.
    pub fn queue_conv_reg(&mut self, source_id: u32, accept: bool) {
        let mut timer = Timer::new(CONV_REG_WAIT_TIMEOUT);
        timer.start();
        self.pending_conv_reg.push(PendingConvReg { source_id, timer, accept });
    }

    /// Advance every timer-backed subsystem by `ms` and collect the
    /// resulting events. This is the engine's only entry point that
    /// touches wall-clock-driven state; everything else is triggered by
    /// an incoming frame or packet.
    pub fn clock(&mut self, ms: u64) -> ClockEvents {
        let mut events = ClockEvents::default();

        events.expired_grants = self.affiliation.tick(ms);
        events.expired_sndcp_llids = self.sndcp.tick(ms);
        self.vtun.tick(ms);

        if self.adj_site_age_timer.tick(ms) {
            self.affiliation.age_sites();
            self.adj_site_age_timer.start();
        }

        let mut remaining = Vec::with_capacity(self.pending_conv_reg.len());
        for mut pending in self.pending_conv_reg.drain(..) {
            if pending.timer.tick(ms) {
                events.conv_reg_decisions.push((pending.source_id, pending.accept));
            } else {
                remaining.push(pending);
            }
        }
        self.pending_conv_reg = remaining;

        events
    }
}

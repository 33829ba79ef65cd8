//! SNDCP context state machine: tracks one data session per logical link
//! ID from its first channel request through call termination.

use std::collections::HashMap;

use crate::consts::timing::{SNDCP_READY_TIMEOUT, SNDCP_STANDBY_TIMEOUT};
use crate::timers::Timer;

/// Network address type requested by `ACT_TDS_CTX`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NetworkAddrType {
    Ipv4Dynamic,
    Ipv4Static,
}

/// Outcome of feeding an event into a context; `None` means the event was
/// absorbed with no reply owed to the requester.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SndcpAction {
    Accept,
    /// Static addressing is never supported.
    RejectStaticUnsupported,
    /// Dynamic addressing is unimplemented in this release.
    RejectDynamicUnsupported,
    /// Emit a TDULC LC_CALL_TERM and notify the control channel.
    CallTerminate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SndcpState {
    Closed,
    Idle,
    /// Channel granted, awaiting activity before the ready timer expires.
    ReadyS,
    Standby,
    Ready,
}

/// One LLID's SNDCP context.
#[derive(Debug)]
pub struct SndcpContext {
    state: SndcpState,
    ready_timer: Timer,
    standby_timer: Timer,
}

impl SndcpContext {
    fn new() -> SndcpContext {
        SndcpContext {
            state: SndcpState::Closed,
            ready_timer: Timer::new(SNDCP_READY_TIMEOUT),
            standby_timer: Timer::new(SNDCP_STANDBY_TIMEOUT),
        }
    }

    pub fn state(&self) -> SndcpState {
        self.state
    }

    /// First request for this LLID: initialize the context to `IDLE`.
    pub fn open(&mut self) {
        self.state = SndcpState::Idle;
    }

    /// A channel grant was issued for this LLID: start the ready timer.
    pub fn on_channel_grant(&mut self) {
        self.state = SndcpState::ReadyS;
        self.ready_timer.start();
        self.standby_timer.stop();
    }

    /// `ACT_TDS_CTX` request for the given address type.
    pub fn activate(&mut self, addr_type: NetworkAddrType) -> SndcpAction {
        match addr_type {
            NetworkAddrType::Ipv4Static => {
                self.reset();
                SndcpAction::RejectStaticUnsupported
            }
            // Dynamic addressing isn't wired up yet; see DESIGN.md.
            NetworkAddrType::Ipv4Dynamic => {
                self.reset();
                SndcpAction::RejectDynamicUnsupported
            }
        }
    }

    /// `DEACT_TDS_CTX_REQ`: acknowledge, terminate the call, reset.
    pub fn deactivate(&mut self) -> SndcpAction {
        self.reset();
        SndcpAction::CallTerminate
    }

    /// Data traffic observed on this context; promotes READY_S to READY
    /// and restarts the standby timer.
    pub fn touch(&mut self) {
        if self.state == SndcpState::ReadyS || self.state == SndcpState::Ready {
            self.state = SndcpState::Ready;
            self.ready_timer.stop();
            self.standby_timer.start();
        }
    }

    fn reset(&mut self) {
        self.state = SndcpState::Idle;
        self.ready_timer.stop();
        self.standby_timer.stop();
    }

    /// Advance timers by `ms`. Returns `Some(action)` if a timer expiry
    /// drove a transition the caller must act on.
    pub fn tick(&mut self, ms: u64) -> Option<SndcpAction> {
        if self.ready_timer.tick(ms) {
            self.state = SndcpState::Idle;
            return Some(SndcpAction::CallTerminate);
        }

        if self.standby_timer.tick(ms) {
            self.state = SndcpState::Standby;
        }

        None
    }
}

impl Default for SndcpContext {
    fn default() -> SndcpContext {
        SndcpContext::new()
    }
}

/// All active SNDCP contexts, keyed by LLID.
#[derive(Debug, Default)]
pub struct SndcpTable {
    contexts: HashMap<u32, SndcpContext>,
}

impl SndcpTable {
    pub fn new() -> SndcpTable {
        SndcpTable::default()
    }

    pub fn context_mut(&mut self, llid: u32) -> &mut SndcpContext {
        self.contexts.entry(llid).or_insert_with(SndcpContext::new)
    }

    pub fn remove(&mut self, llid: u32) {
        self.contexts.remove(&llid);
    }

    /// Advance every context's timers by `ms`, returning the LLIDs whose
    /// ready timer expired this tick (caller must emit their call-term).
    pub fn tick(&mut self, ms: u64) -> Vec<u32> {
        let mut expired = Vec::new();
        for (&llid, ctx) in self.contexts.iter_mut() {
            if ctx.tick(ms) == Some(SndcpAction::CallTerminate) {
                expired.push(llid);
            }
        }
        expired
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_open_enters_idle() {
        let mut ctx = SndcpContext::new();
        assert_eq!(ctx.state(), SndcpState::Closed);
        ctx.open();
        assert_eq!(ctx.state(), SndcpState::Idle);
    }

    #[test]
    fn test_grant_starts_ready_timer_and_expires_to_idle() {
        let mut ctx = SndcpContext::new();
        ctx.open();
        ctx.on_channel_grant();
        assert_eq!(ctx.state(), SndcpState::ReadyS);

        assert_eq!(ctx.tick(9_999), None);
        assert_eq!(ctx.tick(1), Some(SndcpAction::CallTerminate));
        assert_eq!(ctx.state(), SndcpState::Idle);
    }

    #[test]
    fn test_touch_promotes_to_ready_and_arms_standby() {
        let mut ctx = SndcpContext::new();
        ctx.open();
        ctx.on_channel_grant();
        ctx.touch();
        assert_eq!(ctx.state(), SndcpState::Ready);

        assert_eq!(ctx.tick(59_999), None);
        assert_eq!(ctx.tick(1), None);
        assert_eq!(ctx.state(), SndcpState::Standby);
    }

    #[test]
    fn test_static_address_rejected() {
        let mut ctx = SndcpContext::new();
        ctx.open();
        assert_eq!(ctx.activate(NetworkAddrType::Ipv4Static), SndcpAction::RejectStaticUnsupported);
        assert_eq!(ctx.state(), SndcpState::Idle);
    }

    #[test]
    fn test_dynamic_address_rejected() {
        let mut ctx = SndcpContext::new();
        ctx.open();
        assert_eq!(ctx.activate(NetworkAddrType::Ipv4Dynamic), SndcpAction::RejectDynamicUnsupported);
    }

    #[test]
    fn test_deactivate_terminates_and_resets() {
        let mut ctx = SndcpContext::new();
        ctx.open();
        ctx.on_channel_grant();
        assert_eq!(ctx.deactivate(), SndcpAction::CallTerminate);
        assert_eq!(ctx.state(), SndcpState::Idle);
    }

    #[test]
    fn test_table_tracks_independent_contexts() {
        let mut table = SndcpTable::new();
        table.context_mut(100).open();
        table.context_mut(200).open();
        table.context_mut(100).on_channel_grant();

        let expired = table.tick(10_000);
        assert_eq!(expired, vec![100]);
    }
}

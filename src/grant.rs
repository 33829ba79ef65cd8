//! Per-site affiliation state: the voice-channel grant table, unit
//! registration/affiliation sets, the free-channel pool, and the aging
//! tables for adjacent sites and secondary control channels.

use std::collections::{HashMap, HashSet};

use crate::consts::timing::{ADJ_SITE_UPDATE_CNT, GRANT_TIMER_TIMEOUT};
use crate::site::SiteData;
use crate::timers::Timer;
use crate::tsbk::Channel;

/// An active voice-channel grant to one destination ID.
struct Grant {
    channel: Channel,
    timer: Timer,
}

/// Why a grant request could not be satisfied right now.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GrantDenial {
    /// A different talkgroup is still in the post-call hang window.
    Collide,
    /// No free voice channel to assign.
    ResourceNotAvailable,
}

/// Outcome of a grant request.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GrantOutcome {
    /// Newly granted, or an existing grant to the same destination was
    /// refreshed; carries the assigned channel.
    Granted(Channel),
    Denied(GrantDenial),
}

/// A site's full affiliation and channel-grant bookkeeping.
#[derive(Default)]
pub struct AffiliationState {
    grants: HashMap<u32, Grant>,
    unit_reg: HashSet<u32>,
    group_aff: HashMap<u32, u32>,
    voice_ch_pool: Vec<Channel>,
    adj_sites: HashMap<u8, (SiteData, u32)>,
    sccb: HashMap<u8, (SiteData, u32)>,
}

impl AffiliationState {
    pub fn new() -> AffiliationState {
        AffiliationState::default()
    }

    pub fn add_voice_channel(&mut self, channel: Channel) {
        self.voice_ch_pool.push(channel);
    }

    pub fn free_channel_count(&self) -> usize {
        self.voice_ch_pool.len()
    }

    /// Request (or refresh) a voice-channel grant to `dst_id`. `colliding`
    /// should be true when a different talkgroup currently holds the
    /// network hang window.
    pub fn request_grant(&mut self, dst_id: u32, colliding: bool) -> GrantOutcome {
        if let Some(grant) = self.grants.get_mut(&dst_id) {
            grant.timer.start();
            return GrantOutcome::Granted(grant.channel);
        }

        if colliding {
            return GrantOutcome::Denied(GrantDenial::Collide);
        }

        match self.voice_ch_pool.pop() {
            Some(channel) => {
                let mut timer = Timer::new(GRANT_TIMER_TIMEOUT);
                timer.start();
                self.grants.insert(dst_id, Grant { channel, timer });
                GrantOutcome::Granted(channel)
            }
            None => GrantOutcome::Denied(GrantDenial::ResourceNotAvailable),
        }
    }

    /// Release a grant, returning its channel to the free pool.
    pub fn release_grant(&mut self, dst_id: u32) {
        if let Some(grant) = self.grants.remove(&dst_id) {
            self.voice_ch_pool.push(grant.channel);
        }
    }

    pub fn active_grants(&self) -> impl Iterator<Item = (u32, Channel)> + '_ {
        self.grants.iter().map(|(&dst, g)| (dst, g.channel))
    }

    /// Advance every grant timer by `ms`; expired grants are released and
    /// returned to the caller so it can notify the voice channel.
    pub fn tick(&mut self, ms: u64) -> Vec<u32> {
        let expired: Vec<u32> = self
            .grants
            .iter_mut()
            .filter(|(_, g)| g.timer.tick(ms))
            .map(|(&dst, _)| dst)
            .collect();

        for dst in &expired {
            self.release_grant(*dst);
        }
        expired
    }

    pub fn is_registered(&self, src_id: u32) -> bool {
        self.unit_reg.contains(&src_id)
    }

    pub fn register_unit(&mut self, src_id: u32) {
        self.unit_reg.insert(src_id);
    }

    pub fn deregister_unit(&mut self, src_id: u32) -> bool {
        self.group_aff.remove(&src_id);
        self.unit_reg.remove(&src_id)
    }

    pub fn affiliation(&self, src_id: u32) -> Option<u32> {
        self.group_aff.get(&src_id).copied()
    }

    pub fn affiliate(&mut self, src_id: u32, dst_group_id: u32) {
        self.group_aff.insert(src_id, dst_group_id);
    }

    /// Learn of (or refresh) an adjacent site, resetting its aging counter.
    pub fn update_adjacent_site(&mut self, site_id: u8, site: SiteData) {
        self.adj_sites.insert(site_id, (site, ADJ_SITE_UPDATE_CNT));
    }

    pub fn update_sccb(&mut self, rfss_id: u8, site: SiteData) {
        self.sccb.insert(rfss_id, (site, ADJ_SITE_UPDATE_CNT));
    }

    pub fn adjacent_sites(&self) -> impl Iterator<Item = &SiteData> {
        self.adj_sites.values().map(|(site, _)| site)
    }

    pub fn sccb_entries(&self) -> impl Iterator<Item = &SiteData> {
        self.sccb.values().map(|(site, _)| site)
    }

    /// Decrement every adjacent-site/SCCB aging counter by one tick;
    /// entries that reach zero are dropped and logged by the caller.
    pub fn age_sites(&mut self) {
        self.adj_sites.retain(|&site_id, (_, cnt)| {
            *cnt = cnt.saturating_sub(1);
            let keep = *cnt > 0;
            if !keep {
                log::warn!("adjacent site {:#04x} aged out, no data", site_id);
            }
            keep
        });

        self.sccb.retain(|&rfss_id, (_, cnt)| {
            *cnt = cnt.saturating_sub(1);
            let keep = *cnt > 0;
            if !keep {
                log::warn!("secondary control channel {:#04x} aged out, no data", rfss_id);
            }
            keep
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn chan(no: u16) -> Channel {
        Channel { id: 1, no }
    }

    #[test]
    fn test_grant_pops_from_pool_and_refreshes() {
        let mut state = AffiliationState::new();
        state.add_voice_channel(chan(1));
        state.add_voice_channel(chan(2));

        match state.request_grant(4001, false) {
            GrantOutcome::Granted(ch) => assert_eq!(ch.no, 2),
            other => panic!("expected grant, got {:?}", other),
        }
        assert_eq!(state.free_channel_count(), 1);

        // Requesting the same destination again reuses the channel.
        match state.request_grant(4001, false) {
            GrantOutcome::Granted(ch) => assert_eq!(ch.no, 2),
            other => panic!("expected refreshed grant, got {:?}", other),
        }
        assert_eq!(state.free_channel_count(), 1);
    }

    #[test]
    fn test_grant_denied_when_pool_empty() {
        let mut state = AffiliationState::new();
        match state.request_grant(1, false) {
            GrantOutcome::Denied(GrantDenial::ResourceNotAvailable) => {}
            other => panic!("expected resource-not-available, got {:?}", other),
        }
    }

    #[test]
    fn test_grant_denied_on_collision() {
        let mut state = AffiliationState::new();
        state.add_voice_channel(chan(1));
        match state.request_grant(1, true) {
            GrantOutcome::Denied(GrantDenial::Collide) => {}
            other => panic!("expected collide denial, got {:?}", other),
        }
        assert_eq!(state.free_channel_count(), 1);
    }

    #[test]
    fn test_grant_expiry_returns_channel_to_pool() {
        let mut state = AffiliationState::new();
        state.add_voice_channel(chan(5));
        state.request_grant(99, false);

        assert!(state.tick(14_999).is_empty());
        let expired = state.tick(1);
        assert_eq!(expired, vec![99]);
        assert_eq!(state.free_channel_count(), 1);
    }

    #[test]
    fn test_registration_and_affiliation() {
        let mut state = AffiliationState::new();
        assert!(!state.is_registered(10));
        state.register_unit(10);
        assert!(state.is_registered(10));

        state.affiliate(10, 5000);
        assert_eq!(state.affiliation(10), Some(5000));

        assert!(state.deregister_unit(10));
        assert!(!state.is_registered(10));
        assert_eq!(state.affiliation(10), None);
    }

    #[test]
    fn test_adjacent_site_ages_out() {
        let _ = env_logger::try_init();
        let mut state = AffiliationState::new();
        let site = SiteData::new(1, 1, 1, 2, 0, 100, 0, 0);
        state.update_adjacent_site(2, site);
        assert_eq!(state.adjacent_sites().count(), 1);

        for _ in 0..ADJ_SITE_UPDATE_CNT {
            state.age_sites();
        }
        assert_eq!(state.adjacent_sites().count(), 0);
    }
}

//! FNE-side packet-data call handler: per-peer PDU reassembly, fan-out to
//! other connected peers, and the ARP/virtual-tunnel bridge that lets a
//! PDU session carry IPv4 datagrams.

use std::collections::{HashMap, VecDeque};

use crate::consts::timing::{DATA_CALL_COLL_TIMEOUT, SU_NOT_READY_TIMEOUT};
use crate::consts::MAX_PDU_BLOCKS;
use crate::pdu::DataHeader;
use crate::timers::Timer;

/// Per-peer reassembly state for one in-flight packet-data stream.
pub struct RxStatus {
    pub peer_id: u32,
    pub stream_id: u32,
    pub llid: u32,
    pub header: DataHeader,
    pub block_data: Vec<Option<Vec<u8>>>,
    pub pdu_user_data: Vec<u8>,
    silence: Timer,
}

impl RxStatus {
    fn new(peer_id: u32, stream_id: u32, llid: u32, header: DataHeader) -> RxStatus {
        let mut silence = Timer::new(DATA_CALL_COLL_TIMEOUT);
        silence.start();
        RxStatus {
            peer_id,
            stream_id,
            llid,
            block_data: vec![None; header.blocks_to_follow as usize],
            header,
            pdu_user_data: Vec::new(),
            silence,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.block_data.iter().all(Option::is_some)
    }

    fn touch(&mut self) {
        self.silence.start();
    }
}

/// Tracks one in-flight stream per peer, evicting stale entries after a
/// collision once they've gone quiet for `DATA_CALL_COLL_TIMEOUT`.
#[derive(Default)]
pub struct PacketDataHandler {
    by_peer: HashMap<u32, RxStatus>,
}

#[derive(Debug, Eq, PartialEq)]
pub enum AcceptOutcome {
    /// A new stream was accepted (this was block 0 for that peer).
    Accepted,
    /// A later block arrived for a peer with no known stream; dropped.
    UnknownPeer,
    /// A different stream for a peer already mid-call; the existing
    /// stream is still live, so the new one is rejected.
    Collision,
    /// The existing stream had gone silent too long and was evicted in
    /// favor of the new one.
    EvictedStale,
}

impl PacketDataHandler {
    pub fn new() -> PacketDataHandler {
        PacketDataHandler::default()
    }

    /// Offer the start (`current_block == 0`) of a stream from `peer_id`.
    pub fn accept_start(&mut self, peer_id: u32, stream_id: u32, llid: u32, header: DataHeader) -> AcceptOutcome {
        if header.blocks_to_follow as usize > MAX_PDU_BLOCKS as usize {
            return AcceptOutcome::UnknownPeer;
        }

        if let Some(existing) = self.by_peer.get(&peer_id) {
            if existing.stream_id != stream_id {
                if existing.silence.remaining().is_zero() {
                    self.by_peer.insert(peer_id, RxStatus::new(peer_id, stream_id, llid, header));
                    return AcceptOutcome::EvictedStale;
                }
                log::warn!("packet-data collision on peer {:#010x}: stream {} vs in-flight {}", peer_id, stream_id, existing.stream_id);
                return AcceptOutcome::Collision;
            }
        }

        self.by_peer.insert(peer_id, RxStatus::new(peer_id, stream_id, llid, header));
        AcceptOutcome::Accepted
    }

    /// Feed a later block (`current_block > 0`) into an already-accepted
    /// stream. Returns `false` if no matching stream is known for this
    /// peer/stream pair, meaning the block must be dropped.
    pub fn push_block(&mut self, peer_id: u32, stream_id: u32, index: usize, data: Vec<u8>) -> bool {
        match self.by_peer.get_mut(&peer_id) {
            Some(rx) if rx.stream_id == stream_id => {
                if let Some(slot) = rx.block_data.get_mut(index) {
                    *slot = Some(data);
                    rx.touch();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn take_complete(&mut self, peer_id: u32) -> Option<RxStatus> {
        let complete = self.by_peer.get(&peer_id).map(RxStatus::is_complete).unwrap_or(false);
        if complete {
            self.by_peer.remove(&peer_id)
        } else {
            None
        }
    }

    /// Advance per-peer silence timers by `ms`, dropping any stream that's
    /// gone quiet for longer than the collision timeout.
    pub fn age(&mut self, ms: u64) {
        self.by_peer.retain(|_, rx| !rx.silence.tick(ms));
    }
}

/// Fan a completed packet out to every connected peer and external peer
/// network except the one it arrived from, flushing the outbound queue
/// every two peers to avoid a thundering-herd burst.
pub fn fan_out<F: FnMut(u32), G: FnMut()>(
    peers: &[u32],
    originating_peer: u32,
    blocked: &[u32],
    mut send: F,
    mut flush: G,
) {
    let mut sent = 0;
    for &peer in peers {
        if peer == originating_peer || blocked.contains(&peer) {
            continue;
        }
        send(peer);
        sent += 1;
        if sent % 2 == 0 {
            flush();
        }
    }
}

/// One entry in the ARP table bridging an LLID to its IPv4 hardware
/// address, as resolved over the air.
#[derive(Default)]
pub struct ArpTable {
    llid_to_addr: HashMap<u32, [u8; 4]>,
    ready: HashMap<u32, bool>,
}

impl ArpTable {
    pub fn new() -> ArpTable {
        ArpTable::default()
    }

    pub fn resolve(&self, llid: u32) -> Option<[u8; 4]> {
        self.llid_to_addr.get(&llid).copied()
    }

    pub fn learn(&mut self, llid: u32, addr: [u8; 4]) {
        self.llid_to_addr.insert(llid, addr);
        self.ready.insert(llid, true);
    }

    pub fn is_ready(&self, llid: u32) -> bool {
        self.ready.get(&llid).copied().unwrap_or(false)
    }
}

/// One pending outbound IPv4 datagram waiting on ARP resolution or the
/// per-destination ready gate.
struct PendingDatagram {
    llid: u32,
    packet: Vec<u8>,
}

/// Bridges IPv4 datagrams read from a virtual tunnel device to PDU
/// transmissions, one packet per destination in flight at a time.
#[derive(Default)]
pub struct VtunBridge {
    queue: VecDeque<PendingDatagram>,
    ready_for_pkt: HashMap<u32, bool>,
    su_not_ready: HashMap<u32, Timer>,
}

pub enum DrainAction {
    /// Send `packet` now; the destination's ready gate is now held until
    /// an ACK (or the not-ready timeout) releases it.
    Send { llid: u32, packet: Vec<u8> },
    /// Destination hardware address is unknown; emit an ARP request and
    /// keep the packet queued.
    NeedArp { llid: u32 },
    /// Nothing ready to drain this tick.
    Idle,
}

impl VtunBridge {
    pub fn new() -> VtunBridge {
        VtunBridge::default()
    }

    pub fn queue_datagram(&mut self, llid: u32, packet: Vec<u8>) {
        self.queue.push_back(PendingDatagram { llid, packet });
    }

    pub fn ack_received(&mut self, llid: u32) {
        self.ready_for_pkt.insert(llid, true);
        self.su_not_ready.remove(&llid);
    }

    /// Drain at most one queued datagram this tick, per spec §4.8.
    pub fn drain_one(&mut self, arp: &ArpTable) -> DrainAction {
        let Some(front) = self.queue.front() else {
            return DrainAction::Idle;
        };

        if !self.ready_for_pkt.get(&front.llid).copied().unwrap_or(true) {
            return DrainAction::Idle;
        }

        if arp.resolve(front.llid).is_none() {
            return DrainAction::NeedArp { llid: front.llid };
        }

        let pending = self.queue.pop_front().unwrap();
        self.ready_for_pkt.insert(pending.llid, false);
        let mut timer = Timer::new(SU_NOT_READY_TIMEOUT);
        timer.start();
        self.su_not_ready.insert(pending.llid, timer);

        DrainAction::Send { llid: pending.llid, packet: pending.packet }
    }

    /// Advance the not-ready timers; a destination that never ACKs within
    /// `SU_NOT_READY_TIMEOUT` has its gate released.
    pub fn tick(&mut self, ms: u64) {
        let expired: Vec<u32> = self
            .su_not_ready
            .iter_mut()
            .filter(|(_, t)| t.tick(ms))
            .map(|(&llid, _)| llid)
            .collect();

        for llid in expired {
            self.ready_for_pkt.insert(llid, true);
            self.su_not_ready.remove(&llid);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn header(blocks: u8) -> DataHeader {
        DataHeader { blocks_to_follow: blocks, ..DataHeader::default() }
    }

    #[test]
    fn test_accept_start_then_collision_from_different_stream() {
        let mut h = PacketDataHandler::new();
        assert_eq!(h.accept_start(1, 100, 0xAA, header(2)), AcceptOutcome::Accepted);
        assert_eq!(h.accept_start(1, 200, 0xBB, header(1)), AcceptOutcome::Collision);
    }

    #[test]
    fn test_push_block_and_complete() {
        let mut h = PacketDataHandler::new();
        h.accept_start(1, 100, 0xAA, header(2));
        assert!(h.push_block(1, 100, 0, vec![1, 2, 3]));
        assert!(h.take_complete(1).is_none());
        assert!(h.push_block(1, 100, 1, vec![4, 5, 6]));

        let rx = h.take_complete(1).unwrap();
        assert_eq!(rx.pdu_user_data.len(), 0);
        assert_eq!(rx.block_data.len(), 2);
    }

    #[test]
    fn test_push_block_unknown_peer_dropped() {
        let mut h = PacketDataHandler::new();
        assert!(!h.push_block(99, 1, 0, vec![]));
    }

    #[test]
    fn test_fan_out_skips_originator_and_blocked_flushes_every_two() {
        let peers = [1, 2, 3, 4, 5];
        let mut sent = Vec::new();
        let mut flushes = 0;

        fan_out(&peers, 2, &[4], |p| sent.push(p), || flushes += 1);

        assert_eq!(sent, vec![1, 3, 5]);
        assert_eq!(flushes, 1);
    }

    #[test]
    fn test_vtun_bridge_needs_arp_when_unresolved() {
        let mut bridge = VtunBridge::new();
        let arp = ArpTable::new();
        bridge.queue_datagram(0xAA, vec![1, 2, 3]);

        match bridge.drain_one(&arp) {
            DrainAction::NeedArp { llid } => assert_eq!(llid, 0xAA),
            _ => panic!("expected NeedArp"),
        }
    }

    #[test]
    fn test_vtun_bridge_sends_once_resolved_and_gates_next() {
        let mut bridge = VtunBridge::new();
        let mut arp = ArpTable::new();
        arp.learn(0xAA, [10, 0, 0, 1]);

        bridge.queue_datagram(0xAA, vec![1, 2, 3]);
        bridge.queue_datagram(0xAA, vec![4, 5, 6]);

        match bridge.drain_one(&arp) {
            DrainAction::Send { llid, packet } => {
                assert_eq!(llid, 0xAA);
                assert_eq!(packet, vec![1, 2, 3]);
            }
            _ => panic!("expected Send"),
        }

        // Destination's ready gate is held until an ack (or timeout).
        assert!(matches!(bridge.drain_one(&arp), DrainAction::Idle));
    }

    #[test]
    fn test_vtun_bridge_releases_gate_on_not_ready_timeout() {
        let mut bridge = VtunBridge::new();
        let mut arp = ArpTable::new();
        arp.learn(0xAA, [10, 0, 0, 1]);
        bridge.queue_datagram(0xAA, vec![1]);
        bridge.drain_one(&arp);

        bridge.tick(4_999);
        bridge.queue_datagram(0xAA, vec![2]);
        assert!(matches!(bridge.drain_one(&arp), DrainAction::Idle));

        bridge.tick(1);
        assert!(matches!(bridge.drain_one(&arp), DrainAction::Send { .. }));
    }
}

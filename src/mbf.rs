//! Multi-block-frame assembly and the control-channel scheduler: packs one
//! to three TSBKs into a single TSDU payload, and drives the tick-counter
//! schedule that decides which message goes out next.

use crate::bitbuf::{encode_bit_range, is_status_position};
use crate::consts::{TSBK_FEC_LENGTH_BYTES, TSBK_PAYLOAD_START_BIT};
use crate::status::add_status_bits;
use crate::tsbk::{encode, TsbkHeader};
use crate::tsbk::opcodes::Opcode;

/// Find the raw bit position `start_bit + n` non-status bits after
/// `start_bit`, walking forward over (and skipping) status-symbol
/// positions the same way [`crate::bitbuf::encode_bit_range`] does.
fn end_bit_for(start_bit: usize, data_bits: usize) -> usize {
    let mut pos = start_bit;
    let mut written = 0;

    while written < data_bits {
        if !is_status_position(pos) {
            written += 1;
        }
        pos += 1;
    }
    pos
}

/// Pack between one and three TSBK FEC blocks into one TSDU frame payload,
/// interleaving them across the bit range that follows the NID and adding
/// status bits (busy, then alternating idle).
///
/// The frame buffer passed in must already contain the sync pattern and
/// NID; this only fills in the payload and status-bit planes.
pub fn pack_mbf(frame: &mut [u8], blocks: &[[u8; TSBK_FEC_LENGTH_BYTES]]) {
    assert!(!blocks.is_empty() && blocks.len() <= 3);

    let data_bits = blocks.len() * TSBK_FEC_LENGTH_BYTES * 8;
    let end_bit = end_bit_for(TSBK_PAYLOAD_START_BIT, data_bits);

    let mut payload = Vec::with_capacity(blocks.len() * TSBK_FEC_LENGTH_BYTES);
    for block in blocks {
        payload.extend_from_slice(block);
    }

    encode_bit_range(&payload, frame, TSBK_PAYLOAD_START_BIT, end_bit);
    add_status_bits(frame, end_bit, true, false);
}

/// Encode a list of opcodes (one to three, the last carrying
/// `last_block=true`) into a single MBF-packed frame.
pub fn build_mbf(frame: &mut [u8], header: &TsbkHeader, opcodes: &[Opcode]) {
    assert!(!opcodes.is_empty() && opcodes.len() <= 3);

    let blocks: Vec<[u8; TSBK_FEC_LENGTH_BYTES]> = opcodes
        .iter()
        .enumerate()
        .map(|(i, opcode)| {
            let mut hdr = *header;
            hdr.last_block = i + 1 == opcodes.len();
            encode(&hdr, opcode)
        })
        .collect();

    pack_mbf(frame, &blocks);
}

/// One entry the scheduler decided to emit this tick, carrying enough
/// context for the caller to build the actual opcode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScheduleEntry {
    IdenUp,
    RfssStsBcast,
    NetStsBcast,
    SyncBcast,
    GrpVchGrantUpd,
    SndcpChAnn,
    AdjStsBcast,
    SccbExp,
    TimeDateAnn,
    MotCcBsi,
    DvmGitHash,
}

/// Drives the `n`-counter control-channel schedule of spec §4.6: which
/// logical message to emit this tick, plus the overlay messages that ride
/// on top of the regular rotation.
#[derive(Default)]
pub struct Scheduler {
    n: u32,
    frame_cnt: u64,
    microslot: u16,
    alt_rfss_first: bool,
    have_grants: bool,
    have_adj_sites: bool,
    have_sccb: bool,
    dvm_extensions: bool,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler { alt_rfss_first: true, ..Scheduler::default() }
    }

    pub fn set_have_grants(&mut self, have: bool) {
        self.have_grants = have;
    }

    pub fn set_have_adjacent_sites(&mut self, have: bool) {
        self.have_adj_sites = have;
    }

    pub fn set_have_sccb(&mut self, have: bool) {
        self.have_sccb = have;
    }

    /// Enable the `DVM_GIT_HASH` overlay message, gated behind
    /// `dvmExtensions` since it is a non-standard vendor opcode.
    pub fn set_dvm_extensions(&mut self, enabled: bool) {
        self.dvm_extensions = enabled;
    }

    pub fn microslot(&self) -> u16 {
        self.microslot
    }

    /// Advance one tick and return every entry due this tick: the regular
    /// `n`-counter rotation plus any overlay messages.
    pub fn tick(&mut self) -> Vec<ScheduleEntry> {
        let mut out = Vec::new();

        match self.n {
            0 => out.push(ScheduleEntry::IdenUp),
            1 | 2 => {
                let rfss_first = self.alt_rfss_first == (self.n == 1);
                out.push(if rfss_first { ScheduleEntry::RfssStsBcast } else { ScheduleEntry::NetStsBcast });
            }
            3 => {
                let rfss_first = self.alt_rfss_first;
                out.push(if rfss_first { ScheduleEntry::NetStsBcast } else { ScheduleEntry::RfssStsBcast });
                self.alt_rfss_first = !self.alt_rfss_first;
            }
            4 => out.push(ScheduleEntry::SyncBcast),
            5 => {
                if self.have_grants {
                    out.push(ScheduleEntry::GrpVchGrantUpd);
                }
            }
            6 => out.push(ScheduleEntry::SndcpChAnn),
            7 => {
                if self.have_adj_sites {
                    out.push(ScheduleEntry::AdjStsBcast);
                }
            }
            8 => {
                if self.have_sccb {
                    out.push(ScheduleEntry::SccbExp);
                }
            }
            _ => {}
        }

        if self.frame_cnt % 64 == 0 {
            out.push(ScheduleEntry::TimeDateAnn);
        }
        if self.frame_cnt % 127 == 0 {
            out.push(ScheduleEntry::MotCcBsi);
        }
        if self.dvm_extensions && self.frame_cnt % 125 == 0 {
            out.push(ScheduleEntry::DvmGitHash);
        }

        self.n = (self.n + 1) % 9;
        self.frame_cnt += 1;
        self.microslot = ((self.microslot as u32 + 1) % 8000) as u16;

        out
    }

    /// MBF padding rule: given the number of TSBKs queued when the builder
    /// needs to close out a sequence, how many (and which) filler entries
    /// to append so the frame always carries a full three blocks.
    pub fn mbf_padding(queued: usize) -> Vec<ScheduleEntry> {
        match queued {
            1 => vec![ScheduleEntry::NetStsBcast, ScheduleEntry::RfssStsBcast],
            2 => vec![ScheduleEntry::IdenUp],
            _ => Vec::new(),
        }
    }
}

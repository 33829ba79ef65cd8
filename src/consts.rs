//! On-air frame geometry and protocol timing constants.
//!
//! Byte lengths and bit offsets come from the P25 Phase 1 air interface as
//! implemented by the reference host this crate's behavior is grounded on;
//! see `DESIGN.md` for provenance of each group.

/// 6-byte frame sync pattern that precedes every NID.
pub const SYNC_BYTES: [u8; 6] = [0x55, 0x75, 0xF5, 0xFF, 0x77, 0xFF];

/// Header Data Unit frame length in bytes.
pub const HDU_FRAME_LENGTH_BYTES: usize = 99;
/// Simple Terminator Data Unit frame length in bytes.
pub const TDU_FRAME_LENGTH_BYTES: usize = 18;
/// Logical Link Data Unit (voice) frame length in bytes.
pub const LDU_FRAME_LENGTH_BYTES: usize = 216;
/// Single-block Trunking System Data Unit frame length in bytes.
pub const TSDU_FRAME_LENGTH_BYTES: usize = 45;
/// Double-block Trunking System Data Unit frame length in bytes.
pub const TSDU_DOUBLE_FRAME_LENGTH_BYTES: usize = 72;
/// Triple-block (MBF) Trunking System Data Unit frame length in bytes.
pub const TSDU_TRIPLE_FRAME_LENGTH_BYTES: usize = 90;
/// Terminator Data Unit with Link Control frame length in bytes.
pub const TDULC_FRAME_LENGTH_BYTES: usize = 54;

/// Length in bytes of an encoded Network ID.
pub const NID_LENGTH_BYTES: usize = 8;
/// Bit offset of the first NID bit within a frame (after the 6-byte sync).
pub const NID_START_BIT: usize = 48;
/// Bit offset one past the last NID bit within a frame.
pub const NID_END_BIT: usize = 114;

/// Bit position of the first status symbol (SS0) in a payload bit stream.
pub const SS0_START: usize = 70;
/// Bit position of the second status symbol (SS1) in a payload bit stream.
pub const SS1_START: usize = 71;
/// Spacing in bits between successive status-symbol pairs.
pub const SS_INCREMENT: usize = 72;

/// Length in bytes of a single TSBK's FEC-encoded (Trellis 1/2 rate) on-air block.
pub const TSBK_FEC_LENGTH_BYTES: usize = 25;
/// Length in bytes of a decoded TSBK (payload + CRC, pre-FEC).
pub const TSBK_LENGTH_BYTES: usize = 12;
/// Start bit of the first TSBK payload within a TSDU frame (after sync + NID).
pub const TSBK_PAYLOAD_START_BIT: usize = 114;
/// End bit of a three-block (MBF) TSBK payload run within a TSDU frame.
pub const TSBK_MBF_PAYLOAD_END_BIT: usize = 720;

/// Maximum number of PDU data blocks a header may declare.
pub const MAX_PDU_BLOCKS: u8 = 32;
/// Maximum PDU byte length the engine will reassemble.
pub const MAX_PDU_LENGTH: usize = 512;
/// Length in bytes of a decoded (pre-FEC) PDU data header.
pub const PDU_HEADER_LENGTH_BYTES: usize = 12;
/// Length in bytes of a decoded confirmed PDU data block (serial+CRC9 header + data).
pub const PDU_CONFIRMED_LENGTH_BYTES: usize = 18;
/// Length in bytes of user data carried by one confirmed PDU block.
pub const PDU_CONFIRMED_DATA_LENGTH_BYTES: usize = 16;
/// Length in bytes of a decoded unconfirmed PDU data block.
pub const PDU_UNCONFIRMED_LENGTH_BYTES: usize = 12;
/// Length in bytes of a Trellis-encoded PDU FEC block.
pub const PDU_FEC_LENGTH_BYTES: usize = 25;
/// Bit length of one P25 LDU-sized frame, the unit PDU blocks are carried in.
pub const LDU_FRAME_LENGTH_BITS: usize = LDU_FRAME_LENGTH_BYTES * 8;

/// DVM-internal manufacturer ID used only for non-air-transmitted signalling.
pub const MFID_DVM: u8 = 0xFE;
/// Standard (non-vendor) manufacturer ID.
pub const MFID_STANDARD: u8 = 0x00;
/// Motorola manufacturer ID, whose LCO space partially remaps onto standard opcodes.
pub const MFID_MOTOROLA: u8 = 0x90;

/// Timer durations and retry/aging budgets from the engine's concurrency model.
pub mod timing {
    use std::time::Duration;

    /// Idle time after which a granted channel is released absent any traffic touch.
    pub const GRANT_TIMER_TIMEOUT: Duration = Duration::from_secs(15);
    /// Aging interval for one adjacent-site / SCCB tick.
    pub const ADJ_SITE_TIMER_TIMEOUT: Duration = Duration::from_secs(30);
    /// Number of aging ticks an adjacent/SCCB entry survives without a fresh broadcast.
    pub const ADJ_SITE_UPDATE_CNT: u32 = 5;
    /// Delay before a queued conventional-registration decision is issued.
    pub const CONV_REG_WAIT_TIMEOUT: Duration = Duration::from_millis(750);
    /// Maximum number of ACK_RETRY resends before escalating to NACK_UNDELIVERABLE.
    pub const MAX_PDU_RETRY_CNT: u8 = 2;
    /// Idle time after which a stuck per-peer PDU call is freed.
    pub const DATA_CALL_COLL_TIMEOUT: Duration = Duration::from_secs(60);
    /// SNDCP `READY_S` timer: time allowed between channel grant and traffic.
    pub const SNDCP_READY_TIMEOUT: Duration = Duration::from_secs(10);
    /// SNDCP `STANDBY` timer.
    pub const SNDCP_STANDBY_TIMEOUT: Duration = Duration::from_secs(60);
    /// VTUN: time to wait for an ACK from a subscriber unit before releasing the gate.
    pub const SU_NOT_READY_TIMEOUT: Duration = Duration::from_secs(5);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validate_status_geometry() {
        assert_eq!(SS1_START, SS0_START + 1);
        assert!(SS_INCREMENT > SS1_START);
    }

    #[test]
    fn validate_sync() {
        assert_eq!(SYNC_BYTES.len(), 6);
    }
}

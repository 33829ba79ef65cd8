//! RF-side PDU dispatch: once a [`crate::pdu::PduAssembler`] has produced a
//! complete, CRC-valid payload, this module decides what to do with it per
//! the SAP in the originating [`DataHeader`](crate::pdu::DataHeader) and
//! owns the single per-site retry buffer used to answer `ACK_RETRY`.
//!
//! This is deliberately a thin decision layer: it never touches the modem
//! or network sink itself, it returns an [`Action`] describing what the
//! caller (the modem/peer-network adapter) should do next, matching the
//! propagation policy in `error.rs` of never unwinding across a boundary.

use crate::consts::timing::MAX_PDU_RETRY_CNT;
use crate::pdu::{ack, sap, DataHeader};

/// A parsed 22-byte P25 ARP packet (RFC 826 laid out over LLID/IPv4 fields
/// instead of Ethernet/IP headers).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ArpPacket {
    pub is_request: bool,
    pub sender_llid: u32,
    pub sender_ip: [u8; 4],
    pub target_llid: u32,
    pub target_ip: [u8; 4],
}

const ARP_PACKET_LENGTH: usize = 22;
const ARP_OPCODE_REQUEST: u16 = 0x0001;

impl ArpPacket {
    /// Parse a 22-byte ARP payload. Returns `None` if the buffer is the
    /// wrong length; the opcode isn't validated beyond request/reply.
    pub fn parse(data: &[u8]) -> Option<ArpPacket> {
        if data.len() != ARP_PACKET_LENGTH {
            return None;
        }

        let opcode = u16::from_be_bytes([data[6], data[7]]);
        let sender_llid = u32::from_be_bytes([0, data[8], data[9], data[10]]);
        let sender_ip = [data[11], data[12], data[13], data[14]];
        let target_llid = u32::from_be_bytes([0, data[15], data[16], data[17]]);
        let target_ip = [data[18], data[19], data[20], data[21]];

        Some(ArpPacket {
            is_request: opcode == ARP_OPCODE_REQUEST,
            sender_llid,
            sender_ip,
            target_llid,
            target_ip,
        })
    }

    /// Build the reply to this request: sender/target swapped, with `our_ip`
    /// as the new sender's address and `our_llid` as the new sender LLID.
    pub fn build_reply(&self, our_llid: u32, our_ip: [u8; 4]) -> [u8; ARP_PACKET_LENGTH] {
        let mut out = [0u8; ARP_PACKET_LENGTH];
        out[6..8].copy_from_slice(&0x0002u16.to_be_bytes());
        out[8..11].copy_from_slice(&our_llid.to_be_bytes()[1..]);
        out[11..15].copy_from_slice(&our_ip);
        out[15..18].copy_from_slice(&self.sender_llid.to_be_bytes()[1..]);
        out[18..22].copy_from_slice(&self.sender_ip);
        out
    }
}

/// What the caller should do after a completed PDU is dispatched.
#[derive(Debug, Eq, PartialEq)]
pub enum Action {
    /// Send this ARP reply back on the air.
    ArpReply([u8; ARP_PACKET_LENGTH]),
    /// An ARP reply was received; the peer's hardware address is now known.
    ArpLearned { llid: u32, ip: [u8; 4] },
    /// Write this IPv4 datagram to the virtual tunnel and answer with an ACK.
    WriteTunnel { llid: u32, datagram: Vec<u8> },
    /// Feed this payload to the SNDCP context factory for `llid`.
    Sndcp { llid: u32 },
    /// Queue a conventional data-registration decision for the wait timer.
    ConventionalReg { source_id: u32 },
    /// Hand the header + payload to the TSBK factory as an Alternate MBT.
    TrunkControl,
    /// The retry buffer was cleared by a clean ACK.
    RetryCleared,
    /// The originator NACKed; nothing is resent, just logged.
    RetryNacked { nack_type: u8 },
    /// Resend these buffered bits in answer to an ACK_RETRY.
    RetryResend { bits: Vec<u8>, bit_length: usize },
    /// Retry budget exhausted: send NACK_UNDELIVERABLE and drop the buffer.
    RetryUndeliverable,
    /// Not destined for this host; repeat on the air if configured to.
    Repeat,
    /// Destination SAP/format combination this engine does not act on.
    Ignored,
}

/// The single-entry retry buffer described in spec §3 "Retry buffer":
/// one outstanding confirmed transfer per site, resent on `ACK_RETRY` up
/// to [`MAX_PDU_RETRY_CNT`] times.
#[derive(Debug, Default)]
pub struct RetryBuffer {
    buffered: Option<BufferedPdu>,
}

#[derive(Debug)]
struct BufferedPdu {
    bits: Vec<u8>,
    bit_length: usize,
    retry_count: u8,
}

impl RetryBuffer {
    pub fn new() -> RetryBuffer {
        RetryBuffer::default()
    }

    /// Record a freshly sent confirmed PDU, replacing anything buffered.
    pub fn store(&mut self, bits: Vec<u8>, bit_length: usize) {
        self.buffered = Some(BufferedPdu { bits, bit_length, retry_count: 0 });
    }

    pub fn clear(&mut self) {
        self.buffered = None;
    }

    pub fn is_empty(&self) -> bool {
        self.buffered.is_none()
    }

    /// Handle a `RESPONSE`-format PDU matching this buffer: ACK clears it,
    /// NACK is logged, ACK_RETRY resends up to the retry cap.
    pub fn handle_response(&mut self, class: u8, rs_type: u8) -> Action {
        match class {
            ack::CLASS_ACK => {
                self.clear();
                Action::RetryCleared
            }
            ack::CLASS_NACK => {
                self.clear();
                Action::RetryNacked { nack_type: rs_type }
            }
            ack::CLASS_ACK_RETRY => {
                let Some(buffered) = self.buffered.as_mut() else {
                    return Action::RetryNacked { nack_type: rs_type };
                };

                if buffered.retry_count >= MAX_PDU_RETRY_CNT {
                    self.clear();
                    return Action::RetryUndeliverable;
                }

                buffered.retry_count += 1;
                Action::RetryResend { bits: buffered.bits.clone(), bit_length: buffered.bit_length }
            }
            _ => Action::Ignored,
        }
    }
}

/// Dispatch a fully reassembled, CRC-valid PDU payload per spec §4.5's
/// dispatch table. `header` is the data header that preceded the blocks;
/// `payload` is the user data with its trailing pad already trimmed.
pub fn dispatch(header: &DataHeader, payload: &[u8], our_llid: u32, our_ip: [u8; 4]) -> Action {
    if header.format == crate::pdu::format::RESPONSE {
        // Response-format PDUs are matched against the retry buffer by the
        // caller, which owns that state; see `RetryBuffer::handle_response`.
        return Action::Ignored;
    }

    match header.sap {
        sap::ARP => match ArpPacket::parse(payload) {
            Some(arp) if arp.is_request && arp.target_llid == our_llid => {
                Action::ArpReply(arp.build_reply(our_llid, our_ip))
            }
            Some(arp) if !arp.is_request => {
                Action::ArpLearned { llid: arp.sender_llid, ip: arp.sender_ip }
            }
            _ => Action::Ignored,
        },
        sap::PACKET_DATA => Action::WriteTunnel { llid: header.llid, datagram: payload.to_vec() },
        sap::SNDCP_CONTROL => Action::Sndcp { llid: header.llid },
        sap::REGISTRATION_AUTH => Action::ConventionalReg { source_id: header.llid },
        sap::TRUNKING_CONTROL if header.format == crate::pdu::format::AMBT => Action::TrunkControl,
        _ => Action::Repeat,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pdu::format;

    fn header(sap_id: u8, fmt: u8, llid: u32) -> DataHeader {
        DataHeader { sap: sap_id, format: fmt, llid, ..Default::default() }
    }

    #[test]
    fn test_arp_request_for_us_replies() {
        let our_llid = 0x00C350;
        let our_ip = [10, 0, 0, 1];

        let mut raw = [0u8; ARP_PACKET_LENGTH];
        raw[6..8].copy_from_slice(&ARP_OPCODE_REQUEST.to_be_bytes());
        raw[8..11].copy_from_slice(&0x001234u32.to_be_bytes()[1..]);
        raw[11..15].copy_from_slice(&[10, 0, 0, 2]);
        raw[15..18].copy_from_slice(&our_llid.to_be_bytes()[1..]);
        raw[18..22].copy_from_slice(&our_ip);

        let h = header(sap::ARP, format::UNCONFIRMED, our_llid);
        match dispatch(&h, &raw, our_llid, our_ip) {
            Action::ArpReply(reply) => {
                assert_eq!(u16::from_be_bytes([reply[6], reply[7]]), 0x0002);
                assert_eq!(&reply[18..22], &[10, 0, 0, 2]);
            }
            other => panic!("expected ArpReply, got {:?}", other),
        }
    }

    #[test]
    fn test_arp_reply_updates_table() {
        let mut raw = [0u8; ARP_PACKET_LENGTH];
        raw[6..8].copy_from_slice(&0x0002u16.to_be_bytes());
        raw[8..11].copy_from_slice(&0x0055AAu32.to_be_bytes()[1..]);
        raw[11..15].copy_from_slice(&[172, 16, 0, 9]);

        let h = header(sap::ARP, format::UNCONFIRMED, 0x00C350);
        assert_eq!(
            dispatch(&h, &raw, 0x00C350, [10, 0, 0, 1]),
            Action::ArpLearned { llid: 0x0055AA, ip: [172, 16, 0, 9] }
        );
    }

    #[test]
    fn test_packet_data_writes_tunnel() {
        let h = header(sap::PACKET_DATA, format::UNCONFIRMED, 0x00C350);
        let payload = vec![1, 2, 3, 4];
        assert_eq!(
            dispatch(&h, &payload, 0, [0; 4]),
            Action::WriteTunnel { llid: 0x00C350, datagram: payload }
        );
    }

    #[test]
    fn test_sndcp_control_routes_to_factory() {
        let h = header(sap::SNDCP_CONTROL, format::UNCONFIRMED, 0x00C350);
        assert_eq!(dispatch(&h, &[], 0, [0; 4]), Action::Sndcp { llid: 0x00C350 });
    }

    #[test]
    fn test_conventional_registration_queues() {
        let h = header(sap::REGISTRATION_AUTH, format::UNCONFIRMED, 4001);
        assert_eq!(dispatch(&h, &[], 0, [0; 4]), Action::ConventionalReg { source_id: 4001 });
    }

    #[test]
    fn test_ambt_trunk_control_routes() {
        let h = header(sap::TRUNKING_CONTROL, format::AMBT, 0);
        assert_eq!(dispatch(&h, &[], 0, [0; 4]), Action::TrunkControl);
    }

    #[test]
    fn test_unhandled_sap_repeats_on_air() {
        let h = header(sap::USER_DATA, format::UNCONFIRMED, 4001);
        assert_eq!(dispatch(&h, &[], 0, [0; 4]), Action::Repeat);
    }

    #[test]
    fn test_retry_buffer_ack_clears() {
        let mut rb = RetryBuffer::new();
        rb.store(vec![0xAA; 25], 200);
        assert_eq!(rb.handle_response(ack::CLASS_ACK, ack::TYPE_ACK), Action::RetryCleared);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_retry_buffer_nack_clears_without_resend() {
        let mut rb = RetryBuffer::new();
        rb.store(vec![0xBB; 25], 200);
        assert_eq!(
            rb.handle_response(ack::CLASS_NACK, ack::TYPE_NACK_PACKET_CRC),
            Action::RetryNacked { nack_type: ack::TYPE_NACK_PACKET_CRC }
        );
        assert!(rb.is_empty());
    }

    #[test]
    fn test_retry_buffer_resends_up_to_cap_then_undeliverable() {
        let mut rb = RetryBuffer::new();
        rb.store(vec![0xCC; 25], 200);

        for _ in 0..MAX_PDU_RETRY_CNT {
            match rb.handle_response(ack::CLASS_ACK_RETRY, 0) {
                Action::RetryResend { bit_length, .. } => assert_eq!(bit_length, 200),
                other => panic!("expected resend, got {:?}", other),
            }
        }

        assert_eq!(rb.handle_response(ack::CLASS_ACK_RETRY, 0), Action::RetryUndeliverable);
        assert!(rb.is_empty());
    }
}

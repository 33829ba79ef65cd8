//! Packet Data Unit: the data header, confirmed/unconfirmed/response block
//! codecs, and the reassembly buffer that turns a run of PDU blocks back
//! into one logical packet.
//!
//! The header and unconfirmed blocks are 12 decoded bytes, trellis-coded
//! at half rate into the same 25-byte FEC shape as a TSBK block. Confirmed
//! blocks carry a 2-byte per-block serial+CRC9 header ahead of 16 bytes of
//! data (18 bytes decoded) and are trellis-coded at 3/4 rate into the same
//! 25 FEC bytes. See DESIGN.md for why this supersedes the 4-byte header
//! figure in earlier notes.

use crate::bitbuf::{get_bits, set_bit, set_bits};
use crate::bits::{Dibit, DibitBytes, Dibits, TribitBytes, Tribits};
use crate::coding::crc::{CRC16, CRC32, CRC9};
use crate::coding::trellis::{DibitDecoder, DibitFSM, TribitDecoder, TribitFSM};
use crate::consts::{
    MAX_PDU_BLOCKS, MAX_PDU_LENGTH, PDU_CONFIRMED_DATA_LENGTH_BYTES, PDU_CONFIRMED_LENGTH_BYTES,
    PDU_FEC_LENGTH_BYTES, PDU_HEADER_LENGTH_BYTES, PDU_UNCONFIRMED_LENGTH_BYTES,
};
use crate::error::{P25Error, Result};

/// Data packet opcode carried in the header's 5-bit format field.
pub mod format {
    pub const RESPONSE: u8 = 0x03;
    pub const UNCONFIRMED: u8 = 0x15;
    pub const CONFIRMED: u8 = 0x16;
    pub const AMBT: u8 = 0x17;
}

/// Service access point, identifying the payload carried by a PDU.
pub mod sap {
    pub const USER_DATA: u8 = 0x00;
    pub const ENCRYPTED_USER_DATA: u8 = 0x01;
    pub const PACKET_DATA: u8 = 0x04;
    pub const ARP: u8 = 0x05;
    pub const SNDCP_CONTROL: u8 = 0x06;
    pub const EXTENDED_ADDRESSING: u8 = 0x1F;
    pub const REGISTRATION_AUTH: u8 = 0x20;
    pub const CHANNEL_REASSIGNMENT: u8 = 0x21;
    pub const SYSTEM_CONFIGURATION: u8 = 0x22;
    pub const LOOPBACK: u8 = 0x23;
    pub const OUT_OF_SERVICE: u8 = 0x25;
    pub const PAGING: u8 = 0x26;
    pub const UNENCRYPTED_KEY_MGMT: u8 = 0x28;
    pub const ENCRYPTED_KEY_MGMT: u8 = 0x29;
    pub const TRUNKING_CONTROL: u8 = 0x3D;
}

/// Acknowledgment class/type values carried by a response-format PDU.
pub mod ack {
    pub const CLASS_ACK: u8 = 0x00;
    pub const CLASS_NACK: u8 = 0x01;
    pub const CLASS_ACK_RETRY: u8 = 0x02;

    pub const TYPE_ACK: u8 = 0x01;

    pub const TYPE_NACK_ILLEGAL: u8 = 0x00;
    pub const TYPE_NACK_PACKET_CRC: u8 = 0x01;
    pub const TYPE_NACK_MEMORY_FULL: u8 = 0x02;
    pub const TYPE_NACK_SEQ: u8 = 0x03;
    pub const TYPE_NACK_UNDELIVERABLE: u8 = 0x04;
    pub const TYPE_NACK_OUT_OF_SEQ: u8 = 0x05;
    pub const TYPE_NACK_INVL_USER: u8 = 0x06;
}

/// The 10-byte (+2-byte CRC) data header that precedes every PDU's blocks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DataHeader {
    /// Sender is requesting a confirmed (ack'd) transfer.
    pub ack_needed: bool,
    /// True when travelling from the fixed network to a subscriber.
    pub outbound: bool,
    pub format: u8,
    pub sap: u8,
    pub mfid: u8,
    /// Logical link ID: source or destination radio/talkgroup ID.
    pub llid: u32,
    /// This is a complete, single-block message (no blocks follow).
    pub full_message: bool,
    pub blocks_to_follow: u8,
    pub pad_count: u8,
    /// Resynchronize flag, confirmed transfers only.
    pub resync: bool,
    /// Send sequence number N(S), confirmed transfers only.
    pub ns: u8,
    /// Fragment sequence number, confirmed transfers only.
    pub fsn: u8,
    pub offset: u8,
}

impl Default for DataHeader {
    fn default() -> DataHeader {
        DataHeader {
            ack_needed: false,
            outbound: false,
            format: format::UNCONFIRMED,
            sap: sap::PACKET_DATA,
            mfid: 0,
            llid: 0,
            full_message: true,
            blocks_to_follow: 0,
            pad_count: 0,
            resync: false,
            ns: 0,
            fsn: 0,
            offset: 0,
        }
    }
}

impl DataHeader {
    fn to_bytes(&self) -> [u8; 10] {
        let mut buf = [0u8; 10];
        set_bit(&mut buf, 0, self.ack_needed as u8);
        set_bit(&mut buf, 1, self.outbound as u8);
        set_bits(&mut buf, 3, 5, self.format as u32);
        set_bits(&mut buf, 8, 2, 0b11);
        set_bits(&mut buf, 10, 6, self.sap as u32);
        set_bits(&mut buf, 16, 8, self.mfid as u32);
        set_bits(&mut buf, 24, 24, self.llid);
        set_bit(&mut buf, 48, self.full_message as u8);
        set_bits(&mut buf, 49, 7, self.blocks_to_follow as u32);
        set_bits(&mut buf, 56, 5, self.pad_count as u32);

        if self.format == format::CONFIRMED {
            set_bit(&mut buf, 64, self.resync as u8);
            set_bits(&mut buf, 65, 3, self.ns as u32);
            set_bits(&mut buf, 68, 4, self.fsn as u32);
        }

        set_bits(&mut buf, 74, 6, self.offset as u32);
        buf
    }

    fn from_bytes(buf: &[u8; 10]) -> DataHeader {
        let format = get_bits(buf, 3, 5) as u8;

        DataHeader {
            ack_needed: get_bits(buf, 0, 1) != 0,
            outbound: get_bits(buf, 1, 1) != 0,
            format,
            sap: get_bits(buf, 10, 6) as u8,
            mfid: get_bits(buf, 16, 8) as u8,
            llid: get_bits(buf, 24, 24),
            full_message: get_bits(buf, 48, 1) != 0,
            blocks_to_follow: get_bits(buf, 49, 7) as u8,
            pad_count: get_bits(buf, 56, 5) as u8,
            resync: format == format::CONFIRMED && get_bits(buf, 64, 1) != 0,
            ns: if format == format::CONFIRMED { get_bits(buf, 65, 3) as u8 } else { 0 },
            fsn: if format == format::CONFIRMED { get_bits(buf, 68, 4) as u8 } else { 0 },
            offset: get_bits(buf, 74, 6) as u8,
        }
    }

    /// Decoded (pre-FEC) byte layout: 10 field bytes followed by a CRC-16.
    fn pack(&self) -> [u8; PDU_HEADER_LENGTH_BYTES] {
        let fields = self.to_bytes();
        let crc = CRC16::new().feed_bytes(fields.iter().cloned()).finish() as u16;

        let mut block = [0u8; PDU_HEADER_LENGTH_BYTES];
        block[..10].copy_from_slice(&fields);
        block[10] = (crc >> 8) as u8;
        block[11] = crc as u8;
        block
    }

    fn unpack(block: &[u8; PDU_HEADER_LENGTH_BYTES]) -> (DataHeader, bool) {
        let mut fields = [0u8; 10];
        fields.copy_from_slice(&block[..10]);

        let received = ((block[10] as u16) << 8) | block[11] as u16;
        let computed = CRC16::new().feed_bytes(fields.iter().cloned()).finish() as u16;

        (DataHeader::from_bytes(&fields), received == computed)
    }
}

fn half_rate_encode(block: &[u8; PDU_HEADER_LENGTH_BYTES]) -> [u8; PDU_FEC_LENGTH_BYTES] {
    let mut fsm = DibitFSM::new();
    let mut coded = Vec::with_capacity(100);

    for dibit in Dibits::new(block.iter().cloned()) {
        let (hi, lo) = fsm.feed(dibit);
        coded.push(hi);
        coded.push(lo);
    }

    let (hi, lo) = fsm.finish();
    coded.push(hi);
    coded.push(lo);
    coded.push(Dibit::new(0));
    coded.push(Dibit::new(0));

    let mut fec = [0u8; PDU_FEC_LENGTH_BYTES];
    for (i, byte) in DibitBytes::new(coded.into_iter()).enumerate() {
        fec[i] = byte;
    }
    fec
}

fn half_rate_decode(fec: &[u8; PDU_FEC_LENGTH_BYTES]) -> Result<[u8; PDU_HEADER_LENGTH_BYTES]> {
    let coded: Vec<Dibit> = Dibits::new(fec.iter().cloned()).take(98).collect();

    let mut symbols = Vec::with_capacity(49);
    for result in DibitDecoder::new(coded.into_iter()) {
        symbols.push(result.map_err(|_| P25Error::TrellisFail)?);
    }
    symbols.truncate(48);

    let mut block = [0u8; PDU_HEADER_LENGTH_BYTES];
    for (i, byte) in DibitBytes::new(symbols.into_iter()).enumerate() {
        block[i] = byte;
    }
    Ok(block)
}

fn three_quarter_encode(block: &[u8; PDU_CONFIRMED_LENGTH_BYTES]) -> [u8; PDU_FEC_LENGTH_BYTES] {
    let mut fsm = TribitFSM::new();
    let mut coded = Vec::with_capacity(100);

    for tribit in Tribits::new(block.iter().cloned()) {
        let (hi, lo) = fsm.feed(tribit);
        coded.push(hi);
        coded.push(lo);
    }

    let (hi, lo) = fsm.finish();
    coded.push(hi);
    coded.push(lo);
    coded.push(Dibit::new(0));
    coded.push(Dibit::new(0));

    let mut fec = [0u8; PDU_FEC_LENGTH_BYTES];
    for (i, byte) in DibitBytes::new(coded.into_iter()).enumerate() {
        fec[i] = byte;
    }
    fec
}

fn three_quarter_decode(fec: &[u8; PDU_FEC_LENGTH_BYTES]) -> Result<[u8; PDU_CONFIRMED_LENGTH_BYTES]> {
    let coded: Vec<Dibit> = Dibits::new(fec.iter().cloned()).take(98).collect();

    let mut symbols = Vec::with_capacity(49);
    for result in TribitDecoder::new(coded.into_iter()) {
        symbols.push(result.map_err(|_| P25Error::TrellisFail)?);
    }
    symbols.truncate(48);

    let mut block = [0u8; PDU_CONFIRMED_LENGTH_BYTES];
    for (i, byte) in TribitBytes::new(symbols.into_iter()).enumerate() {
        block[i] = byte;
    }
    Ok(block)
}

/// Encode a data header into its 25-byte FEC block.
pub fn encode_header(header: &DataHeader) -> [u8; PDU_FEC_LENGTH_BYTES] {
    half_rate_encode(&header.pack())
}

/// Decode a 25-byte FEC block into a data header. A CRC mismatch is
/// reported in the returned flag rather than as an error, mirroring how
/// the caller decides whether to trust a corrupted header.
pub fn decode_header(fec: &[u8; PDU_FEC_LENGTH_BYTES]) -> Result<(DataHeader, bool)> {
    let block = half_rate_decode(fec)?;
    Ok(DataHeader::unpack(&block))
}

/// Encode one unconfirmed data block (12 bytes of user data, no per-block
/// header) into its 25-byte FEC block.
pub fn encode_unconfirmed_block(data: &[u8; PDU_UNCONFIRMED_LENGTH_BYTES]) -> [u8; PDU_FEC_LENGTH_BYTES] {
    half_rate_encode(data)
}

pub fn decode_unconfirmed_block(fec: &[u8; PDU_FEC_LENGTH_BYTES]) -> Result<[u8; PDU_UNCONFIRMED_LENGTH_BYTES]> {
    half_rate_decode(fec)
}

/// Encode one confirmed data block: a 7-bit serial number and 9-bit CRC-9
/// ahead of 16 bytes of user data, 3/4-rate trellis coded.
pub fn encode_confirmed_block(
    serial: u8,
    data: &[u8; PDU_CONFIRMED_DATA_LENGTH_BYTES],
) -> [u8; PDU_FEC_LENGTH_BYTES] {
    let sn = serial & 0x7F;
    let crc = CRC9::new().feed_bits(sn, 7).feed_bytes(data.iter().cloned()).finish() as u16;

    let mut block = [0u8; PDU_CONFIRMED_LENGTH_BYTES];
    block[0] = (sn << 1) | ((crc >> 8) as u8 & 0x01);
    block[1] = crc as u8;
    block[2..].copy_from_slice(data);

    three_quarter_encode(&block)
}

/// Decode one confirmed data block, returning its serial number, data, and
/// whether the per-block CRC-9 matched.
pub fn decode_confirmed_block(
    fec: &[u8; PDU_FEC_LENGTH_BYTES],
) -> Result<(u8, [u8; PDU_CONFIRMED_DATA_LENGTH_BYTES], bool)> {
    let block = three_quarter_decode(fec)?;

    let sn = block[0] >> 1;
    let received = (((block[0] & 0x01) as u16) << 8) | block[1] as u16;

    let mut data = [0u8; PDU_CONFIRMED_DATA_LENGTH_BYTES];
    data.copy_from_slice(&block[2..]);

    let computed = CRC9::new().feed_bits(sn, 7).feed_bytes(data.iter().cloned()).finish() as u16;

    Ok((sn, data, received == computed))
}

/// A response-format PDU (ack/nack of a confirmed transfer), carried in a
/// single header-shaped 12-byte block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ResponsePdu {
    pub class: u8,
    pub rs_type: u8,
    /// Observed behavior echoes the originating header's `Ns` into this
    /// field rather than carrying a standard status code; treat it as an
    /// opaque echo, not a meaningful value, and round-trip it unchanged.
    pub status: u8,
    pub llid: u32,
}

impl ResponsePdu {
    fn pack(&self) -> [u8; PDU_HEADER_LENGTH_BYTES] {
        let mut fields = [0u8; 10];
        set_bits(&mut fields, 3, 5, format::RESPONSE as u32);
        set_bits(&mut fields, 16, 2, self.class as u32);
        set_bits(&mut fields, 18, 3, self.rs_type as u32);
        set_bits(&mut fields, 21, 3, self.status as u32);
        set_bits(&mut fields, 24, 24, self.llid);

        let crc = CRC16::new().feed_bytes(fields.iter().cloned()).finish() as u16;
        let mut block = [0u8; PDU_HEADER_LENGTH_BYTES];
        block[..10].copy_from_slice(&fields);
        block[10] = (crc >> 8) as u8;
        block[11] = crc as u8;
        block
    }

    fn unpack(block: &[u8; PDU_HEADER_LENGTH_BYTES]) -> (ResponsePdu, bool) {
        let mut fields = [0u8; 10];
        fields.copy_from_slice(&block[..10]);

        let received = ((block[10] as u16) << 8) | block[11] as u16;
        let computed = CRC16::new().feed_bytes(fields.iter().cloned()).finish() as u16;

        let pdu = ResponsePdu {
            class: get_bits(&fields, 16, 2) as u8,
            rs_type: get_bits(&fields, 18, 3) as u8,
            status: get_bits(&fields, 21, 3) as u8,
            llid: get_bits(&fields, 24, 24),
        };

        (pdu, received == computed)
    }
}

pub fn encode_response(pdu: &ResponsePdu) -> [u8; PDU_FEC_LENGTH_BYTES] {
    half_rate_encode(&pdu.pack())
}

pub fn decode_response(fec: &[u8; PDU_FEC_LENGTH_BYTES]) -> Result<(ResponsePdu, bool)> {
    let block = half_rate_decode(fec)?;
    Ok(ResponsePdu::unpack(&block))
}

/// Reassembles a run of confirmed or unconfirmed data blocks into one
/// logical packet, following the block count and pad count declared in the
/// header that precedes them.
#[derive(Debug)]
pub struct PduAssembler {
    header: DataHeader,
    confirmed: bool,
    blocks_to_follow: usize,
    received: Vec<Option<Vec<u8>>>,
}

impl PduAssembler {
    pub fn new(header: DataHeader) -> Result<PduAssembler> {
        if header.blocks_to_follow as usize > MAX_PDU_BLOCKS as usize {
            return Err(P25Error::PduTooManyBlocks);
        }

        let blocks_to_follow = header.blocks_to_follow as usize;
        Ok(PduAssembler {
            confirmed: header.format == format::CONFIRMED,
            header,
            blocks_to_follow,
            received: vec![None; blocks_to_follow],
        })
    }

    pub fn header(&self) -> &DataHeader {
        &self.header
    }

    /// Feed one already-FEC-decoded confirmed block in, keyed by its
    /// sequence position (`fsn` modulo the window, or a running index
    /// supplied by the caller).
    pub fn push_confirmed(&mut self, index: usize, data: [u8; PDU_CONFIRMED_DATA_LENGTH_BYTES]) {
        if let Some(slot) = self.received.get_mut(index) {
            *slot = Some(data.to_vec());
        }
    }

    pub fn push_unconfirmed(&mut self, index: usize, data: [u8; PDU_UNCONFIRMED_LENGTH_BYTES]) {
        if let Some(slot) = self.received.get_mut(index) {
            *slot = Some(data.to_vec());
        }
    }

    pub fn is_complete(&self) -> bool {
        self.received.iter().all(Option::is_some)
    }

    /// Which block indices are still outstanding, for a selective-retry
    /// ack/nack.
    pub fn missing(&self) -> Vec<usize> {
        self.received
            .iter()
            .enumerate()
            .filter_map(|(i, b)| if b.is_none() { Some(i) } else { None })
            .collect()
    }

    /// Concatenate every block's data, trim the trailing pad bytes the
    /// header declared, and return the assembled packet payload.
    pub fn take_payload(&self) -> Result<Vec<u8>> {
        if !self.is_complete() {
            return Err(P25Error::UndeliverablePdu);
        }

        let mut payload = Vec::with_capacity(self.blocks_to_follow * 16);
        for block in &self.received {
            payload.extend_from_slice(block.as_ref().unwrap());
        }

        let pad = self.header.pad_count as usize;
        if pad > payload.len() || payload.len() > MAX_PDU_LENGTH + pad {
            return Err(P25Error::PduTooManyBlocks);
        }
        payload.truncate(payload.len() - pad);

        let _ = self.confirmed;
        Ok(payload)
    }
}

/// Whole-packet CRC-32, computed over the assembled data plus its trailing
/// pad bytes before they're trimmed.
pub fn packet_checksum(data: &[u8], pad_len: usize) -> u32 {
    CRC32::new()
        .feed_bytes(data.iter().cloned())
        .feed_bytes(std::iter::repeat(0u8).take(pad_len))
        .finish() as u32
}

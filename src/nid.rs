//! Network ID codec: stamps and recognizes the {NAC, DUID} tag carried by
//! every on-air frame.
//!
//! A NID is 64 bits: a 12-bit NAC and 4-bit DUID BCH(63,16)-encoded
//! together, followed by a single P25 parity bit. Decoding is tolerant —
//! the observed 8 bytes are compared against every known DUID pattern for
//! the current NAC, and the closest match within `MAX_NID_ERRS` wins,
//! since the parity bit makes the LDU1/LDU2 patterns differ from the rest
//! by exactly one bit and a syndrome-based BCH decode alone can't see it.

use crate::bitbuf::{decode_bit_range, encode_bit_range};
use crate::coding::bch;
use crate::consts::{NID_END_BIT, NID_LENGTH_BYTES, NID_START_BIT};
use crate::error::{P25Error, Result};

/// Maximum Hamming distance (in bits) tolerated between a received NID and
/// a known pattern before it is rejected. Six or fewer bit errors recover;
/// seven or more do not.
pub const MAX_NID_ERRS: u32 = 7;

/// Data Unit ID: identifies the kind of frame a NID is attached to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Duid {
    Hdu,
    Tdu,
    Ldu1,
    Tsdu,
    Ldu2,
    Pdu,
    Tdulc,
}

impl Duid {
    /// All DUIDs a NID pattern is precomputed for, in a fixed order used
    /// to rank equidistant matches deterministically.
    pub const ALL: [Duid; 7] = [
        Duid::Hdu,
        Duid::Tdu,
        Duid::Ldu1,
        Duid::Tsdu,
        Duid::Ldu2,
        Duid::Pdu,
        Duid::Tdulc,
    ];

    /// The 4-bit on-air DUID code.
    pub fn code(self) -> u8 {
        match self {
            Duid::Hdu => 0x00,
            Duid::Tdu => 0x03,
            Duid::Ldu1 => 0x05,
            Duid::Tsdu => 0x07,
            Duid::Ldu2 => 0x0A,
            Duid::Pdu => 0x0C,
            Duid::Tdulc => 0x0F,
        }
    }

    /// Whether this DUID's NID carries the P25 parity bit set. Only the
    /// two voice-frame DUIDs do.
    fn parity_set(self) -> bool {
        matches!(self, Duid::Ldu1 | Duid::Ldu2)
    }
}

/// One precomputed 8-byte NID pattern for a given NAC and DUID.
type Pattern = [u8; NID_LENGTH_BYTES];

fn build_pattern(nac: u16, duid: Duid) -> Pattern {
    let byte0 = (nac >> 4) as u8;
    let byte1 = ((nac << 4) as u8) | duid.code();

    let word = (byte0 as u16) << 8 | byte1 as u16;
    let codeword = bch::encode(word);

    let mut bytes = codeword.to_be_bytes();
    // `bch::encode` carries its own P25 parity choice in the LSB; force it
    // to the per-DUID value NID.cpp uses instead.
    if duid.parity_set() {
        bytes[7] |= 1;
    } else {
        bytes[7] &= !1;
    }

    bytes
}

/// Builds and tolerantly recognizes NID patterns for one NAC (or, with
/// split Rx/Tx, two).
pub struct Nid {
    rx_nac: u16,
    rx_patterns: [Pattern; 7],
    tx_patterns: Option<[Pattern; 7]>,
    /// "Digital squelch"/"reuse Rx NAC" mode: rebuild the pattern table
    /// for whatever NAC is observed on each decode instead of enforcing a
    /// fixed one.
    accept_any_nac: bool,
}

impl Nid {
    /// Precompute patterns for all seven DUIDs under the given NAC.
    pub fn new(nac: u16) -> Nid {
        Nid {
            rx_nac: nac,
            rx_patterns: Self::build_all(nac),
            tx_patterns: None,
            accept_any_nac: false,
        }
    }

    /// Construct a `Nid` that accepts any NAC on decode, rebuilding its
    /// comparison patterns for whatever NAC was actually observed. Used
    /// for digital-squelch / reuse-Rx-NAC scanner modes.
    pub fn new_accept_any(nac: u16) -> Nid {
        let mut n = Self::new(nac);
        n.accept_any_nac = true;
        n
    }

    fn build_all(nac: u16) -> [Pattern; 7] {
        let mut patterns = [[0u8; NID_LENGTH_BYTES]; 7];
        for (i, &duid) in Duid::ALL.iter().enumerate() {
            patterns[i] = build_pattern(nac, duid);
        }
        patterns
    }

    /// Switch to an independent Tx pattern table. A no-op if `nac` equals
    /// the already-active Rx NAC, matching `NID::setTxNAC`.
    pub fn set_tx_nac(&mut self, nac: u16) {
        if nac == self.rx_nac {
            self.tx_patterns = None;
            return;
        }

        self.tx_patterns = Some(Self::build_all(nac));
    }

    /// Extract the NID bit range from `frame` (deinterleaved through the
    /// status-bit plane) and match it against the known patterns. Returns
    /// the recognized DUID, or `NidMismatch` if no pattern is within
    /// tolerance.
    pub fn decode(&mut self, frame: &[u8]) -> Result<Duid> {
        let mut packed = [0u8; NID_LENGTH_BYTES];
        decode_bit_range(frame, &mut packed, NID_START_BIT, NID_END_BIT);

        if self.accept_any_nac {
            let nac = ((packed[0] as u16) << 4) | (packed[1] as u16 >> 4);
            self.rx_nac = nac;
            self.rx_patterns = Self::build_all(nac);
        }

        best_match(&self.rx_patterns, &packed)
    }

    /// Write the pattern for `duid` into `frame`'s NID bit range, using
    /// the Tx pattern table if one was set.
    pub fn encode(&self, frame: &mut [u8], duid: Duid) {
        let patterns = self.tx_patterns.as_ref().unwrap_or(&self.rx_patterns);
        let idx = Duid::ALL.iter().position(|&d| d == duid).expect("known DUID");
        encode_bit_range(&patterns[idx], frame, NID_START_BIT, NID_END_BIT);
    }
}

fn best_match(patterns: &[Pattern; 7], observed: &Pattern) -> Result<Duid> {
    let mut best: Option<(Duid, u32)> = None;

    for (i, &duid) in Duid::ALL.iter().enumerate() {
        let dist = hamming_distance(&patterns[i], observed);
        if dist < MAX_NID_ERRS {
            match best {
                Some((_, best_dist)) if best_dist <= dist => {}
                _ => best = Some((duid, dist)),
            }
        }
    }

    best.map(|(duid, _)| duid).ok_or(P25Error::NidMismatch)
}

fn hamming_distance(a: &Pattern, b: &Pattern) -> u32 {
    a.iter().zip(b.iter()).map(|(&x, &y)| (x ^ y).count_ones()).sum()
}

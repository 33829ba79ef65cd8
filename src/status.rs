//! Status-symbol plane: the two dibits (SS0, SS1) inserted every 72 bits
//! into every on-air payload, independent of DUID.
//!
//! `bitbuf::decode_bit_range`/`encode_bit_range` already skip over these
//! positions when packing/unpacking payload bits; this module is for the
//! encode side filling them back in with the busy/idle/unknown pattern a
//! transmitting site advertises.

use crate::bitbuf::set_bit;
use crate::consts::{SS0_START, SS_INCREMENT};

/// Set one status-symbol pair (two bits) at bit offset `pos` (which must
/// land on an SS0 position) within `frame`.
pub fn set_status_bits(frame: &mut [u8], pos: usize, b1: u8, b2: u8) {
    set_bit(frame, pos, b1);
    set_bit(frame, pos + 1, b2);
}

/// Fill every status-symbol pair in `[0, length)` with the "unknown"
/// pattern (1, 0).
pub fn add_unknown_status_bits(frame: &mut [u8], length: usize) {
    let mut pos = SS0_START;
    while pos + 1 < length {
        set_status_bits(frame, pos, 1, 0);
        pos += SS_INCREMENT;
    }
}

/// Fill every status-symbol pair in `[0, length)` with the "idle" pattern
/// (0, 1).
pub fn add_idle_status_bits(frame: &mut [u8], length: usize) {
    let mut pos = SS0_START;
    while pos + 1 < length {
        set_status_bits(frame, pos, 0, 1);
        pos += SS_INCREMENT;
    }
}

/// Fill every status-symbol pair in `frame` with "unknown", then overwrite
/// alternating pairs with `busy` (1,0 while transmitting) or the idle
/// pattern, matching the reference host's `addStatusBits`.
pub fn add_status_bits(frame: &mut [u8], length: usize, busy: bool, unknown: bool) {
    add_unknown_status_bits(frame, length);

    if unknown {
        return;
    }

    let pattern = if busy { (1, 0) } else { (0, 1) };

    let mut pos = SS0_START;
    let mut toggle = false;
    while pos + 1 < length {
        if toggle {
            set_status_bits(frame, pos, pattern.0, pattern.1);
        }
        toggle = !toggle;
        pos += SS_INCREMENT;
    }
}

/// Fill status bits starting from the idle pattern at the first position,
/// then continue with `add_status_bits`'s busy/idle alternation. Used
/// around frame boundaries where the leading status pair must read idle
/// regardless of the overall busy/unknown state.
pub fn set_status_bits_start_idle(frame: &mut [u8], length: usize, busy: bool) {
    add_status_bits(frame, length, busy, false);
    if SS0_START + 1 < length {
        set_status_bits(frame, SS0_START, 0, 1);
    }
}

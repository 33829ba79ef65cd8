//! Forward error correction and checksum codecs shared by the NID, TSBK, TDULC, and
//! PDU layers: Galois field arithmetic, BCH(63,16) for the NID, Berlekamp-Massey/
//! Chien/Forney decoding shared by BCH and Reed-Solomon, the (24,12) Reed-Solomon
//! code used by TDULC, the half- and 3/4-rate trellis (Viterbi) codes used by TSBK
//! and PDU blocks, and the CRC-9/16/32 checksums used across the trunking and
//! packet-data layers.

#[macro_use]
pub mod galois;

pub mod bch;
pub mod bmcf;
pub mod crc;
pub mod reed_solomon;
pub mod trellis;

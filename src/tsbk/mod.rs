//! Trunking Signalling Block: control-channel messages carried one to
//! three per TSDU (see [`crate::mbf`] for the three-block packing).

pub mod codec;
pub mod consts;
pub mod opcodes;

pub use codec::{decode, encode, TsbkHeader};
pub use opcodes::{Channel, Opcode};

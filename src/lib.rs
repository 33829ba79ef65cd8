//! A Project 25 (P25) trunked control-channel engine: NID/DUID framing,
//! TSBK and TDULC codecs, PDU reassembly, the control-channel scheduler,
//! the grant/affiliation manager, and the FNE-side packet-data handler.
//!
//! The modem driver and baseband I/O, the config/YAML loader, the CLI and
//! activity-log sinks, the radio-ID/talkgroup-ACL file formats, and the
//! IMBE voice audio pipeline are external collaborators, not implemented
//! here; see `config.rs` for the contract those collaborators fill in.

pub mod bitbuf;
pub mod bits;
pub mod coding;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod grant;
pub mod handler;
pub mod lookups;
pub mod mbf;
pub mod nid;
pub mod packetdata;
pub mod pdu;
pub mod rest;
pub mod rfdata;
pub mod site;
pub mod sndcp;
pub mod status;
pub mod tdulc;
pub mod timers;
pub mod tsbk;

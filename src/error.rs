//! Standard errors that may occur when running the P25 protocol engine.

use thiserror::Error;

/// P25 runtime errors.
///
/// The core never unwinds across a public boundary: every fallible operation in
/// this crate returns one of these instead, and callers convert it into an
/// on-air response, a log line, or a state reset per the propagation policy.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum P25Error {
    /// Too many errors were detected when attempting a BCH decode.
    #[error("BCH decode unrecoverable")]
    BchUnrecoverable,
    /// Too many errors were detected when attempting a Reed-Solomon decode.
    #[error("Reed-Solomon decode unrecoverable")]
    ReedSolomonUnrecoverable,
    /// An ambiguous symbol or too many errors were detected during Trellis/Viterbi
    /// decode.
    #[error("Trellis decode unrecoverable")]
    TrellisFail,
    /// The decoded NID did not match any known DUID pattern within tolerance.
    #[error("NID did not match any known DUID pattern")]
    NidMismatch,
    /// A TSBK or PDU block failed its CRC check.
    #[error("CRC check failed")]
    CrcFail,
    /// A PDU header declared more blocks than the engine will reassemble.
    #[error("PDU declared too many blocks to follow")]
    PduTooManyBlocks,
    /// The (MFID, LCO) pair did not resolve to a known TSBK opcode.
    #[error("unrecognized TSBK opcode")]
    UnknownOpcode,
    /// An ACL or unsupported-service check rejected the request.
    #[error("policy denied request")]
    PolicyDeny,
    /// A per-peer call was evicted after sitting silent past the collision timeout.
    #[error("stale call evicted by collision timeout")]
    CollisionTimeout,
    /// The voice-channel node refused (or failed to answer) a permit-to-use REST call.
    #[error("voice channel refused permit-to-use")]
    RestPermitFail,
    /// A confirmed PDU exhausted its retry budget without being acknowledged.
    #[error("PDU undeliverable after exhausting retries")]
    UndeliverablePdu,
}

/// Standard result using [`P25Error`].
pub type Result<T> = std::result::Result<T, P25Error>;

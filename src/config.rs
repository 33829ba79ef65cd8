//! The configuration surface the engine is driven by.
//!
//! Parsing the YAML that produces this struct is out of scope (§1); this
//! is the contract an external loader fills in before constructing
//! [`crate::engine::Engine`].

use serde::Deserialize;

/// Runtime knobs controlling trunking, policy, and logging behavior.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// This host issues permit-to-use REST calls rather than deferring to
    /// another authoritative node.
    pub authoritative: bool,
    /// This host is a supervisor allowed to issue grants directly.
    pub supervisor: bool,

    /// Site runs a dedicated control channel carrying only TSBKs.
    pub control_only: bool,
    /// Dedicated-control mode: no voice traffic interleaved on this channel.
    pub dedicated_control: bool,
    /// Voice-on-control mode: TSBKs interleaved with voice traffic.
    pub voice_on_control: bool,

    /// Acknowledge TSBK requests that do not otherwise require a response.
    pub ack_tsbk_requests: bool,
    /// Suppress ACKs to IOSP_STS_UPDT.
    pub no_status_ack: bool,
    /// Suppress ACKs to IOSP_MSG_UPDT.
    pub no_message_ack: bool,

    /// Run the `VALID_SRCID`/`VALID_DSTID`/unit-to-unit availability check.
    pub unit_to_unit_avail_check: bool,
    /// Require prior group affiliation before granting (`VERIFY_SRCID_AFF`).
    pub verify_aff: bool,
    /// Require prior unit registration before granting (`VERIFY_SRCID_REG`).
    pub verify_reg: bool,

    /// Announce SNDCP channel grants on the control channel.
    pub sndcp_ch_grant: bool,
    /// Support SNDCP packet-data contexts at all.
    pub sndcp_support: bool,

    /// Emit `OSP_TIME_DATE_ANN` on the scheduler's overlay cadence.
    pub ctrl_time_date_ann: bool,
    /// Pack TSBKs into three-block MBF TSDUs instead of single-block TSDUs.
    pub ctrl_tsdu_mbf: bool,

    /// Auto-send an inhibit `IOSP_EXT_FNCT` to sources that fail an ACL check.
    pub inhibit_illegal: bool,
    /// Repeat PDU frames not destined for this host back out on the air.
    pub repeat_pdu: bool,
    /// Log PDU payload bytes at `trace!` granularity.
    pub dump_pdu_data: bool,
    /// Log decoded TSBK fields at `trace!` granularity.
    pub dump_tsbk: bool,

    /// Treat all talkgroups in a configured "super group" as one for
    /// patch purposes.
    pub patch_super_group: bool,
    /// Seconds between adjacent-site aging ticks (floor 30s per spec §5).
    pub adj_site_update_interval: u32,

    /// Log (don't drop) TSBK/PDU CRC failures instead of rejecting them.
    pub warn_crc: bool,

    /// Swap `srcId`/`dstId` in `IOSP_ACK_RSP` when `AIV=false` and
    /// `dstId != 0`, a vendor-compatibility accommodation rather than
    /// standard behavior. See DESIGN.md "Open Question decisions".
    pub ack_rsp_swap_ids: bool,
    /// Enable DVM-specific, non-standard MFID opcodes (e.g. LC_CALL_TERM
    /// carried as a TSBK) for interop with that vendor's infrastructure.
    pub dvm_extensions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            authoritative: true,
            supervisor: true,
            control_only: false,
            dedicated_control: false,
            voice_on_control: true,
            ack_tsbk_requests: true,
            no_status_ack: false,
            no_message_ack: false,
            unit_to_unit_avail_check: true,
            verify_aff: false,
            verify_reg: false,
            sndcp_ch_grant: false,
            sndcp_support: false,
            ctrl_time_date_ann: true,
            ctrl_tsdu_mbf: true,
            inhibit_illegal: false,
            repeat_pdu: true,
            dump_pdu_data: false,
            dump_tsbk: false,
            patch_super_group: false,
            adj_site_update_interval: 30,
            warn_crc: false,
            ack_rsp_swap_ids: false,
            dvm_extensions: false,
        }
    }
}

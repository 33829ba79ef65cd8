//! Radio-ID and talkgroup-rules lookups: read-mostly tables shared across
//! the trunking opcode handler, each behind its own mutex so a lookup
//! never blocks a caller on another table's traffic.
//!
//! Parsing the radio-ID CSV and talkgroup-rules YAML formats themselves is
//! out of scope; this module only models the in-memory result a loader
//! hands to the engine and the query surface the opcode handler needs.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Deserialize;

/// One radio ID's ACL entry: whether it's allowed on the air at all, and
/// an optional display alias.
#[derive(Clone, Debug, Deserialize)]
pub struct RadioIdEntry {
    pub radio_id: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub alias: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// One talkgroup's ACL entry.
#[derive(Clone, Debug, Deserialize)]
pub struct TalkgroupEntry {
    pub talkgroup_id: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub affiliated_only: bool,
}

/// The radio-ID ACL, keyed by radio ID.
#[derive(Default)]
pub struct RadioIdTable {
    entries: Mutex<HashMap<u32, RadioIdEntry>>,
}

impl RadioIdTable {
    pub fn new() -> RadioIdTable {
        RadioIdTable::default()
    }

    pub fn load(entries: Vec<RadioIdEntry>) -> RadioIdTable {
        let table = RadioIdTable::new();
        {
            let mut map = table.entries.lock().unwrap();
            for entry in entries {
                map.insert(entry.radio_id, entry);
            }
        }
        table
    }

    /// Whether `radio_id` is allowed on the air. An ID absent from the
    /// table is treated as invalid, matching a closed ACL.
    pub fn is_valid(&self, radio_id: u32) -> bool {
        self.entries.lock().unwrap().get(&radio_id).map(|e| e.enabled).unwrap_or(false)
    }

    pub fn alias(&self, radio_id: u32) -> Option<String> {
        self.entries.lock().unwrap().get(&radio_id).and_then(|e| e.alias.clone())
    }
}

/// The talkgroup ACL, keyed by talkgroup ID.
#[derive(Default)]
pub struct TalkgroupTable {
    entries: Mutex<HashMap<u32, TalkgroupEntry>>,
}

impl TalkgroupTable {
    pub fn new() -> TalkgroupTable {
        TalkgroupTable::default()
    }

    pub fn load(entries: Vec<TalkgroupEntry>) -> TalkgroupTable {
        let table = TalkgroupTable::new();
        {
            let mut map = table.entries.lock().unwrap();
            for entry in entries {
                map.insert(entry.talkgroup_id, entry);
            }
        }
        table
    }

    pub fn is_valid(&self, talkgroup_id: u32) -> bool {
        self.entries.lock().unwrap().get(&talkgroup_id).map(|e| e.enabled).unwrap_or(false)
    }

    pub fn requires_affiliation(&self, talkgroup_id: u32) -> bool {
        self.entries.lock().unwrap().get(&talkgroup_id).map(|e| e.affiliated_only).unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unknown_radio_id_is_invalid() {
        let table = RadioIdTable::new();
        assert!(!table.is_valid(1234));
    }

    #[test]
    fn test_loaded_radio_id_respected() {
        let table = RadioIdTable::load(vec![
            RadioIdEntry { radio_id: 1, enabled: true, alias: Some("N2PLL".into()) },
            RadioIdEntry { radio_id: 2, enabled: false, alias: None },
        ]);

        assert!(table.is_valid(1));
        assert!(!table.is_valid(2));
        assert_eq!(table.alias(1).as_deref(), Some("N2PLL"));
    }

    #[test]
    fn test_talkgroup_affiliation_requirement() {
        let table = TalkgroupTable::load(vec![TalkgroupEntry {
            talkgroup_id: 5000,
            enabled: true,
            affiliated_only: true,
        }]);

        assert!(table.is_valid(5000));
        assert!(table.requires_affiliation(5000));
        assert!(!table.requires_affiliation(9999));
    }
}

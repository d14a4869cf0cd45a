//! Decoding of the cluster's departed-member descriptors.

#![allow(missing_docs)]

use std::sync::OnceLock;

use regex::Regex;

use crate::core::errors::{MonError, Result};

/// A member that has left the cluster, as reported in `membersDeparted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartedMember {
    pub node_id: String,
    pub timestamp: String,
    pub address: String,
    pub machine_id: String,
    pub location: String,
    pub role: String,
}

fn descriptor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^Member\(Id=(\d+), Timestamp=([^,]+), Address=([^,]+), MachineId=([^,]+), Location=(.*), Role=([^)]*)\)$",
        )
        .unwrap_or_else(|e| unreachable!("static departed-member regex: {e}"))
    })
}

/// Parse every descriptor; any malformed entry fails the whole batch.
pub fn decode_departed(descriptors: &[String]) -> Result<Vec<DepartedMember>> {
    descriptors
        .iter()
        .map(|raw| {
            let caps = descriptor_re()
                .captures(raw.trim())
                .ok_or_else(|| MonError::Decode {
                    context: "departed members".to_string(),
                    details: format!("unrecognised member descriptor {raw:?}"),
                })?;
            Ok(DepartedMember {
                node_id: caps[1].to_string(),
                timestamp: caps[2].to_string(),
                address: caps[3].to_string(),
                machine_id: caps[4].to_string(),
                location: caps[5].to_string(),
                role: caps[6].to_string(),
            })
        })
        .collect()
}

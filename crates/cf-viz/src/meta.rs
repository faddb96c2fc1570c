use std::time::{SystemTime, UNIX_EPOCH};

use cf_core::Result;
use serde::{Deserialize, Serialize};

/// Provenance stamped into every artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Producing tool.
    pub tool: String,
    /// Version of the producing tool.
    pub tool_version: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_unix_ms: u128,
}

impl ArtifactMeta {
    /// Metadata for an artifact created now.
    pub fn now() -> Result<Self> {
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| cf_core::Error::Computation(format!("system time error: {}", e)))?;
        Ok(Self {
            tool: "cutflow".to_string(),
            tool_version: cf_core::VERSION.to_string(),
            created_unix_ms: d.as_millis(),
        })
    }
}

use crate::room::RoomConfig;
use crate::transport::TransportConfig;
use serde::Deserialize;

/// Top-level configuration of a mesh participant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub transport: TransportConfig,
    pub room: RoomConfig,
}

impl MeshConfig {
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

use pearmo_core::utils::DEFAULT_DATA_CHANNEL_LABEL;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomConfig {
    /// On hang-up the room document is deleted unless it holds more participants than this.
    pub delete_threshold: usize,
    /// How many times a colliding participant id is regenerated before a join gives up.
    pub max_id_retries: u32,
    pub data_channel_label: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            delete_threshold: 2,
            max_id_retries: 5,
            data_channel_label: DEFAULT_DATA_CHANNEL_LABEL.to_owned(),
        }
    }
}

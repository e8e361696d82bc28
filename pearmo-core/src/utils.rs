pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Top-level collection holding room documents.
pub const ROOMS_COLLECTION: &str = "rooms";

/// Sub-collection of a room holding its connection documents.
pub const CONNECTIONS_COLLECTION: &str = "connections";

/// Label of the data channel opened by the offering side.
pub const DEFAULT_DATA_CHANNEL_LABEL: &str = "messages";

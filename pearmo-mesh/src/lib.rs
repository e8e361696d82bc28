mod config;
mod error;
pub mod negotiation;
pub mod room;
pub mod store;
pub mod transport;

pub use config::*;
pub use error::*;
pub use negotiation::{Coordinator, IdGenerator, MeshHandle, MeshStatus, SessionStatus};
pub use room::{JoinReport, LoggingBehavior, RoomBehavior, RoomConfig, RoomContext};
pub use store::{MemoryStore, SignalingStore, StoreError, Subscription};
pub use transport::{
    PeerEngine, PeerKey, PeerTransport, TransportConfig, TransportEvent, WebRtcEngine,
};

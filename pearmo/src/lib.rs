pub use pearmo_core::model::{ParticipantId, RoomId};

pub mod model {
    pub use pearmo_core::model::*;
}

#[cfg(feature = "mesh")]
pub mod mesh {
    pub use pearmo_mesh::*;
}

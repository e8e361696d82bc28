use crate::error::MeshResult;
use crate::negotiation::MeshStatus;
use crate::room::JoinReport;
use pearmo_core::RoomId;
use tokio::sync::oneshot;

/// Requests sent from a [`MeshHandle`](crate::negotiation::MeshHandle) to its coordinator.
#[derive(Debug)]
pub(crate) enum RoomCommand {
    CreateRoom {
        reply: oneshot::Sender<MeshResult<RoomId>>,
    },

    JoinRoom {
        room: RoomId,
        reply: oneshot::Sender<MeshResult<JoinReport>>,
    },

    HangUp {
        reply: oneshot::Sender<MeshResult<()>>,
    },

    Status {
        reply: oneshot::Sender<MeshStatus>,
    },
}

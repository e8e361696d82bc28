use crate::error::{MeshError, MeshResult};
use crate::negotiation::{NegotiationRole, NegotiationState};
use crate::room::{JoinReport, RoomCommand, RoomContext};
use pearmo_core::{ConnectionRef, ParticipantId, RoomId};
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub remote: ParticipantId,
    pub connection: ConnectionRef,
    pub role: NegotiationRole,
    pub state: NegotiationState,
}

/// Snapshot of a coordinator, sessions ordered by remote id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshStatus {
    pub participant_id: ParticipantId,
    pub room: Option<RoomId>,
    pub sessions: Vec<SessionStatus>,
}

impl MeshStatus {
    pub fn session(&self, remote: &ParticipantId) -> Option<&SessionStatus> {
        self.sessions.iter().find(|session| &session.remote == remote)
    }

    /// Every session finished negotiating, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.sessions.iter().all(|session| session.state.is_terminal())
    }
}

/// Cloneable entry point to a running [`Coordinator`](crate::negotiation::Coordinator).
#[derive(Clone)]
pub struct MeshHandle {
    command_tx: mpsc::Sender<RoomCommand>,
    context: RoomContext,
}

impl MeshHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<RoomCommand>, context: RoomContext) -> Self {
        Self {
            command_tx,
            context,
        }
    }

    /// Creates a room holding only this participant and returns its id for sharing.
    pub async fn create_room(&self) -> MeshResult<RoomId> {
        self.request(|reply| RoomCommand::CreateRoom { reply }).await?
    }

    /// Joins an existing room and sends an offer to everyone already in it.
    pub async fn join_room(&self, room: RoomId) -> MeshResult<JoinReport> {
        self.request(|reply| RoomCommand::JoinRoom { room, reply }).await?
    }

    /// Closes every session and cleans up this participant's documents. A no-op outside a
    /// room.
    pub async fn hang_up(&self) -> MeshResult<()> {
        self.request(|reply| RoomCommand::HangUp { reply }).await?
    }

    pub async fn status(&self) -> MeshResult<MeshStatus> {
        self.request(|reply| RoomCommand::Status { reply }).await
    }

    /// The current id, which may differ from the initial one after a join resolved a
    /// collision.
    pub async fn participant_id(&self) -> MeshResult<ParticipantId> {
        Ok(self.status().await?.participant_id)
    }

    pub fn context(&self) -> RoomContext {
        self.context.clone()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> MeshResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| MeshError::CoordinatorClosed)?;
        reply_rx.await.map_err(|_| MeshError::CoordinatorClosed)
    }
}

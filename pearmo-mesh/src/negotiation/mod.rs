use crate::config::MeshConfig;
use crate::room::{RoomBehavior, RoomCommand, RoomConfig, RoomContext};
use crate::store::{SignalingStore, Subscription};
use crate::transport::{PeerEngine, PeerTransport, TransportEvent, WebRtcEngine};
use dashmap::DashMap;
use pearmo_core::{CandidateSnapshot, ConnectionSnapshot, ParticipantId, RoomId, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

mod collect_candidates_impl;
mod create_offer_impl;
mod handle_remote_answer_impl;
mod handle_remote_offer_impl;
mod handle_signal_impl;
mod handle_transport_event_impl;
mod mesh_handle;
mod negotiation_state;
mod peer_session;

pub use mesh_handle::*;
pub use negotiation_state::*;
pub(crate) use peer_session::*;

/// Produces participant ids; called again whenever the current id collides in a room.
pub type IdGenerator = Arc<dyn Fn() -> ParticipantId + Send + Sync>;

pub(crate) struct ActiveRoom {
    pub(crate) id: RoomId,
    pub(crate) connection_watch: Option<Subscription>,
}

/// Per-participant actor that owns room membership and every negotiation with the other
/// participants. All state is touched only from [`Coordinator::run`].
pub struct Coordinator {
    pub(crate) participant_id: ParticipantId,
    pub(crate) room: Option<ActiveRoom>,
    pub(crate) sessions: HashMap<ParticipantId, PeerSession>,
    /// Last offer time applied per offering participant.
    pub(crate) offer_times: HashMap<ParticipantId, Timestamp>,
    /// Last answer time applied per answering participant.
    pub(crate) answer_times: HashMap<ParticipantId, Timestamp>,
    pub(crate) peers_data: Arc<DashMap<ParticipantId, Arc<dyn PeerTransport>>>,
    pub(crate) store: Arc<dyn SignalingStore>,
    pub(crate) engine: Arc<dyn PeerEngine>,
    pub(crate) behavior: Box<dyn RoomBehavior>,
    pub(crate) config: RoomConfig,
    pub(crate) id_generator: IdGenerator,
    pub(crate) connection_tx: mpsc::UnboundedSender<ConnectionSnapshot>,
    connection_rx: mpsc::UnboundedReceiver<ConnectionSnapshot>,
    pub(crate) candidate_tx: mpsc::UnboundedSender<CandidateSnapshot>,
    candidate_rx: mpsc::UnboundedReceiver<CandidateSnapshot>,
    pub(crate) transport_tx: mpsc::Sender<TransportEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn SignalingStore>,
        engine: Arc<dyn PeerEngine>,
        behavior: Box<dyn RoomBehavior>,
        config: RoomConfig,
    ) -> Self {
        let id_generator: IdGenerator = Arc::new(ParticipantId::generate);
        let (connection_tx, connection_rx) = mpsc::unbounded_channel();
        let (candidate_tx, candidate_rx) = mpsc::unbounded_channel();
        let (transport_tx, transport_rx) = mpsc::channel(256);

        Self {
            participant_id: id_generator(),
            room: None,
            sessions: HashMap::new(),
            offer_times: HashMap::new(),
            answer_times: HashMap::new(),
            peers_data: Arc::new(DashMap::new()),
            store,
            engine,
            behavior,
            config,
            id_generator,
            connection_tx,
            connection_rx,
            candidate_tx,
            candidate_rx,
            transport_tx,
            transport_rx,
        }
    }

    /// Coordinator whose peer connections are real webrtc-rs connections.
    pub fn with_webrtc(
        store: Arc<dyn SignalingStore>,
        behavior: Box<dyn RoomBehavior>,
        config: MeshConfig,
    ) -> Self {
        let engine = Arc::new(WebRtcEngine::new(config.transport));
        Self::new(store, engine, behavior, config.room)
    }

    /// Replaces the id generator and draws a fresh participant id from it.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> ParticipantId + Send + Sync + 'static,
    {
        self.id_generator = Arc::new(generator);
        self.participant_id = (self.id_generator)();
        self
    }

    pub fn with_participant_id(mut self, participant_id: impl Into<ParticipantId>) -> Self {
        self.participant_id = participant_id.into();
        self
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// Starts the actor on the current tokio runtime. The coordinator hangs up and stops once
    /// every handle is dropped.
    pub fn spawn(self) -> MeshHandle {
        let (command_tx, command_rx) = mpsc::channel(32);
        let handle = MeshHandle::new(command_tx, self.context());
        tokio::spawn(self.run(command_rx));
        handle
    }

    pub(crate) fn context(&self) -> RoomContext {
        RoomContext::new(self.peers_data.clone())
    }

    pub(crate) async fn run(mut self, mut command_rx: mpsc::Receiver<RoomCommand>) {
        info!("Coordinator for {} started", self.participant_id);

        loop {
            tokio::select! {
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All handles of {} dropped. Shutting down.", self.participant_id);
                            break;
                        }
                    }
                }

                Some(snapshot) = self.connection_rx.recv() => {
                    self.handle_signal(snapshot).await;
                }

                Some(snapshot) = self.candidate_rx.recv() => {
                    self.handle_remote_candidate(snapshot).await;
                }

                Some(event) = self.transport_rx.recv() => {
                    self.handle_transport_event(event).await;
                }
            }
        }

        if self.room.is_some() {
            if let Err(e) = self.hang_up().await {
                warn!("Hang-up on shutdown of {} failed: {}", self.participant_id, e);
            }
        }
        info!("Coordinator for {} finished", self.participant_id);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::CreateRoom { reply } => {
                let result = self.create_room().await;
                let _ = reply.send(result);
            }

            RoomCommand::JoinRoom { room, reply } => {
                let result = self.join_room(room).await;
                let _ = reply.send(result);
            }

            RoomCommand::HangUp { reply } => {
                let result = self.hang_up().await;
                let _ = reply.send(result);
            }

            RoomCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    pub(crate) fn status(&self) -> MeshStatus {
        let mut sessions: Vec<SessionStatus> = self
            .sessions
            .values()
            .map(|session| SessionStatus {
                remote: session.remote.clone(),
                connection: session.connection.clone(),
                role: session.role,
                state: session.state,
            })
            .collect();
        sessions.sort_by(|a, b| a.remote.cmp(&b.remote));

        MeshStatus {
            participant_id: self.participant_id.clone(),
            room: self.room.as_ref().map(|active| active.id.clone()),
            sessions,
        }
    }
}

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use pearmo_core::{IceCandidate, ParticipantId, SessionDescription};
use pearmo_mesh::{PeerEngine, PeerKey, PeerTransport, TransportEvent};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Everything a [`FakeTransport`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct FakeState {
    pub data_channel: Option<String>,
    pub local: Option<SessionDescription>,
    pub remote: Option<SessionDescription>,
    /// Number of successful remote description applications.
    pub remote_sets: usize,
    pub candidates: Vec<IceCandidate>,
    pub sent: Vec<Bytes>,
    pub closed: bool,
    pub open: bool,
}

/// Scriptable peer connection. Setting the local description "gathers" exactly one
/// candidate, and the data channel opens once both descriptions are set.
pub struct FakeTransport {
    owner: String,
    key: PeerKey,
    events: mpsc::Sender<TransportEvent>,
    state: Mutex<FakeState>,
}

impl FakeTransport {
    fn new(owner: &str, key: PeerKey, events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            owner: owner.to_owned(),
            key,
            events,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn key(&self) -> &PeerKey {
        &self.key
    }

    pub fn state(&self) -> FakeState {
        self.state.lock().unwrap().clone()
    }

    /// The candidate this transport reports on `set_local_description`.
    pub fn local_candidate(&self) -> String {
        format!("candidate:{}-{}", self.owner, self.key.remote)
    }

    /// Simulates an incoming data channel message.
    pub fn deliver(&self, data: Bytes) {
        let _ = self
            .events
            .try_send(TransportEvent::Message(self.key.clone(), data));
    }

    /// Simulates the remote peer going away.
    pub fn disconnect(&self) {
        let _ = self
            .events
            .try_send(TransportEvent::Disconnected(self.key.clone()));
    }

    fn open_if_ready(&self, state: &mut FakeState) {
        if state.local.is_some() && state.remote.is_some() && !state.open {
            state.open = true;
            let _ = self
                .events
                .try_send(TransportEvent::DataChannelOpen(self.key.clone()));
        }
    }
}

#[async_trait]
impl PeerTransport for FakeTransport {
    fn remote(&self) -> &ParticipantId {
        &self.key.remote
    }

    async fn open_data_channel(&self, label: &str) -> Result<()> {
        self.state.lock().unwrap().data_channel = Some(label.to_owned());
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        Ok(SessionDescription::offer(format!(
            "v=0 offer {}->{}",
            self.owner, self.key.remote
        )))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        if self.state.lock().unwrap().remote.is_none() {
            bail!("Cannot answer without a remote offer");
        }
        Ok(SessionDescription::answer(format!(
            "v=0 answer {}->{}",
            self.owner, self.key.remote
        )))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.local.is_some() {
            bail!("Local description already set");
        }
        state.local = Some(desc);

        let mut candidate = IceCandidate::new(self.local_candidate());
        candidate.sdp_mid = Some("0".to_owned());
        candidate.sdp_m_line_index = Some(0);
        let _ = self
            .events
            .try_send(TransportEvent::CandidateGenerated(self.key.clone(), candidate));

        self.open_if_ready(&mut state);
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.remote.is_some() {
            bail!("Remote description already set");
        }
        state.remote = Some(desc);
        state.remote_sets += 1;
        self.open_if_ready(&mut state);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.remote.is_none() {
            bail!("Candidate before remote description");
        }
        if candidate.candidate.is_empty() {
            bail!("Malformed candidate");
        }
        state.candidates.push(candidate);
        Ok(())
    }

    async fn send(&self, data: Bytes) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.open || state.closed {
            bail!("Data channel is not open");
        }
        state.sent.push(data);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Creates [`FakeTransport`]s and keeps every one of them for inspection.
#[derive(Clone)]
pub struct FakeEngine {
    owner: String,
    transports: Arc<Mutex<Vec<Arc<FakeTransport>>>>,
}

impl FakeEngine {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            transports: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Latest transport created for `remote`.
    pub fn transport(&self, remote: &ParticipantId) -> Option<Arc<FakeTransport>> {
        self.transports
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|t| &t.key.remote == remote)
            .cloned()
    }

    pub fn transport_count(&self) -> usize {
        self.transports.lock().unwrap().len()
    }
}

#[async_trait]
impl PeerEngine for FakeEngine {
    async fn create_peer(
        &self,
        key: PeerKey,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = Arc::new(FakeTransport::new(&self.owner, key, events));
        self.transports.lock().unwrap().push(transport.clone());
        Ok(transport as Arc<dyn PeerTransport>)
    }
}

use crate::transport::{PeerEngine, PeerKey, PeerTransport, TransportConfig, TransportEvent};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use pearmo_core::{IceCandidate, ParticipantId, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;

type ChannelSlot = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// [`PeerEngine`] backed by webrtc-rs.
#[derive(Clone, Default)]
pub struct WebRtcEngine {
    config: TransportConfig,
}

impl WebRtcEngine {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PeerEngine for WebRtcEngine {
    async fn create_peer(
        &self,
        key: PeerKey,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let wrapper = ConnectionWrapper::new(key, self.config.clone(), events).await?;
        Ok(Arc::new(wrapper))
    }
}

pub struct ConnectionWrapper {
    pub key: PeerKey,
    pub peer_connection: Arc<RTCPeerConnection>,
    data_channel: ChannelSlot,
    event_tx: mpsc::Sender<TransportEvent>,
}

impl ConnectionWrapper {
    /// Creates the peer connection and wires its callbacks into `event_tx`.
    pub async fn new(
        key: PeerKey,
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );
        let data_channel: ChannelSlot = Arc::new(Mutex::new(None));

        let state_tx = event_tx.clone();
        let uid_state = key.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    info!("Peer connection state changed for {}: {:?}", uid, s);
                    match s {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(TransportEvent::Disconnected(uid)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        let uid_ice_state = key.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                info!("ICE connection state changed for {}: {:?}", uid_ice_state, s);
                Box::pin(async {})
            },
        ));

        let uid_gathering = key.clone();
        peer_connection.on_ice_gathering_state_change(Box::new(move |s: RTCIceGathererState| {
            debug!("ICE gathering state changed for {}: {:?}", uid_gathering, s);
            Box::pin(async {})
        }));

        let uid_signaling = key.clone();
        peer_connection.on_signaling_state_change(Box::new(move |s: RTCSignalingState| {
            debug!("Signaling state changed for {}: {:?}", uid_signaling, s);
            Box::pin(async {})
        }));

        // Renegotiation is not supported; the event is only reported.
        let uid_negotiation = key.clone();
        peer_connection.on_negotiation_needed(Box::new(move || {
            debug!("Negotiation needed for {}", uid_negotiation);
            Box::pin(async {})
        }));

        let ice_tx = event_tx.clone();
        let uid_ice = key.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let uid = uid_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else {
                    debug!("ICE gathering complete for {}", uid);
                    return;
                };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize local candidate for {}: {}", uid, e);
                        return;
                    }
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(uid, candidate))
                    .await;
            })
        }));

        let dc_tx = event_tx.clone();
        let dc_slot = data_channel.clone();
        let uid_dc = key.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let slot = dc_slot.clone();
            let uid = uid_dc.clone();

            Box::pin(async move {
                debug!("Remote data channel '{}' announced by {}", dc.label(), uid);
                *slot.lock().await = Some(dc.clone());
                setup_data_channel(&dc, uid, tx);
            })
        }));

        Ok(Self {
            key,
            peer_connection,
            data_channel,
            event_tx,
        })
    }
}

fn setup_data_channel(
    dc: &Arc<RTCDataChannel>,
    uid: PeerKey,
    tx: mpsc::Sender<TransportEvent>,
) {
    let tx_open = tx.clone();
    let uid_open = uid.clone();
    let label = dc.label().to_owned();
    dc.on_open(Box::new(move || {
        Box::pin(async move {
            info!("Data channel '{}' open with {}", label, uid_open);
            let _ = tx_open.send(TransportEvent::DataChannelOpen(uid_open)).await;
        })
    }));

    let tx_close = tx.clone();
    let uid_close = uid.clone();
    dc.on_close(Box::new(move || {
        let tx = tx_close.clone();
        let uid = uid_close.clone();
        Box::pin(async move {
            info!("Data channel closed with {}", uid);
            let _ = tx.send(TransportEvent::DataChannelClosed(uid)).await;
        })
    }));

    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx.clone();
        let uid = uid.clone();
        Box::pin(async move {
            let bytes = Bytes::from(msg.data.to_vec());
            debug!("Received {} bytes from {}", bytes.len(), uid);
            let _ = tx.send(TransportEvent::Message(uid, bytes)).await;
        })
    }));
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription> {
    let rtc = match desc.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpType::Answer => RTCSessionDescription::answer(desc.sdp)?,
        SdpType::Pranswer => RTCSessionDescription::pranswer(desc.sdp)?,
        SdpType::Rollback => bail!("Rollback descriptions are not supported"),
    };
    Ok(rtc)
}

fn from_rtc_description(desc: RTCSessionDescription) -> Result<SessionDescription> {
    let sdp_type = match desc.sdp_type {
        RTCSdpType::Offer => SdpType::Offer,
        RTCSdpType::Answer => SdpType::Answer,
        RTCSdpType::Pranswer => SdpType::Pranswer,
        RTCSdpType::Rollback => SdpType::Rollback,
        RTCSdpType::Unspecified => bail!("Engine produced a description without type"),
    };
    Ok(SessionDescription {
        sdp_type,
        sdp: desc.sdp,
    })
}

#[async_trait]
impl PeerTransport for ConnectionWrapper {
    fn remote(&self) -> &ParticipantId {
        &self.key.remote
    }

    async fn open_data_channel(&self, label: &str) -> Result<()> {
        let dc = self
            .peer_connection
            .create_data_channel(label, None)
            .await
            .context("Failed to create data channel")?;
        setup_data_channel(&dc, self.key.clone(), self.event_tx.clone());
        *self.data_channel.lock().await = Some(dc);
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc_description(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc_description(answer)
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn send(&self, data: Bytes) -> Result<()> {
        let Some(dc) = self.data_channel.lock().await.clone() else {
            bail!("No data channel with {}", self.key);
        };
        if dc.ready_state() != RTCDataChannelState::Open {
            bail!(
                "Data channel with {} is {:?}",
                self.key,
                dc.ready_state()
            );
        }
        dc.send(&data).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Some(dc) = self.data_channel.lock().await.take() {
            let _ = dc.close().await;
        }
        self.peer_connection.close().await?;
        Ok(())
    }
}

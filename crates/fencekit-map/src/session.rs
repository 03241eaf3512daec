//! Map session lifecycle
//!
//! A [`MapSession`] owns one map handle and the inbound queue its listeners
//! deliver into. Sessions are never reused: reopening creates a new identity
//! and a new queue, so callbacks registered by an earlier session cannot
//! reach the current one.

use std::sync::Arc;

use fencekit_core::{Result, SessionError, SessionId};
use fencekit_settings::TimingSettings;
use tokio::sync::mpsc;

use crate::capability::{
    ContainerId, EventSink, Inbound, InboundSender, MapCapability, MapHandle, MapOptions,
};

/// Opens and closes map sessions against an injected capability
pub struct MapSessionManager {
    capability: Arc<dyn MapCapability>,
    timing: TimingSettings,
}

impl MapSessionManager {
    pub fn new(capability: Arc<dyn MapCapability>, timing: TimingSettings) -> Self {
        Self { capability, timing }
    }

    /// Whether the capability can create maps right now
    pub fn is_available(&self) -> bool {
        self.capability.is_available()
    }

    /// Poll until the capability is present, bounded by the configured timeout
    pub async fn wait_for_capability(&self) -> Result<()> {
        if self.capability.is_available() {
            return Ok(());
        }

        let poll = self.timing.capability_poll();
        tracing::debug!(
            "Map capability not loaded, polling every {}ms",
            self.timing.capability_poll_ms
        );

        let waited = tokio::time::timeout(self.timing.capability_timeout(), async {
            loop {
                tokio::time::sleep(poll).await;
                if self.capability.is_available() {
                    break;
                }
            }
        })
        .await;

        waited.map_err(|_| {
            tracing::warn!(
                "Map capability did not load within {}ms",
                self.timing.capability_timeout_ms
            );
            SessionError::CapabilityTimeout {
                timeout_ms: self.timing.capability_timeout_ms,
            }
            .into()
        })
    }

    /// Create a map bound to `container`
    pub fn open(&self, container: Option<&ContainerId>, options: MapOptions) -> Result<MapSession> {
        let container = container.ok_or(SessionError::ContainerMissing)?;
        if !self.capability.is_available() {
            return Err(SessionError::CapabilityUnavailable.into());
        }

        let map = self.capability.create_map(container, &options)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let session = MapSession {
            id: SessionId::new(),
            map: Some(map),
            tx,
            rx,
        };

        tracing::info!(
            session = %session.id,
            container = %container,
            center = %options.center,
            zoom = options.zoom,
            "Map session opened"
        );
        Ok(session)
    }

    /// Release every handle of `session`. Safe to call repeatedly.
    pub fn close(&self, session: &mut MapSession) {
        session.close();
    }
}

impl std::fmt::Debug for MapSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSessionManager")
            .field("available", &self.capability.is_available())
            .field("timing", &self.timing)
            .finish()
    }
}

/// One open map instance and its inbound event queue
pub struct MapSession {
    id: SessionId,
    map: Option<Box<dyn MapHandle>>,
    tx: InboundSender,
    rx: mpsc::UnboundedReceiver<Inbound>,
}

impl MapSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.map.is_some()
    }

    /// The live map handle
    pub fn map(&mut self) -> Result<&mut (dyn MapHandle + 'static)> {
        match self.map.as_mut() {
            Some(map) => Ok(map.as_mut()),
            None => Err(SessionError::SessionClosed.into()),
        }
    }

    /// A fresh listener endpoint scoped to this session
    pub fn sink(&self) -> EventSink {
        EventSink::new(self.id, self.tx.clone())
    }

    pub(crate) fn sender(&self) -> InboundSender {
        self.tx.clone()
    }

    pub(crate) fn try_recv(&mut self) -> Option<Inbound> {
        self.rx.try_recv().ok()
    }

    pub(crate) async fn recv(&mut self) -> Option<Inbound> {
        self.rx.recv().await
    }

    /// Destroy the map. Events still queued are dropped with the session.
    pub fn close(&mut self) {
        if let Some(mut map) = self.map.take() {
            map.destroy();
            tracing::info!(session = %self.id, "Map session closed");
        }
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .finish()
    }
}

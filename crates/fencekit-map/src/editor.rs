//! Geofence polygon editor
//!
//! Drives one map session at a time: opens the map, loads the drawing tool
//! plugin with a bounded wait, arms the one-shot drawing tool, renders the
//! single editable overlay and publishes the validated ring to the host with
//! a debounce. Provider events are queued on the session and handled by
//! [`GeofenceEditor::dispatch_pending`] or [`GeofenceEditor::dispatch_next`].

use std::sync::Arc;

use fencekit_core::{
    validate, DrawPhase, DrawingEvent, EditorEvent, Error, EventBus, LifecycleEvent, Result,
    Ring, SessionError, SessionId, MIN_POLYGON_POINTS,
};
use fencekit_settings::Config;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::capability::{
    ContainerId, Inbound, ListenerId, MapCapability, MapEvent, MapHandle, MapOptions, OverlayId,
};
use crate::notice_for;
use crate::overlay::OverlayManager;
use crate::publisher::DebouncedPublisher;
use crate::session::{MapSession, MapSessionManager};
use crate::tool::DrawingToolController;

/// Receives the editor's results
pub trait GeofenceHost: Send + Sync {
    /// The user confirmed a ring of at least three points
    fn on_finish(&self, ring: &Ring);

    /// The user dismissed the editor
    fn on_cancel(&self);

    /// Debounced copy of the current ring after every change
    fn on_ring_changed(&self, _ring: &Ring) {}
}

struct ActiveSession {
    map: MapSession,
    tool: DrawingToolController,
    overlay: OverlayManager,
    publisher: DebouncedPublisher<Ring>,
    plugin_deadline: Option<JoinHandle<()>>,
    plugin_timed_out: bool,
    ring: Ring,
}

impl ActiveSession {
    /// Overlay, then tool, then map
    fn teardown(&mut self) {
        self.overlay.destroy(self.map.map().ok());
        self.tool.reset();
        self.publisher.cancel();
        if let Some(deadline) = self.plugin_deadline.take() {
            deadline.abort();
        }
        self.map.close();
    }

    /// Back to an empty ring with no overlay and no tool
    fn clear_drawing(&mut self) {
        self.overlay.destroy(self.map.map().ok());
        self.tool.reset();
        self.ring = Ring::new();
    }

    fn render(&mut self, ring: &Ring) -> Result<OverlayId> {
        let adjust = self.map.sink();
        let drag_start = self.map.sink();
        let map = self.map.map()?;
        self.overlay.render(map, ring, adjust, drag_start)
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Interactive polygon editor bound to an injected map capability
pub struct GeofenceEditor {
    sessions: MapSessionManager,
    config: Config,
    host: Arc<dyn GeofenceHost>,
    bus: Arc<EventBus>,
    active: Option<ActiveSession>,
}

impl GeofenceEditor {
    pub fn new(
        capability: Arc<dyn MapCapability>,
        config: Config,
        host: Arc<dyn GeofenceHost>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            sessions: MapSessionManager::new(capability, config.timing.clone()),
            config,
            host,
            bus,
            active: None,
        }
    }

    /// Open a fresh session and seed it with `initial` points.
    ///
    /// Any previous session is torn down first. Waits for the capability up
    /// to the configured timeout; the drawing tool becomes usable once its
    /// plugin loads.
    pub async fn show(&mut self, container: Option<&ContainerId>, initial: &[Value]) -> Result<()> {
        self.hide();
        let result = self.open(container, initial).await;
        if let Err(e) = &result {
            self.report(e);
        }
        self.flush_transitions();
        result
    }

    async fn open(&mut self, container: Option<&ContainerId>, initial: &[Value]) -> Result<()> {
        if container.is_none() {
            return Err(SessionError::ContainerMissing.into());
        }
        self.sessions.wait_for_capability().await?;

        let center = self
            .config
            .map
            .center_coordinate()
            .map_err(|e| Error::other(e.to_string()))?;
        let options = MapOptions {
            center,
            zoom: self.config.map.zoom,
        };
        let mut map = self.sessions.open(container, options)?;
        let session = map.id();

        let plugin = self.config.plugins.draw_tool.clone();
        let plugin_sink = map.sink();
        let requested = map.map()?.load_plugin(&plugin, plugin_sink);
        let plugin_deadline = match requested {
            Ok(()) => Some(self.spawn_plugin_deadline(&map)),
            Err(e) => {
                let error = Error::from(e);
                tracing::error!("Failed to request plugin {}: {}", plugin, error);
                self.report(&error);
                None
            }
        };
        let plugin_failed = plugin_deadline.is_none();

        let publisher = {
            let tx = map.sender();
            DebouncedPublisher::new(self.config.timing.debounce(), move |ring| {
                let _ = tx.send(Inbound::Publish { session, ring });
            })
        };

        self.active = Some(ActiveSession {
            map,
            tool: DrawingToolController::new(),
            overlay: OverlayManager::new(self.config.polygon.clone()),
            publisher,
            plugin_deadline,
            plugin_timed_out: plugin_failed,
            ring: Ring::new(),
        });
        self.bus
            .publish(EditorEvent::Lifecycle(LifecycleEvent::Opened { session }));

        let seeded = validate(initial);
        if !seeded.is_empty() {
            if let Err(e) = self.seed(seeded) {
                tracing::error!("Failed to render initial ring: {}", e);
                self.report(&e);
            }
        }
        Ok(())
    }

    fn seed(&mut self, ring: Ring) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Err(SessionError::SessionClosed.into());
        };
        tracing::debug!("Seeding {} with {} points", active.map.id(), ring.len());
        active.ring = ring.clone();
        active.render(&ring)?;
        active.tool.enter_editing();
        Ok(())
    }

    fn spawn_plugin_deadline(&self, map: &MapSession) -> JoinHandle<()> {
        let tx = map.sender();
        let session = map.id();
        let timeout = self.config.timing.plugin_timeout();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Inbound::PluginDeadline { session });
        })
    }

    /// Tear down the session. Safe to call repeatedly or with nothing open.
    pub fn hide(&mut self) {
        if let Some(mut active) = self.active.take() {
            let session = active.map.id();
            active.teardown();
            self.bus
                .publish(EditorEvent::Lifecycle(LifecycleEvent::Closed { session }));
        }
    }

    /// Discard the current ring and let the user draw a new polygon
    pub fn start_drawing(&mut self) -> Result<()> {
        let result = self.try_start_drawing();
        if let Err(e) = &result {
            self.report(e);
        }
        self.flush_transitions();
        result
    }

    fn try_start_drawing(&mut self) -> Result<()> {
        let active = self.active.as_mut().ok_or(SessionError::SessionNotReady)?;
        if !active.map.is_open() || !active.tool.is_ready() {
            return Err(SessionError::SessionNotReady.into());
        }

        let had_points = !active.ring.is_empty();
        active.clear_drawing();
        if had_points {
            active.publisher.publish(Ring::new());
        }

        let sink = active.map.sink();
        let map = active.map.map()?;
        active.tool.arm(map, sink, &self.config.polygon)?;
        tracing::info!(session = %active.map.id(), "Drawing started");
        Ok(())
    }

    /// Remove the overlay and empty the ring
    pub fn clear(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.clear_drawing();
            active.publisher.publish(Ring::new());
            let session = active.map.id();
            self.bus.publish(EditorEvent::Drawing(DrawingEvent::RingUpdated {
                session,
                points: 0,
            }));
        }
        self.flush_transitions();
    }

    /// Hand the ring to the host. Needs at least three validated points.
    pub fn finish(&mut self) -> Result<Ring> {
        let result = match self.active.as_ref() {
            None => Err(SessionError::SessionClosed.into()),
            Some(active) if !active.ring.is_publishable() => {
                Err(SessionError::InsufficientPoints {
                    required: MIN_POLYGON_POINTS,
                    actual: active.ring.len(),
                }
                .into())
            }
            Some(active) => Ok(active.ring.clone()),
        };

        match result {
            Ok(ring) => {
                tracing::info!("Geofence finished with {} points", ring.len());
                self.host.on_finish(&ring);
                Ok(ring)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Tell the host the editor was dismissed, then tear down
    pub fn cancel(&mut self) {
        self.host.on_cancel();
        self.hide();
    }

    pub fn zoom_in(&mut self) -> Result<()> {
        self.with_map(|map| map.zoom_in().map_err(Error::from))
    }

    pub fn zoom_out(&mut self) -> Result<()> {
        self.with_map(|map| map.zoom_out().map_err(Error::from))
    }

    fn with_map<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut dyn MapHandle) -> Result<()>,
    {
        let active = self.active.as_mut().ok_or(SessionError::SessionClosed)?;
        f(active.map.map()?)
    }

    /// Handle every event already queued. Returns how many were handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(inbound) = self.active.as_mut().and_then(|a| a.map.try_recv()) {
            self.dispatch(inbound);
            handled += 1;
        }
        handled
    }

    /// Wait for the next event and handle it. Returns false with no session.
    pub async fn dispatch_next(&mut self) -> bool {
        let inbound = match self.active.as_mut() {
            Some(active) => active.map.recv().await,
            None => return false,
        };
        match inbound {
            Some(inbound) => {
                self.dispatch(inbound);
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, inbound: Inbound) {
        if self.session_id() != Some(inbound.session()) {
            tracing::debug!("Dropping event for stale {}", inbound.session());
            return;
        }

        let result = match inbound {
            Inbound::Map {
                listener, event, ..
            } => self.on_map_event(listener, event),
            Inbound::PluginDeadline { .. } => {
                self.on_plugin_deadline();
                Ok(())
            }
            Inbound::Publish { ring, .. } => {
                self.host.on_ring_changed(&ring);
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!("Map event failed: {}", e);
            self.report(&e);
        }
        self.flush_transitions();
    }

    fn on_map_event(&mut self, listener: ListenerId, event: MapEvent) -> Result<()> {
        match event {
            MapEvent::PluginLoaded { plugin } => {
                self.on_plugin_loaded(&plugin);
                Ok(())
            }
            MapEvent::Draw { path } => self.on_draw(listener, &path),
            MapEvent::Adjust => self.on_adjust(listener),
            MapEvent::DragStart => self.on_drag_start(listener),
            MapEvent::Click { .. } | MapEvent::DragEnd { .. } => Ok(()),
        }
    }

    fn on_plugin_loaded(&mut self, plugin: &str) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if plugin != self.config.plugins.draw_tool {
            tracing::debug!("Ignoring unrelated plugin {}", plugin);
            return;
        }
        if active.plugin_timed_out {
            tracing::debug!("Plugin {} arrived after its deadline, ignored", plugin);
            return;
        }
        if active.tool.is_ready() {
            return;
        }

        if let Some(deadline) = active.plugin_deadline.take() {
            deadline.abort();
        }
        active.tool.mark_ready();
        let session = active.map.id();
        tracing::info!(session = %session, "Drawing tool ready");
        self.bus
            .publish(EditorEvent::Lifecycle(LifecycleEvent::ToolReady { session }));
    }

    fn on_plugin_deadline(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.tool.is_ready() || active.plugin_timed_out {
            return;
        }
        active.plugin_timed_out = true;
        active.plugin_deadline = None;

        let session = active.map.id();
        let plugin = self.config.plugins.draw_tool.clone();
        let error: Error = SessionError::PluginTimeout {
            plugin: plugin.clone(),
            timeout_ms: self.config.timing.plugin_timeout_ms,
        }
        .into();
        tracing::warn!("{}: {}", session, error);
        self.bus.publish(EditorEvent::Lifecycle(LifecycleEvent::PluginTimedOut {
            session,
            plugin,
        }));
        self.report(&error);
    }

    fn on_draw(&mut self, listener: ListenerId, path: &[Value]) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if !active.tool.take_delivery(listener) {
            tracing::debug!("Ignoring repeated draw delivery from {}", listener);
            return Ok(());
        }
        active.tool.close_tool();

        let ring = validate(path);
        let session = active.map.id();
        tracing::info!(session = %session, points = ring.len(), "Drawing completed");

        active.ring = ring.clone();
        active.publisher.publish(ring.clone());
        self.bus.publish(EditorEvent::Drawing(DrawingEvent::RingUpdated {
            session,
            points: ring.len(),
        }));

        if ring.is_empty() {
            active.tool.reset();
            return Ok(());
        }
        // The validated ring stays authoritative even without an overlay.
        if let Err(e) = active.render(&ring) {
            active.tool.reset();
            return Err(e);
        }
        active.tool.enter_editing();
        Ok(())
    }

    fn on_adjust(&mut self, listener: ListenerId) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if !active.overlay.owns(listener) {
            tracing::debug!("Ignoring adjust from detached {}", listener);
            return Ok(());
        }

        let ring = validate(&active.overlay.path()?);
        let session = active.map.id();
        tracing::debug!("{} ring adjusted to {} points", session, ring.len());
        active.ring = ring.clone();
        active.publisher.publish(ring.clone());
        self.bus.publish(EditorEvent::Drawing(DrawingEvent::RingUpdated {
            session,
            points: ring.len(),
        }));
        Ok(())
    }

    fn on_drag_start(&mut self, listener: ListenerId) -> Result<()> {
        match self.active.as_mut() {
            Some(active) if active.overlay.owns(listener) => active.overlay.highlight_drag(),
            _ => Ok(()),
        }
    }

    fn flush_transitions(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let session = active.map.id();
        for (from, to) in active.tool.take_transitions() {
            self.bus
                .publish(EditorEvent::Drawing(DrawingEvent::PhaseChanged { session, from, to }));
        }
    }

    fn report(&self, error: &Error) {
        self.bus.notify(notice_for(error));
    }

    /// Phase of the drawing state machine; `Idle` with no session
    pub fn phase(&self) -> DrawPhase {
        self.active
            .as_ref()
            .map_or(DrawPhase::Idle, |a| a.tool.phase())
    }

    /// Authoritative validated ring
    pub fn ring(&self) -> Ring {
        self.active
            .as_ref()
            .map(|a| a.ring.clone())
            .unwrap_or_default()
    }

    pub fn coordinate_summary(&self) -> String {
        self.ring().summary()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|a| a.map.id())
    }

    pub fn is_open(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.map.is_open())
    }

    /// Whether the drawing-tool plugin has loaded for this session
    pub fn is_tool_ready(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.tool.is_ready())
    }

    pub fn overlay_id(&self) -> Option<OverlayId> {
        self.active.as_ref().and_then(|a| a.overlay.overlay_id())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }
}

impl Drop for GeofenceEditor {
    fn drop(&mut self) {
        self.hide();
    }
}

impl std::fmt::Debug for GeofenceEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceEditor")
            .field("session", &self.session_id())
            .field("phase", &self.phase())
            .field("points", &self.ring().len())
            .finish()
    }
}

//! Single-point location picker
//!
//! Same session discipline as the geofence editor, with a click listener on
//! the map and one draggable marker instead of a drawing tool.

use std::sync::Arc;

use fencekit_core::{
    coerce_point, Coordinate, EditorEvent, Error, EventBus, LifecycleEvent, Result,
    SessionError, SessionId,
};
use fencekit_settings::Config;
use serde_json::Value;

use crate::capability::{
    ContainerId, EventKind, Inbound, ListenerId, MapCapability, MapEvent, MapHandle, MapOptions,
    OverlayId,
};
use crate::marker::MarkerManager;
use crate::notice_for;
use crate::session::{MapSession, MapSessionManager};

/// Receives the picker's result
pub trait PickerHost: Send + Sync {
    fn on_confirm(&self, location: Coordinate);
    fn on_cancel(&self);
}

struct PickerSession {
    map: MapSession,
    marker: MarkerManager,
    click_listener: Option<ListenerId>,
    selection: Option<Coordinate>,
}

impl PickerSession {
    fn teardown(&mut self) {
        self.marker.destroy(self.map.map().ok());
        if let Some(listener) = self.click_listener.take() {
            if let Ok(map) = self.map.map() {
                map.off(listener);
            }
        }
        self.map.close();
    }

    fn select(&mut self, location: Coordinate) -> Result<OverlayId> {
        self.selection = Some(location);
        let drag_end = self.map.sink();
        let map = self.map.map()?;
        self.marker.render(map, location, drag_end)
    }
}

impl Drop for PickerSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Lets the user choose one location by clicking or dragging a marker
pub struct LocationPicker {
    sessions: MapSessionManager,
    config: Config,
    host: Arc<dyn PickerHost>,
    bus: Arc<EventBus>,
    active: Option<PickerSession>,
}

impl LocationPicker {
    pub fn new(
        capability: Arc<dyn MapCapability>,
        config: Config,
        host: Arc<dyn PickerHost>,
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

    /// Open a fresh session centred on `initial`, or the configured centre
    pub async fn show(
        &mut self,
        container: Option<&ContainerId>,
        initial: Option<Coordinate>,
    ) -> Result<()> {
        self.hide();
        let result = self.open(container, initial).await;
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    async fn open(&mut self, container: Option<&ContainerId>, initial: Option<Coordinate>) -> Result<()> {
        if container.is_none() {
            return Err(SessionError::ContainerMissing.into());
        }
        self.sessions.wait_for_capability().await?;

        let center = match initial {
            Some(location) => location,
            None => self
                .config
                .map
                .center_coordinate()
                .map_err(|e| Error::other(e.to_string()))?,
        };
        let options = MapOptions {
            center,
            zoom: self.config.map.zoom,
        };
        let mut map = self.sessions.open(container, options)?;
        let session = map.id();

        let click = map.sink();
        let click_listener = click.listener();
        map.map()?.on(EventKind::Click, click)?;

        let mut active = PickerSession {
            map,
            marker: MarkerManager::new(self.config.marker.clone()),
            click_listener: Some(click_listener),
            selection: None,
        };
        if let Some(location) = initial {
            active.select(location)?;
        }

        self.active = Some(active);
        self.bus
            .publish(EditorEvent::Lifecycle(LifecycleEvent::Opened { session }));
        Ok(())
    }

    /// Tear down the session. Safe to call repeatedly.
    pub fn hide(&mut self) {
        if let Some(mut active) = self.active.take() {
            let session = active.map.id();
            active.teardown();
            self.bus
                .publish(EditorEvent::Lifecycle(LifecycleEvent::Closed { session }));
        }
    }

    /// Hand the selected location to the host
    pub fn confirm(&mut self) -> Result<Coordinate> {
        match self.selection() {
            Some(location) => {
                tracing::info!("Location confirmed at {}", location);
                self.host.on_confirm(location);
                Ok(location)
            }
            None => {
                let error: Error = SessionError::NoSelection.into();
                self.report(&error);
                Err(error)
            }
        }
    }

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

    /// Handle every event already queued
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(inbound) = self.active.as_mut().and_then(|a| a.map.try_recv()) {
            self.dispatch(inbound);
            handled += 1;
        }
        handled
    }

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
        let Inbound::Map {
            listener, event, ..
        } = inbound
        else {
            return;
        };

        let result = match event {
            MapEvent::Click { position } => self.on_click(listener, &position),
            MapEvent::DragEnd { position } => self.on_drag_end(listener, &position),
            _ => Ok(()),
        };
        if let Err(e) = result {
            tracing::error!("Map event failed: {}", e);
            self.report(&e);
        }
    }

    fn on_click(&mut self, listener: ListenerId, position: &Value) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if active.click_listener != Some(listener) {
            return Ok(());
        }
        match coerce_point(position) {
            Some(location) => {
                tracing::debug!("Location picked at {}", location);
                active.select(location).map(|_| ())
            }
            None => {
                tracing::debug!("Ignoring click with invalid position {}", position);
                Ok(())
            }
        }
    }

    fn on_drag_end(&mut self, listener: ListenerId, position: &Value) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if !active.marker.owns(listener) {
            return Ok(());
        }
        if let Some(location) = coerce_point(position) {
            tracing::debug!("Marker dragged to {}", location);
            active.selection = Some(location);
        }
        Ok(())
    }

    fn report(&self, error: &Error) {
        self.bus.notify(notice_for(error));
    }

    pub fn selection(&self) -> Option<Coordinate> {
        self.active.as_ref().and_then(|a| a.selection)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|a| a.map.id())
    }

    pub fn is_open(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.map.is_open())
    }

    pub fn marker_id(&self) -> Option<OverlayId> {
        self.active.as_ref().and_then(|a| a.marker.overlay_id())
    }
}

impl Drop for LocationPicker {
    fn drop(&mut self) {
        self.hide();
    }
}

impl std::fmt::Debug for LocationPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationPicker")
            .field("session", &self.session_id())
            .field("selection", &self.selection())
            .finish()
    }
}

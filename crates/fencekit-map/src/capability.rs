//! Map capability contract
//!
//! The interactive map is an external, opaque service. Widgets never reach
//! for it through ambient global state: a [`MapCapability`] is injected into
//! the [`MapSessionManager`](crate::session::MapSessionManager) and every
//! handle it hands out is owned by exactly one session.
//!
//! Listener registration passes an [`EventSink`] stamped with the owning
//! session and a fresh [`ListenerId`]. Providers call [`EventSink::deliver`]
//! whenever the event fires; deliveries are queued and handled on the owning
//! widget's loop, never re-entrantly inside a provider call.

use fencekit_core::{Coordinate, ProviderError, Ring, SessionId};
use fencekit_settings::{MarkerStyle, PolygonStyle};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Result type for calls into the map capability
pub type ProviderResult<T> = Result<T, ProviderError>;

/// DOM container (or equivalent surface) a map is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", &self.0.to_string()[..8])
    }
}

/// Identifies an overlay created by a map handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(Uuid);

impl OverlayId {
    /// Create a new unique overlay id (for capability implementations)
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Overlay({})", &self.0.to_string()[..8])
    }
}

/// Options for a new map instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Events a listener can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Map clicked
    Click,
    /// Drawing tool finished a shape
    Draw,
    /// A polygon vertex was moved
    Adjust,
    /// An overlay drag started
    DragStart,
    /// An overlay drag ended
    DragEnd,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Click => write!(f, "click"),
            EventKind::Draw => write!(f, "draw"),
            EventKind::Adjust => write!(f, "adjust"),
            EventKind::DragStart => write!(f, "dragstart"),
            EventKind::DragEnd => write!(f, "dragend"),
        }
    }
}

/// Payloads a capability delivers. Point data is untyped and untrusted.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A requested plugin finished loading
    PluginLoaded { plugin: String },
    /// The map was clicked at `position`
    Click { position: Value },
    /// The drawing tool completed a shape with the given vertex list
    Draw { path: Vec<Value> },
    /// A vertex of an editable polygon moved
    Adjust,
    /// An overlay drag started
    DragStart,
    /// An overlay drag ended at `position`
    DragEnd { position: Value },
}

/// Everything that reaches a widget's loop.
#[derive(Debug)]
pub(crate) enum Inbound {
    Map {
        session: SessionId,
        listener: ListenerId,
        event: MapEvent,
    },
    PluginDeadline {
        session: SessionId,
    },
    Publish {
        session: SessionId,
        ring: Ring,
    },
}

impl Inbound {
    pub(crate) fn session(&self) -> SessionId {
        match self {
            Inbound::Map { session, .. }
            | Inbound::PluginDeadline { session }
            | Inbound::Publish { session, .. } => *session,
        }
    }
}

pub(crate) type InboundSender = mpsc::UnboundedSender<Inbound>;

/// Delivery endpoint handed to the capability with a listener registration
#[derive(Debug, Clone)]
pub struct EventSink {
    session: SessionId,
    listener: ListenerId,
    tx: InboundSender,
}

impl EventSink {
    pub(crate) fn new(session: SessionId, tx: InboundSender) -> Self {
        Self {
            session,
            listener: ListenerId::new(),
            tx,
        }
    }

    /// Session that registered this listener
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Token identifying this registration
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    /// Queue an event for the owning session.
    ///
    /// Returns false when the session is gone; the event is discarded.
    pub fn deliver(&self, event: MapEvent) -> bool {
        self.tx
            .send(Inbound::Map {
                session: self.session,
                listener: self.listener,
                event,
            })
            .is_ok()
    }
}

/// Entry point of the external mapping service
pub trait MapCapability: Send + Sync {
    /// Whether the service has finished loading and can create maps
    fn is_available(&self) -> bool;

    /// Construct a map bound to `container`
    fn create_map(
        &self,
        container: &ContainerId,
        options: &MapOptions,
    ) -> ProviderResult<Box<dyn MapHandle>>;
}

/// A live map instance
pub trait MapHandle: Send {
    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()>;
    fn off(&mut self, listener: ListenerId);

    /// Start loading a plugin; `sink` receives [`MapEvent::PluginLoaded`]
    fn load_plugin(&mut self, plugin: &str, sink: EventSink) -> ProviderResult<()>;

    fn create_draw_tool(&mut self) -> ProviderResult<Box<dyn DrawTool>>;
    fn create_polygon(
        &mut self,
        path: &Ring,
        style: &PolygonStyle,
    ) -> ProviderResult<Box<dyn PolygonOverlay>>;
    fn create_marker(
        &mut self,
        position: Coordinate,
        style: &MarkerStyle,
    ) -> ProviderResult<Box<dyn MarkerOverlay>>;

    fn add(&mut self, overlay: OverlayId) -> ProviderResult<()>;
    fn remove(&mut self, overlay: OverlayId) -> ProviderResult<()>;
    fn fit_view(&mut self, overlays: &[OverlayId]) -> ProviderResult<()>;
    fn zoom_in(&mut self) -> ProviderResult<()>;
    fn zoom_out(&mut self) -> ProviderResult<()>;

    /// Release the instance and everything attached to it
    fn destroy(&mut self);
}

/// Interactive drawing tool provided by a plugin
pub trait DrawTool: Send {
    /// Begin collecting polygon vertices from the user
    fn polygon(&mut self, style: &PolygonStyle) -> ProviderResult<()>;
    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()>;
    fn off(&mut self, listener: ListenerId);
    /// Stop drawing; `force` also clears the tool's own sketch overlay
    fn close(&mut self, force: bool);
}

/// Editable polygon overlay
pub trait PolygonOverlay: Send {
    fn id(&self) -> OverlayId;
    /// Current vertex list, in whatever shape the capability uses
    fn path(&self) -> ProviderResult<Vec<Value>>;
    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()>;
    /// Remove every listener registered for `kind`
    fn off(&mut self, kind: EventKind);
    fn set_fill_color(&mut self, color: &str) -> ProviderResult<()>;
}

/// Draggable point marker
pub trait MarkerOverlay: Send {
    fn id(&self) -> OverlayId;
    fn position(&self) -> ProviderResult<Value>;
    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()>;
    fn off(&mut self, kind: EventKind);
}

//! In-memory map capability
//!
//! [`HeadlessMap`] implements the capability contract without a renderer.
//! Besides serving handles it exposes driver methods that play the user's
//! part (finishing a drawing, moving a vertex, clicking, dragging) and
//! inspection methods for what is currently attached, so widget behavior can
//! be exercised end to end.

use std::collections::{HashMap, HashSet};

use fencekit_core::{thread_safe, Coordinate, ProviderError, Ring, ThreadSafe};
use fencekit_settings::{MarkerStyle, PolygonStyle};
use serde_json::Value;

use crate::capability::{
    ContainerId, DrawTool, EventKind, EventSink, ListenerId, MapCapability, MapEvent, MapHandle,
    MapOptions, MarkerOverlay, OverlayId, PolygonOverlay, ProviderResult,
};

const MAX_ZOOM: u8 = 20;
const MIN_ZOOM: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlayKind {
    Polygon,
    Marker,
}

struct MapState {
    container: ContainerId,
    options: MapOptions,
    zoom: u8,
    listeners: Vec<(EventKind, EventSink)>,
    attached: Vec<OverlayId>,
    fit_calls: usize,
    destroyed: bool,
}

struct ToolState {
    map: usize,
    listeners: Vec<(EventKind, EventSink)>,
    drawing: bool,
    closed: bool,
}

struct OverlayState {
    map: usize,
    kind: OverlayKind,
    path: Vec<Value>,
    position: Value,
    fill_color: String,
    listeners: Vec<(EventKind, EventSink)>,
}

struct World {
    available: bool,
    auto_load_plugins: bool,
    maps: Vec<MapState>,
    tools: Vec<ToolState>,
    overlays: HashMap<OverlayId, OverlayState>,
    pending_plugins: Vec<(String, EventSink)>,
    failures: HashSet<String>,
}

impl World {
    fn take_failure(&mut self, operation: &str) -> ProviderResult<()> {
        if self.failures.remove(operation) {
            tracing::debug!("Injected failure for {}", operation);
            return Err(ProviderError::rejected(operation, "injected failure"));
        }
        Ok(())
    }

    fn live_map(&mut self, map: usize) -> ProviderResult<&mut MapState> {
        match self.maps.get_mut(map) {
            Some(state) if !state.destroyed => Ok(state),
            _ => Err(ProviderError::HandleReleased),
        }
    }

    fn is_attached(&self, id: &OverlayId) -> bool {
        self.overlays.get(id).is_some_and(|o| {
            self.maps
                .get(o.map)
                .is_some_and(|m| !m.destroyed && m.attached.contains(id))
        })
    }

    fn attached_of(&self, kind: OverlayKind) -> impl Iterator<Item = (&OverlayId, &OverlayState)> {
        self.overlays
            .iter()
            .filter(move |(id, o)| o.kind == kind && self.is_attached(id))
    }
}

/// In-memory capability and user simulator
#[derive(Clone)]
pub struct HeadlessMap {
    world: ThreadSafe<World>,
}

impl HeadlessMap {
    /// A loaded capability that completes plugin loads immediately
    pub fn new() -> Self {
        Self {
            world: thread_safe(World {
                available: true,
                auto_load_plugins: true,
                maps: Vec::new(),
                tools: Vec::new(),
                overlays: HashMap::new(),
                pending_plugins: Vec::new(),
                failures: HashSet::new(),
            }),
        }
    }

    /// A capability whose script has not loaded yet
    pub fn unavailable() -> Self {
        let map = Self::new();
        map.set_available(false);
        map
    }

    pub fn set_available(&self, available: bool) {
        self.world.lock().available = available;
    }

    /// When false, plugin loads wait for [`HeadlessMap::complete_plugin_loads`]
    pub fn set_auto_load_plugins(&self, auto: bool) {
        self.world.lock().auto_load_plugins = auto;
    }

    /// Make the next call of `operation` fail.
    ///
    /// Operations: `create_map`, `load_plugin`, `create_draw_tool`,
    /// `polygon`, `create_polygon`, `create_marker`, `add`, `path`,
    /// `fit_view`, `on`.
    pub fn fail_next(&self, operation: &str) {
        self.world.lock().failures.insert(operation.to_string());
    }

    /// Deliver every outstanding plugin load. Returns accepted deliveries.
    pub fn complete_plugin_loads(&self) -> usize {
        let pending = std::mem::take(&mut self.world.lock().pending_plugins);
        pending
            .into_iter()
            .filter(|(plugin, sink)| {
                sink.deliver(MapEvent::PluginLoaded {
                    plugin: plugin.clone(),
                })
            })
            .count()
    }

    /// Complete the active drawing with `path`
    pub fn finish_drawing(&self, path: Vec<Value>) -> usize {
        let sinks: Vec<EventSink> = {
            let world = self.world.lock();
            world
                .tools
                .iter()
                .filter(|t| t.drawing && !t.closed)
                .flat_map(|t| t.listeners.iter())
                .filter(|(kind, _)| *kind == EventKind::Draw)
                .map(|(_, sink)| sink.clone())
                .collect()
        };
        Self::fan_out(sinks, MapEvent::Draw { path })
    }

    /// Replace the path of the attached polygon and fire its adjust listeners
    pub fn adjust_polygon(&self, path: Vec<Value>) -> usize {
        let sinks = {
            let mut world = self.world.lock();
            let ids: Vec<OverlayId> = world
                .attached_of(OverlayKind::Polygon)
                .map(|(id, _)| *id)
                .collect();
            let mut sinks = Vec::new();
            for id in ids {
                if let Some(overlay) = world.overlays.get_mut(&id) {
                    overlay.path = path.clone();
                    sinks.extend(Self::listening(&overlay.listeners, EventKind::Adjust));
                }
            }
            sinks
        };
        Self::fan_out(sinks, MapEvent::Adjust)
    }

    /// Move one vertex of the attached polygon
    pub fn move_vertex(&self, index: usize, to: Value) -> usize {
        let Some(mut path) = self.polygon_paths().into_iter().next() else {
            return 0;
        };
        if index >= path.len() {
            return 0;
        }
        path[index] = to;
        self.adjust_polygon(path)
    }

    pub fn start_polygon_drag(&self) -> usize {
        let sinks: Vec<EventSink> = {
            let world = self.world.lock();
            world
                .attached_of(OverlayKind::Polygon)
                .flat_map(|(_, o)| Self::listening(&o.listeners, EventKind::DragStart))
                .collect()
        };
        Self::fan_out(sinks, MapEvent::DragStart)
    }

    /// Click every live map at `position`
    pub fn click(&self, position: Value) -> usize {
        let sinks: Vec<EventSink> = {
            let world = self.world.lock();
            world
                .maps
                .iter()
                .filter(|m| !m.destroyed)
                .flat_map(|m| Self::listening(&m.listeners, EventKind::Click))
                .collect()
        };
        Self::fan_out(sinks, MapEvent::Click { position })
    }

    /// Drag the attached marker to `position`
    pub fn drag_marker(&self, position: Value) -> usize {
        let sinks = {
            let mut world = self.world.lock();
            let ids: Vec<OverlayId> = world
                .attached_of(OverlayKind::Marker)
                .map(|(id, _)| *id)
                .collect();
            let mut sinks = Vec::new();
            for id in ids {
                if let Some(marker) = world.overlays.get_mut(&id) {
                    marker.position = position.clone();
                    sinks.extend(Self::listening(&marker.listeners, EventKind::DragEnd));
                }
            }
            sinks
        };
        Self::fan_out(sinks, MapEvent::DragEnd { position })
    }

    pub fn maps_created(&self) -> usize {
        self.world.lock().maps.len()
    }

    pub fn live_maps(&self) -> usize {
        self.world.lock().maps.iter().filter(|m| !m.destroyed).count()
    }

    /// Container and options of the most recently created map
    pub fn last_map(&self) -> Option<(ContainerId, MapOptions)> {
        self.world
            .lock()
            .maps
            .last()
            .map(|m| (m.container.clone(), m.options))
    }

    pub fn zoom(&self) -> Option<u8> {
        let world = self.world.lock();
        world.maps.iter().rev().find(|m| !m.destroyed).map(|m| m.zoom)
    }

    pub fn fit_view_calls(&self) -> usize {
        self.world.lock().maps.iter().map(|m| m.fit_calls).sum()
    }

    pub fn attached_polygons(&self) -> usize {
        self.world.lock().attached_of(OverlayKind::Polygon).count()
    }

    pub fn attached_markers(&self) -> usize {
        self.world.lock().attached_of(OverlayKind::Marker).count()
    }

    /// Paths of every attached polygon
    pub fn polygon_paths(&self) -> Vec<Vec<Value>> {
        self.world
            .lock()
            .attached_of(OverlayKind::Polygon)
            .map(|(_, o)| o.path.clone())
            .collect()
    }

    pub fn polygon_fill_colors(&self) -> Vec<String> {
        self.world
            .lock()
            .attached_of(OverlayKind::Polygon)
            .map(|(_, o)| o.fill_color.clone())
            .collect()
    }

    pub fn marker_positions(&self) -> Vec<Value> {
        self.world
            .lock()
            .attached_of(OverlayKind::Marker)
            .map(|(_, o)| o.position.clone())
            .collect()
    }

    /// Drawing tools not yet closed
    pub fn open_tools(&self) -> usize {
        self.world.lock().tools.iter().filter(|t| !t.closed).count()
    }

    /// Listener registrations still held by maps, tools and overlays
    pub fn live_listeners(&self) -> usize {
        let world = self.world.lock();
        let maps: usize = world
            .maps
            .iter()
            .filter(|m| !m.destroyed)
            .map(|m| m.listeners.len())
            .sum();
        let tools: usize = world.tools.iter().map(|t| t.listeners.len()).sum();
        let overlays: usize = world.overlays.values().map(|o| o.listeners.len()).sum();
        maps + tools + overlays
    }

    pub fn pending_plugin_loads(&self) -> usize {
        self.world.lock().pending_plugins.len()
    }

    fn listening(listeners: &[(EventKind, EventSink)], kind: EventKind) -> Vec<EventSink> {
        listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, sink)| sink.clone())
            .collect()
    }

    fn fan_out(sinks: Vec<EventSink>, event: MapEvent) -> usize {
        sinks
            .iter()
            .filter(|sink| sink.deliver(event.clone()))
            .count()
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeadlessMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessMap")
            .field("live_maps", &self.live_maps())
            .field("live_listeners", &self.live_listeners())
            .finish()
    }
}

impl MapCapability for HeadlessMap {
    fn is_available(&self) -> bool {
        self.world.lock().available
    }

    fn create_map(
        &self,
        container: &ContainerId,
        options: &MapOptions,
    ) -> ProviderResult<Box<dyn MapHandle>> {
        let mut world = self.world.lock();
        if !world.available {
            return Err(ProviderError::rejected("create_map", "capability not loaded"));
        }
        world.take_failure("create_map")?;

        world.maps.push(MapState {
            container: container.clone(),
            options: *options,
            zoom: options.zoom,
            listeners: Vec::new(),
            attached: Vec::new(),
            fit_calls: 0,
            destroyed: false,
        });
        Ok(Box::new(HeadlessMapHandle {
            world: self.world.clone(),
            map: world.maps.len() - 1,
        }))
    }
}

struct HeadlessMapHandle {
    world: ThreadSafe<World>,
    map: usize,
}

impl MapHandle for HeadlessMapHandle {
    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()> {
        let mut world = self.world.lock();
        world.take_failure("on")?;
        world.live_map(self.map)?.listeners.push((kind, sink));
        Ok(())
    }

    fn off(&mut self, listener: ListenerId) {
        if let Some(map) = self.world.lock().maps.get_mut(self.map) {
            map.listeners.retain(|(_, sink)| sink.listener() != listener);
        }
    }

    fn load_plugin(&mut self, plugin: &str, sink: EventSink) -> ProviderResult<()> {
        let auto = {
            let mut world = self.world.lock();
            world.live_map(self.map)?;
            world.take_failure("load_plugin")?;
            if !world.auto_load_plugins {
                world.pending_plugins.push((plugin.to_string(), sink.clone()));
            }
            world.auto_load_plugins
        };
        if auto {
            sink.deliver(MapEvent::PluginLoaded {
                plugin: plugin.to_string(),
            });
        }
        Ok(())
    }

    fn create_draw_tool(&mut self) -> ProviderResult<Box<dyn DrawTool>> {
        let mut world = self.world.lock();
        world.live_map(self.map)?;
        world.take_failure("create_draw_tool")?;
        world.tools.push(ToolState {
            map: self.map,
            listeners: Vec::new(),
            drawing: false,
            closed: false,
        });
        Ok(Box::new(HeadlessDrawTool {
            world: self.world.clone(),
            tool: world.tools.len() - 1,
        }))
    }

    fn create_polygon(
        &mut self,
        path: &Ring,
        style: &PolygonStyle,
    ) -> ProviderResult<Box<dyn PolygonOverlay>> {
        let mut world = self.world.lock();
        world.live_map(self.map)?;
        world.take_failure("create_polygon")?;
        let id = OverlayId::new();
        world.overlays.insert(
            id,
            OverlayState {
                map: self.map,
                kind: OverlayKind::Polygon,
                path: path.to_values(),
                position: Value::Null,
                fill_color: style.fill_color.clone(),
                listeners: Vec::new(),
            },
        );
        Ok(Box::new(HeadlessOverlay {
            world: self.world.clone(),
            id,
        }))
    }

    fn create_marker(
        &mut self,
        position: Coordinate,
        _style: &MarkerStyle,
    ) -> ProviderResult<Box<dyn MarkerOverlay>> {
        let mut world = self.world.lock();
        world.live_map(self.map)?;
        world.take_failure("create_marker")?;
        let id = OverlayId::new();
        world.overlays.insert(
            id,
            OverlayState {
                map: self.map,
                kind: OverlayKind::Marker,
                path: Vec::new(),
                position: position.to_value(),
                fill_color: String::new(),
                listeners: Vec::new(),
            },
        );
        Ok(Box::new(HeadlessOverlay {
            world: self.world.clone(),
            id,
        }))
    }

    fn add(&mut self, overlay: OverlayId) -> ProviderResult<()> {
        let mut world = self.world.lock();
        world.take_failure("add")?;
        let map = world.live_map(self.map)?;
        if !map.attached.contains(&overlay) {
            map.attached.push(overlay);
        }
        Ok(())
    }

    fn remove(&mut self, overlay: OverlayId) -> ProviderResult<()> {
        let mut world = self.world.lock();
        world.live_map(self.map)?.attached.retain(|id| *id != overlay);
        world.overlays.remove(&overlay);
        Ok(())
    }

    fn fit_view(&mut self, _overlays: &[OverlayId]) -> ProviderResult<()> {
        let mut world = self.world.lock();
        world.take_failure("fit_view")?;
        world.live_map(self.map)?.fit_calls += 1;
        Ok(())
    }

    fn zoom_in(&mut self) -> ProviderResult<()> {
        let mut world = self.world.lock();
        let map = world.live_map(self.map)?;
        map.zoom = (map.zoom + 1).min(MAX_ZOOM);
        Ok(())
    }

    fn zoom_out(&mut self) -> ProviderResult<()> {
        let mut world = self.world.lock();
        let map = world.live_map(self.map)?;
        map.zoom = map.zoom.saturating_sub(1).max(MIN_ZOOM);
        Ok(())
    }

    fn destroy(&mut self) {
        let mut world = self.world.lock();
        let map = self.map;
        if let Some(state) = world.maps.get_mut(map) {
            state.destroyed = true;
            state.listeners.clear();
            state.attached.clear();
        }
        // Destroying the map releases whatever was still on it.
        world.overlays.retain(|_, o| o.map != map);
        for tool in world.tools.iter_mut().filter(|t| t.map == map) {
            tool.closed = true;
            tool.drawing = false;
        }
    }
}

struct HeadlessDrawTool {
    world: ThreadSafe<World>,
    tool: usize,
}

impl HeadlessDrawTool {
    fn with_tool<R>(&self, f: impl FnOnce(&mut ToolState) -> R) -> Option<R> {
        self.world.lock().tools.get_mut(self.tool).map(f)
    }
}

impl DrawTool for HeadlessDrawTool {
    fn polygon(&mut self, _style: &PolygonStyle) -> ProviderResult<()> {
        self.world.lock().take_failure("polygon")?;
        match self.with_tool(|tool| {
            if tool.closed {
                return Err(ProviderError::HandleReleased);
            }
            tool.drawing = true;
            Ok(())
        }) {
            Some(result) => result,
            None => Err(ProviderError::HandleReleased),
        }
    }

    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()> {
        self.world.lock().take_failure("on")?;
        self.with_tool(|tool| tool.listeners.push((kind, sink)))
            .ok_or(ProviderError::HandleReleased)
    }

    fn off(&mut self, listener: ListenerId) {
        self.with_tool(|tool| {
            tool.listeners
                .retain(|(_, sink)| sink.listener() != listener)
        });
    }

    fn close(&mut self, _force: bool) {
        self.with_tool(|tool| {
            tool.closed = true;
            tool.drawing = false;
        });
    }
}

struct HeadlessOverlay {
    world: ThreadSafe<World>,
    id: OverlayId,
}

impl HeadlessOverlay {
    fn with_overlay<R>(&self, f: impl FnOnce(&mut OverlayState) -> R) -> ProviderResult<R> {
        self.world
            .lock()
            .overlays
            .get_mut(&self.id)
            .map(f)
            .ok_or(ProviderError::HandleReleased)
    }

    fn register(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()> {
        self.world.lock().take_failure("on")?;
        self.with_overlay(|o| o.listeners.push((kind, sink)))
    }

    fn unregister(&mut self, kind: EventKind) {
        let _ = self.with_overlay(|o| o.listeners.retain(|(k, _)| *k != kind));
    }
}

impl PolygonOverlay for HeadlessOverlay {
    fn id(&self) -> OverlayId {
        self.id
    }

    fn path(&self) -> ProviderResult<Vec<Value>> {
        self.world.lock().take_failure("path")?;
        self.with_overlay(|o| o.path.clone())
    }

    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()> {
        self.register(kind, sink)
    }

    fn off(&mut self, kind: EventKind) {
        self.unregister(kind);
    }

    fn set_fill_color(&mut self, color: &str) -> ProviderResult<()> {
        self.with_overlay(|o| o.fill_color = color.to_string())
    }
}

impl MarkerOverlay for HeadlessOverlay {
    fn id(&self) -> OverlayId {
        self.id
    }

    fn position(&self) -> ProviderResult<Value> {
        self.with_overlay(|o| o.position.clone())
    }

    fn on(&mut self, kind: EventKind, sink: EventSink) -> ProviderResult<()> {
        self.register(kind, sink)
    }

    fn off(&mut self, kind: EventKind) {
        self.unregister(kind);
    }
}

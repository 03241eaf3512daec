//! Single editable polygon overlay
//!
//! At most one polygon is attached per session. Rendering always removes the
//! previous overlay, and its listeners, before the replacement is created.

use fencekit_core::{Result, Ring};
use fencekit_settings::PolygonStyle;
use serde_json::Value;

use crate::capability::{EventKind, EventSink, ListenerId, MapHandle, OverlayId, PolygonOverlay};

pub struct OverlayManager {
    overlay: Option<Box<dyn PolygonOverlay>>,
    listeners: Vec<ListenerId>,
    style: PolygonStyle,
}

impl OverlayManager {
    pub fn new(style: PolygonStyle) -> Self {
        Self {
            overlay: None,
            listeners: Vec::new(),
            style,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn overlay_id(&self) -> Option<OverlayId> {
        self.overlay.as_ref().map(|o| o.id())
    }

    /// Whether `listener` belongs to the current overlay
    pub fn owns(&self, listener: ListenerId) -> bool {
        self.listeners.contains(&listener)
    }

    /// Replace the overlay with one showing `ring` and fit the view to it
    pub fn render(
        &mut self,
        map: &mut dyn MapHandle,
        ring: &Ring,
        adjust: EventSink,
        drag_start: EventSink,
    ) -> Result<OverlayId> {
        self.destroy(Some(&mut *map));

        let mut overlay = map.create_polygon(ring, &self.style)?;
        let id = overlay.id();
        let listeners = vec![adjust.listener(), drag_start.listener()];

        let attached = overlay
            .on(EventKind::Adjust, adjust)
            .and_then(|_| overlay.on(EventKind::DragStart, drag_start))
            .and_then(|_| map.add(id));
        if let Err(e) = attached {
            overlay.off(EventKind::Adjust);
            overlay.off(EventKind::DragStart);
            return Err(e.into());
        }

        self.overlay = Some(overlay);
        self.listeners = listeners;

        if let Err(e) = map.fit_view(&[id]) {
            tracing::warn!("Could not fit view to {}: {}", id, e);
        }
        tracing::debug!("Rendered {} with {} points", id, ring.len());
        Ok(id)
    }

    /// Raw vertex list of the current overlay
    pub fn path(&self) -> Result<Vec<Value>> {
        match self.overlay.as_ref() {
            Some(overlay) => Ok(overlay.path()?),
            None => Ok(Vec::new()),
        }
    }

    /// Apply the drag highlight fill
    pub fn highlight_drag(&mut self) -> Result<()> {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_fill_color(&self.style.drag_fill_color)?;
        }
        Ok(())
    }

    /// Detach listeners and remove the overlay. No-op when nothing is attached.
    pub fn destroy(&mut self, map: Option<&mut (dyn MapHandle + '_)>) {
        let Some(mut overlay) = self.overlay.take() else {
            return;
        };
        self.listeners.clear();
        overlay.off(EventKind::Adjust);
        overlay.off(EventKind::DragStart);

        let id = overlay.id();
        if let Some(map) = map {
            if let Err(e) = map.remove(id) {
                tracing::warn!("Failed to remove {}: {}", id, e);
            }
        }
        tracing::debug!("Destroyed {}", id);
    }
}

impl std::fmt::Debug for OverlayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayManager")
            .field("overlay", &self.overlay_id())
            .finish()
    }
}

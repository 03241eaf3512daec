//! Single draggable marker for the location picker

use fencekit_core::{Coordinate, Result};
use fencekit_settings::MarkerStyle;

use crate::capability::{EventKind, EventSink, ListenerId, MapHandle, MarkerOverlay, OverlayId};

pub struct MarkerManager {
    marker: Option<Box<dyn MarkerOverlay>>,
    listener: Option<ListenerId>,
    style: MarkerStyle,
}

impl MarkerManager {
    pub fn new(style: MarkerStyle) -> Self {
        Self {
            marker: None,
            listener: None,
            style,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.marker.is_some()
    }

    pub fn overlay_id(&self) -> Option<OverlayId> {
        self.marker.as_ref().map(|m| m.id())
    }

    pub fn owns(&self, listener: ListenerId) -> bool {
        self.listener == Some(listener)
    }

    /// Replace the marker with one at `position`
    pub fn render(
        &mut self,
        map: &mut dyn MapHandle,
        position: Coordinate,
        drag_end: EventSink,
    ) -> Result<OverlayId> {
        self.destroy(Some(&mut *map));

        let mut marker = map.create_marker(position, &self.style)?;
        let id = marker.id();
        let listener = drag_end.listener();

        let attached = marker
            .on(EventKind::DragEnd, drag_end)
            .and_then(|_| map.add(id));
        if let Err(e) = attached {
            marker.off(EventKind::DragEnd);
            return Err(e.into());
        }

        self.marker = Some(marker);
        self.listener = Some(listener);
        tracing::debug!("Marker {} at {}", id, position);
        Ok(id)
    }

    pub fn destroy(&mut self, map: Option<&mut (dyn MapHandle + '_)>) {
        let Some(mut marker) = self.marker.take() else {
            return;
        };
        self.listener = None;
        marker.off(EventKind::DragEnd);

        let id = marker.id();
        if let Some(map) = map {
            if let Err(e) = map.remove(id) {
                tracing::warn!("Failed to remove marker {}: {}", id, e);
            }
        }
    }
}

impl std::fmt::Debug for MarkerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerManager")
            .field("marker", &self.overlay_id())
            .finish()
    }
}

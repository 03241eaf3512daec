//! Drawing tool state machine
//!
//! `Idle → Armed → Drawing → Completed → Editing`. The draw-complete
//! listener is one-shot: it is removed before its payload is processed, so a
//! second delivery for the same arming finds nothing to match and is ignored.

use fencekit_core::{DrawPhase, Result, SessionError};
use fencekit_settings::PolygonStyle;

use crate::capability::{DrawTool, EventKind, EventSink, ListenerId, MapHandle};

/// Owns the drawing tool of one session and tracks its phase
#[derive(Default)]
pub struct DrawingToolController {
    tool: Option<Box<dyn DrawTool>>,
    pending: Option<ListenerId>,
    phase: DrawPhase,
    plugin_ready: bool,
    transitions: Vec<(DrawPhase, DrawPhase)>,
}

impl DrawingToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    /// Whether the drawing-tool plugin has loaded
    pub fn is_ready(&self) -> bool {
        self.plugin_ready
    }

    pub fn mark_ready(&mut self) {
        self.plugin_ready = true;
    }

    pub fn has_tool(&self) -> bool {
        self.tool.is_some()
    }

    /// Whether a draw-complete delivery is still expected
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Create a tool, register the one-shot listener and begin polygon mode.
    ///
    /// Any previous tool is released first. On failure the controller is back
    /// in `Idle` with no tool and no listener.
    pub fn arm(
        &mut self,
        map: &mut dyn MapHandle,
        sink: EventSink,
        style: &PolygonStyle,
    ) -> Result<()> {
        if !self.plugin_ready {
            return Err(SessionError::SessionNotReady.into());
        }
        self.reset();

        let mut tool = map.create_draw_tool()?;
        let listener = sink.listener();
        if let Err(e) = tool.on(EventKind::Draw, sink) {
            tool.close(true);
            return Err(e.into());
        }
        self.tool = Some(tool);
        self.pending = Some(listener);
        self.enter(DrawPhase::Armed);

        let started = match self.tool.as_mut() {
            Some(tool) => tool.polygon(style),
            None => Ok(()),
        };
        if let Err(e) = started {
            self.reset();
            return Err(e.into());
        }

        self.enter(DrawPhase::Drawing);
        tracing::debug!("Drawing tool armed with {}", listener);
        Ok(())
    }

    /// Claim the draw-complete delivery for `listener`.
    ///
    /// Returns true exactly once per arming; the listener is removed before
    /// returning so the caller processes the payload with nothing armed.
    pub fn take_delivery(&mut self, listener: ListenerId) -> bool {
        if self.pending != Some(listener) {
            return false;
        }
        self.pending = None;
        if let Some(tool) = self.tool.as_mut() {
            tool.off(listener);
        }
        self.enter(DrawPhase::Completed);
        true
    }

    /// Close and release the tool, keeping the phase
    pub fn close_tool(&mut self) {
        if let Some(mut tool) = self.tool.take() {
            tool.close(true);
        }
    }

    /// An editable overlay is on the map
    pub fn enter_editing(&mut self) {
        self.enter(DrawPhase::Editing);
    }

    /// Disarm, release the tool and return to `Idle`
    pub fn reset(&mut self) {
        if let Some(listener) = self.pending.take() {
            if let Some(tool) = self.tool.as_mut() {
                tool.off(listener);
            }
        }
        self.close_tool();
        self.enter(DrawPhase::Idle);
    }

    /// Phase changes since the last call, oldest first
    pub fn take_transitions(&mut self) -> Vec<(DrawPhase, DrawPhase)> {
        std::mem::take(&mut self.transitions)
    }

    fn enter(&mut self, phase: DrawPhase) {
        if self.phase != phase {
            tracing::trace!("Draw phase {} -> {}", self.phase, phase);
            self.transitions.push((self.phase, phase));
            self.phase = phase;
        }
    }
}

impl std::fmt::Debug for DrawingToolController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingToolController")
            .field("phase", &self.phase)
            .field("plugin_ready", &self.plugin_ready)
            .field("armed", &self.pending.is_some())
            .field("has_tool", &self.tool.is_some())
            .finish()
    }
}

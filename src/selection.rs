//! Rectangular box-zoom selection.
//!
//! Dragging with the primary button sketches a rectangle in screen space.
//! Releasing it hands the normalised rectangle back to the engine, which
//! zooms the view to fill the canvas with it.
//!
//! ```text
//! Idle --press--> Selecting { start, current } --release--> Idle
//!                         |    ^
//!                         +----+ move
//! ```

use crate::canvas::{Canvas, Color, Rect, Stroke};
use glam::Vec2;

/// Rectangles narrower or shorter than this are treated as stray clicks.
pub const MIN_SELECTION_PX: f32 = 6.0;

/// Translucent fill drawn inside the selection.
pub const SELECTION_FILL: Color = Color::rgba(1.0, 1.0, 1.0, 0.06);

/// Dashed outline around the selection.
pub const SELECTION_STROKE: Stroke = Stroke {
    color: Color::rgba(1.0, 1.0, 1.0, 0.8),
    width: 1.5,
    dash: Some((6.0, 6.0)),
};

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Selecting { start: Vec2, current: Vec2 },
}

/// Tracks one box-zoom drag at a time.
#[derive(Debug, Clone, Default)]
pub struct BoxZoomSelector {
    state: Selection,
}

impl BoxZoomSelector {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> Selection {
        self.state
    }

    #[inline]
    pub fn is_selecting(&self) -> bool {
        matches!(self.state, Selection::Selecting { .. })
    }

    /// Start a drag at `at`. Restarts any drag already in progress.
    pub fn press(&mut self, at: Vec2) {
        self.state = Selection::Selecting { start: at, current: at };
    }

    /// Track the pointer. Ignored while idle.
    pub fn drag(&mut self, to: Vec2) {
        if let Selection::Selecting { current, .. } = &mut self.state {
            *current = to;
        }
    }

    /// Finish the drag.
    ///
    /// The release point itself is not used: the rectangle spans `start` to
    /// the last tracked `current`. Returns `None` when idle or when the
    /// rectangle is smaller than [`MIN_SELECTION_PX`] on either axis.
    pub fn release(&mut self) -> Option<Rect> {
        let Selection::Selecting { start, current } = std::mem::take(&mut self.state) else {
            return None;
        };
        let rect = Rect::from_corners(start, current);
        if rect.width() < MIN_SELECTION_PX || rect.height() < MIN_SELECTION_PX {
            log::debug!("discarding {}x{} selection", rect.width(), rect.height());
            return None;
        }
        Some(rect)
    }

    /// Abandon the drag without zooming.
    pub fn cancel(&mut self) {
        self.state = Selection::Idle;
    }

    /// The rectangle currently being dragged out.
    pub fn current_rect(&self) -> Option<Rect> {
        match self.state {
            Selection::Idle => None,
            Selection::Selecting { start, current } => Some(Rect::from_corners(start, current)),
        }
    }

    /// Draw the in-progress rectangle, if any.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        let Some(rect) = self.current_rect() else {
            return;
        };
        canvas.fill_rect(rect, SELECTION_FILL);
        // half-pixel shift keeps the 1.5px line crisp
        canvas.stroke_rect(rect.translate(Vec2::splat(0.5)), SELECTION_STROKE);
    }
}

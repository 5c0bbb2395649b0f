//! Host UI observation surface.
//!
//! The game client exposes a deeply nested, mutable widget tree. This module
//! defines the read-only view the extractor consumes: a [`UiSnapshot`] that
//! resolves well-known [`WidgetId`]s to [`Widget`] nodes, plus the screen-space
//! [`Rect`] math the bounds computation needs.
//!
//! Absence is always representable and never an error: a missing widget is
//! `None`, missing text is `None`, missing bounds are `None`.

/// Screen-space rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = (self.x + self.width).max(other.x + other.width);
        let y2 = (self.y + self.height).max(other.y + other.height);
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Clamp to a `canvas_width` x `canvas_height` canvas anchored at the
    /// origin. Returns `None` when the intersection collapses to zero area
    /// (or the canvas itself is degenerate).
    pub fn clamp_to_canvas(&self, canvas_width: i32, canvas_height: i32) -> Option<Rect> {
        if canvas_width <= 0 || canvas_height <= 0 {
            return None;
        }

        let x = self.x.max(0);
        let y = self.y.max(0);
        let right = (self.x + self.width).min(canvas_width);
        let bottom = (self.y + self.height).min(canvas_height);

        let width = right - x;
        let height = bottom - y;
        if width <= 0 || height <= 0 {
            return None;
        }

        Some(Rect::new(x, y, width, height))
    }
}

/// Address of a widget in the host tree: interface group + child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId {
    pub group: u32,
    pub child: u32,
}

impl WidgetId {
    pub const fn new(group: u32, child: u32) -> Self {
        Self { group, child }
    }
}

/// Well-known widget addresses exposed by the host client.
pub mod component {
    use super::WidgetId;

    /// NPC dialog: speaker name line.
    pub const DIALOG_NPC_NAME: WidgetId = WidgetId::new(231, 4);
    /// NPC dialog: body text.
    pub const DIALOG_NPC_TEXT: WidgetId = WidgetId::new(231, 6);
    /// Player dialog: body text.
    pub const DIALOG_PLAYER_TEXT: WidgetId = WidgetId::new(217, 6);
    /// Chatbox free-text input line.
    pub const CHATBOX_INPUT: WidgetId = WidgetId::new(162, 42);
    /// Canonical option-menu container.
    pub const DIALOG_OPTION_OPTIONS: WidgetId = WidgetId::new(219, 1);
}

/// One node of the host widget tree.
///
/// The three child accessors mirror the host's three child categories; any of
/// them may be empty. Implementations must be cheap: every accessor is a
/// synchronous local-memory read.
pub trait Widget {
    /// Raw (un-normalized) widget text, if any.
    fn text(&self) -> Option<&str>;

    /// Whether the widget is currently hidden.
    fn is_hidden(&self) -> bool;

    /// Screen-space bounds, if the widget has been laid out.
    fn bounds(&self) -> Option<Rect>;

    /// Layout children.
    fn children(&self) -> Vec<&dyn Widget>;

    /// Static children.
    fn static_children(&self) -> Vec<&dyn Widget>;

    /// Dynamic (script-populated) children.
    fn dynamic_children(&self) -> Vec<&dyn Widget>;
}

/// Read-only view of the host UI for one tick.
pub trait UiSnapshot {
    /// Resolve a widget address. Absent widgets are `None`, never an error.
    fn widget(&self, id: WidgetId) -> Option<&dyn Widget>;

    /// Visible canvas width in pixels.
    fn canvas_width(&self) -> i32;

    /// Visible canvas height in pixels.
    fn canvas_height(&self) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both() {
        let a = Rect::new(10, 10, 20, 20);
        let b = Rect::new(40, 5, 10, 10);
        assert_eq!(a.union(&b), Rect::new(10, 5, 40, 25));
    }

    #[test]
    fn union_is_commutative() {
        let a = Rect::new(-5, 0, 10, 10);
        let b = Rect::new(3, 3, 1, 1);
        assert_eq!(a.union(&b), b.union(&a));
    }

    #[test]
    fn clamp_trims_every_edge() {
        let r = Rect::new(-10, -10, 800, 800);
        assert_eq!(
            r.clamp_to_canvas(765, 503),
            Some(Rect::new(0, 0, 765, 503))
        );
    }

    #[test]
    fn clamp_inside_is_identity() {
        let r = Rect::new(5, 5, 100, 50);
        assert_eq!(r.clamp_to_canvas(765, 503), Some(r));
    }

    #[test]
    fn degenerate_clamp_is_absent() {
        // Entirely off-canvas.
        assert_eq!(Rect::new(800, 10, 50, 50).clamp_to_canvas(765, 503), None);
        // Zero-area input.
        assert_eq!(Rect::new(10, 10, 0, 40).clamp_to_canvas(765, 503), None);
        // Degenerate canvas.
        assert_eq!(Rect::new(10, 10, 40, 40).clamp_to_canvas(0, 503), None);
    }
}

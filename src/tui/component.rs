use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something that draws itself into a region of the frame.
///
/// Components are built per frame from props (struct fields) and may borrow
/// persistent state mutably, so `render` takes `&mut self` to let them
/// refresh layout caches and scroll offsets while drawing. Same idea as
/// ratatui's `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events.
pub trait EventHandler {
    /// What the component reports back to the event loop.
    type Event;

    /// Handle a low-level `TuiEvent`, optionally emitting a higher-level one.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}

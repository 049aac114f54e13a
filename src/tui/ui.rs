use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::input_box::HEIGHT as INPUT_HEIGHT;
use crate::tui::components::{MessageList, TitleBar};

/// Splits the frame into title line, transcript and input box.
pub fn layout_areas(frame_area: Rect) -> [Rect; 3] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(INPUT_HEIGHT)]).areas(frame_area)
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize, now: Instant) {
    let [title_area, main_area, input_area] = layout_areas(frame.area());

    let mut title_bar = TitleBar::new(
        app.provider.name().to_string(),
        app.model_name.clone(),
        app.status_message.clone(),
    );
    title_bar.render(frame, title_area);

    MessageList::new(
        &mut tui.message_list,
        app.conversation.messages(),
        &tui.copies,
        app.is_thinking(),
        spinner_frame,
        now,
    )
    .render(frame, main_area);

    tui.input_box.waiting = app.is_awaiting();
    tui.input_box.render(frame, input_area);
}

//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the panel,
//! and translates terminal events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop redraws only when something changed:
//!
//! - **Animating** (thinking spinner, typewriter reveal, follow-scroll, a
//!   live "Copied!" acknowledgment): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms and redraws on events or terminal resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
pub mod components;
pub mod event;
pub mod markdown;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::action::{Action, Effect, update};
use crate::core::clipboard::{Clipboard, CopyController, SegmentKey, SystemClipboard};
use crate::core::config::ResolvedConfig;
use crate::core::request::TurnRequest;
use crate::core::segment;
use crate::core::state::App;
use crate::inference::{
    CompletionProvider, GeminiProvider, LmStudioProvider, Message, ProviderError, Role,
};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core session logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub copies: CopyController,
    pub reveal_interval: Duration,
}

impl TuiState {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self::with_clipboard(
            Box::new(SystemClipboard::new()),
            config.reveal_interval,
            config.copy_ack_window,
            config.scroll_slack_rows,
        )
    }

    pub fn with_clipboard(
        clipboard: Box<dyn Clipboard>,
        reveal_interval: Duration,
        copy_ack_window: Duration,
        scroll_slack_rows: u32,
    ) -> Self {
        Self {
            message_list: MessageListState::new(scroll_slack_rows),
            input_box: InputBox::new(),
            copies: CopyController::new(clipboard, copy_ack_window),
            reveal_interval,
        }
    }

    /// Applies the view side of an `Effect`. I/O (spawning requests,
    /// quitting) stays with the caller.
    pub fn apply_effect(&mut self, app: &App, effect: Effect, now: Instant) {
        match effect {
            Effect::SpawnRequest => {
                // The user message was accepted and appended
                self.input_box.clear();
                self.message_list.on_append();
            }
            Effect::MessageAppended => {
                self.message_list.on_append();
                let messages = app.conversation.messages();
                if let Some(last) = messages.last()
                    && last.role == Role::Bot
                    && !segment::has_fence(&last.content)
                {
                    self.message_list.start_reveal(
                        messages.len() - 1,
                        &last.content,
                        self.reveal_interval,
                        now,
                    );
                }
            }
            Effect::ResetView => {
                self.message_list.reset();
                self.copies.clear();
                self.input_box.clear();
            }
            Effect::None | Effect::Quit => {}
        }
    }

    /// Copies the code segment `key` and starts its acknowledgment.
    pub fn copy_segment(&mut self, app: &App, key: SegmentKey, now: Instant) -> bool {
        match code_text(app.conversation.messages(), key) {
            Some(text) => self.copies.request_copy(key, &text, now),
            None => {
                debug!("No code segment at {:?}", key);
                false
            }
        }
    }

    pub fn is_animating(&self, app: &App, now: Instant) -> bool {
        app.is_thinking() || self.message_list.is_animating(now) || self.copies.has_active(now)
    }
}

/// Body of the code segment addressed by `key`.
pub fn code_text(messages: &[Message], key: SegmentKey) -> Option<String> {
    let message = messages.get(key.message)?;
    if message.role != Role::Bot {
        return None;
    }
    segment::parse(&message.content)
        .into_iter()
        .nth(key.segment)
        .filter(|s| s.is_code())
        .map(|s| s.body)
}

/// The last code segment of the most recent bot reply that has one.
pub fn latest_code_key(messages: &[Message]) -> Option<SegmentKey> {
    messages
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, m)| m.role == Role::Bot)
        .find_map(|(message, m)| {
            segment::parse(&m.content)
                .iter()
                .rposition(|s| s.is_code())
                .map(|segment| SegmentKey { message, segment })
        })
}

/// Routes one terminal event. Returns the core `Effect` so the caller can
/// perform its I/O.
pub fn dispatch(app: &mut App, tui: &mut TuiState, event: TuiEvent, now: Instant) -> Effect {
    let effect = match event {
        TuiEvent::Resize => Effect::None,
        TuiEvent::Close => update(app, Action::Close),
        TuiEvent::NewSession => {
            let code = app.code.clone();
            update(app, Action::OpenSession { code })
        }
        TuiEvent::MouseClick(column, row) => {
            if tui.message_list.jump_hit(column, row) {
                tui.message_list.jump_to_latest();
            } else if let Some(key) = tui.message_list.copy_target_at(column, row) {
                tui.copy_segment(app, key, now);
            }
            Effect::None
        }
        TuiEvent::CopyLatestCode => {
            if let Some(key) = latest_code_key(app.conversation.messages()) {
                tui.copy_segment(app, key, now);
            }
            Effect::None
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::JumpToLatest => {
            tui.message_list.handle_event(&event);
            Effect::None
        }
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::Submit(text)) => update(app, Action::Submit(text)),
            Some(InputEvent::ContentChanged) | None => Effect::None,
        },
    };
    tui.apply_effect(app, effect, now);
    effect
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is harmlessly ignored by terminals that lack it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Build the backend client once per process from the resolved config.
pub fn build_provider(config: &ResolvedConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    match config.provider.as_str() {
        "lmstudio" => Ok(Arc::new(LmStudioProvider::new(Some(
            config.lmstudio_base_url.clone(),
        )))),
        "gemini" => {
            let api_key = config.gemini_api_key.clone().ok_or_else(|| {
                ProviderError::Config(
                    "Gemini API key must be set (config file, GEMINI_API_KEY env var, or --provider lmstudio)"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(GeminiProvider::new(
                api_key,
                Some(config.gemini_base_url.clone()),
            )))
        }
        other => Err(ProviderError::Config(format!("Unknown provider '{other}'"))),
    }
}

/// Runs the panel until it is closed.
pub fn run(config: ResolvedConfig, provider: Arc<dyn CompletionProvider>, code: String) -> std::io::Result<()> {
    let mut app = App::from_config(provider, &config, code);
    let mut tui = TuiState::new(&config);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut in_flight: Option<tokio::task::AbortHandle> = None;

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'event_loop: loop {
        let now = Instant::now();
        if tui.copies.prune(now) {
            needs_redraw = true;
        }
        tui.message_list.tick_reveals(now);

        let animating = tui.is_animating(&app, now);
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_millis() / ANIMATION_TICK.as_millis()) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame, now))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match dispatch(&mut app, &mut tui, event, Instant::now()) {
                Effect::Quit => break 'event_loop,
                Effect::SpawnRequest => in_flight = Some(spawn_request(&app, tx.clone())),
                Effect::ResetView => {
                    if let Some(handle) = in_flight.take() {
                        handle.abort();
                    }
                }
                Effect::None | Effect::MessageAppended => {}
            }
        }

        // Completions from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if effect == Effect::MessageAppended {
                in_flight = None;
            }
            tui.apply_effect(&app, effect, Instant::now());
        }
    }

    if let Some(handle) = in_flight.take() {
        handle.abort();
    }
    info!("Session {} closed after {} turns", app.session_id, app.conversation.turn_count());

    ratatui::restore();
    Ok(())
}

fn spawn_request(app: &App, tx: mpsc::Sender<Action>) -> tokio::task::AbortHandle {
    info!("Spawning completion request (generation {})", app.generation);
    let request = TurnRequest::from_app(app);
    let handle = tokio::spawn(async move {
        let action = request.run().await;
        if tx.send(action).is_err() {
            warn!("Failed to deliver completion: receiver dropped");
        }
    });
    handle.abort_handle()
}

//! # timed-quiz
//!
//! A terminal quiz with per-question or whole-sitting countdowns.
//!
//! Questions come from the bundled bank, a JSON file, a set saved earlier
//! with `draw`, or a chat-completion service that generates them on demand.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use timed_quiz::{Quiz, QuizError, QuizOrigin, SessionSettings};
//! use timed_quiz::data::builtin_questions;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), QuizError> {
//!     let origin = QuizOrigin::Bank {
//!         label: "English".into(),
//!         pool: builtin_questions()?,
//!         count: 10,
//!     };
//!     Quiz::new(origin, SessionSettings::default(), None).run().await
//! }
//! ```

pub mod ai;
mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod selector;
pub mod terminal;
pub mod timer;
mod ui;

use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures_util::StreamExt;

pub use ai::ChatCompletion;
pub use app::{App, AppChannels, FetchEvent, QuizOrigin, Screen, SetupField, SetupForm};
pub use error::QuizError;
pub use models::{Phase, Question, ScoreReport, Session, SessionSettings, TimerMode};

/// A quiz instance that can be run in the terminal.
pub struct Quiz {
    app: App,
    channels: AppChannels,
}

impl Quiz {
    pub fn new(
        origin: QuizOrigin,
        settings: SessionSettings,
        chat: Option<Arc<dyn ChatCompletion>>,
    ) -> Self {
        let (app, channels) = App::new(origin, settings, chat);
        Self { app, channels }
    }

    /// Run the quiz in the terminal.
    ///
    /// Takes over the terminal and returns when the user quits. Must be
    /// called from within a tokio runtime.
    pub async fn run(self) -> Result<(), QuizError> {
        let Quiz {
            mut app,
            mut channels,
        } = self;

        app.request_placeholders();
        let mut tui = terminal::Tui::enter()?;
        run_event_loop(&mut tui, &mut app, &mut channels).await
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

async fn run_event_loop(
    tui: &mut terminal::Tui,
    app: &mut App,
    channels: &mut AppChannels,
) -> Result<(), QuizError> {
    let mut keys = EventStream::new();

    loop {
        tui.terminal().draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            event = keys.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if handle_input(app, key.code) {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
            Some(event) = channels.timer.recv() => app.on_timer_event(event),
            Some(event) = channels.fetch.recv() => app.on_fetch_event(event),
        }
    }

    tracing::info!("quit");
    Ok(())
}

/// Returns true if the app should exit.
pub fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.screen {
        Screen::Setup if app.is_generated() => handle_form_input(app, key),
        Screen::Setup => handle_welcome_input(app, key),
        Screen::Loading => matches!(key, KeyCode::Esc),
        Screen::Quiz if app.session().phase() == Phase::AwaitingConfirmation => {
            handle_confirm_input(app, key);
            false
        }
        Screen::Quiz => handle_quiz_input(app, key),
        Screen::Results => handle_result_input(app, key),
    }
}

fn handle_welcome_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Enter => {
            app.start_quiz();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}

fn handle_form_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Esc => return true,
        KeyCode::Enter => app.start_quiz(),
        KeyCode::Tab | KeyCode::Down => app.focus_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.focus_previous_field(),
        KeyCode::Right => app.increase_field(),
        KeyCode::Left => app.decrease_field(),
        KeyCode::Backspace => app.erase_char(),
        KeyCode::Char(c) => app.type_char(c),
        _ => {}
    }
    false
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.choose_option(),
        KeyCode::Right | KeyCode::Char('n') => app.next_question(),
        KeyCode::Left | KeyCode::Char('p') => app.previous_question(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.request_submit(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_confirm_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_submit(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_submit(),
        _ => {}
    }
}

fn handle_result_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('e') | KeyCode::Char('E') => app.explain_selected(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

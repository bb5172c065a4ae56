use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ai::generator::DEFAULT_GENERATED;
use crate::ai::suggest::suggest_placeholders;
use crate::ai::{
    ChatCompletion, Difficulty, ExplanationBoard, ExplanationFetcher, GenerationRequest,
    Placeholders, QuestionGenerator, Ticket,
};
use crate::data::{QuestionSet, QuestionSource, SourceConfig};
use crate::error::{GenerationError, InvalidTransition, SourceError};
use crate::models::{Advance, Expiry, Question, ScoreReport, Session, SessionSettings};
use crate::selector::select;
use crate::timer::{Timer, TimerEvent};

/// Where the questions of a sitting come from.
pub enum QuizOrigin {
    /// Draw `count` questions from a validated pool for every sitting.
    Bank {
        label: String,
        pool: Vec<Question>,
        count: usize,
    },
    /// A set drawn earlier, taken as is.
    Drawn(QuestionSet),
    /// Questions generated on demand from the setup form.
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Loading,
    Quiz,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Subject,
    Topic,
    Count,
    Difficulty,
}

impl SetupField {
    const ORDER: [SetupField; 4] = [
        SetupField::Subject,
        SetupField::Topic,
        SetupField::Count,
        SetupField::Difficulty,
    ];

    fn step(self, offset: usize) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(index + offset) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone)]
pub struct SetupForm {
    pub subject: String,
    pub topic: String,
    pub count: usize,
    pub difficulty: Difficulty,
    pub focus: SetupField,
}

impl Default for SetupForm {
    fn default() -> Self {
        Self {
            subject: String::new(),
            topic: String::new(),
            count: DEFAULT_GENERATED,
            difficulty: Difficulty::default(),
            focus: SetupField::Subject,
        }
    }
}

impl SetupForm {
    pub fn request(&self) -> Result<GenerationRequest, &'static str> {
        if self.subject.trim().is_empty() {
            return Err("Please fill in the subject.");
        }
        Ok(GenerationRequest::new(self.subject.trim(), self.count, self.difficulty)
            .with_topic(self.topic.trim()))
    }
}

/// Results of background calls, delivered to the event loop.
#[derive(Debug)]
pub enum FetchEvent {
    Generated {
        id: Uuid,
        result: Result<Vec<Question>, SourceError>,
    },
    Explained {
        ticket: Ticket,
        result: Result<String, GenerationError>,
    },
    Suggested(Placeholders),
}

pub struct AppChannels {
    pub timer: mpsc::UnboundedReceiver<TimerEvent>,
    pub fetch: mpsc::UnboundedReceiver<FetchEvent>,
}

struct PendingGeneration {
    id: Uuid,
    count: usize,
}

pub struct App {
    pub screen: Screen,
    origin: QuizOrigin,
    session: Session<Timer>,
    source: QuestionSource,
    chat: Option<Arc<dyn ChatCompletion>>,
    fetcher: Option<ExplanationFetcher>,
    fetch_tx: mpsc::UnboundedSender<FetchEvent>,
    form: SetupForm,
    placeholders: Placeholders,
    pending_generation: Option<PendingGeneration>,
    error_message: Option<String>,
    selected_option: usize,
    report: Option<ScoreReport>,
    result_cursor: usize,
    explanations: ExplanationBoard,
}

impl App {
    pub fn new(
        origin: QuizOrigin,
        settings: SessionSettings,
        chat: Option<Arc<dyn ChatCompletion>>,
    ) -> (Self, AppChannels) {
        let (timer, timer_rx) = Timer::new();
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        let source = QuestionSource::new(chat.clone().map(QuestionGenerator::new));
        let fetcher = chat.clone().map(ExplanationFetcher::new);

        let app = Self {
            screen: Screen::Setup,
            origin,
            session: Session::new(settings, timer),
            source,
            chat,
            fetcher,
            fetch_tx,
            form: SetupForm::default(),
            placeholders: Placeholders::default(),
            pending_generation: None,
            error_message: None,
            selected_option: 0,
            report: None,
            result_cursor: 0,
            explanations: ExplanationBoard::new(),
        };
        let channels = AppChannels {
            timer: timer_rx,
            fetch: fetch_rx,
        };
        (app, channels)
    }

    pub fn session(&self) -> &Session<Timer> {
        &self.session
    }

    pub fn form(&self) -> &SetupForm {
        &self.form
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    pub fn result_cursor(&self) -> usize {
        self.result_cursor
    }

    pub fn explanations(&self) -> &ExplanationBoard {
        &self.explanations
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.origin, QuizOrigin::Generated)
    }

    pub fn is_generating(&self) -> bool {
        self.pending_generation.is_some()
    }

    pub fn can_explain(&self) -> bool {
        self.fetcher.is_some()
    }

    pub fn label(&self) -> String {
        match &self.origin {
            QuizOrigin::Bank { label, .. } => label.clone(),
            QuizOrigin::Drawn(set) => set.label.clone(),
            QuizOrigin::Generated => match self.form.request() {
                Ok(request) => SourceConfig::Generated(request).label(),
                Err(_) => "AI quiz".to_string(),
            },
        }
    }

    /// Number of questions the next sitting will have.
    pub fn sitting_size(&self) -> usize {
        match &self.origin {
            QuizOrigin::Bank { pool, count, .. } => (*count).min(pool.len()),
            QuizOrigin::Drawn(set) => set.questions.len(),
            QuizOrigin::Generated => self.form.count,
        }
    }

    /// Fetch example subjects and topics for the setup form.
    pub fn request_placeholders(&self) {
        let (QuizOrigin::Generated, Some(chat)) = (&self.origin, &self.chat) else {
            return;
        };
        let chat = Arc::clone(chat);
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let placeholders = suggest_placeholders(chat.as_ref()).await;
            let _ = tx.send(FetchEvent::Suggested(placeholders));
        });
    }

    pub fn start_quiz(&mut self) {
        let questions = match &self.origin {
            QuizOrigin::Bank { pool, count, .. } => select(pool, *count),
            QuizOrigin::Drawn(set) => set.questions.clone(),
            QuizOrigin::Generated => {
                self.start_generation();
                return;
            }
        };
        self.begin_with(questions);
    }

    fn start_generation(&mut self) {
        if self.pending_generation.is_some() {
            return;
        }
        let request = match self.form.request() {
            Ok(request) => request,
            Err(message) => {
                self.error_message = Some(message.to_string());
                return;
            }
        };

        let id = Uuid::new_v4();
        self.pending_generation = Some(PendingGeneration {
            id,
            count: request.count,
        });
        self.error_message = None;
        self.screen = Screen::Loading;

        let source = self.source.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = source.get_pool(&SourceConfig::Generated(request)).await;
            let _ = tx.send(FetchEvent::Generated { id, result });
        });
    }

    fn begin_with(&mut self, questions: Vec<Question>) {
        self.explanations.clear();
        self.report = None;
        self.result_cursor = 0;

        match self.session.begin(questions) {
            Ok(()) => {
                self.error_message = None;
                self.screen = Screen::Quiz;
                self.sync_cursor();
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not start sitting");
                self.error_message = Some(format!("Cannot start the quiz: {err}."));
                self.screen = Screen::Setup;
            }
        }
    }

    fn sync_cursor(&mut self) {
        let current = self.session.current_index();
        self.selected_option = self.session.answer_for(current).unwrap_or(0);
    }

    fn option_count(&self) -> usize {
        self.session
            .current_question()
            .map(|q| q.options.len())
            .unwrap_or(1)
    }

    pub fn select_next_option(&mut self) {
        self.selected_option = (self.selected_option + 1) % self.option_count();
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        self.selected_option = (self.selected_option + count - 1) % count;
    }

    pub fn choose_option(&mut self) {
        logged(self.session.record_answer(self.selected_option));
    }

    pub fn next_question(&mut self) {
        if let Some(Advance::Moved(_)) = logged(self.session.advance()) {
            self.sync_cursor();
        }
    }

    pub fn previous_question(&mut self) {
        if logged(self.session.go_back()).is_some() {
            self.sync_cursor();
        }
    }

    pub fn request_submit(&mut self) {
        logged(self.session.request_submit());
    }

    pub fn confirm_submit(&mut self) {
        if logged(self.session.confirm_submit()).is_some() {
            self.enter_results();
        }
    }

    pub fn cancel_submit(&mut self) {
        logged(self.session.cancel_submit());
    }

    pub fn on_timer_event(&mut self, event: TimerEvent) {
        if !self.session.clock().is_current(&event) {
            tracing::debug!(?event, "dropping stale timer event");
            return;
        }
        match event {
            TimerEvent::Tick { remaining, .. } => self.session.on_tick(remaining),
            TimerEvent::Expired { .. } => match self.session.on_timer_expire() {
                Expiry::Advanced(_) => self.sync_cursor(),
                Expiry::Finished => self.enter_results(),
                Expiry::Ignored => {}
            },
        }
    }

    fn enter_results(&mut self) {
        self.report = logged(self.session.report());
        self.result_cursor = 0;
        self.screen = Screen::Results;
    }

    pub fn on_fetch_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Generated { id, result } => self.on_generated(id, result),
            FetchEvent::Explained { ticket, result } => {
                self.explanations.resolve(ticket, result);
            }
            FetchEvent::Suggested(placeholders) => self.placeholders = placeholders,
        }
    }

    fn on_generated(&mut self, id: Uuid, result: Result<Vec<Question>, SourceError>) {
        let Some(pending) = self.pending_generation.take_if(|p| p.id == id) else {
            tracing::warn!(%id, "discarding stale generation result");
            return;
        };

        match result {
            Ok(pool) => {
                let questions = select(&pool, pending.count);
                self.begin_with(questions);
            }
            Err(err) => {
                tracing::error!(error = %err, "quiz generation failed");
                self.error_message = Some(format!("{err}. Please try again."));
                self.screen = Screen::Setup;
            }
        }
    }

    /// Request an explanation for the highlighted result row.
    pub fn explain_selected(&mut self) {
        let Some(fetcher) = self.fetcher.clone() else {
            return;
        };
        if self.screen != Screen::Results {
            return;
        }
        let index = self.result_cursor;
        let Some(question) = self.session.questions().get(index).cloned() else {
            return;
        };
        let Some(ticket) = self.explanations.request(index) else {
            return;
        };

        let selected = self.session.answer_for(index);
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.explain(&question, selected).await;
            let _ = tx.send(FetchEvent::Explained { ticket, result });
        });
    }

    pub fn scroll_results_down(&mut self) {
        let max = self.session.total_questions().saturating_sub(1);
        self.result_cursor = (self.result_cursor + 1).min(max);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_cursor = self.result_cursor.saturating_sub(1);
    }

    /// Drop the finished sitting and go back to setup.
    pub fn restart(&mut self) {
        self.session.reset();
        self.explanations.clear();
        self.report = None;
        self.result_cursor = 0;
        self.selected_option = 0;
        self.error_message = None;
        self.screen = Screen::Setup;
    }

    /// Preset the number of questions asked for in the setup form.
    pub fn set_question_count(&mut self, count: usize) {
        self.form.count = count.clamp(
            crate::ai::generator::MIN_GENERATED,
            crate::ai::generator::MAX_GENERATED,
        );
    }

    pub fn focus_next_field(&mut self) {
        self.form.focus = self.form.focus.step(1);
    }

    pub fn focus_previous_field(&mut self) {
        self.form.focus = self.form.focus.step(SetupField::ORDER.len() - 1);
    }

    pub fn type_char(&mut self, c: char) {
        match self.form.focus {
            SetupField::Subject => self.form.subject.push(c),
            SetupField::Topic => self.form.topic.push(c),
            SetupField::Count | SetupField::Difficulty => match c {
                '+' | '=' => self.increase_field(),
                '-' => self.decrease_field(),
                _ => {}
            },
        }
    }

    pub fn erase_char(&mut self) {
        match self.form.focus {
            SetupField::Subject => {
                self.form.subject.pop();
            }
            SetupField::Topic => {
                self.form.topic.pop();
            }
            SetupField::Count | SetupField::Difficulty => {}
        }
    }

    pub fn increase_field(&mut self) {
        match self.form.focus {
            SetupField::Count => {
                self.form.count = (self.form.count + 1).min(crate::ai::generator::MAX_GENERATED);
            }
            SetupField::Difficulty => self.form.difficulty = self.form.difficulty.next(),
            _ => {}
        }
    }

    pub fn decrease_field(&mut self) {
        match self.form.focus {
            SetupField::Count => {
                self.form.count = self
                    .form
                    .count
                    .saturating_sub(1)
                    .max(crate::ai::generator::MIN_GENERATED);
            }
            SetupField::Difficulty => self.form.difficulty = self.form.difficulty.previous(),
            _ => {}
        }
    }
}

/// Log a rejected session operation; key handlers never surface these.
fn logged<T>(result: Result<T, InvalidTransition>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "rejected session operation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ai::{ExplanationState, ScriptedChat};
    use crate::models::{Phase, TimerMode};

    fn bank(count: usize, limit: u32) -> QuizOrigin {
        let pool = (0..count)
            .map(|i| Question::new(format!("Q{i}"), ["a", "b", "c"], 1, limit))
            .collect();
        QuizOrigin::Bank {
            label: "Test".into(),
            pool,
            count,
        }
    }

    fn generated_payload(n: usize) -> String {
        let records: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"question":"G{i}","options":["x","y","z"],"correctAnswerIndex":2,"timeLimitSeconds":15}}"#
                )
            })
            .collect();
        format!("```json\n[{}]\n```", records.join(","))
    }

    #[tokio::test(start_paused = true)]
    async fn test_bank_sitting_to_results() {
        let (mut app, _channels) = App::new(bank(3, 30), SessionSettings::default(), None);
        app.start_quiz();
        assert_eq!(app.screen, Screen::Quiz);
        assert_eq!(app.session().total_questions(), 3);

        for _ in 0..3 {
            app.select_next_option();
            app.choose_option();
            app.next_question();
        }
        assert_eq!(app.session().phase(), Phase::AwaitingConfirmation);
        app.confirm_submit();

        assert_eq!(app.screen, Screen::Results);
        let report = app.report().unwrap();
        assert_eq!((report.correct_count, report.total), (3, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_follows_recorded_answer() {
        let (mut app, _channels) = App::new(bank(2, 30), SessionSettings::default(), None);
        app.start_quiz();
        app.select_previous_option();
        assert_eq!(app.selected_option(), 2);
        app.choose_option();
        app.next_question();
        assert_eq!(app.selected_option(), 0);
        app.previous_question();
        assert_eq!(app.selected_option(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_drives_sitting_to_results() {
        let (mut app, mut channels) = App::new(bank(2, 1), SessionSettings::default(), None);
        app.start_quiz();
        app.select_next_option();
        app.choose_option();

        while app.screen != Screen::Results {
            let event = channels.timer.recv().await.unwrap();
            app.on_timer_event(event);
        }
        let report = app.report().unwrap();
        assert_eq!(report.correct_count, 1);
        assert_eq!(report.per_question[1].selected_index, None);
        assert!(!report.per_question[1].is_correct);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whole_session_expiry() {
        let settings = SessionSettings {
            timer: TimerMode::WholeSession { seconds: 2 },
            allow_back: true,
        };
        let (mut app, mut channels) = App::new(bank(5, 60), settings, None);
        app.start_quiz();
        while app.screen != Screen::Results {
            let event = channels.timer.recv().await.unwrap();
            app.on_timer_event(event);
        }
        assert_eq!(app.report().unwrap().correct_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generated_sitting_and_explanation() {
        let chat: Arc<dyn ChatCompletion> = Arc::new(ScriptedChat::replying([
            generated_payload(3),
            "Because z.".to_string(),
        ]));
        let (mut app, mut channels) = App::new(QuizOrigin::Generated, SessionSettings::default(), Some(chat));

        app.start_quiz();
        assert_eq!(app.error_message(), Some("Please fill in the subject."));
        assert_eq!(app.screen, Screen::Setup);

        for c in "Science".chars() {
            app.type_char(c);
        }
        app.focus_next_field();
        app.focus_next_field();
        app.decrease_field();
        app.decrease_field();
        assert_eq!(app.form().count, 3);

        app.start_quiz();
        assert_eq!(app.screen, Screen::Loading);
        assert!(app.is_generating());
        app.start_quiz();

        let event = channels.fetch.recv().await.unwrap();
        app.on_fetch_event(event);
        assert_eq!(app.screen, Screen::Quiz);
        assert_eq!(app.session().total_questions(), 3);

        app.request_submit();
        app.confirm_submit();
        assert_eq!(app.screen, Screen::Results);

        app.explain_selected();
        app.explain_selected();
        assert!(app.explanations().is_loading(0));
        let event = channels.fetch.recv().await.unwrap();
        app.on_fetch_event(event);
        assert_eq!(
            app.explanations().get(0),
            Some(&ExplanationState::Ready("Because z.".into()))
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(channels.fetch.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_failure_returns_to_setup() {
        let chat: Arc<dyn ChatCompletion> = Arc::new(ScriptedChat::replying(["no json here"]));
        let (mut app, mut channels) = App::new(QuizOrigin::Generated, SessionSettings::default(), Some(chat));
        for c in "Math".chars() {
            app.type_char(c);
        }
        app.start_quiz();
        let event = channels.fetch.recv().await.unwrap();
        app.on_fetch_event(event);

        assert_eq!(app.screen, Screen::Setup);
        assert!(app.error_message().unwrap().ends_with("Please try again."));
        assert_eq!(app.session().phase(), Phase::NotStarted);
        assert!(!app.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_discarded() {
        let (mut app, _channels) = App::new(QuizOrigin::Generated, SessionSettings::default(), None);
        app.on_fetch_event(FetchEvent::Generated {
            id: Uuid::new_v4(),
            result: Ok(vec![Question::new("Q", ["a", "b"], 0, 10)]),
        });
        assert_eq!(app.screen, Screen::Setup);
        assert_eq!(app.session().phase(), Phase::NotStarted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_draw_reports_why_nothing_started() {
        let (mut app, _channels) = App::new(bank(0, 30), SessionSettings::default(), None);
        app.start_quiz();
        assert_eq!(app.screen, Screen::Setup);
        assert_eq!(app.session().phase(), Phase::NotStarted);
        assert!(app.error_message().unwrap().starts_with("Cannot start the quiz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_discards_sitting() {
        let (mut app, _channels) = App::new(bank(2, 30), SessionSettings::default(), None);
        app.start_quiz();
        app.request_submit();
        app.confirm_submit();
        app.restart();
        assert_eq!(app.screen, Screen::Setup);
        assert_eq!(app.session().phase(), Phase::NotStarted);
        app.start_quiz();
        assert_eq!(app.session().phase(), Phase::InProgress);
    }
}

//! The quiz session state machine.
//!
//! A [`Session`] moves through `NotStarted -> InProgress ->
//! AwaitingConfirmation -> Finished`. While in progress a cursor walks the
//! drawn questions without changing the phase. Every user-driven operation
//! returns `Err(InvalidTransition)` without touching state when called in the
//! wrong phase; timer-driven operations always succeed.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::InvalidTransition;
use crate::models::question::Question;
use crate::models::score::ScoreReport;
use crate::timer::Clock;

/// Coarse state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    AwaitingConfirmation,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "not started",
            Phase::InProgress => "in progress",
            Phase::AwaitingConfirmation => "awaiting confirmation",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Named session operations, used in rejection reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Begin,
    RecordAnswer,
    Advance,
    GoBack,
    RequestSubmit,
    ConfirmSubmit,
    CancelSubmit,
    Score,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Begin => "begin",
            Operation::RecordAnswer => "record_answer",
            Operation::Advance => "advance",
            Operation::GoBack => "go_back",
            Operation::RequestSubmit => "request_submit",
            Operation::ConfirmSubmit => "confirm_submit",
            Operation::CancelSubmit => "cancel_submit",
            Operation::Score => "score",
        };
        f.write_str(name)
    }
}

/// How the countdown is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Each question runs on its own time limit.
    PerQuestion,
    /// One clock for the whole sitting.
    WholeSession { seconds: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub timer: TimerMode,
    /// Whether the Previous control is exposed.
    pub allow_back: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timer: TimerMode::PerQuestion,
            allow_back: true,
        }
    }
}

/// Outcome of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to this question.
    Moved(usize),
    /// The last question was left; submission must be confirmed.
    AwaitingConfirmation,
}

/// What a timer expiry did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Advanced(usize),
    Finished,
    /// The session was not running; the expiry was stale.
    Ignored,
}

pub struct Session<C: Clock> {
    settings: SessionSettings,
    clock: C,
    questions: Vec<Question>,
    current_index: usize,
    answers: BTreeMap<usize, usize>,
    phase: Phase,
    time_remaining: u32,
}

impl<C: Clock> Session<C> {
    pub fn new(settings: SessionSettings, clock: C) -> Self {
        Self {
            settings,
            clock,
            questions: Vec::new(),
            current_index: 0,
            answers: BTreeMap::new(),
            phase: Phase::NotStarted,
            time_remaining: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    pub fn answer_for(&self, index: usize) -> Option<usize> {
        self.answers.get(&index).copied()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::InProgress | Phase::AwaitingConfirmation => self.questions.get(self.current_index),
            _ => None,
        }
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn require(&self, operation: Operation, phase: Phase) -> Result<(), InvalidTransition> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(InvalidTransition::WrongPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn restart_clock_for_current(&mut self) {
        if let TimerMode::PerQuestion = self.settings.timer {
            let seconds = self.questions[self.current_index].time_limit_seconds;
            self.time_remaining = seconds;
            self.clock.start(seconds);
        }
    }

    fn finish(&mut self) {
        self.clock.cancel();
        self.phase = Phase::Finished;
        tracing::info!(
            answered = self.answers.len(),
            total = self.questions.len(),
            "session finished"
        );
    }

    /// Start the sitting on the first question.
    pub fn begin(&mut self, questions: Vec<Question>) -> Result<(), InvalidTransition> {
        self.require(Operation::Begin, Phase::NotStarted)?;
        if questions.is_empty() {
            return Err(InvalidTransition::NoQuestions);
        }

        self.questions = questions;
        self.current_index = 0;
        self.answers.clear();
        self.phase = Phase::InProgress;

        let seconds = match self.settings.timer {
            TimerMode::PerQuestion => self.questions[0].time_limit_seconds,
            TimerMode::WholeSession { seconds } => seconds,
        };
        self.time_remaining = seconds;
        self.clock.start(seconds);

        tracing::info!(questions = self.questions.len(), seconds, "session started");
        Ok(())
    }

    /// Store or overwrite the answer for the current question.
    pub fn record_answer(&mut self, option: usize) -> Result<(), InvalidTransition> {
        self.require(Operation::RecordAnswer, Phase::InProgress)?;
        let question = &self.questions[self.current_index];
        if !question.is_valid_option(option) {
            return Err(InvalidTransition::OptionOutOfRange {
                option,
                available: question.options.len(),
            });
        }
        self.answers.insert(self.current_index, option);
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Advance, InvalidTransition> {
        self.require(Operation::Advance, Phase::InProgress)?;
        if self.is_last() {
            self.phase = Phase::AwaitingConfirmation;
            return Ok(Advance::AwaitingConfirmation);
        }
        self.current_index += 1;
        self.restart_clock_for_current();
        tracing::debug!(index = self.current_index, "advanced");
        Ok(Advance::Moved(self.current_index))
    }

    pub fn go_back(&mut self) -> Result<usize, InvalidTransition> {
        self.require(Operation::GoBack, Phase::InProgress)?;
        if !self.settings.allow_back {
            return Err(InvalidTransition::BackDisabled);
        }
        if self.current_index == 0 {
            return Err(InvalidTransition::AtFirstQuestion);
        }
        self.current_index -= 1;
        self.restart_clock_for_current();
        Ok(self.current_index)
    }

    /// Ask to submit before reaching the last question.
    pub fn request_submit(&mut self) -> Result<(), InvalidTransition> {
        self.require(Operation::RequestSubmit, Phase::InProgress)?;
        self.phase = Phase::AwaitingConfirmation;
        Ok(())
    }

    pub fn confirm_submit(&mut self) -> Result<(), InvalidTransition> {
        self.require(Operation::ConfirmSubmit, Phase::AwaitingConfirmation)?;
        self.finish();
        Ok(())
    }

    pub fn cancel_submit(&mut self) -> Result<(), InvalidTransition> {
        self.require(Operation::CancelSubmit, Phase::AwaitingConfirmation)?;
        self.phase = Phase::InProgress;
        Ok(())
    }

    pub fn on_tick(&mut self, remaining: u32) {
        if matches!(self.phase, Phase::InProgress | Phase::AwaitingConfirmation) {
            self.time_remaining = remaining;
        }
    }

    /// Forced transition when the countdown reaches zero.
    pub fn on_timer_expire(&mut self) -> Expiry {
        if !matches!(self.phase, Phase::InProgress | Phase::AwaitingConfirmation) {
            return Expiry::Ignored;
        }
        self.time_remaining = 0;

        let whole_session = matches!(self.settings.timer, TimerMode::WholeSession { .. });
        if whole_session || self.is_last() {
            self.finish();
            return Expiry::Finished;
        }

        // A pending early submit is abandoned along with the question.
        self.phase = Phase::InProgress;
        self.current_index += 1;
        self.restart_clock_for_current();
        tracing::debug!(index = self.current_index, "advanced on expiry");
        Expiry::Advanced(self.current_index)
    }

    pub fn report(&self) -> Result<ScoreReport, InvalidTransition> {
        self.require(Operation::Score, Phase::Finished)?;
        Ok(ScoreReport::compute(&self.questions, &self.answers))
    }

    /// Discard the sitting and return to `NotStarted` for a new one.
    pub fn reset(&mut self) {
        self.clock.cancel();
        self.questions.clear();
        self.answers.clear();
        self.current_index = 0;
        self.time_remaining = 0;
        self.phase = Phase::NotStarted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    fn questions(limits: &[u32]) -> Vec<Question> {
        limits
            .iter()
            .enumerate()
            .map(|(i, &limit)| Question::new(format!("Q{i}"), ["a", "b", "c"], i % 3, limit))
            .collect()
    }

    fn started(limits: &[u32]) -> Session<ManualClock> {
        let mut session = Session::new(SessionSettings::default(), ManualClock::new());
        session.begin(questions(limits)).unwrap();
        session
    }

    fn whole(seconds: u32, limits: &[u32]) -> Session<ManualClock> {
        let settings = SessionSettings {
            timer: TimerMode::WholeSession { seconds },
            allow_back: true,
        };
        let mut session = Session::new(settings, ManualClock::new());
        session.begin(questions(limits)).unwrap();
        session
    }

    fn snapshot(s: &Session<ManualClock>) -> (Phase, usize, BTreeMap<usize, usize>, u32, ManualClock) {
        (
            s.phase(),
            s.current_index(),
            s.answers().clone(),
            s.time_remaining(),
            s.clock().clone(),
        )
    }

    #[test]
    fn test_begin_starts_first_question_clock() {
        let session = started(&[20, 30]);
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.time_remaining(), 20);
        assert_eq!(session.clock().starts, vec![20]);
    }

    #[test]
    fn test_begin_rejects_empty_and_repeat() {
        let mut session = Session::new(SessionSettings::default(), ManualClock::new());
        assert_eq!(session.begin(Vec::new()), Err(InvalidTransition::NoQuestions));
        assert_eq!(session.phase(), Phase::NotStarted);

        session.begin(questions(&[10])).unwrap();
        let before = snapshot(&session);
        assert_eq!(
            session.begin(questions(&[10, 10])),
            Err(InvalidTransition::WrongPhase {
                operation: Operation::Begin,
                phase: Phase::InProgress
            })
        );
        assert_eq!(snapshot(&session), before);
        assert_eq!(session.total_questions(), 1);
    }

    #[test]
    fn test_record_answer_overwrites_without_advancing() {
        let mut session = started(&[20, 30]);
        session.record_answer(0).unwrap();
        session.record_answer(2).unwrap();
        assert_eq!(session.answer_for(0), Some(2));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn test_record_answer_rejects_out_of_range_option() {
        let mut session = started(&[20]);
        let before = snapshot(&session);
        assert_eq!(
            session.record_answer(3),
            Err(InvalidTransition::OptionOutOfRange { option: 3, available: 3 })
        );
        assert_eq!(snapshot(&session), before);
    }

    #[test]
    fn test_rejects_operations_before_begin() {
        let mut session = Session::new(SessionSettings::default(), ManualClock::new());
        let before = snapshot(&session);
        assert!(matches!(
            session.record_answer(0),
            Err(InvalidTransition::WrongPhase { operation: Operation::RecordAnswer, .. })
        ));
        assert!(session.advance().is_err());
        assert!(session.go_back().is_err());
        assert!(session.confirm_submit().is_err());
        assert!(session.cancel_submit().is_err());
        assert!(session.report().is_err());
        assert_eq!(session.on_timer_expire(), Expiry::Ignored);
        assert_eq!(snapshot(&session), before);
    }

    #[test]
    fn test_advance_restarts_clock_per_question() {
        let mut session = started(&[20, 30, 45]);
        assert_eq!(session.advance(), Ok(Advance::Moved(1)));
        assert_eq!(session.time_remaining(), 30);
        assert_eq!(session.advance(), Ok(Advance::Moved(2)));
        assert_eq!(session.clock().starts, vec![20, 30, 45]);
    }

    #[test]
    fn test_advance_on_last_awaits_confirmation() {
        let mut session = started(&[20, 30]);
        session.advance().unwrap();
        assert_eq!(session.advance(), Ok(Advance::AwaitingConfirmation));
        assert_eq!(session.phase(), Phase::AwaitingConfirmation);
        assert_eq!(session.current_index(), 1);

        let before = snapshot(&session);
        assert!(session.record_answer(0).is_err());
        assert!(session.advance().is_err());
        assert!(session.go_back().is_err());
        assert_eq!(snapshot(&session), before);
    }

    #[test]
    fn test_cancel_submit_returns_to_same_question() {
        let mut session = started(&[20, 30]);
        session.advance().unwrap();
        session.advance().unwrap();
        session.cancel_submit().unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.current_index(), 1);
        session.record_answer(1).unwrap();
    }

    #[test]
    fn test_confirm_submit_finishes_and_cancels_clock() {
        let mut session = started(&[20]);
        session.record_answer(0).unwrap();
        session.advance().unwrap();
        session.confirm_submit().unwrap();
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.clock().cancels, 1);
        assert_eq!(session.clock().running(), None);
        assert_eq!(session.report().unwrap().correct_count, 1);
    }

    #[test]
    fn test_request_submit_from_middle() {
        let mut session = started(&[20, 30, 40]);
        session.request_submit().unwrap();
        assert_eq!(session.phase(), Phase::AwaitingConfirmation);
        session.cancel_submit().unwrap();
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_go_back_rules() {
        let mut session = started(&[20, 30]);
        assert_eq!(session.go_back(), Err(InvalidTransition::AtFirstQuestion));
        session.advance().unwrap();
        assert_eq!(session.go_back(), Ok(0));
        assert_eq!(session.time_remaining(), 20);
        assert_eq!(session.clock().starts, vec![20, 30, 20]);

        let settings = SessionSettings {
            timer: TimerMode::PerQuestion,
            allow_back: false,
        };
        let mut session = Session::new(settings, ManualClock::new());
        session.begin(questions(&[20, 30])).unwrap();
        session.advance().unwrap();
        let before = snapshot(&session);
        assert_eq!(session.go_back(), Err(InvalidTransition::BackDisabled));
        assert_eq!(snapshot(&session), before);
    }

    #[test]
    fn test_whole_session_clock_survives_navigation() {
        let mut session = whole(600, &[20, 30, 40]);
        session.on_tick(590);
        session.advance().unwrap();
        session.advance().unwrap();
        session.go_back().unwrap();
        assert_eq!(session.clock().starts, vec![600]);
        assert_eq!(session.time_remaining(), 590);
    }

    #[test]
    fn test_expiry_on_middle_question_matches_advance() {
        let mut expired = started(&[20, 30, 40]);
        let mut advanced = started(&[20, 30, 40]);

        assert_eq!(expired.on_timer_expire(), Expiry::Advanced(1));
        assert_eq!(advanced.advance(), Ok(Advance::Moved(1)));
        assert_eq!(snapshot(&expired), snapshot(&advanced));
    }

    #[test]
    fn test_expiry_on_last_question_skips_confirmation() {
        let mut session = started(&[20, 30]);
        session.advance().unwrap();
        assert_eq!(session.on_timer_expire(), Expiry::Finished);
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.time_remaining(), 0);
    }

    #[test]
    fn test_expiry_while_awaiting_confirmation_finishes() {
        let mut session = started(&[20]);
        session.advance().unwrap();
        assert_eq!(session.on_timer_expire(), Expiry::Finished);
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn test_whole_session_expiry_finishes_anywhere() {
        let mut session = whole(60, &[20, 30, 40]);
        assert_eq!(session.on_timer_expire(), Expiry::Finished);
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn test_finished_session_is_frozen() {
        let mut session = started(&[20]);
        session.record_answer(1).unwrap();
        session.on_timer_expire();
        let before = snapshot(&session);

        assert!(session.record_answer(0).is_err());
        assert!(session.advance().is_err());
        assert!(session.request_submit().is_err());
        assert!(session.begin(questions(&[5])).is_err());
        session.on_tick(3);
        assert_eq!(session.on_timer_expire(), Expiry::Ignored);
        assert_eq!(snapshot(&session), before);
    }

    #[test]
    fn test_reset_allows_new_sitting() {
        let mut session = started(&[20]);
        session.record_answer(0).unwrap();
        session.on_timer_expire();
        session.reset();
        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(session.answers().is_empty());

        session.begin(questions(&[15, 15])).unwrap();
        assert_eq!(session.total_questions(), 2);
        assert_eq!(session.clock().starts.last(), Some(&15));
    }

    #[test]
    fn test_answers_stay_in_bounds_for_any_sequence() {
        let mut session = started(&[5, 5, 5, 5]);
        for step in 0..200usize {
            let _ = match step % 7 {
                0 => session.record_answer(step % 5).map(|_| ()),
                1 => session.advance().map(|_| ()),
                2 => session.go_back().map(|_| ()),
                3 => session.cancel_submit(),
                4 => session.record_answer(step % 3).map(|_| ()),
                5 => session.request_submit(),
                _ => {
                    session.on_tick((step % 5) as u32);
                    Ok(())
                }
            };
            for (&index, &option) in session.answers() {
                assert!(index < session.total_questions());
                assert!(session.questions()[index].is_valid_option(option));
            }
            if matches!(session.phase(), Phase::InProgress | Phase::AwaitingConfirmation) {
                assert!(session.current_index() < session.total_questions());
            }
        }
    }
}

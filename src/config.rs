//! Command-line configuration.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::models::{SessionSettings, TimerMode};

/// Questions drawn per sitting from a static bank.
pub const DEFAULT_BANK_COUNT: usize = 10;
/// Whole-sitting time budget (20 minutes).
pub const DEFAULT_TOTAL_SECONDS: u32 = 1200;

fn at_least_one() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File to append diagnostics to
    #[arg(long, global = true, env = "QUIZ_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("timed-quiz.log"))
    }

    /// The subcommand, defaulting to `play` with default flags.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Play(PlayArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Take a quiz from a question bank or generated by the AI service
    Play(PlayArgs),
    /// Draw a sitting from a question bank and save it for `take`
    Draw(DrawArgs),
    /// Take a sitting previously saved by `draw`
    Take(TakeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// JSON file to load the questions from (defaults to the bundled bank)
    #[arg(short, long)]
    pub questions: Option<PathBuf>,

    /// Number of questions per sitting
    #[arg(short = 'n', long, value_parser = at_least_one())]
    pub count: Option<usize>,

    /// Generate questions with the AI service (needs QUIZ_AI_API_KEY)
    #[arg(long, conflicts_with = "questions")]
    pub ai: bool,

    #[command(flatten)]
    pub timer: TimerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DrawArgs {
    /// JSON file to load the questions from (defaults to the bundled bank)
    #[arg(short, long)]
    pub questions: Option<PathBuf>,

    /// Number of questions to draw
    #[arg(short = 'n', long, default_value_t = DEFAULT_BANK_COUNT, value_parser = at_least_one())]
    pub count: usize,

    /// Where to save the drawn set
    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TakeArgs {
    /// Drawn set written by `draw`; consumed on load
    #[arg(short, long)]
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub timer: TimerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TimerArgs {
    /// Countdown per question, or one for the whole sitting
    #[arg(long, value_enum, default_value_t = TimerKind::PerQuestion)]
    pub timer: TimerKind,

    /// Time budget for `--timer whole`
    #[arg(long, default_value_t = DEFAULT_TOTAL_SECONDS)]
    pub total_seconds: u32,

    /// Hide the Previous control
    #[arg(long)]
    pub no_back: bool,
}

impl Default for TimerArgs {
    fn default() -> Self {
        Self {
            timer: TimerKind::PerQuestion,
            total_seconds: DEFAULT_TOTAL_SECONDS,
            no_back: false,
        }
    }
}

impl TimerArgs {
    pub fn settings(&self) -> SessionSettings {
        let timer = match self.timer {
            TimerKind::PerQuestion => TimerMode::PerQuestion,
            TimerKind::Whole => TimerMode::WholeSession {
                seconds: self.total_seconds.max(1),
            },
        };
        SessionSettings {
            timer,
            allow_back: !self.no_back,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    PerQuestion,
    Whole,
}

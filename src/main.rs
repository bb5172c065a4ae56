use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Parser;
use timed_quiz::ai::{ChatClient, ChatCompletion};
use timed_quiz::config::{Cli, Command, DEFAULT_BANK_COUNT, DrawArgs, PlayArgs, TakeArgs};
use timed_quiz::data::{QuestionSet, QuestionSource, SnapshotStore, SourceConfig};
use timed_quiz::error::GenerationError;
use timed_quiz::selector::select;
use timed_quiz::{Quiz, QuizError, QuizOrigin};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_path()) {
        eprintln!("Logging disabled: {}", e);
    }

    if let Err(e) = run(cli.command()).await {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to a file; the terminal belongs to the quiz UI.
fn init_tracing(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "timed_quiz=info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run(command: Command) -> Result<(), QuizError> {
    match command {
        Command::Play(args) => play(args).await,
        Command::Draw(args) => draw(args).await,
        Command::Take(args) => take(args).await,
    }
}

fn bank_source(questions: Option<PathBuf>) -> SourceConfig {
    questions.map(SourceConfig::File).unwrap_or(SourceConfig::Builtin)
}

/// The configured chat service, if an API key is set.
fn chat_service() -> Option<Arc<dyn ChatCompletion>> {
    let client = ChatClient::from_env();
    if !client.enabled() {
        return None;
    }
    Some(Arc::new(client))
}

async fn play(args: PlayArgs) -> Result<(), QuizError> {
    let settings = args.timer.settings();
    let chat = chat_service();

    if args.ai {
        if chat.is_none() {
            return Err(GenerationError::Disabled.into());
        }
        let mut quiz = Quiz::new(QuizOrigin::Generated, settings, chat);
        if let Some(count) = args.count {
            quiz.app_mut().set_question_count(count);
        }
        return quiz.run().await;
    }

    let config = bank_source(args.questions);
    let pool = QuestionSource::default().get_pool(&config).await?;
    tracing::info!(source = %config.label(), pool = pool.len(), "question bank loaded");

    let origin = QuizOrigin::Bank {
        label: config.label(),
        pool,
        count: args.count.unwrap_or(DEFAULT_BANK_COUNT),
    };
    Quiz::new(origin, settings, chat).run().await
}

async fn draw(args: DrawArgs) -> Result<(), QuizError> {
    let config = bank_source(args.questions);
    let pool = QuestionSource::default().get_pool(&config).await?;
    let set = QuestionSet {
        label: config.label(),
        questions: select(&pool, args.count),
    };

    let store = SnapshotStore::new(args.out);
    store.write(&set)?;
    println!(
        "Drew {} of {} questions from {} into {}",
        set.questions.len(),
        pool.len(),
        set.label,
        store.path().display()
    );
    println!("Take it with: timed-quiz take --snapshot {}", store.path().display());
    Ok(())
}

async fn take(args: TakeArgs) -> Result<(), QuizError> {
    let set = SnapshotStore::new(args.snapshot).take()?;
    tracing::info!(label = %set.label, questions = set.questions.len(), "drawn set taken");
    Quiz::new(QuizOrigin::Drawn(set), args.timer.settings(), chat_service())
        .run()
        .await
}

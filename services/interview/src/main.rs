mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_core::{
    Difficulty, GptClient, InterviewSession, InterviewStore, Language, Phase, SessionConfig,
    SessionError, SessionRecord, SessionState, SqliteStore, TextGeneration,
};
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
#[command(name = "interview", about = "Simulated job interviews with automated evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a new interview session
    Start {
        /// Position to interview for, e.g. "Backend Engineer"
        profession: String,
        /// basic, intermediate or advanced
        #[arg(long, default_value = "intermediate")]
        difficulty: Difficulty,
        /// english or turkish
        #[arg(long, default_value = "english")]
        language: Language,
        /// How many questions to generate (3..=10)
        #[arg(long, default_value_t = 5)]
        questions: usize,
    },
    /// List saved interview sessions, newest first
    History,
    /// Show one saved session in full
    Show { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = config::Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    // --- 3. Parse Command-Line Arguments ---
    let cli = Cli::parse();

    match cli.command {
        Command::Start {
            profession,
            difficulty,
            language,
            questions,
        } => {
            let session_config = SessionConfig::new(profession, difficulty, language, questions)?;
            run_session(&config, session_config).await
        }
        Command::History => {
            let store = open_store(&config)?;
            show_history(&store)
        }
        Command::Show { id } => {
            let store = open_store(&config)?;
            let record = store.fetch_one(id)?;
            print_record(&record);
            Ok(())
        }
    }
}

fn open_store(config: &config::Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open interview database at {}",
            config.database_path
        )
    })
}

async fn run_session(config: &config::Config, session_config: SessionConfig) -> Result<()> {
    let api_key = config.require_api_key()?.to_string();
    let generator = GptClient::new(api_key, config.chat_model.clone());
    let store = open_store(config)?;

    let mut session = InterviewSession::new();

    // Ctrl-C abandons any in-flight generation call; the unfinished session
    // is simply discarded.
    tokio::select! {
        result = drive(&mut session, &generator, &store, session_config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, discarding session");
            println!();
            Ok(())
        }
    }
}

/// The single serialized loop that owns the session: stdin lines and session
/// mutations all pass through here, one at a time.
async fn drive<G, S>(
    session: &mut InterviewSession,
    generator: &G,
    store: &S,
    session_config: SessionConfig,
) -> Result<()>
where
    G: TextGeneration + Sync,
    S: InterviewStore + Sync,
{
    println!(
        "Generating {} {} questions for a {} position ({})...",
        session_config.question_count,
        session_config.difficulty,
        session_config.profession,
        session_config.language,
    );
    if let Err(e) = session.start(generator, session_config.clone()).await {
        tracing::warn!(error = %e, "question generation failed");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match session.phase() {
            Phase::InProgress => {
                prompt_question(session);
                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };
                handle_line(session, generator, store, line.trim()).await?;
            }
            Phase::Failed => {
                let reason = session.view().failure.unwrap_or_default();
                println!("\nThe session failed: {reason}");
                print!("Type 'retry' to try again, anything else to quit: ");
                std::io::stdout().flush()?;
                match lines.next_line().await? {
                    Some(line) if line.trim().eq_ignore_ascii_case("retry") => {
                        if let Err(e) = session.retry(generator, session_config.clone()).await {
                            tracing::warn!(error = %e, "retry failed");
                        }
                    }
                    _ => return Ok(()),
                }
            }
            Phase::Completed => {
                print_completion(session);
                return Ok(());
            }
            // start/advance only return once generation is over, so the loop
            // never rests in these phases.
            Phase::AwaitingConfig | Phase::GeneratingQuestions | Phase::Evaluating => {
                return Ok(());
            }
        }
    }
}

fn prompt_question(session: &InterviewSession) {
    let view = session.view();
    println!(
        "\nQuestion {}/{}: {}",
        view.current_index + 1,
        view.total_questions,
        view.current_question.as_deref().unwrap_or(""),
    );
    if !view.current_answer.is_empty() {
        println!("Current answer: {}", view.current_answer);
    }
    println!("(type your answer, ':back' for the previous question, ':next' to keep the current answer)");
}

async fn handle_line<G, S>(
    session: &mut InterviewSession,
    generator: &G,
    store: &S,
    line: &str,
) -> Result<()>
where
    G: TextGeneration + Sync,
    S: InterviewStore + Sync,
{
    match line {
        ":back" => {
            if let Err(e) = session.retreat() {
                println!("{e}");
            }
            return Ok(());
        }
        // An empty line keeps whatever answer is already buffered.
        "" | ":next" => {}
        text => session.set_current_answer(text)?,
    }

    let view = session.view();
    if view.current_index + 1 == view.total_questions {
        println!("Completing the interview and evaluating your answers...");
    }
    if let Err(e) = session.advance(generator, store).await {
        match e {
            SessionError::MissingAnswer(n) => println!(
                "Please answer all questions before completing the interview (question {n} has no answer)."
            ),
            // Generation/persistence failures moved the session to Failed;
            // the drive loop reports them from there.
            e => tracing::debug!(error = %e, "advance did not complete"),
        }
    }
    Ok(())
}

fn print_completion(session: &InterviewSession) {
    if let SessionState::Completed {
        evaluation,
        record_id,
    } = session.state()
    {
        println!("\n=== Evaluation ===");
        println!("Overall score: {}/100", evaluation.overall_score);
        print_list("Strengths", &evaluation.strengths);
        print_list("Weaknesses", &evaluation.weaknesses);
        print_list("Recommendations", &evaluation.recommendations);
        if !evaluation.detailed_feedback.is_empty() {
            println!("\n{}", evaluation.detailed_feedback);
        }
        println!("\nSaved as interview #{record_id}.");
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}:");
    for item in items {
        println!("  - {item}");
    }
}

fn show_history(store: &SqliteStore) -> Result<()> {
    let records = store.fetch_all()?;
    if records.is_empty() {
        println!("No saved interviews yet.");
        return Ok(());
    }
    for record in records {
        println!(
            "#{:<4} {}  {:<24} {:<12} {:<8} {:>3}/100",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.profession,
            record.difficulty,
            record.language,
            record.evaluation.overall_score,
        );
    }
    Ok(())
}

fn print_record(record: &SessionRecord) {
    println!(
        "Interview #{} — {} ({}, {})",
        record.id, record.profession, record.difficulty, record.language
    );
    println!("Taken {}", record.timestamp.format("%Y-%m-%d %H:%M"));
    for (index, qa) in record.questions.iter().enumerate() {
        println!("\nQuestion {}: {}", index + 1, qa.question);
        println!("Answer: {}", qa.answer);
    }
    println!("\nOverall score: {}/100", record.evaluation.overall_score);
    print_list("Strengths", &record.evaluation.strengths);
    print_list("Weaknesses", &record.evaluation.weaknesses);
    print_list("Recommendations", &record.evaluation.recommendations);
    if !record.evaluation.detailed_feedback.is_empty() {
        println!("\n{}", record.evaluation.detailed_feedback);
    }
}

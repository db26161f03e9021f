use anyhow::Result;
use clap::{Parser, Subcommand};
use examace_tutor::app::TutorApp;
use examace_tutor::models::PerformanceSummary;
use examace_tutor::{Error, GenerationErrorKind};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "examace-tutor")]
#[command(about = "AI practice questions, study plans, and tutoring for exam prep")]
struct CliArgs {
    /// Exam focus (for example JEE or NEET); overrides EXAM_FOCUS.
    #[arg(long)]
    exam: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one practice question.
    Question {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        difficulty: String,
        #[arg(long)]
        topic: String,
        /// Also print a detailed worked solution.
        #[arg(long)]
        with_solution: bool,
    },
    /// Interactive tutoring chat; reads questions from stdin.
    Chat,
    /// Personalized study recommendations from a performance summary JSON file.
    Recommend {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Study plan covering the given weak topics.
    Plan {
        #[arg(value_name = "TOPIC", required = true)]
        topics: Vec<String>,
    },
    /// Motivational quote, streamed as it is generated.
    Quote,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "examace_tutor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let app = match TutorApp::new() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };
    let mut app = match args.exam {
        Some(exam) => app.with_exam(exam),
        None => app,
    };

    info!("Exam focus: {}", app.exam());

    if let Err(e) = run_command(&mut app, args.command).await {
        error!("Command failed: {}", e);
        if let Some(hint) = generation_hint(&e) {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run_command(app: &mut TutorApp, command: Command) -> examace_tutor::Result<()> {
    match command {
        Command::Question {
            subject,
            difficulty,
            topic,
            with_solution,
        } => {
            let question = app.practice_question(&subject, &difficulty, &topic).await?;

            println!("{}\n", question.question);
            for (idx, option) in question.options.iter().enumerate() {
                println!("  {}) {}", (b'A' + idx as u8) as char, option);
            }

            if with_solution {
                let detail = app
                    .solution_walkthrough(&question.question, &question.options, question.correct)
                    .await?;
                println!("\nSolution: {}", detail.solution);
                println!("Explanation: {}", detail.explanation);
                println!("Key insight: {}", detail.key_insight);
            } else if let Some(answer) = question.options.get(question.correct) {
                println!("\nAnswer: {}", answer);
                println!("Explanation: {}", question.explanation);
            }
        }
        Command::Chat => run_chat(app).await?,
        Command::Recommend { file } => {
            let json = std::fs::read_to_string(file)?;
            let summary: PerformanceSummary = serde_json::from_str(&json)?;
            let recommendations = app.recommendations(&summary).await?;
            println!("{}", recommendations);
        }
        Command::Plan { topics } => {
            let plan = app.study_plan(&topics).await?;
            println!("{}", plan);
        }
        Command::Quote => {
            app.stream_motivational_quote(&mut |chunk: &str| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            })
            .await?;
            println!();
        }
    }

    Ok(())
}

async fn run_chat(app: &mut TutorApp) -> examace_tutor::Result<()> {
    println!(
        "Ask your {} tutor anything. Blank line or Ctrl-D exits.",
        app.exam()
    );

    let stdin = std::io::stdin();
    let mut input = String::new();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let question = input.trim();
        if question.is_empty() {
            break;
        }

        // A failed exchange should not end the session.
        match app.ask(question).await {
            Ok(reply) => println!("tutor> {}\n", reply),
            Err(e) => {
                eprintln!("tutor> {}", e);
                if let Some(hint) = generation_hint(&e) {
                    eprintln!("       {}", hint);
                }
                eprintln!();
            }
        }
    }

    Ok(())
}

/// Kind-specific guidance for generation failures, shown next to the error.
fn generation_hint(err: &Error) -> Option<String> {
    let Error::Generation(generation) = err else {
        return None;
    };

    match generation.kind {
        GenerationErrorKind::QuotaExceeded | GenerationErrorKind::ServiceUnavailable => generation
            .retry_after
            .map(|delay| format!("Try again in about {} seconds.", delay.as_secs())),
        GenerationErrorKind::AuthError => {
            Some("Check that GEMINI_API_KEY is set to a valid key.".to_string())
        }
        GenerationErrorKind::ParseError | GenerationErrorKind::Unknown => None,
    }
}

mod backend;
mod evaluator;
mod executor;
mod retry;
mod runner;

use anyhow::{bail, Context, Result};
use backend::{BackendClient, BackendError};
use chrono::Utc;
use clap::{Parser, Subcommand};
use clp_common::config::ClientConfig;
use clp_common::types::{Language, Role};
use clp_session::{AuthSession, RouteDecision, SessionGuard, SessionStore};
use executor::{CompilerClient, RunRequest};
use retry::RetryPolicy;
use runner::SubmissionRunner;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "clp-grader")]
#[command(
    about = "CLP coding practice client - run, grade, and submit solutions",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the platform and store the session
    Login {
        /// Role to authenticate as (admin, teacher, student)
        #[arg(short, long, default_value = "student")]
        role: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Execute a source file once against custom stdin, without grading
    Run {
        /// Language (python3, java, cpp, c, nodejs)
        #[arg(short, long)]
        language: String,

        /// Source file; defaults to the language's starter code
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Stdin fed to the program
        #[arg(short, long, default_value = "")]
        stdin: String,
    },

    /// Grade a solution against a question's test cases and submit the outcome
    Submit {
        /// Question id on the platform
        #[arg(short, long)]
        question: u64,

        /// Language (python3, java, cpp, c, nodejs)
        #[arg(short, long)]
        language: String,

        /// Source file; defaults to the language's starter code
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Clear the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    let mut guard = SessionGuard::new(SessionStore::new(&config.session_dir));

    match cli.command {
        Commands::Login {
            role,
            email,
            password,
        } => {
            let role: Role = role.parse().map_err(anyhow::Error::msg)?;
            login(&config, &mut guard, role, &email, &password).await?;
        }
        Commands::Run {
            language,
            file,
            stdin,
        } => {
            let language: Language = language.parse().map_err(anyhow::Error::msg)?;
            run_once(&config, language, file.as_deref(), &stdin).await?;
        }
        Commands::Submit {
            question,
            language,
            file,
        } => {
            let language: Language = language.parse().map_err(anyhow::Error::msg)?;
            submit(&config, &mut guard, question, language, file.as_deref()).await?;
        }
        Commands::Logout => {
            guard.logout();
            println!("Stored session cleared");
        }
    }

    Ok(())
}

/// Read the solution source, falling back to the language's starter code.
fn load_source(file: Option<&std::path::Path>, language: Language) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source file {}", path.display())),
        None => {
            info!(language = %language, "No source file given, using starter code");
            Ok(language.starter_code().to_string())
        }
    }
}

async fn login(
    config: &ClientConfig,
    guard: &mut SessionGuard,
    role: Role,
    email: &str,
    password: &str,
) -> Result<()> {
    let backend = BackendClient::new(&config.api_base_url, config.request_timeout)?;
    let issued = backend
        .login(role, email, password)
        .await
        .context("login failed")?;

    guard.login(AuthSession {
        user: issued.user,
        token: issued.token,
        role,
    })?;

    println!("Logged in as {} ({})", email, role);
    Ok(())
}

async fn run_once(
    config: &ClientConfig,
    language: Language,
    file: Option<&std::path::Path>,
    stdin: &str,
) -> Result<()> {
    let code = load_source(file, language)?;
    let compiler = CompilerClient::new(&config.api_base_url, config.request_timeout)?;

    let request = RunRequest::new(code, language, stdin);
    let raw = compiler
        .run(&request)
        .await
        .context("execution failed")?;

    println!("{}", evaluator::normalize_output(&raw));
    Ok(())
}

async fn submit(
    config: &ClientConfig,
    guard: &mut SessionGuard,
    question_id: u64,
    language: Language,
    file: Option<&std::path::Path>,
) -> Result<()> {
    // Submitting is a protected student operation; the expiry check and
    // its session-clearing side effect happen before anything else
    let now = Utc::now().timestamp();
    match guard.authorize("/student/practice", Role::Student, now) {
        RouteDecision::Allow => {}
        RouteDecision::Redirect(route) => {
            bail!(
                "not authorized for student practice, log in first (see {})",
                route
            );
        }
    }

    let code = load_source(file, language)?;
    let compiler = CompilerClient::new(&config.api_base_url, config.request_timeout)?;
    let mut backend = BackendClient::new(&config.api_base_url, config.request_timeout)?;
    backend.set_token(guard.token().map(String::from));

    let question = match backend.question(question_id).await {
        Ok(q) => q,
        Err(BackendError::Unauthorized) => {
            guard.logout();
            bail!("session rejected by the platform, please log in again");
        }
        Err(e) => return Err(e).context("failed to fetch question"),
    };

    let retry = RetryPolicy {
        max_attempts: config.max_attempts,
        backoff_unit: config.backoff_unit,
    };
    let runner = SubmissionRunner::new(&compiler, &backend, retry, config.inter_case_delay);

    let report = runner
        .run(&question, &code, language)
        .await
        .context("evaluation aborted, no submission was recorded")?;

    println!("{} ({})", question.title, language);
    for (idx, result) in report.results.iter().enumerate() {
        let status = if result.is_correct { "pass" } else { "fail" };
        let visibility = if result.hidden { " (hidden)" } else { "" };
        println!("  test {:>2}: {}{}", idx + 1, status, visibility);
        if !result.is_correct && !result.hidden {
            println!("    expected: {}", result.expected);
            println!("    actual:   {}", result.actual);
        }
    }
    println!(
        "Passed {} / {} test cases, score {}",
        report.summary.passed, report.summary.total, report.summary.score
    );

    if let Some(err) = &report.persist_error {
        println!("Warning: results were NOT saved to the platform ({})", err);
        if matches!(err, BackendError::Unauthorized) {
            guard.logout();
        }
    }

    Ok(())
}

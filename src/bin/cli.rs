use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use quiz_admin::admin::{MemorySession, SessionStore};
use quiz_admin::api::{QuestionApi, QuestionClient, DEFAULT_API_URL};
use quiz_admin::telemetry::init_tracing;
use quiz_admin::transfer::{read_questions, write_questions};
use reqwest::Url;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the quiz admin API
    #[clap(long, env = "QUIZ_ADMIN_API_URL", default_value = DEFAULT_API_URL)]
    api_url: Url,
    /// Admin bearer token; when missing, --username and --password are used to log in
    #[clap(long, env = "QUIZ_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[clap(long, env = "QUIZ_ADMIN_USERNAME")]
    username: Option<String>,
    #[clap(long, env = "QUIZ_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all questions to a CSV file
    Export { path: PathBuf },
    /// Create every valid question found in a CSV file
    Import { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let client = QuestionClient::new(cli.api_url)?;
    let cancel = CancellationToken::new();

    let mut session = MemorySession::default();
    match (cli.token, cli.username, cli.password) {
        (Some(token), _, _) => session.set(SecretString::from(token)),
        (None, Some(username), Some(password)) => {
            let token = client
                .login(&username, &SecretString::from(password), &cancel)
                .await
                .context("Login failed")?;
            session.set(token);
        }
        _ => anyhow::bail!("Either --token or --username and --password must be given"),
    }
    let token = session.get().context("No admin session")?;

    match cli.command {
        Commands::Export { path } => {
            let questions = client
                .list(&token, &cancel)
                .await
                .context("Cannot fetch questions")?;
            write_questions(&path, &questions)?;
            tracing::info!("Exported {} questions to {}", questions.len(), path.display());
        }
        Commands::Import { path } => {
            let (questions, rejected) = read_questions(&path)?;
            for row in &rejected {
                tracing::warn!("Skipping row {}: {}", row.row, row.reason);
            }
            let mut created = 0;
            for question in &questions {
                match client.create(&token, question, &cancel).await {
                    Ok(q) => {
                        created += 1;
                        tracing::debug!("Created question {:?}", q.id);
                    }
                    Err(e) => tracing::error!("Cannot create \"{}\": {e}", question.question),
                }
            }
            tracing::info!(
                "Imported {created} of {} questions, {} rows rejected",
                questions.len(),
                rejected.len()
            );
        }
    }
    Ok(())
}

use std::path::PathBuf;

use clap::Parser;
use quiz_admin::{config::Settings, server::run_server, telemetry::init_tracing};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, values from QUIZ_ADMIN_* variables take precedence
    #[clap(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    run_server(settings).await
}

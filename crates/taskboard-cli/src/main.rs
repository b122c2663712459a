mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("TASKBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "taskboard", &mut std::io::stdout());
        return Ok(());
    }

    if let Err(err) = run(cli).await {
        output::output_error(&format!("{:#}", err));
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext::new(&cli.global);

    match cli.command {
        Commands::Project(cmd) => handlers::project::handle(&ctx, cmd.action).await,
        Commands::Column(cmd) => handlers::column::handle(&ctx, cmd.action).await,
        Commands::Task(cmd) => handlers::task::handle(&ctx, cmd.action).await,
        Commands::Metrics { project, today } => {
            handlers::metrics::handle(&ctx, project, today).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

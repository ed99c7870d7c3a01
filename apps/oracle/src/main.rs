use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use draw_core::{
    fetcher_for, DrawController, DrawOutcome, Navigator, PrintNavigator, SourceLocation,
    SystemClock, SystemNavigator,
};
use rand::{rngs::StdRng, SeedableRng};
use shared::{error::DrawError, protocol::DrawReport};
use storage::{KeyValueStore, MemoryStore, Storage};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url, Settings};

#[derive(Parser, Debug)]
#[command(name = "oracle", version, about = "Open a random URL you have not drawn recently")]
struct Cli {
    /// TOML settings file (defaults to ./oracle.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// URL list location: http(s) URL, file:// URL or local path.
    #[arg(long, global = true)]
    source: Option<String>,
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Keep state in memory only.
    #[arg(long, global = true)]
    ephemeral: bool,
    /// Emit machine-readable reports on stdout.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Draw an entry and open it (the default).
    Draw {
        /// Print the drawn URL instead of opening it.
        #[arg(long)]
        print: bool,
        #[arg(long, hide = true)]
        seed: Option<u64>,
    },
    /// Show drawn history and any pending reset.
    Status,
    /// Forget drawn history and any pending reset.
    Reset,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(source) = &cli.source {
        settings.source = source.clone();
    }
    if let Some(database_url) = &cli.database_url {
        settings.database_url = database_url.clone();
    }

    let command = cli.command.clone().unwrap_or(Command::Draw {
        print: false,
        seed: None,
    });
    let navigator: Arc<dyn Navigator> = match command {
        Command::Draw { print: true, .. } => Arc::new(PrintNavigator),
        _ => Arc::new(SystemNavigator),
    };
    let controller = build_controller(&settings, cli.ephemeral, navigator).await?;

    let result = match command {
        Command::Draw { seed, .. } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            controller
                .draw(&mut rng)
                .await
                .map(|outcome| print_outcome(&outcome, cli.json))
        }
        Command::Status => controller
            .status()
            .await
            .map(|status| print_status(&status, cli.json)),
        Command::Reset => controller.reset().await.map(|()| {
            if !cli.json {
                println!("Draw history cleared.");
            }
        }),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            report_failure(&err, cli.json);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn build_controller(
    settings: &Settings,
    ephemeral: bool,
    navigator: Arc<dyn Navigator>,
) -> Result<DrawController> {
    let policy = settings.policy()?;
    let location = SourceLocation::parse(&settings.source)
        .with_context(|| format!("invalid source '{}'", settings.source))?;
    let fetcher = fetcher_for(location, settings.fetch_timeout()?)?;

    let store: Arc<dyn KeyValueStore> = if ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let database_url = prepare_database_url(&settings.database_url);
        let storage = Storage::new(&database_url).await.map_err(|error| {
            error!(
                %database_url,
                %error,
                "failed to open SQLite database; verify parent directory exists and permissions are correct"
            );
            error
        })?;
        Arc::new(storage)
    };

    Ok(DrawController::new(
        store,
        fetcher,
        navigator,
        Arc::new(SystemClock),
        policy,
    ))
}

fn print_outcome(outcome: &DrawOutcome, json: bool) {
    if json {
        print_json(&outcome.report());
        return;
    }
    match outcome {
        DrawOutcome::Navigated { .. } => {}
        DrawOutcome::Waiting(notice) => println!("{}", notice.message()),
    }
}

fn print_status(status: &shared::protocol::StatusReport, json: bool) {
    if json {
        print_json(status);
        return;
    }
    println!("Drawn {}/{}", status.history.len(), status.history_limit);
    for url in status.history.iter().rev() {
        println!("  {url}");
    }
    match &status.reset_time {
        Some(reset_time) => println!("Draws resume at {reset_time}."),
        None => println!("Ready to draw."),
    }
}

fn report_failure(err: &DrawError, json: bool) {
    if json {
        print_json(&DrawReport::Failed {
            kind: err.kind(),
            message: err.to_string(),
        });
    }
    eprintln!("{}", err.notice());
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => error!(%err, "failed to encode report"),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voxroute::cli::CommandContext;
use voxroute::cli::commands;

#[derive(Parser)]
#[command(name = "voxroute")]
#[command(
    version,
    about = "Route voice-assistant questions to AI providers and speak the answer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Routing document (overrides settings and VOXROUTE_ROUTING_PATH)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question end to end
    Ask {
        #[arg(help = "Question text")]
        question: String,
        #[arg(long, short, help = "Write the audio answer to this file")]
        out: Option<PathBuf>,
        #[arg(long, help = "Print selection statistics afterwards")]
        stats: bool,
    },

    /// Show the complexity score of a question
    Classify {
        #[arg(help = "Question text")]
        question: String,
    },

    /// Probe every enabled provider and speech engine
    Health,

    /// Manage the routing document
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the routing document
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show settings and routing document paths
    Path,
    /// Write a starter routing document
    Init {
        #[arg(long, help = "Overwrite an existing document")]
        force: bool,
    },
    /// Validate the routing document
    Validate,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mvoxroute encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = CommandContext::load(cli.config)?;

    match cli.command {
        Commands::Ask {
            question,
            out,
            stats,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::ask::run(&ctx, &question, out.as_deref(), stats))?;
        }
        Commands::Classify { question } => {
            commands::classify::run(&ctx, &question)?;
        }
        Commands::Health => {
            let rt = Runtime::new()?;
            if !rt.block_on(commands::health::run(&ctx))? {
                anyhow::bail!("health checks failed");
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&ctx, &format)?;
            }
            ConfigAction::Path => {
                commands::config::path(&ctx)?;
            }
            ConfigAction::Init { force } => {
                commands::config::init(&ctx, force)?;
            }
            ConfigAction::Validate => {
                commands::config::validate(&ctx)?;
            }
        },
    }

    Ok(())
}

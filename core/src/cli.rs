use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::interpreter::{self, ExecutionContext};

#[derive(Parser)]
#[command(name = "nbz")]
#[command(about = "NBZ - browser automation script runner", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a parsed script (instruction tree JSON)
    Run {
        /// Instruction tree file
        script: PathBuf,

        /// Parameters available to the script through get_parameter()
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        params: Vec<String>,

        /// Route the browser through the capturing proxy
        #[arg(long)]
        proxy: bool,

        /// Directory for exported network reports
        #[arg(long)]
        reports_dir: Option<PathBuf>,
    },

    /// Load a script and report whether its instruction tree is well formed
    Check {
        /// Instruction tree file
        script: PathBuf,
    },
}

/// Run the CLI by parsing process arguments. Returns the process exit code.
pub fn run_cli() -> Result<i32> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<i32> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn init_tracing(default_level: &str) {
    // a second init (tests, embedding hosts) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_cli_with_args(cli: Cli) -> Result<i32> {
    let mut builder = Config::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_path(path);
    }

    match cli.command {
        Commands::Run {
            script,
            params,
            proxy,
            reports_dir,
        } => {
            if proxy {
                builder = builder.proxy_enabled(true);
            }
            if let Some(dir) = reports_dir {
                builder = builder.reports_dir(dir);
            }
            let config = builder.build()?;
            init_tracing(&config.log.level);

            let program = interpreter::load_program(&script)?;
            let mut ctx = ExecutionContext::builder()
                .config(&config)
                .script_name(interpreter::script_name(&script))
                .parameters(params)
                .build();

            let outcome = interpreter::run(&mut ctx, &program);

            if let Err(e) = ctx.session.close() {
                warn!("failed to close browser session: {:#}", e);
            }

            let outcome = outcome.with_context(|| format!("Script {} failed", script.display()))?;
            Ok(outcome.exit_code())
        }

        Commands::Check { script } => {
            let config = builder.build()?;
            init_tracing(&config.log.level);

            let program = interpreter::load_program(&script)?;
            println!(
                "✓ {} is well formed ({} top-level instruction(s))",
                script.display(),
                program.len()
            );
            Ok(0)
        }
    }
}

//! # Fleetauth CLI
//!
//! Mints role-scoped fleet tokens from the command line and inspects them.
//!
//! ## Usage
//!
//! ```bash
//! # Server token, signed as this machine's service account
//! FLEETAUTH_SIGNERS__SERVER__TYPE=ambient fleetauth mint server
//!
//! # Driver token for one vehicle, using a settings file
//! fleetauth --config fleetauth.toml mint driver --vehicle-id vehicle-17
//!
//! # JSON output with the decoded payload
//! fleetauth -c fleetauth.toml -f json mint consumer --trip-id trip-42 --decode
//!
//! # Inspect any token
//! fleetauth decode eyJhbGciOi...
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod settings;
pub mod signers;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, MintArgs, OutputFormat, Role};
pub use error::{CliError, CliResult};
pub use settings::{MinterSettings, SignerSettings};

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run the CLI application
///
/// # Errors
///
/// Any failure of the selected command.
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli).await
}

/// Execute parsed arguments and print the result to stdout
///
/// # Errors
///
/// Any failure of the selected command.
pub async fn execute(cli: Cli) -> CliResult<()> {
    let rendered = match &cli.command {
        Commands::Mint(args) => {
            let settings = MinterSettings::load(cli.config.as_deref())?;
            let token = commands::mint(&settings, args).await?;
            output::render_token(&token, cli.format, args.decode)?
        }
        Commands::Decode { jwt } => output::render_decoded(jwt.trim(), cli.format)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

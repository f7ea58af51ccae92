//! CLI argument parsing

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use fleetauth::TokenType;

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "fleetauth",
    version,
    about = "Mint and inspect role-scoped fleet JWTs",
    long_about = "Mints short-lived RS256 tokens for fleet-management roles.\n\
                  Signers are configured per role in a settings file or through\n\
                  FLEETAUTH_ prefixed environment variables (nested keys use `__`).\n\n\
                  Tokens are written to stdout; logs go to stderr."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Settings file (TOML, YAML or JSON)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mint a signed token for a role
    Mint(MintArgs),

    /// Print the header and payload of a JWT without verifying it
    Decode {
        /// The JWT to inspect
        jwt: String,
    },
}

/// Arguments of `fleetauth mint`
#[derive(Args, Debug, Clone)]
pub struct MintArgs {
    /// Role to mint for
    #[arg(value_enum)]
    pub role: Role,

    /// Vehicle id, or `*` for every vehicle (driver)
    #[arg(long)]
    pub vehicle_id: Option<String>,

    /// Trip id, or `*` for every trip (consumer)
    #[arg(long)]
    pub trip_id: Option<String>,

    /// Task id (delivery consumer, trusted delivery driver)
    #[arg(long)]
    pub task_id: Option<String>,

    /// Tracking id (delivery consumer)
    #[arg(long)]
    pub tracking_id: Option<String>,

    /// Delivery vehicle id, or `*` for every delivery vehicle
    #[arg(long)]
    pub delivery_vehicle_id: Option<String>,

    /// Custom claim as `name=value`, repeatable (custom role)
    #[arg(long = "claim", value_parser = parse_claim)]
    pub claims: Vec<(String, String)>,

    /// Also print the decoded header and payload
    #[arg(long)]
    pub decode: bool,
}

/// Roles that can be minted from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Server,
    Driver,
    Consumer,
    DeliveryServer,
    DeliveryConsumer,
    UntrustedDeliveryDriver,
    TrustedDeliveryDriver,
    DeliveryFleetReader,
    FleetReader,
    Custom,
}

impl Role {
    /// Token type minted for this role
    pub const fn token_type(self) -> TokenType {
        match self {
            Self::Server => TokenType::Server,
            Self::Driver => TokenType::Driver,
            Self::Consumer => TokenType::Consumer,
            Self::DeliveryServer => TokenType::DeliveryServer,
            Self::DeliveryConsumer => TokenType::DeliveryConsumer,
            Self::UntrustedDeliveryDriver => TokenType::UntrustedDeliveryDriver,
            Self::TrustedDeliveryDriver => TokenType::TrustedDeliveryDriver,
            Self::DeliveryFleetReader => TokenType::DeliveryFleetReader,
            Self::FleetReader => TokenType::FleetReader,
            Self::Custom => TokenType::Custom,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Labelled fields for people
    Human,
    /// A single JSON document
    Json,
}

fn parse_claim(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_parsing() {
        let cli = Cli::try_parse_from([
            "fleetauth",
            "mint",
            "driver",
            "--vehicle-id",
            "v-17",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Mint(args) => {
                assert_eq!(args.role, Role::Driver);
                assert_eq!(args.vehicle_id.as_deref(), Some("v-17"));
                assert!(!args.decode);
            }
            Commands::Decode { .. } => panic!("expected mint"),
        }
    }

    #[test]
    fn test_claim_parsing() {
        let cli = Cli::try_parse_from([
            "fleetauth",
            "mint",
            "custom",
            "--claim",
            "depotid=d-1",
            "--claim",
            "regionid=*",
        ])
        .unwrap();

        let Commands::Mint(args) = cli.command else {
            panic!("expected mint");
        };
        assert_eq!(
            args.claims,
            vec![
                ("depotid".to_string(), "d-1".to_string()),
                ("regionid".to_string(), "*".to_string()),
            ]
        );

        assert!(
            Cli::try_parse_from(["fleetauth", "mint", "custom", "--claim", "novalue"]).is_err()
        );
    }

    #[test]
    fn test_role_names_are_kebab_case() {
        let cli = Cli::try_parse_from(["fleetauth", "mint", "untrusted-delivery-driver"]).unwrap();
        let Commands::Mint(args) = cli.command else {
            panic!("expected mint");
        };
        assert_eq!(args.role, Role::UntrustedDeliveryDriver);
        assert_eq!(args.role.token_type(), TokenType::UntrustedDeliveryDriver);
    }
}

//! Settings loaded from a file and the environment
//!
//! ```toml
//! audience = "https://fleetengine.googleapis.com/"
//! default_role = "odrd"
//!
//! [signers.server]
//! type = "ambient"
//!
//! [signers.driver]
//! type = "impersonated"
//! account = "fleet-driver@my-project.iam.gserviceaccount.com"
//!
//! [signers.consumer]
//! type = "local"
//! identity = "fleet-consumer@my-project.iam.gserviceaccount.com"
//! key_id = "0123abcd"
//! private_key_path = "consumer.pem"
//! ```
//!
//! Every key can be overridden from the environment, for example
//! `FLEETAUTH_DEFAULT_ROLE=lmfs` or `FLEETAUTH_SIGNERS__SERVER__TYPE=ambient`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use fleetauth::{DEFAULT_JWT_AUDIENCE, DefaultRole, TokenType};
use serde::{Deserialize, Serialize};

use crate::error::CliResult;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FLEETAUTH";

/// How one role's tokens are signed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignerSettings {
    /// As the account this machine runs as
    Ambient,
    /// As `account`, impersonated with this machine's credentials
    Impersonated { account: String },
    /// With a private key held locally
    Local {
        identity: String,
        key_id: String,
        #[serde(default)]
        private_key: Option<String>,
        #[serde(default)]
        private_key_path: Option<PathBuf>,
    },
}

/// Signer settings per role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSigners {
    pub server: Option<SignerSettings>,
    pub driver: Option<SignerSettings>,
    pub consumer: Option<SignerSettings>,
    pub delivery_server: Option<SignerSettings>,
    pub delivery_consumer: Option<SignerSettings>,
    pub untrusted_delivery_driver: Option<SignerSettings>,
    pub trusted_delivery_driver: Option<SignerSettings>,
    pub delivery_fleet_reader: Option<SignerSettings>,
    pub fleet_reader: Option<SignerSettings>,
    pub custom: Option<SignerSettings>,
}

impl RoleSigners {
    /// Settings for the signer of `token_type`
    pub fn get(&self, token_type: TokenType) -> Option<&SignerSettings> {
        match token_type {
            TokenType::Server => self.server.as_ref(),
            TokenType::Driver => self.driver.as_ref(),
            TokenType::Consumer => self.consumer.as_ref(),
            TokenType::DeliveryServer => self.delivery_server.as_ref(),
            TokenType::DeliveryConsumer => self.delivery_consumer.as_ref(),
            TokenType::UntrustedDeliveryDriver => self.untrusted_delivery_driver.as_ref(),
            TokenType::TrustedDeliveryDriver => self.trusted_delivery_driver.as_ref(),
            TokenType::DeliveryFleetReader => self.delivery_fleet_reader.as_ref(),
            TokenType::FleetReader => self.fleet_reader.as_ref(),
            TokenType::Custom => self.custom.as_ref(),
        }
    }
}

/// Top-level CLI settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinterSettings {
    /// Audience of minted tokens
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Role family required to be configured
    #[serde(default)]
    pub default_role: DefaultRole,

    #[serde(default)]
    pub signers: RoleSigners,
}

fn default_audience() -> String {
    DEFAULT_JWT_AUDIENCE.to_string()
}

impl Default for MinterSettings {
    fn default() -> Self {
        Self {
            audience: default_audience(),
            default_role: DefaultRole::default(),
            signers: RoleSigners::default(),
        }
    }
}

impl MinterSettings {
    /// Load from `path` (when given) overlaid with the process environment.
    ///
    /// # Errors
    ///
    /// [`CliError::Config`](crate::CliError::Config) when the file is missing
    /// or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) but reading variables from `env` instead of
    /// the process environment when provided.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> CliResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(env),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

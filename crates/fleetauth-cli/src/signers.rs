//! Turning settings into a minter configuration

use std::sync::Arc;

use fleetauth::{
    DefaultTokenFactory, LocalSigner, MinterConfig, Signer, TokenFactorySettings, TokenType,
};
use fleetauth_gcp::GcpSigners;
use tracing::debug;

use crate::error::{CliError, CliResult};
use crate::settings::{MinterSettings, SignerSettings};

/// Builds signers, creating the cloud clients only when a role needs them
#[derive(Debug, Default)]
pub struct SignerResolver {
    gcp: Option<GcpSigners>,
}

impl SignerResolver {
    /// Resolver that connects to Google Cloud on first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver using prepared cloud clients
    pub fn with_gcp(gcp: GcpSigners) -> Self {
        Self { gcp: Some(gcp) }
    }

    fn gcp(&mut self) -> CliResult<&GcpSigners> {
        let gcp = match self.gcp.take() {
            Some(gcp) => gcp,
            None => GcpSigners::from_environment()?,
        };
        Ok(self.gcp.insert(gcp))
    }

    /// Signer described by `settings`.
    ///
    /// # Errors
    ///
    /// Fails when cloud clients cannot be created, the ambient account cannot
    /// be resolved, or a local key is missing or unreadable.
    pub async fn resolve(&mut self, settings: &SignerSettings) -> CliResult<Arc<dyn Signer>> {
        let signer: Arc<dyn Signer> = match settings {
            SignerSettings::Ambient => Arc::new(self.gcp()?.default_account().await?),
            SignerSettings::Impersonated { account } => Arc::new(self.gcp()?.impersonated(account)),
            SignerSettings::Local {
                identity,
                key_id,
                private_key,
                private_key_path,
            } => {
                let pem = match (private_key, private_key_path) {
                    (Some(pem), _) => pem.clone(),
                    (None, Some(path)) => std::fs::read_to_string(path)?,
                    (None, None) => {
                        return Err(CliError::InvalidArguments(format!(
                            "local signer '{identity}' needs private_key or private_key_path"
                        )));
                    }
                };
                Arc::new(LocalSigner::new(identity.as_str(), key_id.as_str(), &pem)?)
            }
        };
        debug!(identity = %signer.identity(), "Resolved signer");
        Ok(signer)
    }

    /// Minter configuration able to mint `token_type`.
    ///
    /// Only the default role's signer and the signer for `token_type` are
    /// resolved. Other configured roles stay unset, so their cloud lookups
    /// never run.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve) for either of the two roles.
    pub async fn build_config(
        &mut self,
        settings: &MinterSettings,
        token_type: TokenType,
    ) -> CliResult<MinterConfig> {
        let mut config = MinterConfig::new(settings.default_role);
        config.token_factory = Arc::new(DefaultTokenFactory::new(TokenFactorySettings {
            audience: settings.audience.clone(),
        }));

        for role in [settings.default_role.token_type(), token_type] {
            if config.signer(role).is_some() {
                continue;
            }
            if let Some(signer_settings) = settings.signers.get(role) {
                let signer = self.resolve(signer_settings).await?;
                config.set_signer(role, Some(signer));
            }
        }

        Ok(config)
    }
}

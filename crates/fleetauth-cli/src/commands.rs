//! Command implementations

use fleetauth::{AuthTokenMinter, ClaimKind, Token, TokenClaims};
use tracing::info;

use crate::cli::{MintArgs, Role};
use crate::error::{CliError, CliResult};
use crate::settings::MinterSettings;
use crate::signers::SignerResolver;

/// Claims for an id flag: `*` means every entity of the kind
fn id_claims(kind: ClaimKind, flag: &str, id: Option<&str>) -> CliResult<TokenClaims> {
    match id {
        Some(fleetauth::WILDCARD) => Ok(TokenClaims::any(kind)),
        Some(id) => Ok(TokenClaims::scoped(kind, Some(id))?),
        None => Err(CliError::InvalidArguments(format!(
            "--{flag} is required for this role"
        ))),
    }
}

/// Mint the token described by `args` with an already built minter.
///
/// # Errors
///
/// [`CliError::InvalidArguments`] when a role's id flag is missing, otherwise
/// whatever the minter reports.
pub async fn mint_with(minter: &AuthTokenMinter, args: &MintArgs) -> CliResult<Token> {
    let token = match args.role {
        Role::Server => minter.server_token().await?,
        Role::Driver => {
            let claims = id_claims(ClaimKind::Vehicle, "vehicle-id", args.vehicle_id.as_deref())?;
            minter.driver_token(claims).await?
        }
        Role::Consumer => {
            let claims = id_claims(ClaimKind::Trip, "trip-id", args.trip_id.as_deref())?;
            minter.consumer_token(claims).await?
        }
        Role::DeliveryServer => minter.delivery_server_token().await?,
        Role::DeliveryConsumer => {
            let claims = match (&args.task_id, &args.tracking_id) {
                (Some(_), Some(_)) => {
                    return Err(CliError::InvalidArguments(
                        "give either --task-id or --tracking-id, not both".to_string(),
                    ));
                }
                (Some(task), None) => id_claims(ClaimKind::Task, "task-id", Some(task))?,
                (None, tracking) => {
                    id_claims(ClaimKind::Tracking, "tracking-id", tracking.as_deref())?
                }
            };
            minter.delivery_consumer_token(claims).await?
        }
        Role::UntrustedDeliveryDriver => {
            let claims = id_claims(
                ClaimKind::DeliveryVehicle,
                "delivery-vehicle-id",
                args.delivery_vehicle_id.as_deref(),
            )?;
            minter.untrusted_delivery_vehicle_token(claims).await?
        }
        Role::TrustedDeliveryDriver => {
            let vehicle = id_claims(
                ClaimKind::DeliveryVehicle,
                "delivery-vehicle-id",
                args.delivery_vehicle_id.as_deref(),
            )?;
            match args.task_id.as_deref() {
                Some(task) => {
                    let task = id_claims(ClaimKind::Task, "task-id", Some(task))?;
                    minter
                        .trusted_delivery_vehicle_task_token(vehicle, task)
                        .await?
                }
                None => minter.trusted_delivery_vehicle_token(vehicle).await?,
            }
        }
        Role::DeliveryFleetReader => minter.delivery_fleet_reader_token().await?,
        Role::FleetReader => minter.fleet_reader_token().await?,
        Role::Custom => {
            if args.claims.is_empty() {
                return Err(CliError::InvalidArguments(
                    "custom tokens need at least one --claim name=value".to_string(),
                ));
            }
            let claims = TokenClaims::custom(args.claims.iter().cloned())?;
            minter.custom_token(claims).await?
        }
    };

    info!(
        token_type = %token.token_type(),
        expires_at = token.expires_at_secs(),
        "Minted token"
    );
    Ok(token)
}

/// Build a minter from `settings` and mint the token described by `args`.
///
/// Only the default role's signer and the requested role's signer are built.
///
/// # Errors
///
/// Settings that cannot produce the required signers, plus everything
/// [`mint_with`] reports.
pub async fn mint(settings: &MinterSettings, args: &MintArgs) -> CliResult<Token> {
    let config = SignerResolver::new()
        .build_config(settings, args.role.token_type())
        .await?;
    let minter = AuthTokenMinter::new(config)?;
    mint_with(&minter, args).await
}

//! Minting through settings files with a local key

use std::io::Write;
use std::path::PathBuf;

use fleetauth::{FleetAuthError, TokenType, decode_unverified};
use fleetauth_cli::{CliError, MintArgs, MinterSettings, OutputFormat, Role, commands, output};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn fixture_key() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../fleetauth/tests/fixtures/test_signing_key.pem")
}

fn settings_file(extra: &str) -> NamedTempFile {
    let key = fixture_key();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
audience = "https://fleet.test/"

[signers.server]
type = "local"
identity = "server@fleet.test"
key_id = "server-key"
private_key_path = "{key}"

[signers.driver]
type = "local"
identity = "driver@fleet.test"
key_id = "driver-key"
private_key_path = "{key}"
{extra}
"#,
        key = key.display()
    )
    .unwrap();
    file
}

fn load(file: &NamedTempFile) -> MinterSettings {
    MinterSettings::load_with_env(Some(file.path()), Some(config::Map::new())).unwrap()
}

fn args(role: Role) -> MintArgs {
    MintArgs {
        role,
        vehicle_id: None,
        trip_id: None,
        task_id: None,
        tracking_id: None,
        delivery_vehicle_id: None,
        claims: Vec::new(),
        decode: false,
    }
}

#[tokio::test]
async fn driver_token_is_scoped_and_signed_locally() {
    let settings = load(&settings_file(""));
    let mut driver = args(Role::Driver);
    driver.vehicle_id = Some("vehicle-17".to_string());

    let token = commands::mint(&settings, &driver).await.unwrap();
    assert_eq!(token.token_type(), TokenType::Driver);

    let (header, payload) = decode_unverified(token.jwt().unwrap()).unwrap();
    assert_eq!(header.kid.as_deref(), Some("driver-key"));
    assert_eq!(payload.iss, "driver@fleet.test");
    assert_eq!(payload.aud, "https://fleet.test/");
    assert_eq!(
        payload.authorization.get("vehicleid").map(String::as_str),
        Some("vehicle-17")
    );
}

#[tokio::test]
async fn star_id_mints_wildcard_claims() {
    let settings = load(&settings_file(""));
    let mut driver = args(Role::Driver);
    driver.vehicle_id = Some("*".to_string());

    let token = commands::mint(&settings, &driver).await.unwrap();
    assert!(token.claims().is_wildcard());
}

#[tokio::test]
async fn missing_id_flag_is_an_argument_error() {
    let settings = load(&settings_file(""));
    let err = commands::mint(&settings, &args(Role::Consumer))
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::InvalidArguments(_)));
}

#[tokio::test]
async fn role_without_signer_reports_signer_not_configured() {
    let settings = load(&settings_file(""));
    let mut consumer = args(Role::Consumer);
    consumer.trip_id = Some("trip-1".to_string());

    let err = commands::mint(&settings, &consumer).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Mint(FleetAuthError::SignerNotConfigured(TokenType::Consumer))
    ));
}

#[tokio::test]
async fn unrelated_role_signers_are_not_built() {
    let extra = r#"
[signers.fleet_reader]
type = "ambient"

[signers.consumer]
type = "local"
identity = "consumer@fleet.test"
key_id = "consumer-key"
private_key_path = "/nonexistent/consumer.pem"
"#;
    let settings = load(&settings_file(extra));
    let mut driver = args(Role::Driver);
    driver.vehicle_id = Some("vehicle-3".to_string());

    let token = commands::mint(&settings, &driver).await.unwrap();
    let (_, payload) = decode_unverified(token.jwt().unwrap()).unwrap();
    assert_eq!(payload.iss, "driver@fleet.test");

    let mut consumer = args(Role::Consumer);
    consumer.trip_id = Some("trip-3".to_string());
    let err = commands::mint(&settings, &consumer).await.unwrap_err();
    assert!(matches!(err, CliError::Io(_)));
}

#[tokio::test]
async fn custom_claims_are_rendered_as_json() {
    let key = fixture_key();
    let extra = format!(
        r#"
[signers.custom]
type = "local"
identity = "custom@fleet.test"
key_id = "c"
private_key_path = "{}"
"#,
        key.display()
    );
    let settings = load(&settings_file(&extra));
    let mut custom = args(Role::Custom);
    custom.claims = vec![("depotid".to_string(), "depot-3".to_string())];
    custom.decode = true;

    let token = commands::mint(&settings, &custom).await.unwrap();
    let rendered = output::render_token(&token, OutputFormat::Json, custom.decode).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["token_type"], "custom");
    assert_eq!(value["decoded"]["payload"]["authorization"]["depotid"], "depot-3");
}

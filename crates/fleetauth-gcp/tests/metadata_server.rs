//! Metadata server client against a mock metadata host

use std::sync::Arc;

use fleetauth::{DefaultTokenFactory, Signer, TokenFactory};
use fleetauth_gcp::{AccessTokenSource, GcpError, GcpSigners, IamCredentialsClient, MetadataServer};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/email";
const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

fn metadata(server: &MockServer) -> MetadataServer {
    MetadataServer::with_base_url(Url::parse(&server.uri()).unwrap()).unwrap()
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.ambient",
            "expires_in": 3599,
            "token_type": "Bearer",
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn email_is_read_with_metadata_flavor_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EMAIL_PATH))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("runtime@demo.iam.gserviceaccount.com\n"),
        )
        .mount(&server)
        .await;

    let email = metadata(&server).email().await.unwrap();
    assert_eq!(email, "runtime@demo.iam.gserviceaccount.com");
}

#[tokio::test]
async fn access_token_is_cached_until_near_expiry() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let metadata = metadata(&server);
    assert_eq!(metadata.access_token().await.unwrap(), "ya29.ambient");
    assert_eq!(metadata.access_token().await.unwrap(), "ya29.ambient");
}

#[tokio::test]
async fn missing_account_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EMAIL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = metadata(&server).email().await.unwrap_err();
    assert!(matches!(err, GcpError::Status { status: 404, .. }));
}

#[tokio::test]
async fn default_account_signer_uses_ambient_identity_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EMAIL_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("runtime@demo.iam.gserviceaccount.com"),
        )
        .mount(&server)
        .await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(
            "/v1/projects/-/serviceAccounts/runtime@demo.iam.gserviceaccount.com:signBlob",
        ))
        .and(header("authorization", "Bearer ya29.ambient"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keyId": "k1",
            "signedBlob": "c2lnbmF0dXJl",
        })))
        .expect(2)
        .mount(&server)
        .await;

    let base = Url::parse(&server.uri()).unwrap();
    let metadata = Arc::new(metadata(&server));
    let iam = Arc::new(IamCredentialsClient::with_base_url(base, metadata.clone()).unwrap());
    let signers = GcpSigners::new(metadata, iam);

    let signer = signers.default_account().await.unwrap();
    assert_eq!(signer.identity(), "runtime@demo.iam.gserviceaccount.com");

    let token = DefaultTokenFactory::default().create_server_token();
    let signed = signer.sign(&token).await.unwrap();
    assert!(signed.is_signed());
    signer.sign(&token).await.unwrap();
}

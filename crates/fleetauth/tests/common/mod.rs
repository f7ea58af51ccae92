//! Shared test doubles for the minting suites

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use fleetauth::{
    AuthTokenMinter, CachingStateManager, DefaultTokenFactory, ManualClock, MinterConfig, Result,
    Signer, Token, TokenClaims, TokenFactory, TokenFactorySettings,
};
use parking_lot::Mutex;

/// Signer returning `stub.<n>` and remembering what it signed
#[derive(Debug)]
pub struct RecordingSigner {
    identity: String,
    signed: Mutex<Vec<BTreeMap<String, String>>>,
}

impl RecordingSigner {
    pub fn new(identity: &str) -> Arc<Self> {
        Arc::new(Self {
            identity: identity.to_string(),
            signed: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.signed.lock().len()
    }

    pub fn signed_claims(&self) -> Vec<BTreeMap<String, String>> {
        self.signed.lock().clone()
    }
}

#[async_trait]
impl Signer for RecordingSigner {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn sign(&self, token: &Token) -> Result<Token> {
        let mut signed = self.signed.lock();
        signed.push(token.claims().to_map());
        Ok(token.with_jwt(format!("stub.{}", signed.len())))
    }
}

/// Factory delegating to the default one while counting calls
#[derive(Debug)]
pub struct CountingFactory {
    inner: DefaultTokenFactory,
    calls: AtomicUsize,
}

impl CountingFactory {
    pub fn new(clock: &ManualClock) -> Arc<Self> {
        Arc::new(Self {
            inner: DefaultTokenFactory::with_clock(
                Arc::new(clock.clone()),
                TokenFactorySettings::default(),
            ),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl TokenFactory for CountingFactory {
    fn create_server_token(&self) -> Token {
        self.hit();
        self.inner.create_server_token()
    }

    fn create_driver_token(&self, claims: TokenClaims) -> Result<Token> {
        self.hit();
        self.inner.create_driver_token(claims)
    }

    fn create_consumer_token(&self, claims: TokenClaims) -> Result<Token> {
        self.hit();
        self.inner.create_consumer_token(claims)
    }

    fn create_delivery_server_token(&self) -> Token {
        self.hit();
        self.inner.create_delivery_server_token()
    }

    fn create_delivery_consumer_token(&self, claims: TokenClaims) -> Result<Token> {
        self.hit();
        self.inner.create_delivery_consumer_token(claims)
    }

    fn create_untrusted_delivery_driver_token(&self, claims: TokenClaims) -> Result<Token> {
        self.hit();
        self.inner.create_untrusted_delivery_driver_token(claims)
    }

    fn create_trusted_delivery_driver_token(&self, claims: TokenClaims) -> Result<Token> {
        self.hit();
        self.inner.create_trusted_delivery_driver_token(claims)
    }

    fn create_trusted_delivery_driver_task_token(
        &self,
        vehicle_claims: TokenClaims,
        task_claims: TokenClaims,
    ) -> Result<Token> {
        self.hit();
        self.inner
            .create_trusted_delivery_driver_task_token(vehicle_claims, task_claims)
    }

    fn create_delivery_fleet_reader_token(&self) -> Token {
        self.hit();
        self.inner.create_delivery_fleet_reader_token()
    }

    fn create_fleet_reader_token(&self) -> Token {
        self.hit();
        self.inner.create_fleet_reader_token()
    }

    fn create_custom_token(&self, claims: TokenClaims) -> Result<Token> {
        self.hit();
        self.inner.create_custom_token(claims)
    }
}

/// Minter wiring with a shared manual clock starting at the epoch
pub struct Harness {
    pub clock: ManualClock,
    pub factory: Arc<CountingFactory>,
    pub server: Arc<RecordingSigner>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = ManualClock::new(UNIX_EPOCH);
        Self {
            factory: CountingFactory::new(&clock),
            server: RecordingSigner::new("server@fleet.example"),
            clock,
        }
    }

    /// ODRD configuration with only the server signer set
    pub fn config(&self) -> MinterConfig {
        let mut config = MinterConfig::odrd();
        config.server_signer = Some(self.server.clone());
        config.token_factory = self.factory.clone();
        config.state_manager = Arc::new(CachingStateManager::with_clock(Arc::new(
            self.clock.clone(),
        )));
        config
    }

    pub fn minter(&self) -> AuthTokenMinter {
        AuthTokenMinter::new(self.config()).expect("server signer is configured")
    }
}

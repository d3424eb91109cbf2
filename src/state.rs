use std::sync::Arc;

use crate::auth::{JwksClient, TokenVerifier};
use crate::config::AppConfig;
use crate::store::DrinkStore;

/// Shared per-process state, constructed once at startup and handed to the
/// router. Replaces any module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: DrinkStore,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(config: AppConfig, store: DrinkStore) -> Self {
        let jwks = JwksClient::new(config.auth.jwks_url.clone());
        Self::with_jwks(config, store, jwks)
    }

    /// Build state over an explicit key-set client. Tests use this with a
    /// local key set instead of a remote provider.
    pub fn with_jwks(config: AppConfig, store: DrinkStore, jwks: JwksClient) -> Self {
        let verifier = TokenVerifier::new(jwks, &config.auth);
        Self {
            config: Arc::new(config),
            store,
            verifier,
        }
    }
}

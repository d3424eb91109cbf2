use std::sync::Arc;

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

use super::AuthError;

/// Client for the identity provider's published JWK set.
///
/// The set is fetched lazily and cached process-wide; it is refetched only
/// when a token arrives with a key id the cached set does not contain, which
/// covers provider key rotation without an invalidation protocol.
#[derive(Clone)]
pub struct JwksClient {
    inner: Arc<Inner>,
}

struct Inner {
    /// `None` for a fixed local set (tests, offline verification).
    url: Option<String>,
    http: reqwest::Client,
    cached: RwLock<Option<JwkSet>>,
}

impl JwksClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                url: Some(url.into()),
                http: reqwest::Client::new(),
                cached: RwLock::new(None),
            }),
        }
    }

    /// Build a client over a fixed key set that is never refetched.
    pub fn from_set(set: JwkSet) -> Self {
        Self {
            inner: Arc::new(Inner {
                url: None,
                http: reqwest::Client::new(),
                cached: RwLock::new(Some(set)),
            }),
        }
    }

    /// Resolve the decoding key for `kid`, refetching the set once if the
    /// cached copy does not know it.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.lookup(kid).await? {
            return Ok(key);
        }

        self.refresh().await?;

        match self.lookup(kid).await? {
            Some(key) => Ok(key),
            None => Err(AuthError::UnknownSigningKey),
        }
    }

    async fn lookup(&self, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
        let cached = self.inner.cached.read().await;
        let Some(set) = cached.as_ref() else {
            return Ok(None);
        };
        match set.find(kid) {
            Some(jwk) => DecodingKey::from_jwk(jwk)
                .map(Some)
                .map_err(|e| AuthError::KeySetUnavailable(format!("unusable key '{}': {}", kid, e))),
            None => Ok(None),
        }
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        // A fixed local set has nowhere to refresh from.
        let Some(url) = self.inner.url.as_deref() else {
            return Ok(());
        };

        tracing::debug!("refreshing JWK set from {}", url);
        let set: JwkSet = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        *self.inner.cached.write().await = Some(set);
        Ok(())
    }
}

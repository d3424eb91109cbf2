use axum::http::{HeaderMap, StatusCode};
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

pub mod jwks;

pub use jwks::JwksClient;

/// Permission scopes understood by this API.
pub mod scopes {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

/// Claims consumed from a validated bearer token. Audience and issuer are
/// checked during decode and not retained.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    /// Scope strings granted by the identity provider. Absent entirely when
    /// the token was issued without an RBAC grant.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    pub exp: i64,
}

/// Request-scoped identity decoded from a validated token. Never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub sub: String,
    pub permissions: Vec<String>,
    pub expires_at: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            permissions: claims.permissions.unwrap_or_default(),
            expires_at: claims.exp,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header is expected")]
    MissingAuthHeader,
    #[error("authorization header must be of the form 'Bearer <token>'")]
    MalformedAuthHeader,
    #[error("no signing key matches the token's key id")]
    UnknownSigningKey,
    #[error("token is expired")]
    TokenExpired,
    #[error("invalid claims: {0}")]
    InvalidClaims(String),
    #[error("token signature could not be verified")]
    InvalidSignature,
    #[error("permissions not included in token")]
    MissingPermissions,
    #[error("permission '{0}' not granted")]
    InsufficientScope(String),
    #[error("signing key set unavailable: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::MalformedAuthHeader
            | AuthError::UnknownSigningKey
            | AuthError::TokenExpired
            | AuthError::InvalidClaims(_)
            | AuthError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AuthError::MissingPermissions | AuthError::InsufficientScope(_) => {
                StatusCode::FORBIDDEN
            }
            AuthError::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Human-readable description carried into the error envelope.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively; anything other than exactly two
/// segments is rejected.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?;

    let value = value.to_str().map_err(|_| AuthError::MalformedAuthHeader)?;
    let mut parts = value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// Verifies bearer tokens against the identity provider's published keys.
///
/// Pure pipeline: signature check, standard-claims check, then scope
/// membership. No retries, no side effects beyond the key-set cache.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks: JwksClient,
    audience: String,
    issuer: String,
}

impl TokenVerifier {
    pub fn new(jwks: JwksClient, config: &AuthConfig) -> Self {
        Self {
            jwks,
            audience: config.audience.clone(),
            issuer: config.issuer.clone(),
        }
    }

    /// Validate signature and standard claims, returning the decoded claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidSignature)?;
        let kid = header.kid.ok_or(AuthError::UnknownSigningKey)?;
        let key = self.jwks.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, &key, &validation).map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidAudience => {
                    AuthError::InvalidClaims("audience does not match this API".to_string())
                }
                ErrorKind::InvalidIssuer => {
                    AuthError::InvalidClaims("issuer is not the trusted provider".to_string())
                }
                ErrorKind::MissingRequiredClaim(claim) => {
                    AuthError::InvalidClaims(format!("missing required claim '{}'", claim))
                }
                ErrorKind::ImmatureSignature => {
                    AuthError::InvalidClaims("token is not yet valid".to_string())
                }
                _ => AuthError::InvalidSignature,
            }
        })?;

        Ok(data.claims)
    }

    /// Check that the decoded claims grant `required` and yield the principal.
    pub fn check_scope(&self, claims: Claims, required: &str) -> Result<Principal, AuthError> {
        match &claims.permissions {
            None => Err(AuthError::MissingPermissions),
            Some(granted) if !granted.iter().any(|p| p == required) => {
                Err(AuthError::InsufficientScope(required.to_string()))
            }
            Some(_) => Ok(Principal::from(claims)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn missing_header_is_distinct_from_malformed() {
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("Token abc")),
            Err(AuthError::MalformedAuthHeader)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("Bearer")),
            Err(AuthError::MalformedAuthHeader)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("Bearer abc extra")),
            Err(AuthError::MalformedAuthHeader)
        ));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer(&headers_with("bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer(&headers_with("Bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn scope_check_separates_missing_list_from_missing_entry() {
        let verifier = TokenVerifier {
            jwks: JwksClient::from_set(jsonwebtoken::jwk::JwkSet { keys: vec![] }),
            audience: "drinks".to_string(),
            issuer: "https://issuer/".to_string(),
        };

        let no_list = Claims { sub: "u".to_string(), permissions: None, exp: 0 };
        assert!(matches!(
            verifier.check_scope(no_list, "post:drinks"),
            Err(AuthError::MissingPermissions)
        ));

        let wrong_scope = Claims {
            sub: "u".to_string(),
            permissions: Some(vec!["get:drinks-detail".to_string()]),
            exp: 0,
        };
        assert!(matches!(
            verifier.check_scope(wrong_scope, "post:drinks"),
            Err(AuthError::InsufficientScope(_))
        ));

        let granted = Claims {
            sub: "u".to_string(),
            permissions: Some(vec!["post:drinks".to_string()]),
            exp: 0,
        };
        let principal = verifier.check_scope(granted, "post:drinks").unwrap();
        assert_eq!(principal.sub, "u");
        assert_eq!(principal.permissions, vec!["post:drinks".to_string()]);
    }
}

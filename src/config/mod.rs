use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration, built from the environment once at startup and
/// passed explicitly through `AppState` (no module-level singleton).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// URL of the identity provider's published JWK set.
    pub jwks_url: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim (the API identifier registered with the provider).
    pub audience: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::defaults().with_env_overrides()
    }

    fn defaults() -> Self {
        Self {
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: "sqlite:drinks.db".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                jwks_url: "https://dev-coffeeshop.us.auth0.com/.well-known/jwks.json".to_string(),
                issuer: "https://dev-coffeeshop.us.auth0.com/".to_string(),
                audience: "drinks".to_string(),
            },
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // AUTH_DOMAIN derives both the JWK-set URL and the issuer; the
        // specific vars below still win if both are set.
        if let Ok(domain) = env::var("AUTH_DOMAIN") {
            self.auth.jwks_url = format!("https://{}/.well-known/jwks.json", domain);
            self.auth.issuer = format!("https://{}/", domain);
        }
        if let Ok(v) = env::var("AUTH_JWKS_URL") {
            self.auth.jwks_url = v;
        }
        if let Ok(v) = env::var("AUTH_ISSUER") {
            self.auth.issuer = v;
        }
        if let Ok(v) = env::var("AUTH_AUDIENCE") {
            self.auth.audience = v;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_db_and_jwks_endpoint() {
        let config = AppConfig::defaults();
        assert_eq!(config.server.port, 3000);
        assert!(config.database.url.starts_with("sqlite:"));
        assert!(config.auth.jwks_url.ends_with("/.well-known/jwks.json"));
    }
}

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub accounts: AccountsConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Email address of the designated administrator account. A caller
    /// registered with this email is granted the admin claim when their
    /// profile is created.
    pub admin_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL prefixed onto signed file links handed back to clients.
    pub public_base_url: String,
    /// Directory the filesystem blob adapter writes under.
    pub blob_root: String,
    /// Lifetime of signed retrieval URLs, in days. Defaults to roughly a
    /// century: links are meant to outlive the catalogue entry itself.
    pub signed_url_expiry_days: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("ACCOUNTS_ADMIN_EMAIL") {
            self.accounts.admin_email = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.storage.public_base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("BLOB_ROOT") {
            self.storage.blob_root = v;
        }
        if let Ok(v) = env::var("SIGNED_URL_EXPIRY_DAYS") {
            self.storage.signed_url_expiry_days =
                v.parse().unwrap_or(self.storage.signed_url_expiry_days);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            accounts: AccountsConfig {
                admin_email: "admin@example.com".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: "bookshelf-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
            },
            storage: StorageConfig {
                public_base_url: "http://127.0.0.1:3000".to_string(),
                blob_root: "./blobdata".to_string(),
                signed_url_expiry_days: 365 * 100,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            accounts: AccountsConfig {
                admin_email: String::new(),
            },
            security: SecurityConfig {
                // Must be provided via JWT_SECRET; an empty secret rejects all tokens
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
            },
            storage: StorageConfig {
                public_base_url: String::new(),
                blob_root: "/var/lib/bookshelf/blobs".to_string(),
                signed_url_expiry_days: 365 * 100,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.accounts.admin_email, "admin@example.com");
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.storage.signed_url_expiry_days, 36500);
    }

    #[test]
    fn production_requires_explicit_secret() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.accounts.admin_email.is_empty());
    }
}

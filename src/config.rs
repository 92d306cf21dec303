/// Configuration management for the career portal
use crate::{
    account::Role,
    error::{PortalError, PortalResult},
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub email: Option<EmailConfig>,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public base URL used in outgoing mail
    pub public_url: String,
    /// Maximum request body / uploaded file size in bytes
    pub upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub uploads_directory: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of a bearer token and its session
    pub token_ttl_hours: i64,
    /// Admin account created at startup when no active admin exists
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

/// Bulk import defaults applied to missing CSV columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub default_password: String,
    pub default_role: Role,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> PortalResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("PORTAL_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORTAL_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| PortalError::Validation("Invalid port number".to_string()))?;
        let public_url = env::var("PORTAL_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let upload_limit = env::var("PORTAL_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .unwrap_or(10 * 1024 * 1024);

        let data_directory: PathBuf = env::var("PORTAL_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("PORTAL_DATABASE_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("portal.sqlite"));
        let uploads_directory = env::var("PORTAL_UPLOADS_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("uploads"));

        let jwt_secret = env::var("PORTAL_JWT_SECRET")
            .map_err(|_| PortalError::Validation("JWT secret required".to_string()))?;
        let token_ttl_hours = env::var("PORTAL_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        let bootstrap_admin = match (
            env::var("PORTAL_BOOTSTRAP_ADMIN_EMAIL"),
            env::var("PORTAL_BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        let email = if let Ok(smtp_url) = env::var("PORTAL_EMAIL_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("PORTAL_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
            })
        } else {
            None
        };

        let default_password = env::var("PORTAL_IMPORT_DEFAULT_PASSWORD")
            .unwrap_or_else(|_| "default123".to_string());
        let default_role = env::var("PORTAL_IMPORT_DEFAULT_ROLE")
            .unwrap_or_else(|_| "student".to_string())
            .parse()?;

        let log_level = env::var("PORTAL_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let log_json = env::var("PORTAL_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                database,
                uploads_directory,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_hours,
                bootstrap_admin,
            },
            email,
            import: ImportConfig {
                default_password,
                default_role,
            },
            logging: LoggingConfig {
                level: log_level,
                json: log_json,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> PortalResult<()> {
        if self.service.hostname.is_empty() {
            return Err(PortalError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(PortalError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.token_ttl_hours <= 0 {
            return Err(PortalError::Validation(
                "Token lifetime must be positive".to_string(),
            ));
        }

        if self.import.default_password.is_empty() {
            return Err(PortalError::Validation(
                "Import default password cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }
}

/// In-memory configuration shared by unit tests
#[cfg(test)]
pub(crate) fn test_config() -> std::sync::Arc<ServerConfig> {
    std::sync::Arc::new(tests::sample_config())
}

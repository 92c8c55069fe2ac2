//! Configuration for the emblem gateway
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use mongodb::options::Credential;
use std::fmt;
use std::net::SocketAddr;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::services::CallbackVerifier;

const DEFAULT_DB_NAME: &str = "lupul-corbul";

/// Emblem gateway - payment callbacks that mint Lupul și Corbul emblems
#[derive(Parser, Debug, Clone)]
#[command(name = "emblem-gateway")]
#[command(about = "Payment callback gateway that mints Lupul și Corbul emblems")]
pub struct Args {
    /// Unique node identifier for this gateway instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8888")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory ledger when MongoDB is unreachable)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name (defaults to the service account project id)
    #[arg(long, env = "MONGODB_DB")]
    pub mongodb_db: Option<String>,

    /// Service account used to reach the document store
    #[command(flatten)]
    pub service_account: ServiceAccountArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Timeout for reading a request body and for outbound notifications
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,

    /// Largest accepted callback body
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "65536")]
    pub max_body_bytes: usize,

    /// Answer malformed callbacks with 4xx instead of 500
    #[arg(long, env = "STRICT_STATUS_CODES", default_value = "false")]
    pub strict_status_codes: bool,

    /// Hex Ed25519 public key of the payment processor.
    /// When set, every callback must carry a valid signature.
    #[arg(long, env = "PROCESSOR_PUBLIC_KEY")]
    pub processor_public_key: Option<String>,

    /// Webhook that receives mint notifications (e-mail service)
    #[arg(long, env = "MINT_NOTIFICATION_URL")]
    pub mint_notification_url: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Service account credential fields
#[derive(Parser, Clone, Default)]
pub struct ServiceAccountArgs {
    /// Project the emblem collections belong to
    #[arg(long, env = "SERVICE_ACCOUNT_PROJECT_ID")]
    pub project_id: Option<String>,

    #[arg(long, env = "SERVICE_ACCOUNT_PRIVATE_KEY_ID")]
    pub private_key_id: Option<String>,

    #[arg(long, env = "SERVICE_ACCOUNT_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    #[arg(long, env = "SERVICE_ACCOUNT_CLIENT_EMAIL")]
    pub client_email: Option<String>,

    #[arg(long, env = "SERVICE_ACCOUNT_CLIENT_ID")]
    pub client_id: Option<String>,
}

impl fmt::Debug for ServiceAccountArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountArgs")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl ServiceAccountArgs {
    fn any_set(&self) -> bool {
        self.project_id.is_some()
            || self.private_key_id.is_some()
            || self.private_key.is_some()
            || self.client_email.is_some()
            || self.client_id.is_some()
    }

    /// Build the resolved account; `None` when no project id is configured
    pub fn resolve(&self) -> Option<ServiceAccount> {
        let project_id = self.project_id.clone()?;
        Some(ServiceAccount {
            project_id,
            private_key_id: self.private_key_id.clone(),
            // Keys pasted into env files usually carry literal \n sequences
            private_key: self.private_key.as_ref().map(|k| k.replace("\\n", "\n")),
            client_email: self.client_email.clone(),
            client_id: self.client_id.clone(),
        })
    }
}

/// Resolved service account. The private key is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ServiceAccount {
    pub project_id: String,
    pub private_key_id: Option<String>,
    private_key: Option<String>,
    pub client_email: Option<String>,
    pub client_id: Option<String>,
}

impl ServiceAccount {
    /// Store credential, when both client email and private key are present
    pub fn credential(&self) -> Option<Credential> {
        match (&self.client_email, &self.private_key) {
            (Some(email), Some(key)) => Some(
                Credential::builder()
                    .username(email.clone())
                    .password(key.clone())
                    .build(),
            ),
            _ => None,
        }
    }

    /// Application name reported to the store
    pub fn app_name(&self) -> String {
        let id = self.client_id.as_deref().unwrap_or(&self.project_id);
        format!("emblem-gateway/{}", id)
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl Args {
    /// Database holding the emblem collections
    pub fn database_name(&self) -> String {
        self.mongodb_db
            .clone()
            .or_else(|| self.service_account.project_id.clone())
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string())
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let sa = &self.service_account;
        if sa.any_set() && sa.project_id.is_none() {
            return Err("SERVICE_ACCOUNT_PROJECT_ID is required when other service account fields are set".to_string());
        }
        if sa.private_key.is_some() != sa.client_email.is_some() {
            return Err(
                "SERVICE_ACCOUNT_PRIVATE_KEY and SERVICE_ACCOUNT_CLIENT_EMAIL must be set together"
                    .to_string(),
            );
        }

        if let Some(ref key) = self.processor_public_key {
            CallbackVerifier::from_hex(key)
                .map_err(|e| format!("PROCESSOR_PUBLIC_KEY is invalid: {}", e))?;
        }

        if let Some(ref url) = self.mint_notification_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("MINT_NOTIFICATION_URL must be an http(s) URL".to_string());
            }
        }

        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["emblem-gateway"];
        argv.extend_from_slice(args);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults_validate() {
        let args = parse(&[]);
        assert!(args.validate().is_ok());
        assert_eq!(args.listen.port(), 8888);
        assert!(!args.strict_status_codes);
    }

    #[test]
    fn test_database_name_falls_back_to_project() {
        let args = parse(&["--project-id", "lupul-corbul-prod"]);
        assert_eq!(args.database_name(), "lupul-corbul-prod");

        let args = parse(&["--project-id", "p", "--mongodb-db", "explicit"]);
        assert_eq!(args.database_name(), "explicit");
    }

    #[test]
    fn test_key_and_email_must_pair() {
        let args = parse(&["--project-id", "p", "--private-key", "k"]);
        assert!(args.validate().is_err());

        let args = parse(&["--client-email", "svc@p.example"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_invalid_processor_key_rejected() {
        let args = parse(&["--processor-public-key", "not-hex"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_service_account_resolution() {
        let args = parse(&[
            "--project-id",
            "p",
            "--private-key",
            "line1\\nline2",
            "--client-email",
            "svc@p.example",
            "--client-id",
            "1234",
        ]);
        let account = args.service_account.resolve().unwrap();
        assert_eq!(account.app_name(), "emblem-gateway/1234");
        let cred = account.credential().unwrap();
        assert_eq!(cred.username.as_deref(), Some("svc@p.example"));
        assert_eq!(cred.password.as_deref(), Some("line1\nline2"));

        let debug = format!("{:?}", args.service_account);
        assert!(!debug.contains("line1"));
    }
}

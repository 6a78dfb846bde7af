//! Gateway configuration.
//!
//! The configuration is process-wide and immutable once the gateway is built.
//! It is usually loaded from TOML using the option names operators already
//! know from REMOTE_USER deployments:
//!
//! ```toml
//! remote_user_header = "HTTP_REMOTE_USER"
//! maildomain = "example.org"
//! display_servers = ["ucsc.example.org"]
//! admin_users = ["root@example.org", "bob"]
//! remote_user_secret = "change-me"
//! normalize_remote_user_email = true
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::dns::DEFAULT_MAX_DNS_LOOKUPS;
use crate::error::ConfigError;
use crate::Secret;

/// Header name used when none is configured.
pub const DEFAULT_IDENTITY_HEADER: &str = "HTTP_REMOTE_USER";

/// Header carrying the shared secret from the upstream proxy.
pub const SECRET_HEADER: &str = "GX_SECRET";

/// Mail domain used for the display-server identity when none is configured.
pub const DEFAULT_DISPLAY_SERVER_DOMAIN: &str = "example.org";

const DEFAULT_DNS_TIMEOUT_MS: u64 = 2000;
const DEFAULT_SUPPORT_CONTACT: &str = "your local Galaxy administrator";

/// Configuration for [`AuthGateway`](crate::AuthGateway).
///
/// # Examples
///
/// ```
/// use remote_user_gate::GatewayConfig;
///
/// let config = GatewayConfig {
///     mail_domain: Some("example.org".to_string()),
///     admin_users: vec!["bob@example.org".to_string()],
///     ..GatewayConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Header carrying the asserted identity
    #[serde(rename = "remote_user_header")]
    pub identity_header: String,

    /// Domain appended to bare usernames
    #[serde(rename = "maildomain")]
    pub mail_domain: Option<String>,

    /// Hostnames of display servers allowed in without an identity
    pub display_servers: BTreeSet<String>,

    /// Admin identities, bare usernames or `user@domain`; first match wins
    pub admin_users: Vec<String>,

    /// Identity forced onto every request (single-user deployments)
    pub single_user: Option<String>,

    /// Secret the upstream proxy must send in `GX_SECRET`
    #[serde(rename = "remote_user_secret", alias = "remote_user_secret_header")]
    pub shared_secret: Option<Secret<String>>,

    /// Lowercase the asserted identity before use
    #[serde(rename = "normalize_remote_user_email")]
    pub normalize_to_lowercase: bool,

    /// Require a live registry record before granting admin status
    pub admin_requires_registry: bool,

    /// Upper bound on the reverse-DNS lookup for display servers
    pub dns_timeout_ms: u64,

    /// Reverse-DNS lookups allowed to run at once; further lookups fail closed
    pub dns_max_in_flight: usize,

    /// Who users are told to contact when their identity is unknown
    pub support_contact: String,

    /// Dump request headers at debug level on every denial
    pub log_denied_headers: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            mail_domain: None,
            display_servers: BTreeSet::new(),
            admin_users: Vec::new(),
            single_user: None,
            shared_secret: None,
            normalize_to_lowercase: false,
            admin_requires_registry: false,
            dns_timeout_ms: DEFAULT_DNS_TIMEOUT_MS,
            dns_max_in_flight: DEFAULT_MAX_DNS_LOOKUPS,
            support_contact: DEFAULT_SUPPORT_CONTACT.to_string(),
            log_denied_headers: true,
        }
    }
}

impl GatewayConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when [`validate`](Self::validate) fails.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks invariants that deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_header.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "remote_user_header must not be empty".to_string(),
            ));
        }

        if let Some(domain) = &self.mail_domain {
            if domain.trim().is_empty() || domain.contains('@') {
                return Err(ConfigError::Invalid(format!(
                    "maildomain `{domain}` must be a bare domain"
                )));
            }
        }

        if self.admin_users.iter().any(|u| u.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "admin_users must not contain empty entries".to_string(),
            ));
        }

        if self.display_servers.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "display_servers must not contain empty hostnames".to_string(),
            ));
        }

        if matches!(&self.single_user, Some(user) if user.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "single_user must not be empty when set".to_string(),
            ));
        }

        if matches!(&self.shared_secret, Some(secret) if secret.expose_secret().is_empty()) {
            return Err(ConfigError::Invalid(
                "remote_user_secret must not be empty when set".to_string(),
            ));
        }

        if self.dns_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "dns_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.dns_max_in_flight == 0 {
            return Err(ConfigError::Invalid(
                "dns_max_in_flight must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Reverse-DNS timeout as a [`Duration`].
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    /// Returns `true` if `host` is a configured display server.
    ///
    /// Hostnames compare ASCII case-insensitively; a trailing root dot is ignored.
    pub fn is_display_server(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.');
        self.display_servers
            .iter()
            .any(|known| known.trim_end_matches('.').eq_ignore_ascii_case(host))
    }

    /// Identity bound to requests coming from a display server.
    pub fn display_server_identity(&self) -> String {
        format!(
            "remote_display_server@{}",
            self.mail_domain
                .as_deref()
                .unwrap_or(DEFAULT_DISPLAY_SERVER_DOMAIN)
        )
    }
}

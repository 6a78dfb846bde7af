//! Classification of a normalized identity as admin, regular user, or unknown.

use crate::config::GatewayConfig;
use crate::registry::{UserRecord, UserRegistry};

/// Outcome of identity resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIdentity {
    /// Matched a configured admin entry; holds that entry
    Admin(String),
    /// A live account in the registry; holds its email
    RegularUser(String),
    /// Neither
    Unknown,
}

impl ResolvedIdentity {
    /// Returns the canonical identity, unless unknown.
    pub fn email(&self) -> Option<&str> {
        match self {
            ResolvedIdentity::Admin(email) | ResolvedIdentity::RegularUser(email) => Some(email),
            ResolvedIdentity::Unknown => None,
        }
    }

    /// Returns `true` for admins.
    pub fn is_admin(&self) -> bool {
        matches!(self, ResolvedIdentity::Admin(_))
    }
}

/// Text before the first `@`, or the whole string.
///
/// # Examples
///
/// ```
/// use remote_user_gate::local_part;
///
/// assert_eq!(local_part("bob@example.org"), "bob");
/// assert_eq!(local_part("bob"), "bob");
/// ```
pub fn local_part(identity: &str) -> &str {
    identity.split_once('@').map_or(identity, |(local, _)| local)
}

/// Resolves normalized identities against the admin list and the registry.
///
/// Admin entries are checked first, in configured order, by local part. The
/// returned admin identity is always the configured entry, never the
/// caller-supplied value. With `admin_requires_registry` the entry must also
/// exist, not deleted, in the registry.
///
/// # Examples
///
/// ```
/// use remote_user_gate::{GatewayConfig, IdentityResolver, InMemoryRegistry, ResolvedIdentity};
///
/// let config = GatewayConfig {
///     admin_users: vec!["bob@example.org".to_string()],
///     ..GatewayConfig::default()
/// };
/// let registry = InMemoryRegistry::new().with_user("alice@example.org");
/// let resolver = IdentityResolver::new(&config, &registry);
///
/// assert_eq!(resolver.resolve("bob"), ResolvedIdentity::Admin("bob@example.org".into()));
/// assert_eq!(
///     resolver.resolve("alice@example.org"),
///     ResolvedIdentity::RegularUser("alice@example.org".into())
/// );
/// assert_eq!(resolver.resolve("mallory@example.org"), ResolvedIdentity::Unknown);
/// ```
#[derive(Debug)]
pub struct IdentityResolver<'a, R> {
    config: &'a GatewayConfig,
    registry: &'a R,
}

impl<'a, R: UserRegistry> IdentityResolver<'a, R> {
    /// Creates a resolver over the given configuration and registry.
    pub fn new(config: &'a GatewayConfig, registry: &'a R) -> Self {
        Self { config, registry }
    }

    /// Classifies `identity`.
    pub fn resolve(&self, identity: &str) -> ResolvedIdentity {
        if let Some(admin) = self.admin_entry(identity) {
            if !self.config.admin_requires_registry || self.is_live(admin) {
                return ResolvedIdentity::Admin(admin.to_string());
            }
            tracing::debug!(admin = %admin, "Admin entry has no live registry record");
        }

        match self.lookup(identity) {
            Some(record) if !record.deleted => ResolvedIdentity::RegularUser(record.email),
            _ => ResolvedIdentity::Unknown,
        }
    }

    /// First admin entry sharing the local part of `identity`.
    fn admin_entry(&self, identity: &str) -> Option<&'a str> {
        let wanted = local_part(identity);
        self.config
            .admin_users
            .iter()
            .map(String::as_str)
            .find(|entry| local_part(entry) == wanted)
    }

    fn is_live(&self, identity: &str) -> bool {
        matches!(self.lookup(identity), Some(record) if !record.deleted)
    }

    fn lookup(&self, identity: &str) -> Option<UserRecord> {
        match self.registry.lookup(identity) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "User registry lookup failed; treating identity as unknown");
                None
            }
        }
    }
}

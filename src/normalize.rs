//! Canonicalization of the identity asserted by the upstream proxy.

use crate::config::GatewayConfig;
use crate::Tainted;

/// Value some proxies (Apache `Rewrite*` setups, for one) put in the identity
/// header when the user is not authenticated.
pub const UNAUTHENTICATED_MARKER: &str = "(null)";

/// Turns a raw identity header value into an account identifier.
///
/// Normalization appends `@{mail_domain}` to bare usernames and, when
/// configured, lowercases the result (domain included). Applying it twice
/// gives the same result as applying it once.
///
/// Values containing control characters (CR, LF, NUL and friends) are
/// rejected: they are never valid account identifiers and would otherwise
/// end up verbatim in logs and in the bound identity.
///
/// # Examples
///
/// ```
/// use remote_user_gate::{IdentityNormalizer, Tainted};
///
/// let normalizer = IdentityNormalizer::new(Some("example.org"), false);
/// assert_eq!(
///     normalizer.normalize(Tainted::new("alice".into())).as_deref(),
///     Some("alice@example.org")
/// );
/// assert_eq!(
///     normalizer.normalize(Tainted::new("bob@other.org".into())).as_deref(),
///     Some("bob@other.org")
/// );
/// assert_eq!(normalizer.normalize(Tainted::new("alice\r\n".into())), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IdentityNormalizer<'a> {
    mail_domain: Option<&'a str>,
    lowercase: bool,
}

impl<'a> IdentityNormalizer<'a> {
    /// Creates a normalizer with an optional default mail domain.
    pub fn new(mail_domain: Option<&'a str>, lowercase: bool) -> Self {
        Self {
            mail_domain,
            lowercase,
        }
    }

    /// Creates a normalizer from the gateway configuration.
    pub fn from_config(config: &'a GatewayConfig) -> Self {
        Self::new(config.mail_domain.as_deref(), config.normalize_to_lowercase)
    }

    /// Normalizes the value, consuming the taint.
    ///
    /// Returns `None` when the value contains control characters.
    pub fn normalize(&self, raw: Tainted<String>) -> Option<String> {
        let identity = raw.into_inner();
        if identity.chars().any(is_control_char) {
            return None;
        }

        let identity = match self.mail_domain {
            Some(domain) if !identity.contains('@') => format!("{identity}@{domain}"),
            _ => identity,
        };

        if self.lowercase {
            Some(identity.to_lowercase())
        } else {
            Some(identity)
        }
    }
}

fn is_control_char(c: char) -> bool {
    c.is_control() || c == '\u{007F}'
}

/// Returns `true` for header values that signal "authenticated user unknown".
pub fn is_unauthenticated_marker(raw: &Tainted<String>) -> bool {
    raw.peek().starts_with(UNAUTHENTICATED_MARKER)
}

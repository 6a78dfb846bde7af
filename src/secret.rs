//! The shared secret between the upstream proxy and the gateway.

use std::fmt;

use serde::{Deserialize, Deserializer};
use subtle::ConstantTimeEq;

/// A wrapper that prevents accidental exposure of sensitive values.
///
/// The gateway keeps the upstream shared secret in a `Secret<String>` so it
/// cannot end up in logs, audit events, or `Debug` output of the
/// configuration. The wrapped value can only be reached through
/// [`expose_secret`](Self::expose_secret).
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow`, `Clone`, or `Copy`
/// - Debug and Display output is always `[REDACTED]`
/// - Deserializes transparently, so configuration files hold the plain value
///
/// # Examples
///
/// ```
/// use remote_user_gate::Secret;
///
/// let shared = Secret::new("s3cr3t".to_string());
/// assert_eq!(format!("{:?}", shared), "[REDACTED]");
/// assert_eq!(shared.expose_secret(), "s3cr3t");
/// ```
// BREAKING CHANGE WARNING: Do NOT add Clone, Copy, or Default derives.
// These would bypass redaction protections and allow secrets to be duplicated carelessly.
pub struct Secret<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value in a `Secret`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// Intentionally verbose; make sure the returned value is not logged.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Secret::new)
    }
}

/// Compares the secret supplied by the upstream proxy against the configured one.
///
/// The comparison runs in constant time with respect to the contents of both
/// values; only the lengths influence timing. An absent `provided` value is
/// always a failure and is never compared.
///
/// # Examples
///
/// ```
/// use remote_user_gate::{secret, Secret};
///
/// let expected = Secret::new("s3cr3t".to_string());
/// assert!(secret::compare(Some("s3cr3t"), &expected));
/// assert!(!secret::compare(Some("s3cr3T"), &expected));
/// assert!(!secret::compare(None, &expected));
/// ```
pub fn compare(provided: Option<&str>, expected: &Secret<String>) -> bool {
    let Some(provided) = provided else {
        return false;
    };

    provided
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into()
}

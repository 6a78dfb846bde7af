use std::fmt;

/// A wrapper for an identity asserted by the upstream proxy that has not been
/// normalized yet.
///
/// The raw value of the identity header is untrusted: it may be the
/// `(null)` marker some proxies emit, a bare username, or mixed case. Wrapping
/// it in `Tainted<T>` keeps it from being bound as a user identity until it
/// has gone through [`IdentityNormalizer`](crate::IdentityNormalizer).
///
/// # Security Properties
///
/// - Does NOT implement `Deref` or any implicit conversion traits
/// - Only code inside this crate can unwrap the value
///
/// # Examples
///
/// ```
/// use remote_user_gate::{IdentityNormalizer, Tainted};
///
/// let raw = Tainted::new("Alice".to_string());
/// let normalizer = IdentityNormalizer::new(Some("example.org"), true);
/// assert_eq!(normalizer.normalize(raw).as_deref(), Some("alice@example.org"));
/// ```
#[derive(Clone)]
pub struct Tainted<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // External code must go through IdentityNormalizer to reach the value.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value in `Tainted`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the inner value for inspection inside the crate.
    pub(crate) fn peek(&self) -> &T {
        &self.inner
    }

    /// Extracts the inner value.
    ///
    /// Only the normalizer calls this.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// BREAKING CHANGE WARNING: Do NOT add Deref, AsRef, Borrow, From<T>, Into<T>.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}

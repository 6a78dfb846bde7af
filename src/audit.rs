//! Audit events for gateway decisions.
//!
//! One event is emitted per evaluation on the `remote_user_gate::audit`
//! tracing target. Events only carry the path, the bound identity and the
//! outcome; header values and the shared secret never appear in them.

use std::fmt;

use crate::error::DenialReason;

/// Tracing target audit events are emitted on.
pub const AUDIT_TARGET: &str = "remote_user_gate::audit";

/// Outcome of an audited evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Request forwarded to the application
    Forwarded,
    /// Request denied with a 403
    Denied,
    /// Evaluation aborted on a configuration error
    Error,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Forwarded => write!(f, "forwarded"),
            AuditOutcome::Denied => write!(f, "denied"),
            AuditOutcome::Error => write!(f, "error"),
        }
    }
}

/// Checks skipped for a forwarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    /// Peer resolved to a configured display server
    DisplayServer,
    /// `/api/` path; the API authenticates on its own
    Api,
}

impl fmt::Display for Bypass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bypass::DisplayServer => write!(f, "display_server"),
            Bypass::Api => write!(f, "api"),
        }
    }
}

/// A structured record of one gateway decision.
///
/// # Example
///
/// ```
/// use remote_user_gate::audit::{AuditEvent, AuditOutcome};
/// use remote_user_gate::DenialReason;
///
/// let event = AuditEvent::new("/user/create", None::<String>, AuditOutcome::Denied)
///     .with_reason(DenialReason::MissingUsername);
///
/// assert_eq!(
///     event.to_string(),
///     "AuditEvent[outcome=denied, path=/user/create, principal=<none>, reason=missing_username]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    path: String,
    principal: Option<String>,
    outcome: AuditOutcome,
    reason: Option<DenialReason>,
    bypass: Option<Bypass>,
}

impl AuditEvent {
    /// Creates an event for `path`.
    pub fn new(
        path: impl Into<String>,
        principal: Option<impl Into<String>>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            path: path.into(),
            principal: principal.map(Into::into),
            outcome,
            reason: None,
            bypass: None,
        }
    }

    /// Sets the denial reason.
    pub fn with_reason(mut self, reason: DenialReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Records which checks were skipped.
    pub fn with_bypass(mut self, bypass: Bypass) -> Self {
        self.bypass = Some(bypass);
        self
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the bound identity, if any.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the denial reason, if any.
    pub fn reason(&self) -> Option<DenialReason> {
        self.reason
    }

    /// Returns the bypass, if any.
    pub fn bypass(&self) -> Option<Bypass> {
        self.bypass
    }

    /// Emits the event at info level on [`AUDIT_TARGET`].
    pub fn emit(&self) {
        tracing::info!(
            target: AUDIT_TARGET,
            outcome = %self.outcome,
            path = ?self.path,
            principal = self.principal.as_deref().unwrap_or("<none>"),
            reason = self.reason.map(|r| r.as_str()),
            bypass = self.bypass.map(|b| tracing::field::display(b)),
            "gateway decision"
        );
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[outcome={}, path={}, principal={}",
            self.outcome,
            self.path,
            self.principal.as_deref().unwrap_or("<none>")
        )?;

        if let Some(reason) = self.reason {
            write!(f, ", reason={}", reason)?;
        }
        if let Some(bypass) = self.bypass {
            write!(f, ", bypass={}", bypass)?;
        }

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_outcome_display() {
        assert_eq!(AuditOutcome::Forwarded.to_string(), "forwarded");
        assert_eq!(AuditOutcome::Denied.to_string(), "denied");
        assert_eq!(AuditOutcome::Error.to_string(), "error");
    }

    #[test]
    fn audit_event_minimal() {
        let event = AuditEvent::new("/histories", Some("alice@example.org"), AuditOutcome::Forwarded);

        assert_eq!(event.path(), "/histories");
        assert_eq!(event.principal(), Some("alice@example.org"));
        assert_eq!(event.outcome(), AuditOutcome::Forwarded);
        assert!(event.reason().is_none());
        assert!(event.bypass().is_none());
    }

    #[test]
    fn audit_event_with_bypass() {
        let event = AuditEvent::new(
            "/display",
            Some("remote_display_server@example.org"),
            AuditOutcome::Forwarded,
        )
        .with_bypass(Bypass::DisplayServer);

        assert_eq!(event.bypass(), Some(Bypass::DisplayServer));
        assert!(event.to_string().ends_with("bypass=display_server]"));
    }

    #[test]
    fn audit_event_unauthenticated() {
        let event = AuditEvent::new("/", None::<String>, AuditOutcome::Denied)
            .with_reason(DenialReason::MissingUsername);

        assert!(event.principal().is_none());
        assert!(event.to_string().contains("<none>"));
        assert!(event.to_string().contains("reason=missing_username"));
    }
}

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort request handling instead of producing a denial.
///
/// These indicate a deployment misconfiguration, not an authentication
/// failure; hosting code should answer with a server error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Single-user mode is enabled but the request already carries the identity header.
    #[error("single-user mode is enabled but the request already carries the `{header}` header")]
    SingleUserHeaderConflict {
        /// The configured identity header name
        header: String,
    },
}

/// Errors raised while loading or validating a [`GatewayConfig`](crate::GatewayConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or has unknown keys.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration parsed but violates an invariant.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Why a request was denied.
///
/// Each reason maps to the fixed title and message shown on the denial page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// The asserted identity is neither an admin nor a live registry user
    UnknownUser,
    /// A shared secret is configured but the upstream sent none
    MissingSecret,
    /// The upstream sent a shared secret that does not match
    IncorrectSecret,
    /// Only a bare username was supplied and no mail domain is configured
    MissingMailDomain,
    /// The path is an account-management endpoint outside the allowlist
    UserControlsDisabled,
    /// No identity reached the gateway
    MissingUsername,
}

const ACCESS_DENIED: &str = "Access to Galaxy is denied";
const SECRET_HINT: &str = "<p>Please contact your local Galaxy administrator.  The variable \
    <code>remote_user_secret</code> and <code>GX_SECRET</code> header must be set before you \
    may access Galaxy.";

impl DenialReason {
    /// Short label used in logs and audit events.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::UnknownUser => "unknown_user",
            DenialReason::MissingSecret => "missing_secret",
            DenialReason::IncorrectSecret => "incorrect_secret",
            DenialReason::MissingMailDomain => "missing_mail_domain",
            DenialReason::UserControlsDisabled => "user_controls_disabled",
            DenialReason::MissingUsername => "missing_username",
        }
    }

    /// Title of the denial page.
    pub fn title(&self) -> &'static str {
        match self {
            DenialReason::UserControlsDisabled => "Access to Galaxy user controls is disabled",
            _ => ACCESS_DENIED,
        }
    }

    /// Message of the denial page. `support_contact` is only used for unknown users.
    pub fn message(&self, support_contact: &str) -> String {
        match self {
            DenialReason::UnknownUser => format!(
                "Galaxy is configured to authenticate users via a custom method, but that \
                 method could not identify you as a Galaxy user. If you believe this is an \
                 error please contact {support_contact}.</p>"
            ),
            DenialReason::MissingSecret => format!(
                "Galaxy is configured to authenticate users via an external method (such as \
                 HTTP authentication in Apache), but no shared secret key was provided by the \
                 upstream (proxy) server.</p>{SECRET_HINT}"
            ),
            DenialReason::IncorrectSecret => format!(
                "Galaxy is configured to authenticate users via an external method (such as \
                 HTTP authentication in Apache), but an incorrect shared secret key was provided \
                 by the upstream (proxy) server.</p>{SECRET_HINT}"
            ),
            DenialReason::MissingMailDomain => "Galaxy is configured to authenticate users via \
                 an external method (such as HTTP authentication in Apache), but only a username \
                 (not an email address) was provided by the upstream (proxy) server.  Since \
                 Galaxy usernames are email addresses, a default mail domain must be set.</p>\
                 <p>Please contact your local Galaxy administrator.  The variable \
                 <code>remote_user_maildomain</code> must be set before you may access Galaxy."
                .to_string(),
            DenialReason::UserControlsDisabled => "User controls are disabled when Galaxy is \
                 configured for external authentication."
                .to_string(),
            DenialReason::MissingUsername => "Galaxy is configured to authenticate users via an \
                 external method (such as HTTP authentication in Apache), but a username was not \
                 provided by the upstream (proxy) server.  This is generally due to a \
                 misconfiguration in the upstream server.</p><p>Please contact your local Galaxy \
                 administrator."
                .to_string(),
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected request with the details shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    reason: DenialReason,
    title: &'static str,
    message: String,
}

impl Denial {
    /// HTTP status of every denial.
    pub const STATUS: u16 = 403;

    /// Creates a denial for `reason`.
    pub fn new(reason: DenialReason, support_contact: &str) -> Self {
        Self {
            reason,
            title: reason.title(),
            message: reason.message(support_contact),
        }
    }

    /// Returns the reason.
    pub fn reason(&self) -> DenialReason {
        self.reason
    }

    /// Returns the HTTP status code (always 403).
    pub fn status(&self) -> u16 {
        Self::STATUS
    }

    /// Returns the page title.
    pub fn title(&self) -> &str {
        self.title
    }

    /// Returns the page message (may contain inline HTML markup).
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.title)
    }
}

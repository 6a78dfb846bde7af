use crate::error::{Denial, DenialReason};

/// Outcome of one gateway evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request to the application with this identity bound to it.
    ///
    /// `identity` is `None` only for `/api/` requests that carried no
    /// identity; the API authenticates those itself.
    Forward {
        /// Identity to bind into the application's request context
        identity: Option<String>,
    },
    /// Reject the request.
    Deny(Denial),
}

impl Decision {
    pub(crate) fn forward(identity: Option<String>) -> Self {
        Decision::Forward { identity }
    }

    pub(crate) fn deny(reason: DenialReason, support_contact: &str) -> Self {
        Decision::Deny(Denial::new(reason, support_contact))
    }

    /// Returns `true` for [`Decision::Forward`].
    pub fn is_forward(&self) -> bool {
        matches!(self, Decision::Forward { .. })
    }

    /// Returns the forwarded identity, if any.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Decision::Forward { identity } => identity.as_deref(),
            Decision::Deny(_) => None,
        }
    }

    /// Returns the denial, if this is one.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Decision::Deny(denial) => Some(denial),
            Decision::Forward { .. } => None,
        }
    }

    /// Returns the denial reason, if this is a denial.
    pub fn denial_reason(&self) -> Option<DenialReason> {
        self.denial().map(Denial::reason)
    }
}

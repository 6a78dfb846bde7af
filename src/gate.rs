use crate::audit::{AuditEvent, AuditOutcome, Bypass};
use crate::config::{GatewayConfig, SECRET_HEADER};
use crate::decision::Decision;
use crate::dns::{ReverseResolver, SystemResolver};
use crate::error::{DenialReason, GatewayError};
use crate::identity::{IdentityResolver, ResolvedIdentity};
use crate::logging::GateLog;
use crate::normalize::{is_unauthenticated_marker, IdentityNormalizer};
use crate::policy::{PathDecision, PathPolicy};
use crate::registry::UserRegistry;
use crate::request::Request;
use crate::{secret, Tainted};

const API_PREFIX: &str = "/api/";

/// The header-based authentication gate.
///
/// `AuthGateway` decides, for every inbound request, whether it may reach the
/// application and under which identity. It holds no per-request state and
/// can be shared across threads behind an `Arc`.
///
/// Checks run in a fixed order, stopping at the first that decides:
///
/// 1. display-server peers are forwarded as `remote_display_server@...`
/// 2. single-user mode supplies the identity
/// 3. the `(null)` marker is discarded
/// 4. the identity is normalized
/// 5. the identity is resolved; unknown identities are denied
/// 6. `/api/` requests are forwarded as they are
/// 7. the shared secret is verified
/// 8. the identity must be email-shaped
/// 9. the account-management path policy is applied
/// 10. a request with no identity is denied
///
/// # Examples
///
/// ```
/// use remote_user_gate::{AuthGateway, Decision, GatewayConfig, InMemoryRegistry, Request};
///
/// let config = GatewayConfig {
///     mail_domain: Some("example.org".to_string()),
///     ..GatewayConfig::default()
/// };
/// let registry = InMemoryRegistry::new().with_user("alice@example.org");
/// let gateway = AuthGateway::new(config, registry);
///
/// let request = Request::new("/histories").with_header("Remote-User", "alice");
/// let decision = gateway.evaluate(&request).expect("no configuration error");
///
/// assert_eq!(decision.identity(), Some("alice@example.org"));
/// ```
#[derive(Debug)]
pub struct AuthGateway<R, D = SystemResolver> {
    config: GatewayConfig,
    registry: R,
    resolver: D,
}

impl<R: UserRegistry> AuthGateway<R, SystemResolver> {
    /// Creates a gateway using the system resolver for display-server checks.
    pub fn new(config: GatewayConfig, registry: R) -> Self {
        let resolver = SystemResolver::new(config.dns_timeout())
            .with_max_in_flight(config.dns_max_in_flight);
        Self {
            config,
            registry,
            resolver,
        }
    }
}

impl<R: UserRegistry, D: ReverseResolver> AuthGateway<R, D> {
    /// Replaces the reverse-DNS resolver.
    pub fn with_resolver<D2: ReverseResolver>(self, resolver: D2) -> AuthGateway<R, D2> {
        AuthGateway {
            config: self.config,
            registry: self.registry,
            resolver,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the user registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Evaluates one request.
    ///
    /// Every authentication failure is a [`Decision::Deny`]; the request is
    /// never modified.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SingleUserHeaderConflict`] when single-user
    /// mode is configured and the request already carries the identity
    /// header. This is a deployment error and should become a server error,
    /// not a denial page.
    pub fn evaluate(&self, request: &Request) -> Result<Decision, GatewayError> {
        let log = GateLog::new(request, &self.config);

        let Evaluation {
            decision,
            principal,
            bypass,
        } = match self.decide(request, &log) {
            Ok(evaluation) => evaluation,
            Err(err) => {
                log.config_error(&err);
                AuditEvent::new(request.path(), None::<String>, AuditOutcome::Error).emit();
                return Err(err);
            }
        };

        let event = match &decision {
            Decision::Forward { identity } => {
                log.forwarded(identity.as_deref());
                AuditEvent::new(request.path(), principal, AuditOutcome::Forwarded)
            }
            Decision::Deny(denial) => {
                log.denied(denial);
                AuditEvent::new(request.path(), principal, AuditOutcome::Denied)
                    .with_reason(denial.reason())
            }
        };
        match bypass {
            Some(bypass) => event.with_bypass(bypass).emit(),
            None => event.emit(),
        }

        Ok(decision)
    }

    fn decide(&self, request: &Request, log: &GateLog<'_>) -> Result<Evaluation, GatewayError> {
        if let Some(host) = self.display_server(request) {
            log.display_server(&host);
            let identity = self.config.display_server_identity();
            return Ok(Evaluation::forward(Some(identity)).with_bypass(Bypass::DisplayServer));
        }

        let header = self.config.identity_header.as_str();
        let mut candidate = request
            .header(header)
            .map(|value| Tainted::new(value.to_string()));

        if let Some(single_user) = &self.config.single_user {
            if candidate.is_some() {
                return Err(GatewayError::SingleUserHeaderConflict {
                    header: header.to_string(),
                });
            }
            candidate = Some(Tainted::new(single_user.clone()));
        }

        if candidate.as_ref().is_some_and(is_unauthenticated_marker) {
            log.discarded_header(header);
            candidate = None;
        }

        let resolved = match candidate {
            Some(raw) => {
                let Some(normalized) = IdentityNormalizer::from_config(&self.config).normalize(raw)
                else {
                    log.rejected_header(header);
                    return Ok(self.deny(DenialReason::UnknownUser));
                };
                match IdentityResolver::new(&self.config, &self.registry).resolve(&normalized) {
                    ResolvedIdentity::Unknown => {
                        return Ok(self.deny(DenialReason::UnknownUser));
                    }
                    resolved => Some(resolved),
                }
            }
            None => None,
        };
        let claimed = resolved
            .as_ref()
            .and_then(ResolvedIdentity::email)
            .map(str::to_string);

        let path = request.path();

        if path.starts_with(API_PREFIX) {
            return Ok(Evaluation::forward(claimed).with_bypass(Bypass::Api));
        }

        if let Some(expected) = &self.config.shared_secret {
            let provided = request.header(SECRET_HEADER);
            if provided.is_none() {
                return Ok(self.deny(DenialReason::MissingSecret).with_principal(claimed));
            }
            if !secret::compare(provided, expected) {
                return Ok(self.deny(DenialReason::IncorrectSecret).with_principal(claimed));
            }
        }

        let Some(resolved) = resolved else {
            return Ok(self.deny(DenialReason::MissingUsername));
        };

        let Some(identity) = self.email_shaped(&resolved) else {
            return Ok(self.deny(DenialReason::MissingMailDomain).with_principal(claimed));
        };

        match PathPolicy::decide(&resolved, path) {
            PathDecision::Allow => Ok(Evaluation::forward(Some(identity))),
            PathDecision::Deny => {
                Ok(self.deny(DenialReason::UserControlsDisabled).with_principal(Some(identity)))
            }
        }
    }

    /// Hostname of the peer when it is a configured display server.
    fn display_server(&self, request: &Request) -> Option<String> {
        if self.config.display_servers.is_empty() {
            return None;
        }

        let addr = request.remote_ip()?;
        let host = self.resolver.reverse_lookup(addr)?;
        self.config.is_display_server(&host).then_some(host)
    }

    /// The resolved identity as an email, appending the mail domain if needed.
    fn email_shaped(&self, resolved: &ResolvedIdentity) -> Option<String> {
        let identity = resolved.email()?;
        if identity.contains('@') {
            return Some(identity.to_string());
        }

        self.config
            .mail_domain
            .as_deref()
            .map(|domain| format!("{identity}@{domain}"))
    }

    fn deny(&self, reason: DenialReason) -> Evaluation {
        Evaluation::new(Decision::deny(reason, &self.config.support_contact))
    }
}

/// A decision plus what the audit trail records about it.
struct Evaluation {
    decision: Decision,
    principal: Option<String>,
    bypass: Option<Bypass>,
}

impl Evaluation {
    fn new(decision: Decision) -> Self {
        Self {
            decision,
            principal: None,
            bypass: None,
        }
    }

    fn forward(identity: Option<String>) -> Self {
        Self::new(Decision::forward(identity.clone())).with_principal(identity)
    }

    fn with_principal(mut self, principal: Option<String>) -> Self {
        self.principal = principal;
        self
    }

    fn with_bypass(mut self, bypass: Bypass) -> Self {
        self.bypass = Some(bypass);
        self
    }
}

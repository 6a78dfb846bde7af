//! Middleware functions running the gateway in front of application handlers.

use crate::decision::Decision;
use crate::dns::ReverseResolver;
use crate::gate::AuthGateway;
use crate::registry::UserRegistry;
use crate::request::Request;

use super::{ExtractRequest, Response};

/// A request the gateway let through.
///
/// The application binds [`identity`](Self::identity) into its per-request
/// user context before running its handler chain.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    /// The request as evaluated
    pub request: Request,
    /// Identity to bind; `None` only for `/api/` requests without one
    pub identity: Option<String>,
}

/// What the hosting framework should do with a request.
#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// Run the application with the bound identity.
    Forward(AuthenticatedRequest),
    /// Send this response and stop.
    Respond(Response),
}

impl GateOutcome {
    /// Returns the response, if the request was stopped.
    pub fn response(&self) -> Option<&Response> {
        match self {
            GateOutcome::Respond(response) => Some(response),
            GateOutcome::Forward(_) => None,
        }
    }

    /// Returns the forwarded request, if it was let through.
    pub fn forwarded(&self) -> Option<&AuthenticatedRequest> {
        match self {
            GateOutcome::Forward(forwarded) => Some(forwarded),
            GateOutcome::Respond(_) => None,
        }
    }
}

/// Evaluates `request` and maps the decision to an outcome.
///
/// Denials become the 403 page; configuration errors become a 500 with no
/// detail, so the hosting framework needs no error handling of its own.
///
/// # Examples
///
/// ```
/// use remote_user_gate::web::{guard, GateOutcome};
/// use remote_user_gate::{AuthGateway, GatewayConfig, InMemoryRegistry, Request};
///
/// let gateway = AuthGateway::new(GatewayConfig::default(), InMemoryRegistry::new());
///
/// let outcome = guard(&gateway, Request::new("/histories"));
/// let response = outcome.response().expect("no identity was supplied");
/// assert_eq!(response.status(), 403);
/// ```
pub fn guard<R, D>(gateway: &AuthGateway<R, D>, request: Request) -> GateOutcome
where
    R: UserRegistry,
    D: ReverseResolver,
{
    match gateway.evaluate(&request) {
        Ok(Decision::Forward { identity }) => {
            GateOutcome::Forward(AuthenticatedRequest { request, identity })
        }
        Ok(Decision::Deny(denial)) => GateOutcome::Respond(Response::denied(&denial)),
        Err(_) => GateOutcome::Respond(Response::server_error()),
    }
}

/// Like [`guard`], for any framework request implementing [`ExtractRequest`].
pub fn guard_extracted<R, D, T>(gateway: &AuthGateway<R, D>, request: &T) -> GateOutcome
where
    R: UserRegistry,
    D: ReverseResolver,
    T: ExtractRequest + ?Sized,
{
    guard(gateway, request.extract_request())
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use super::*;
    use crate::config::GatewayConfig;
    use crate::registry::InMemoryRegistry;

    struct NoDns;

    impl ReverseResolver for NoDns {
        fn reverse_lookup(&self, _addr: IpAddr) -> Option<String> {
            None
        }
    }

    fn gateway(config: GatewayConfig) -> AuthGateway<InMemoryRegistry, NoDns> {
        let registry = InMemoryRegistry::new().with_user("alice@example.org");
        AuthGateway::new(config, registry).with_resolver(NoDns)
    }

    #[test]
    fn guard_forwards_with_identity() {
        let gate = gateway(GatewayConfig::default());
        let request = Request::new("/histories").with_header("Remote-User", "alice@example.org");

        let outcome = guard(&gate, request);
        let forwarded = outcome.forwarded().expect("forwarded");
        assert_eq!(forwarded.identity.as_deref(), Some("alice@example.org"));
        assert_eq!(forwarded.request.path(), "/histories");
    }

    #[test]
    fn guard_renders_denial_page() {
        let gate = gateway(GatewayConfig::default());

        let outcome = guard(&gate, Request::new("/histories"));
        let response = outcome.response().expect("denied");
        assert_eq!(response.status(), 403);
        assert_eq!(response.content_type(), "text/html");
        assert!(response.body().contains("a username was not provided"));
    }

    #[test]
    fn guard_maps_config_error_to_server_error() {
        let gate = gateway(GatewayConfig {
            single_user: Some("alice@example.org".to_string()),
            ..GatewayConfig::default()
        });
        let request = Request::new("/").with_header("Remote-User", "alice@example.org");

        let outcome = guard(&gate, request);
        let response = outcome.response().expect("server error");
        assert_eq!(response.status(), 500);
        assert!(!response.body().contains("single-user"));
    }

    #[test]
    fn guard_extracted_uses_trait() {
        let gate = gateway(GatewayConfig::default());
        let request = Request::new("/").with_header("HTTP_REMOTE_USER", "alice@example.org");

        let outcome = guard_extracted(&gate, &request);
        assert!(outcome.forwarded().is_some());
    }
}

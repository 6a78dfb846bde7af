//! Header-based authentication for applications behind an authenticating proxy.
//!
//! A reverse proxy authenticates the user and passes the identity in a
//! header (`REMOTE_USER` by convention). This crate decides, per request,
//! whether that asserted identity is acceptable and what it maps to:
//! - **Upstream trust**: optional shared secret in `GX_SECRET`, compared in constant time
//! - **Canonical identities**: case-folding and default mail domain for bare usernames
//! - **Resolution**: admin allowlist first, then the application's user registry
//! - **Account controls**: a prefix allowlist for the `/user` area
//!
//! # Core Types
//!
//! - [`AuthGateway`]: Runs the checks and returns a [`Decision`]
//! - [`GatewayConfig`]: Operator configuration, loadable from TOML
//! - [`UserRegistry`]: The application's account lookup
//! - [`Secret<T>`]: Wrapper that redacts the shared secret in logs/output
//! - [`Tainted<T>`]: Wrapper for the raw header value until it is normalized
//!
//! # Examples
//!
//! ```
//! use remote_user_gate::{AuthGateway, DenialReason, GatewayConfig, InMemoryRegistry, Request};
//!
//! let config = GatewayConfig {
//!     mail_domain: Some("example.org".to_string()),
//!     admin_users: vec!["bob@example.org".to_string()],
//!     ..GatewayConfig::default()
//! };
//! let registry = InMemoryRegistry::new().with_user("alice@example.org");
//! let gateway = AuthGateway::new(config, registry);
//!
//! // Admins may create users
//! let request = Request::new("/user/create").with_header("Remote-User", "bob");
//! let decision = gateway.evaluate(&request).unwrap();
//! assert_eq!(decision.identity(), Some("bob@example.org"));
//!
//! // Regular users may not
//! let request = Request::new("/user/create").with_header("Remote-User", "alice");
//! let decision = gateway.evaluate(&request).unwrap();
//! assert_eq!(decision.denial_reason(), Some(DenialReason::UserControlsDisabled));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod config;
mod decision;
mod dns;
mod error;
mod gate;
mod identity;
mod logging;
mod normalize;
mod policy;
mod registry;
mod request;
pub mod secret;
mod tainted;
pub mod web;

pub use config::{
    GatewayConfig, DEFAULT_DISPLAY_SERVER_DOMAIN, DEFAULT_IDENTITY_HEADER, SECRET_HEADER,
};
pub use decision::Decision;
pub use dns::{ReverseResolver, SystemResolver, DEFAULT_MAX_DNS_LOOKUPS};
pub use error::{ConfigError, Denial, DenialReason, GatewayError};
pub use gate::AuthGateway;
pub use identity::{local_part, IdentityResolver, ResolvedIdentity};
pub use normalize::{is_unauthenticated_marker, IdentityNormalizer, UNAUTHENTICATED_MARKER};
pub use policy::{PathDecision, PathPolicy, ADMIN_ACCESSIBLE_PATHS, USER_ACCESSIBLE_PATHS};
pub use registry::{InMemoryRegistry, RegistryError, UserRecord, UserRegistry};
pub use request::{canonical_header_name, Headers, Request};
pub use secret::Secret;
pub use tainted::Tainted;

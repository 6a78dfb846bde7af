//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the gateway:
//! - Mapping framework requests to [`Request`](crate::Request)
//! - Running [`AuthGateway`](crate::AuthGateway) and turning its decision
//!   into either a forwarded request or a ready-made response
//! - Rendering the 403 denial page and the 500 misconfiguration response
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: Framework code implements
//!    [`ExtractRequest`] and converts [`Response`] into its own type.
//!
//! 2. **Explicit Context**: The resolved identity travels in
//!    [`AuthenticatedRequest`]; nothing is stashed in globals or written back
//!    into the request headers.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code implements ExtractRequest
//!   ↓
//! guard_extracted(&gateway, &framework_request)
//!   ↓
//! GateOutcome::Forward(AuthenticatedRequest) → bind identity, run handlers
//! GateOutcome::Respond(Response)             → send as is
//! ```

mod extract;
mod middleware;
mod response;

pub use extract::ExtractRequest;
pub use middleware::{guard, guard_extracted, AuthenticatedRequest, GateOutcome};
pub use response::{render_error_page, Response};

//! Extraction boundary trait for web integration.

use crate::request::Request;

/// Builds a gateway [`Request`] from a framework-specific request.
///
/// Implementations copy the peer address, the path (without query string,
/// as the framework's `PATH_INFO`) and all headers. They do not interpret
/// any of them; that is the gateway's job. Headers set by the trusted proxy
/// go in first, since [`Headers::insert`](crate::Headers::insert) keeps the
/// first of two spellings that name the same header.
///
/// # Examples
///
/// ```
/// use remote_user_gate::web::ExtractRequest;
/// use remote_user_gate::Request;
///
/// // Example framework-specific request
/// struct CgiEnviron {
///     vars: Vec<(String, String)>,
/// }
///
/// impl ExtractRequest for CgiEnviron {
///     fn extract_request(&self) -> Request {
///         let var = |name: &str| {
///             self.vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
///         };
///
///         let mut request = Request::new(var("PATH_INFO").unwrap_or_default());
///         if let Some(addr) = var("REMOTE_ADDR") {
///             request = request.with_remote_addr(addr);
///         }
///         for (name, value) in self.vars.iter().filter(|(k, _)| k.starts_with("HTTP_")) {
///             request.add_header(name.clone(), value.clone());
///         }
///         request
///     }
/// }
///
/// let environ = CgiEnviron {
///     vars: vec![
///         ("PATH_INFO".into(), "/histories".into()),
///         ("HTTP_REMOTE_USER".into(), "alice".into()),
///     ],
/// };
/// let request = environ.extract_request();
/// assert_eq!(request.header("Remote-User"), Some("alice"));
/// ```
pub trait ExtractRequest {
    /// Returns the request as the gateway sees it.
    fn extract_request(&self) -> Request;
}

impl ExtractRequest for Request {
    fn extract_request(&self) -> Request {
        self.clone()
    }
}

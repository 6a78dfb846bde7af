//! The inbound request as seen by the gateway.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

/// Request headers with case-insensitive lookup.
///
/// Names are matched after canonicalization: ASCII-lowercased, with `_`
/// treated as `-` and a leading CGI `HTTP_` prefix removed. `Remote-User`,
/// `REMOTE_USER` and `HTTP_REMOTE_USER` therefore name the same header.
/// The name as first received is kept for logging, and so is the first
/// value: see [`Headers::insert`].
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: BTreeMap<String, (String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header unless one with the same canonical name is already present.
    ///
    /// `Remote_User` and `Remote-User` collide, and servers differ on which
    /// spelling a client can smuggle in. The first value stored wins, so
    /// integrations must insert proxy-set headers (and CGI variables) before
    /// client-supplied ones. Later values are dropped and logged.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.entries.entry(canonical_header_name(&name)) {
            Entry::Vacant(slot) => {
                slot.insert((name, value.into()));
            }
            Entry::Occupied(existing) => {
                tracing::warn!(
                    header = ?name,
                    kept = ?existing.get().0,
                    "Ignoring duplicate header with the same canonical name"
                );
            }
        }
    }

    /// Returns the value of a header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&canonical_header_name(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&canonical_header_name(name))
    }

    /// Iterates over `(received name, value)` pairs in canonical-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of distinct headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no headers were received.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Canonical form of a header name used for comparisons.
///
/// # Examples
///
/// ```
/// use remote_user_gate::canonical_header_name;
///
/// assert_eq!(canonical_header_name("HTTP_REMOTE_USER"), "remote-user");
/// assert_eq!(canonical_header_name("Remote-User"), "remote-user");
/// assert_eq!(canonical_header_name("GX_SECRET"), "gx-secret");
/// ```
pub fn canonical_header_name(name: &str) -> String {
    let name = name.trim();
    let name = match name.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("http_") && name.len() > 5 => &name[5..],
        _ => name,
    };

    name.chars()
        .map(|c| match c {
            '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// An inbound request: peer address, path and headers.
///
/// Owned by the hosting framework and read-only to the gateway; a single
/// evaluation never modifies it.
///
/// # Examples
///
/// ```
/// use remote_user_gate::Request;
///
/// let request = Request::new("/histories/list")
///     .with_remote_addr("10.0.0.7")
///     .with_header("Remote-User", "alice");
///
/// assert_eq!(request.path(), "/histories/list");
/// assert_eq!(request.header("HTTP_REMOTE_USER"), Some("alice"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    remote_addr: Option<String>,
    path: String,
    headers: Headers,
}

impl Request {
    /// Creates a request for the given path with no headers and no peer address.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            remote_addr: None,
            path: path.into(),
            headers: Headers::new(),
        }
    }

    /// Sets the peer address (an IP, optionally with a port).
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all headers.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a header in place.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the peer address as received.
    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    /// Returns the peer address parsed as an IP, if it is one.
    ///
    /// Accepts a bare address or an `ip:port` socket address.
    pub fn remote_ip(&self) -> Option<IpAddr> {
        let addr = self.remote_addr.as_deref()?.trim();
        addr.parse::<IpAddr>()
            .ok()
            .or_else(|| addr.parse::<SocketAddr>().ok().map(|s| s.ip()))
    }

    /// Returns the value of a header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns all received headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = Request::new("/").with_header("Remote-User", "alice");

        assert_eq!(request.header("remote-user"), Some("alice"));
        assert_eq!(request.header("REMOTE-USER"), Some("alice"));
    }

    #[test]
    fn cgi_style_names_match_http_names() {
        let request = Request::new("/").with_header("GX-Secret", "s3cr3t");

        assert_eq!(request.header("HTTP_GX_SECRET"), Some("s3cr3t"));
        assert_eq!(request.header("GX_SECRET"), Some("s3cr3t"));
    }

    #[test]
    fn bare_http_prefix_is_not_stripped() {
        assert_eq!(canonical_header_name("HTTP_"), "http-");
        assert_eq!(canonical_header_name("Http-Version"), "http-version");
    }

    #[test]
    fn first_insert_wins_over_other_spelling() {
        let mut headers = Headers::new();
        headers.insert("Remote-User", "alice");
        headers.insert("REMOTE_USER", "bob");
        headers.insert("Remote_User", "mallory");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("remote-user"), Some("alice"));
        assert_eq!(headers.iter().next(), Some(("Remote-User", "alice")));
    }

    #[test]
    fn smuggled_underscore_header_cannot_override_proxy_value() {
        let request = Request::new("/")
            .with_header("HTTP_REMOTE_USER", "alice@example.org")
            .with_header("Remote_User", "admin@example.org");

        assert_eq!(request.header("HTTP_REMOTE_USER"), Some("alice@example.org"));
    }

    #[test]
    fn iter_reports_received_names() {
        let headers: Headers = [("X-Forwarded-For", "10.0.0.1"), ("Remote-User", "alice")]
            .into_iter()
            .collect();

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Remote-User", "X-Forwarded-For"]);
    }

    #[test]
    fn remote_ip_parses_addresses_and_socket_addresses() {
        assert_eq!(
            Request::new("/").with_remote_addr("10.1.2.3").remote_ip(),
            Some("10.1.2.3".parse().unwrap())
        );
        assert_eq!(
            Request::new("/").with_remote_addr("10.1.2.3:8080").remote_ip(),
            Some("10.1.2.3".parse().unwrap())
        );
        assert_eq!(
            Request::new("/").with_remote_addr("[::1]:443").remote_ip(),
            Some("::1".parse().unwrap())
        );
        assert_eq!(Request::new("/").with_remote_addr("not-an-ip").remote_ip(), None);
        assert_eq!(Request::new("/").remote_ip(), None);
    }
}

use crate::identity::ResolvedIdentity;

/// Account-management area the policy restricts.
const USER_AREA: &str = "/user";

/// Endpoints any header-authenticated user may reach.
pub const USER_ACCESSIBLE_PATHS: &[&str] = &[
    "/users",
    "/user/api_key",
    "/user/edit_username",
    "/user/dbkeys",
    "/user/logout",
    "/user/toolbox_filters",
    "/user/set_default_permissions",
];

/// Extra endpoints reachable by admins.
pub const ADMIN_ACCESSIBLE_PATHS: &[&str] = &[
    "/user/create",
    "/user/logout",
    "/user/manage_user_info",
    "/user/edit_info",
];

/// Result of a path policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDecision {
    /// The request may proceed
    Allow,
    /// The path is an account-management endpoint closed under external authentication
    Deny,
}

/// Prefix allowlist for the account-management area.
///
/// Paths outside `/user` are always allowed. Inside it, only the listed
/// prefixes and the preferences root (`/user`, `/user/`) are reachable.
/// Matching is plain `starts_with`; there are no wildcards.
///
/// # Examples
///
/// ```
/// use remote_user_gate::{PathDecision, PathPolicy, ResolvedIdentity};
///
/// let admin = ResolvedIdentity::Admin("bob@example.org".into());
/// let user = ResolvedIdentity::RegularUser("alice@example.org".into());
///
/// assert_eq!(PathPolicy::decide(&user, "/histories"), PathDecision::Allow);
/// assert_eq!(PathPolicy::decide(&admin, "/user/create"), PathDecision::Allow);
/// assert_eq!(PathPolicy::decide(&user, "/user/create"), PathDecision::Deny);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PathPolicy;

impl PathPolicy {
    /// Decides whether `identity` may reach `path`.
    pub fn decide(identity: &ResolvedIdentity, path: &str) -> PathDecision {
        if !path.starts_with(USER_AREA) {
            return PathDecision::Allow;
        }

        if identity.is_admin() && has_prefix(path, ADMIN_ACCESSIBLE_PATHS) {
            return PathDecision::Allow;
        }

        if has_prefix(path, USER_ACCESSIBLE_PATHS) {
            return PathDecision::Allow;
        }

        if path == "/user" || path == "/user/" {
            return PathDecision::Allow;
        }

        PathDecision::Deny
    }
}

fn has_prefix(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}

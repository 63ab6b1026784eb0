//! Mount-path normalization for the HTTP surface.
//!
//! Configured mount values arrive in many shapes ("api", "/api/", even a full
//! URL); everything funnels through `normalize` to a canonical absolute path
//! before routes are nested or containment is checked.

use url::Url;

/// Mount used when no value is configured.
pub const DEFAULT_MOUNT: &str = "/api";

const PLACEHOLDER_BASE: &str = "http://placeholder.invalid";

/// Canonicalize a raw mount value to an absolute path.
///
/// Empty input yields [`DEFAULT_MOUNT`]. Absolute URLs keep only their path
/// component; protocol-relative input (`//host/x`) has its host stripped;
/// anything else resolves against a placeholder base so relative fragments
/// still yield a path. The result starts with a single `/`, contains no
/// repeated slashes, and carries no trailing slash unless it is `/` itself.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_MOUNT.to_string();
    }
    let candidate = parse_path(trimmed).unwrap_or_else(|| trimmed.to_string());
    // Re-resolving the sanitized path percent-encodes it and folds dot
    // segments, which makes normalize a fixed point on its own output.
    sanitize(&reencode(&sanitize(&candidate)))
}

/// Join a route onto a mount, normalizing both sides.
pub fn join(mount: &str, route: &str) -> String {
    let mount = normalize(mount);
    let route = normalize(route);
    if route == "/" {
        return mount;
    }
    if mount == "/" {
        return route;
    }
    format!("{mount}{route}")
}

/// Whether `path` falls under `mount` (equal to it, or a strict sub-path).
pub fn is_within(mount: &str, path: &str) -> bool {
    let mount = normalize(mount);
    if mount == "/" {
        return true;
    }
    let path = normalize(path);
    path == mount
        || path
            .strip_prefix(&mount)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Extract the path component, or None when the input is not URL-parseable.
fn parse_path(input: &str) -> Option<String> {
    if input.contains("://") {
        return Url::parse(input).ok().map(|u| u.path().to_string());
    }
    if let Some(rest) = input.strip_prefix("//") {
        if rest.starts_with('/') {
            // Three or more leading slashes carry no authority; the URL
            // parser would skip the extra slashes and consume the first
            // segment as a host. Leave these to the sanitizer.
            return None;
        }
        // Protocol-relative: parse with an implied scheme so the host is
        // stripped and only the path survives.
        return Url::parse(&format!("http:{input}"))
            .ok()
            .map(|u| u.path().to_string());
    }
    Url::parse(PLACEHOLDER_BASE)
        .ok()?
        .join(input)
        .ok()
        .map(|u| u.path().to_string())
}

/// Run an already-sanitized path through the URL parser once more.
fn reencode(path: &str) -> String {
    Url::parse(PLACEHOLDER_BASE)
        .ok()
        .and_then(|base| base.join(path).ok())
        .map(|u| u.path().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Forward slashes only, collapsed runs, single leading `/`, no trailing `/`.
fn sanitize(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let joined = forward
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        "/".to_string()
    } else {
        format!("/{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_default_mount() {
        assert_eq!(normalize(""), DEFAULT_MOUNT);
        assert_eq!(normalize("   "), DEFAULT_MOUNT);
    }

    #[test]
    fn test_collapses_and_strips_slashes() {
        assert_eq!(normalize("///a//b/"), "/a/b");
        assert_eq!(normalize("/api/"), "/api");
        assert_eq!(normalize("api"), "/api");
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn test_three_plus_leading_slashes_keep_the_first_segment() {
        // The first segment is a path segment here, not a host.
        assert_eq!(normalize("///a"), "/a");
        assert_eq!(normalize("////x/y"), "/x/y");
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn test_absolute_url_keeps_only_path() {
        assert_eq!(normalize("http://x/y/"), "/y");
        assert_eq!(normalize("https://example.com"), "/");
        assert_eq!(normalize("//host/api"), "/api");
    }

    #[test]
    fn test_backslashes_become_forward_slashes() {
        assert_eq!(normalize("\\api\\v1"), "/api/v1");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/api", "/"), "/api");
        assert_eq!(join("/", "/x"), "/x");
        assert_eq!(join("/api", "x"), "/api/x");
        assert_eq!(join("api/", "/chat/"), "/api/chat");
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("/api", "/api"));
        assert!(is_within("/api", "/api/chat"));
        assert!(!is_within("/api", "/apix"));
        assert!(!is_within("/api", "/other"));
        assert!(is_within("/", "/anything"));
    }

    #[test]
    fn test_normalize_is_idempotent_on_awkward_inputs() {
        for raw in ["a://b c", "//host//x/", "///a//b/", "a b", "..", "/a/b/..", "?q=1"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input: {raw:?}");
        }
    }
}

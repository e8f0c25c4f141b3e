use crate::error::ProxyError;

/// Splits a proxy-form URL into host and path.
///
/// Everything through the first `://` is stripped; the remainder splits at
/// the first `/` into host and path (path keeps its query string and
/// defaults to `/`). Host syntax is not validated here; a bad host shows up
/// as a connect failure.
pub fn parse_url(url: &str) -> (String, String) {
    let rest = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };

    match rest.split_once('/') {
        Some((host, tail)) => (host.to_string(), format!("/{tail}")),
        None => (rest.to_string(), "/".to_string()),
    }
}

/// Resolves the request target to an absolute URL.
///
/// Absolute `http://` targets pass through. A target beginning `/` (and not
/// already `/http...`) is shorthand for `http://` + remainder, for browsers
/// configured to send origin-relative proxy paths. Anything else is a bad
/// request.
pub fn normalize_target(target: &str) -> Result<String, ProxyError> {
    if target.starts_with("http://") {
        return Ok(target.to_string());
    }

    if target.starts_with('/') {
        if target.starts_with("/http") {
            return Ok(target.to_string());
        }
        return Ok(format!("http:/{target}"));
    }

    Err(ProxyError::BadRequest)
}

#[cfg(test)]
mod tests {
    use super::{normalize_target, parse_url};

    #[test]
    fn parse_url_splits_host_and_path() {
        let (host, path) = parse_url("http://example.com/a/b?x=1");
        assert_eq!(host, "example.com");
        assert_eq!(path, "/a/b?x=1");
    }

    #[test]
    fn parse_url_defaults_path_to_root() {
        let (host, path) = parse_url("http://example.com");
        assert_eq!(host, "example.com");
        assert_eq!(path, "/");
    }

    #[test]
    fn parse_url_keeps_port_with_host() {
        let (host, path) = parse_url("http://example.com:8080/a");
        assert_eq!(host, "example.com:8080");
        assert_eq!(path, "/a");
    }

    #[test]
    fn absolute_target_passes_through() {
        let url = normalize_target("http://example.com/a").expect("expected ok");
        assert_eq!(url, "http://example.com/a");
    }

    #[test]
    fn rooted_target_is_rewritten() {
        let url = normalize_target("/www.example.com/a").expect("expected ok");
        assert_eq!(url, "http://www.example.com/a");
    }

    #[test]
    fn bare_root_is_rewritten_not_rejected() {
        let url = normalize_target("/").expect("expected ok");
        assert_eq!(url, "http://");
    }

    #[test]
    fn rooted_http_target_is_kept_verbatim() {
        let url = normalize_target("/http://example.com/a").expect("expected ok");
        assert_eq!(url, "/http://example.com/a");

        // The URL parser still resolves the host from this form.
        let (host, path) = parse_url(&url);
        assert_eq!(host, "example.com");
        assert_eq!(path, "/a");
    }

    #[test]
    fn other_forms_are_rejected() {
        assert!(normalize_target("example.com/a").is_err());
        assert!(normalize_target("ftp://example.com/").is_err());
    }
}

//! Endpoint handling shared by every request the client builds.
//!
//! `join_endpoint` rules:
//! - the base endpoint's path is kept as a directory prefix
//!   (`https://h/api` + `user/user` -> `https://h/api/user/user`);
//! - trailing slashes on the base and leading slashes on the relative path
//!   collapse into a single separator;
//! - the relative path may carry its own query string; the base's query and
//!   fragment are dropped.

use crate::errors::ClientError;
use url::Url;

fn invalid(endpoint: &str, reason: impl Into<String>) -> ClientError {
    ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.into(),
    }
}

fn parse_base(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(raw, "api endpoint is not configured"));
    }
    let url = Url::parse(trimmed).map_err(|err| invalid(trimmed, err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            trimmed,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() || url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(invalid(trimmed, "endpoint must include a host"));
    }
    Ok(url)
}

/// Validates a user-supplied endpoint and returns its canonical form
/// (no query, no fragment, no trailing slash).
pub fn normalize_endpoint(raw: &str) -> Result<String, ClientError> {
    let mut url = parse_base(raw)?;
    url.set_query(None);
    url.set_fragment(None);
    let normalized = format!("{}{}", url.origin().ascii_serialization(), url.path());
    Ok(normalized.trim_end_matches('/').to_string())
}

pub fn join_endpoint(base: &str, path: &str) -> Result<Url, ClientError> {
    let mut url = parse_base(base)?;
    url.set_fragment(None);

    let (relative, query) = match path.split_once('?') {
        Some((relative, query)) => (relative, Some(query)),
        None => (path, None),
    };
    let prefix = url.path().trim_end_matches('/').to_string();
    let relative = relative.trim().trim_start_matches('/');
    url.set_path(&format!("{}/{}", prefix, relative));
    url.set_query(query.filter(|q| !q.is_empty()));
    Ok(url)
}

use crate::constants::signing::{ALGORITHM, DATE_HEADER, KEY_PREFIX, REQUEST_TERMINATOR};
use crate::errors::ClientError;
use crate::models::HttpRequest;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use sha2::{Digest, Sha256};
use url::{form_urlencoded, Url};

type HmacSha256 = Hmac<Sha256>;

/// Everything a signer may look at. `secret` is the current access token.
#[derive(Debug, Clone, Copy)]
pub struct SigningInput<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    pub body: Option<&'a Bytes>,
    pub content_type: Option<&'a str>,
    pub service: &'a str,
    pub key_id: &'a str,
    pub secret: &'a str,
}

/// Turns request parts and key material into an authenticated request.
/// Implementations are pure: same input, same output, no I/O.
pub trait Signer: Send + Sync {
    fn sign(&self, input: SigningInput<'_>) -> Result<HttpRequest, ClientError>;
}

fn base_request(input: &SigningInput<'_>) -> Result<HttpRequest, ClientError> {
    let url = Url::parse(input.url)
        .map_err(|err| ClientError::Signing(format!("invalid url '{}': {}", input.url, err)))?;
    let mut request = HttpRequest::new(input.method.clone(), url);
    if let Some(content_type) = input.content_type {
        request
            .headers
            .insert(CONTENT_TYPE, header_value(content_type, "content-type")?);
    }
    request.body = input.body.cloned();
    Ok(request)
}

fn header_value(raw: &str, label: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(raw)
        .map_err(|_| ClientError::Signing(format!("{} contains invalid header characters", label)))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ClientError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|err| ClientError::Signing(err.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// HMAC-SHA256 request signing in the commons' `CDIS` scheme.
///
/// The signing key is derived from the secret through the date and service
/// (`HMAC("CDIS"+secret, date) -> service -> "cdis_request"`), and the
/// signature covers method, path, sorted query, `content-type`, `host`, the
/// timestamp header, and the SHA-256 of the body.
#[derive(Debug, Clone, Default)]
pub struct HmacSigner {
    fixed_time: Option<DateTime<Utc>>,
}

impl HmacSigner {
    pub fn new() -> Self {
        Self { fixed_time: None }
    }

    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            fixed_time: Some(time),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_time.unwrap_or_else(Utc::now)
    }
}

impl Signer for HmacSigner {
    fn sign(&self, input: SigningInput<'_>) -> Result<HttpRequest, ClientError> {
        let mut request = base_request(&input)?;
        let host = match (request.url.host_str(), request.url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ClientError::Signing(format!(
                    "url '{}' has no host",
                    input.url
                )))
            }
        };
        let now = self.now();
        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/{}", date, input.service, REQUEST_TERMINATOR);
        let signed_headers = format!("content-type;host;{}", DATE_HEADER);
        let body_hash = sha256_hex(input.body.map(|b| &b[..]).unwrap_or_default());
        let path = if request.url.path().is_empty() {
            "/"
        } else {
            request.url.path()
        };

        let canonical = format!(
            "{}\n{}\n{}\ncontent-type:{}\nhost:{}\n{}:{}\n\n{}\n{}",
            input.method.as_str(),
            path,
            canonical_query(&request.url),
            input.content_type.unwrap_or_default().trim(),
            host,
            DATE_HEADER,
            timestamp,
            signed_headers,
            body_hash
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            timestamp,
            scope,
            sha256_hex(canonical.as_bytes())
        );

        let k_date = hmac_sha256(
            format!("{}{}", KEY_PREFIX, input.secret).as_bytes(),
            date.as_bytes(),
        )?;
        let k_service = hmac_sha256(&k_date, input.service.as_bytes())?;
        let k_signing = hmac_sha256(&k_service, REQUEST_TERMINATOR.as_bytes())?;
        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, input.key_id, scope, signed_headers, signature
        );
        request.headers.insert(
            HeaderName::from_static(DATE_HEADER),
            header_value(&timestamp, DATE_HEADER)?,
        );
        request
            .headers
            .insert(AUTHORIZATION, header_value(&authorization, "key id")?);
        Ok(request)
    }
}

/// Sends the access token as a bearer credential; the key id is unused.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerSigner;

impl Signer for BearerSigner {
    fn sign(&self, input: SigningInput<'_>) -> Result<HttpRequest, ClientError> {
        let mut request = base_request(&input)?;
        request.headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", input.secret), "access token")?,
        );
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    static DELETE: Method = Method::DELETE;

    fn fixed() -> HmacSigner {
        HmacSigner::at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).single().expect("time"))
    }

    fn input<'a>(url: &'a str, body: Option<&'a Bytes>, secret: &'a str) -> SigningInput<'a> {
        SigningInput {
            method: &DELETE,
            url,
            body,
            content_type: Some("application/json"),
            service: "submission",
            key_id: "kid-1",
            secret,
        }
    }

    fn authorization(request: &HttpRequest) -> String {
        request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn hmac_signature_is_deterministic_and_scoped() {
        let url = "https://data.example.org/api/v0/submission/p/q";
        let a = fixed().sign(input(url, None, "token")).expect("sign");
        let b = fixed().sign(input(url, None, "token")).expect("sign");
        let header = authorization(&a);
        assert_eq!(header, authorization(&b));
        assert!(header.starts_with(
            "HMAC-SHA256 Credential=kid-1/20240301/submission/cdis_request, SignedHeaders=content-type;host;x-cdis-date, Signature="
        ));
        assert_eq!(
            a.headers.get(DATE_HEADER).and_then(|v| v.to_str().ok()),
            Some("20240301T123000Z")
        );
        assert_eq!(a.method, DELETE);
        assert_eq!(a.url.as_str(), url);
    }

    #[test]
    fn hmac_signature_covers_body_secret_and_query_order() {
        let url = "https://data.example.org/files?b=2&a=1";
        let body = Bytes::from_static(b"{\"x\":1}");
        let base = authorization(&fixed().sign(input(url, None, "token")).expect("sign"));
        let with_body = authorization(&fixed().sign(input(url, Some(&body), "token")).expect("sign"));
        let other_secret = authorization(&fixed().sign(input(url, None, "other")).expect("sign"));
        let reordered = authorization(
            &fixed()
                .sign(input("https://data.example.org/files?a=1&b=2", None, "token"))
                .expect("sign"),
        );
        assert_ne!(base, with_body);
        assert_ne!(base, other_secret);
        assert_eq!(base, reordered);
    }

    #[test]
    fn malformed_url_fails_signing() {
        let err = fixed().sign(input("::not-a-url", None, "token")).expect_err("must fail");
        assert_eq!(err.code(), "SIGNING_FAILED");
    }

    #[test]
    fn bearer_signer_sets_token_and_keeps_body() {
        let body = Bytes::from_static(b"payload");
        let request = BearerSigner
            .sign(input("http://www.test.com/user/user", Some(&body), "tok"))
            .expect("sign");
        assert_eq!(authorization(&request), "Bearer tok");
        assert_eq!(request.body.as_ref(), Some(&body));
        assert_eq!(
            request.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn bearer_signer_rejects_header_breaking_token() {
        let err = BearerSigner
            .sign(input("http://www.test.com/user/user", None, "bad\ntoken"))
            .expect_err("must fail");
        assert_eq!(err.code(), "SIGNING_FAILED");
    }
}

//! Request signing for the Limelight REST API.
//!
//! Every authorized request carries three extra query parameters:
//! `access_key`, `expires`, and `signature`. The signature is an
//! HMAC-SHA256 over a canonical payload that the platform recomputes
//! independently for each request; the two constructions must agree
//! byte for byte or the request is rejected. The canonical payload and
//! the emitted query string therefore use the same parameter order,
//! ascending by key, which both derive from a single [`BTreeMap`]
//! iteration.

use crate::error::{Error, Result};
use base64::Engine;
use hmac::{Hmac, Mac};
use http::Method;
use sha2::Sha256;
use std::collections::BTreeMap;
use url::Url;

/// Validity window of a generated signature, in seconds.
///
/// Fixed by the platform. The `expires` parameter embedded in every
/// signed request is the generation time plus this window.
pub const SIGNATURE_VALIDITY: i64 = 300;

/// Holds the key/secret half of the credential triple and produces
/// authorized query strings.
///
/// Both fields are optional until a signed call is attempted: a client
/// that only builds unsigned URLs (or is never used) does not need
/// them. The secret is checked first when they are missing.
#[derive(Debug, Clone)]
pub(crate) struct RequestSigner {
    access_key: Option<String>,
    secret: Option<String>,
}

impl RequestSigner {
    pub(crate) fn new(access_key: Option<String>, secret: Option<String>) -> Self {
        Self { access_key, secret }
    }

    /// Returns `path?query` where the query contains `params` plus
    /// `access_key`, `expires`, and `signature`, all sorted by key.
    ///
    /// `netloc` is the network-location component of the host the
    /// request will be issued to; it is part of the signed payload, so
    /// signing against one host and issuing to another produces a
    /// request the platform will reject.
    pub(crate) fn signed_path(
        &self,
        method: &Method,
        netloc: &str,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<String> {
        self.signed_path_at(method, netloc, path, params, jiff::Timestamp::now().as_second())
    }

    /// Clock-pinned variant of [`RequestSigner::signed_path`].
    fn signed_path_at(
        &self,
        method: &Method,
        netloc: &str,
        path: &str,
        mut params: BTreeMap<String, String>,
        now: i64,
    ) -> Result<String> {
        let secret = self
            .secret
            .as_deref()
            .ok_or(Error::MissingCredential("secret"))?;
        let access_key = self
            .access_key
            .as_deref()
            .ok_or(Error::MissingCredential("access_key"))?;

        params.insert("access_key".to_owned(), access_key.to_owned());
        params.insert(
            "expires".to_owned(),
            (now + SIGNATURE_VALIDITY).to_string(),
        );

        // The signature covers access_key and expires but cannot cover
        // itself, so it is computed before being inserted.
        let payload = canonical_payload(method, netloc, path, &params);
        params.insert("signature".to_owned(), sign_payload(secret, &payload));

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &params {
            query.append_pair(key, value);
        }
        Ok(format!("{path}?{}", query.finish()))
    }
}

/// The exact string the platform recomputes on its side: lowercased
/// method, host netloc, path as given, and `key=value` pairs in
/// ascending key order joined with `&`, all joined with `|`.
///
/// Parameter values appear raw here (no percent-encoding); the server
/// decodes the query string before rebuilding its copy.
pub(crate) fn canonical_payload(
    method: &Method,
    netloc: &str,
    path: &str,
    params: &BTreeMap<String, String>,
) -> String {
    let joined = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}|{netloc}|{path}|{joined}",
        method.as_str().to_ascii_lowercase()
    )
}

/// Base64 of the HMAC-SHA256 digest of `payload` keyed by `secret`.
pub(crate) fn sign_payload(secret: &str, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any size");
    mac.update(payload.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Network-location component of a base URL: host, plus port when one
/// is explicit. Scheme and path never enter the signed payload.
pub(crate) fn host_netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn signer() -> RequestSigner {
        RequestSigner::new(Some("ak".to_owned()), Some("s3cr3t".to_owned()))
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse_query(signed: &str) -> BTreeMap<String, String> {
        let (_, query) = signed.split_once('?').expect("signed path has a query");
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_signing_is_deterministic() {
        let params_a = params(&[("title", "hello"), ("state", "New")]);
        let params_b = params_a.clone();
        let host = "api.video.limelight.com";
        let a = signer()
            .signed_path_at(&Method::GET, host, "/rest/media", params_a, NOW)
            .unwrap();
        let b = signer()
            .signed_path_at(&Method::GET, host, "/rest/media", params_b, NOW)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let mut forward = BTreeMap::new();
        forward.insert("alpha".to_owned(), "1".to_owned());
        forward.insert("beta".to_owned(), "2".to_owned());
        forward.insert("gamma".to_owned(), "3".to_owned());

        let mut reversed = BTreeMap::new();
        reversed.insert("gamma".to_owned(), "3".to_owned());
        reversed.insert("beta".to_owned(), "2".to_owned());
        reversed.insert("alpha".to_owned(), "1".to_owned());

        let host = "api.video.limelight.com";
        let a = signer()
            .signed_path_at(&Method::POST, host, "/rest/media", forward, NOW)
            .unwrap();
        let b = signer()
            .signed_path_at(&Method::POST, host, "/rest/media", reversed, NOW)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_value_change_changes_signature() {
        let host = "api.video.limelight.com";
        let base = signer()
            .signed_path_at(
                &Method::GET,
                host,
                "/rest/media",
                params(&[("title", "hello")]),
                NOW,
            )
            .unwrap();
        let changed = signer()
            .signed_path_at(
                &Method::GET,
                host,
                "/rest/media",
                params(&[("title", "hellp")]),
                NOW,
            )
            .unwrap();
        assert_ne!(
            parse_query(&base)["signature"],
            parse_query(&changed)["signature"]
        );
    }

    #[test]
    fn test_expires_is_generation_time_plus_window() {
        let signed = signer()
            .signed_path_at(
                &Method::GET,
                "api.video.limelight.com",
                "/rest/media",
                BTreeMap::new(),
                NOW,
            )
            .unwrap();
        assert_eq!(
            parse_query(&signed)["expires"],
            (NOW + SIGNATURE_VALIDITY).to_string()
        );
    }

    #[test]
    fn test_empty_params_still_sign() {
        let signed = signer()
            .signed_path_at(
                &Method::GET,
                "api.video.limelight.com",
                "/rest/media",
                BTreeMap::new(),
                NOW,
            )
            .unwrap();
        let query = parse_query(&signed);
        assert_eq!(query.len(), 3);
        assert!(query.contains_key("access_key"));
        assert!(query.contains_key("expires"));
        assert!(query.contains_key("signature"));
    }

    #[test]
    fn test_degenerate_payload_has_empty_params_segment() {
        let payload = canonical_payload(
            &Method::GET,
            "api.video.limelight.com",
            "/rest/media",
            &BTreeMap::new(),
        );
        assert_eq!(payload, "get|api.video.limelight.com|/rest/media|");
    }

    #[test]
    fn test_secret_checked_before_access_key() {
        let neither = RequestSigner::new(None, None);
        let err = neither
            .signed_path_at(
                &Method::GET,
                "api.video.limelight.com",
                "/rest/media",
                BTreeMap::new(),
                NOW,
            )
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential("secret")));

        let secret_only = RequestSigner::new(None, Some("s3cr3t".to_owned()));
        let err = secret_only
            .signed_path_at(
                &Method::GET,
                "api.video.limelight.com",
                "/rest/media",
                BTreeMap::new(),
                NOW,
            )
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential("access_key")));
    }

    #[test]
    fn test_round_trip_resign_reproduces_signature() {
        let signed = signer()
            .signed_path_at(
                &Method::PUT,
                "api.video.limelight.com",
                "/rest/organizations/org1/channels/c1/properties.json",
                params(&[("state", "Published"), ("title", "a channel")]),
                NOW,
            )
            .unwrap();

        let mut query = parse_query(&signed);
        let signature = query.remove("signature").unwrap();
        let payload = canonical_payload(
            &Method::PUT,
            "api.video.limelight.com",
            "/rest/organizations/org1/channels/c1/properties.json",
            &query,
        );
        assert_eq!(signature, sign_payload("s3cr3t", &payload));
    }

    #[test]
    fn test_method_is_lowercased_in_payload() {
        let payload = canonical_payload(
            &Method::DELETE,
            "api.video.limelight.com",
            "/rest/media/m1",
            &BTreeMap::new(),
        );
        assert!(payload.starts_with("delete|"));
    }

    #[test]
    fn test_host_netloc_strips_scheme_and_path() {
        let url = Url::parse("http://api.video.limelight.com/rest/anything").unwrap();
        assert_eq!(host_netloc(&url), "api.video.limelight.com");

        let url = Url::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(host_netloc(&url), "127.0.0.1:8080");

        let url = Url::parse("https://api.delvenetworks.com/").unwrap();
        assert_eq!(host_netloc(&url), "api.delvenetworks.com");
    }
}

//! Core client: configuration, credential handling, and the request
//! plumbing shared by every API operation.

use crate::error::{Error, Result};
use crate::signing::{RequestSigner, host_netloc};
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Main platform API host. Media, channel, and custom-property
/// operations are all served here.
pub const API_HOST: &str = "http://api.video.limelight.com";

/// Analytics API host. Shares the organization-scoped path convention
/// with the main host but is a separate service.
pub const ANALYTICS_HOST: &str = "http://api.delvenetworks.com";

const ENV_ORGANIZATION: &str = "LIMELIGHT_ORGANIZATION";
const ENV_ACCESS_KEY: &str = "LIMELIGHT_ACCESS_KEY";
const ENV_SECRET: &str = "LIMELIGHT_SECRET";

/// Configuration for [`LimelightClient::new`].
///
/// Only `organization` is required at construction; `access_key` and
/// `secret` are needed once the first signed operation is attempted.
/// The host overrides exist for tests and proxies and are normally
/// left `None`.
///
/// Credentials can come from anywhere, but the conventional setup is
/// explicit values merged over the process environment:
///
/// ```rust,no_run
/// use limelight_video::{ClientOptions, LimelightClient};
///
/// # fn example() -> limelight_video::Result<()> {
/// let options = ClientOptions {
///     organization: Some("org1".into()),
///     ..ClientOptions::default()
/// };
/// let _client = LimelightClient::new(options.or(ClientOptions::from_env()))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Organization ID that scopes every request path.
    pub organization: Option<String>,
    /// Access key identifying the caller to the platform.
    pub access_key: Option<String>,
    /// Shared secret the request signatures are keyed with.
    pub secret: Option<String>,
    /// Override for the main API host (scheme plus authority).
    pub api_host: Option<String>,
    /// Override for the analytics API host.
    pub analytics_host: Option<String>,
}

impl ClientOptions {
    /// Reads credentials from `LIMELIGHT_ORGANIZATION`,
    /// `LIMELIGHT_ACCESS_KEY`, and `LIMELIGHT_SECRET`.
    ///
    /// This is the only place the process environment is consulted;
    /// callers opt in by merging it under their explicit options with
    /// [`ClientOptions::or`]. Nothing deeper in the client reads the
    /// environment.
    pub fn from_env() -> Self {
        Self {
            organization: std::env::var(ENV_ORGANIZATION).ok(),
            access_key: std::env::var(ENV_ACCESS_KEY).ok(),
            secret: std::env::var(ENV_SECRET).ok(),
            api_host: None,
            analytics_host: None,
        }
    }

    /// Field-wise merge preferring values from `self`.
    pub fn or(self, fallback: ClientOptions) -> ClientOptions {
        ClientOptions {
            organization: self.organization.or(fallback.organization),
            access_key: self.access_key.or(fallback.access_key),
            secret: self.secret.or(fallback.secret),
            api_host: self.api_host.or(fallback.api_host),
            analytics_host: self.analytics_host.or(fallback.analytics_host),
        }
    }
}

/// Which remote service a request is addressed to.
///
/// One value selects both the host a request is signed against and the
/// host it is issued to, so the two cannot diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApiHost {
    Platform,
    Analytics,
}

/// A base host parsed once at construction: the full base URL for
/// issuing requests and the precomputed netloc the signer needs.
#[derive(Debug, Clone)]
struct HostContext {
    base: String,
    netloc: String,
}

impl HostContext {
    fn parse(raw: &str, which: &'static str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|_| Error::Configuration(which))?;
        Ok(Self {
            netloc: host_netloc(&url),
            base: raw.trim_end_matches('/').to_owned(),
        })
    }
}

/// Client for the Limelight Video Platform REST API.
///
/// Each operation builds an organization-scoped path, signs it (see
/// the crate docs for the signature scheme), issues a single HTTP
/// request, and returns the decoded JSON body. The client holds no
/// mutable state: credentials and host contexts are fixed at
/// construction, so a clone is cheap and one instance can issue
/// independent requests from multiple tasks.
#[derive(Debug, Clone)]
pub struct LimelightClient {
    organization: String,
    signer: RequestSigner,
    http: reqwest::Client,
    api: HostContext,
    analytics: HostContext,
}

impl LimelightClient {
    /// Creates a client from `options`.
    ///
    /// Fails with [`Error::Configuration`] when no organization is
    /// supplied or a host override cannot be parsed. A missing
    /// `access_key` or `secret` is not an error here; it surfaces as
    /// [`Error::MissingCredential`] from the first signed call.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let organization = options
            .organization
            .ok_or(Error::Configuration("organization"))?;
        let api = HostContext::parse(options.api_host.as_deref().unwrap_or(API_HOST), "api_host")?;
        let analytics = HostContext::parse(
            options.analytics_host.as_deref().unwrap_or(ANALYTICS_HOST),
            "analytics_host",
        )?;

        Ok(Self {
            organization,
            signer: RequestSigner::new(options.access_key, options.secret),
            http: reqwest::Client::new(),
            api,
            analytics,
        })
    }

    /// The organization ID this client is scoped to.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn host(&self, which: ApiHost) -> &HostContext {
        match which {
            ApiHost::Platform => &self.api,
            ApiHost::Analytics => &self.analytics,
        }
    }

    /// `/rest/organizations/{organization}/{tail}`
    pub(crate) fn org_path(&self, tail: &str) -> String {
        format!("/rest/organizations/{}/{tail}", self.organization)
    }

    /// Fully qualified signed URL for `path` on the given host.
    pub(crate) fn signed_url(
        &self,
        method: &Method,
        which: ApiHost,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<String> {
        let host = self.host(which);
        let signed = self.signer.signed_path(method, &host.netloc, path, params)?;
        Ok(format!("{}{signed}", host.base))
    }

    /// Signs and issues a request, expecting a JSON body in response.
    pub(crate) async fn request_json(
        &self,
        method: Method,
        which: ApiHost,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<Value> {
        self.request_typed(method, which, path, params).await
    }

    /// Typed variant of [`LimelightClient::request_json`] for the rare
    /// response whose fields the crate itself consumes.
    pub(crate) async fn request_typed<T: DeserializeOwned>(
        &self,
        method: Method,
        which: ApiHost,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<T> {
        let response = self.execute(method, which, path, params).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(Error::Decode)
    }

    /// Signs and issues a request without touching the response body.
    ///
    /// Delete-style calls use this: the platform may answer them with
    /// an empty or non-JSON body. Transport errors (including
    /// non-success statuses) still propagate.
    pub(crate) async fn request_ignore_body(
        &self,
        method: Method,
        which: ApiHost,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<()> {
        self.execute(method, which, path, params).await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        which: ApiHost,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<reqwest::Response> {
        let url = self.signed_url(&method, which, path, params)?;
        tracing::trace!(%method, %url, "issuing signed request");
        let response = self.http.request(method, url).send().await?;
        Ok(response.error_for_status()?)
    }
}

/// Builds the parameter set for one call.
///
/// Every operation gets a fresh map; nothing is merged into or out of
/// caller-held state, so no parameter can leak between sequential
/// calls.
pub(crate) fn params<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

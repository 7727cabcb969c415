//! Error types for the Limelight client.

use thiserror::Error;

/// Alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`crate::LimelightClient`].
///
/// The library performs no recovery, retries, or suppression; every
/// error propagates to the caller as one of these variants.
#[derive(Error, Debug)]
pub enum Error {
    /// A value required at construction time was missing or invalid.
    ///
    /// `organization` is the only credential checked this early; the
    /// host overrides are validated here too since a malformed base URL
    /// can never produce a correct signature.
    #[error("missing or invalid configuration value `{0}`")]
    Configuration(&'static str),

    /// A credential needed to sign a request was absent when a signed
    /// operation was attempted.
    ///
    /// `access_key` and `secret` are deliberately not validated at
    /// construction, so a client built without them works fine until
    /// the first signed call.
    #[error("missing credential `{0}` required to sign requests")]
    MissingCredential(&'static str),

    /// An upload source that cannot be turned into a named file part.
    #[error("unsupported upload source: {0}")]
    UnsupportedSource(String),

    /// Failed to read a file-backed upload source from disk.
    #[error("failed to read upload source")]
    Io(#[from] std::io::Error),

    /// Network or HTTP-layer failure, including non-success response
    /// statuses. Propagated unmodified from the transport.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Response body was not valid JSON where JSON was expected.
    #[error("response body was not valid JSON")]
    Decode(#[source] serde_json::Error),
}

//! Client library for the Limelight Video Platform REST API.
//!
//! The platform authorizes every request with a deterministic
//! signature instead of a bearer token: the client builds a canonical
//! payload from the HTTP method, the target host, the request path,
//! and the query parameters, computes an HMAC-SHA256 over it with a
//! pre-shared secret, and appends the result (together with the access
//! key and a 300-second expiry timestamp) to the query string. The
//! server rebuilds the same payload and rejects the request unless the
//! signatures match, so parameter ordering is pinned to ascending key
//! order on both sides.
//!
//! On top of that signing scheme the client exposes the platform's
//! operations for media assets, channels, custom metadata properties,
//! and analytics reports. Responses come back as raw
//! [`serde_json::Value`]s; the platform's payloads are large and
//! loosely specified, and callers usually pick out a handful of
//! fields.
//!
//! # Example
//!
//! ```rust,no_run
//! use limelight_video::{ClientOptions, LimelightClient};
//!
//! # async fn example() -> limelight_video::Result<()> {
//! let client = LimelightClient::new(ClientOptions {
//!     organization: Some("org1".into()),
//!     access_key: Some("ak".into()),
//!     secret: Some("s3cr3t".into()),
//!     ..ClientOptions::default()
//! })?;
//!
//! let info = client.media_info("m123").await?;
//! println!("title: {}", info["title"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The client holds no mutable state; credentials and host contexts
//! are fixed at construction. Cloning is cheap (the underlying HTTP
//! connection pool is shared), and one instance can issue independent
//! requests from multiple tasks. There is no internal queueing,
//! retrying, or background work: every operation is a single signed
//! request/response exchange.

mod analytics;
mod channels;
mod client;
mod error;
mod media;
mod properties;
mod signing;

pub use client::{ANALYTICS_HOST, API_HOST, ClientOptions, LimelightClient};
pub use error::{Error, Result};
pub use media::{MediaSource, UploadAttributes};
pub use signing::SIGNATURE_VALIDITY;

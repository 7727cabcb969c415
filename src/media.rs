//! Media asset operations: properties, encodings, search, deletion,
//! and upload.

use crate::client::{ApiHost, LimelightClient, params};
use crate::error::{Error, Result};
use bytes::Bytes;
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::instrument;

/// Per-request timeout for uploads. Media files can be large, so the
/// upload call gets an hour where every other call uses the transport
/// default.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Title given to an upload that does not specify one.
const DEFAULT_TITLE: &str = "Untitled";

/// Source of the bytes for [`LimelightClient::upload`].
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// A named file on disk. The MIME type is inferred from the file
    /// extension and the body is streamed rather than buffered.
    Path(PathBuf),
    /// An in-memory byte stream with explicit metadata.
    Bytes {
        data: Bytes,
        /// File name presented to the platform. Also used for MIME
        /// inference when `mime` is `None`. Must be non-empty.
        filename: String,
        /// Explicit MIME type; inferred from `filename` when `None`.
        mime: Option<String>,
    },
}

impl MediaSource {
    fn filename(&self) -> Result<String> {
        match self {
            MediaSource::Path(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
                .ok_or_else(|| {
                    Error::UnsupportedSource(format!(
                        "path `{}` has no usable file name",
                        path.display()
                    ))
                }),
            MediaSource::Bytes { filename, .. } if filename.is_empty() => Err(
                Error::UnsupportedSource("byte stream sources need a non-empty file name".into()),
            ),
            MediaSource::Bytes { filename, .. } => Ok(filename.clone()),
        }
    }

    fn mime_for(&self, filename: &str) -> String {
        match self {
            MediaSource::Bytes { mime: Some(mime), .. } => mime.clone(),
            _ => mime_guess::from_path(filename)
                .first_or_octet_stream()
                .to_string(),
        }
    }

    async fn into_part(self, filename: String, mime: &str) -> Result<reqwest::multipart::Part> {
        let part = match self {
            MediaSource::Path(path) => {
                let file = tokio::fs::File::open(&path).await?;
                let length = file.metadata().await?.len();
                let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
                reqwest::multipart::Part::stream_with_length(body, length)
            }
            MediaSource::Bytes { data, .. } => {
                reqwest::multipart::Part::stream(reqwest::Body::from(data))
            }
        };
        part.file_name(filename)
            .mime_str(mime)
            .map_err(|_| Error::UnsupportedSource(format!("invalid MIME type `{mime}`")))
    }
}

/// Optional attributes attached to an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadAttributes {
    /// Title of the new media asset; a fixed placeholder is used when
    /// absent.
    pub title: Option<String>,
    /// Custom metadata values keyed by property name. Names not yet
    /// registered for the organization are registered before the
    /// upload is issued.
    pub custom: BTreeMap<String, String>,
}

impl LimelightClient {
    /// Fetches the properties of a single media asset.
    #[instrument(skip(self))]
    pub async fn media_info(&self, media_id: &str) -> Result<Value> {
        let path = self.org_path(&format!("media/{media_id}/properties.json"));
        self.request_json(Method::GET, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }

    /// Fetches the available encodings of a media asset.
    #[instrument(skip(self))]
    pub async fn media_encodings(&self, media_id: &str) -> Result<Value> {
        let path = self.org_path(&format!("media/{media_id}/encodings.json"));
        self.request_json(Method::GET, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }

    /// Lists the organization's media assets.
    pub async fn list_media(&self) -> Result<Value> {
        let path = self.org_path("media.json");
        self.request_json(Method::GET, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }

    /// Searches the organization's media assets.
    pub async fn search_media(&self, term: &str) -> Result<Value> {
        let path = self.org_path("media/search.json");
        self.request_json(
            Method::GET,
            ApiHost::Platform,
            &path,
            params([("term", term)]),
        )
        .await
    }

    /// Updates writable properties of a media asset. The attributes
    /// travel as signed query parameters.
    #[instrument(skip(self, attributes))]
    pub async fn update_media(&self, media_id: &str, attributes: &[(&str, &str)]) -> Result<Value> {
        let path = self.org_path(&format!("media/{media_id}/properties.json"));
        self.request_json(
            Method::PUT,
            ApiHost::Platform,
            &path,
            params(attributes.iter().copied()),
        )
        .await
    }

    /// Deletes a media asset. The response body is not decoded; the
    /// platform may answer with an empty or non-JSON body.
    #[instrument(skip(self))]
    pub async fn delete_media(&self, media_id: &str) -> Result<()> {
        let path = self.org_path(&format!("media/{media_id}"));
        self.request_ignore_body(Method::DELETE, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }

    /// Fully qualified pre-signed URL for a media upload POST.
    ///
    /// Valid for the signature window. Suitable for handing to an
    /// external uploader (a browser form, a separate process) without
    /// going through [`LimelightClient::upload`].
    pub fn upload_url(&self) -> Result<String> {
        self.signed_url(
            &Method::POST,
            ApiHost::Platform,
            &self.org_path("media"),
            BTreeMap::new(),
        )
    }

    /// Uploads a new media asset.
    ///
    /// Custom metadata names in `attributes` that are not yet
    /// registered for the organization are registered first; those
    /// registration calls are fire-and-forget, so a failure there is
    /// logged and does not abort the upload. The upload itself is a
    /// multipart POST to [`LimelightClient::upload_url`] with an
    /// extended timeout.
    #[instrument(skip(self, source, attributes))]
    pub async fn upload(&self, source: MediaSource, attributes: UploadAttributes) -> Result<Value> {
        let filename = source.filename()?;
        let mime = source.mime_for(&filename);

        if !attributes.custom.is_empty() {
            self.register_missing_properties(attributes.custom.keys())
                .await;
        }

        let part = source.into_part(filename, &mime).await?;
        let mut form = reqwest::multipart::Form::new().text(
            "title",
            attributes
                .title
                .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        );
        for (name, value) in attributes.custom {
            form = form.text(format!("custom_property[{name}]"), value);
        }
        let form = form.part("media_file", part);

        let url = self.upload_url()?;
        tracing::debug!(%url, %mime, "uploading media");
        let response = self
            .http()
            .post(url)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(Error::Decode)
    }

    /// Registers any custom property names not already known to the
    /// organization, one create call per missing name.
    async fn register_missing_properties<'a>(&self, names: impl Iterator<Item = &'a String>) {
        let registered = match self.list_custom_properties().await {
            Ok(registered) => registered,
            Err(error) => {
                tracing::warn!(%error, "could not list custom properties, skipping auto-registration");
                return;
            }
        };
        for name in names {
            if registered.iter().any(|existing| existing == name) {
                continue;
            }
            if let Err(error) = self.create_custom_properties([name.as_str()]).await {
                tracing::warn!(property = %name, %error, "failed to register custom property");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;

    fn client() -> LimelightClient {
        LimelightClient::new(ClientOptions {
            organization: Some("org1".to_owned()),
            access_key: Some("ak".to_owned()),
            secret: Some("s3cr3t".to_owned()),
            ..ClientOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn test_mp4_path_infers_video_mime() {
        let source = MediaSource::Path(PathBuf::from("/tmp/movie.mp4"));
        let filename = source.filename().unwrap();
        assert_eq!(filename, "movie.mp4");
        assert_eq!(source.mime_for(&filename), "video/mp4");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_octet_stream() {
        let source = MediaSource::Path(PathBuf::from("mystery.qqq"));
        let filename = source.filename().unwrap();
        assert_eq!(source.mime_for(&filename), "application/octet-stream");
    }

    #[test]
    fn test_explicit_mime_wins_over_inference() {
        let source = MediaSource::Bytes {
            data: Bytes::from_static(b"data"),
            filename: "clip.mp4".to_owned(),
            mime: Some("video/x-custom".to_owned()),
        };
        assert_eq!(source.mime_for("clip.mp4"), "video/x-custom");
    }

    #[test]
    fn test_path_without_file_name_is_unsupported() {
        let source = MediaSource::Path(PathBuf::from("/tmp/.."));
        let err = source.filename().unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource(_)));
    }

    #[test]
    fn test_empty_filename_is_unsupported() {
        let source = MediaSource::Bytes {
            data: Bytes::from_static(b"data"),
            filename: String::new(),
            mime: None,
        };
        let err = source.filename().unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource(_)));
    }

    #[test]
    fn test_upload_url_is_fully_qualified_and_signed() {
        let url = client().upload_url().unwrap();
        assert!(url.starts_with("http://api.video.limelight.com/rest/organizations/org1/media?"));

        let parsed = url::Url::parse(&url).unwrap();
        let query: BTreeMap<String, String> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(query["access_key"], "ak");
        assert!(query.contains_key("expires"));
        assert!(query.contains_key("signature"));
    }
}

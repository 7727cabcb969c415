//! Channel operations, including linking media into channels.

use crate::client::{ApiHost, LimelightClient, params};
use crate::error::Result;
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

impl LimelightClient {
    /// Creates a new (unpublished) channel with the given title.
    #[instrument(skip(self))]
    pub async fn create_channel(&self, title: &str) -> Result<Value> {
        let path = self.org_path("channels");
        self.request_json(
            Method::POST,
            ApiHost::Platform,
            &path,
            params([("title", title)]),
        )
        .await
    }

    /// Lists the organization's channels.
    pub async fn list_channels(&self) -> Result<Value> {
        let path = self.org_path("channels.json");
        self.request_json(Method::GET, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }

    /// Updates writable properties of a channel. The attributes travel
    /// as signed query parameters.
    #[instrument(skip(self, attributes))]
    pub async fn update_channel(
        &self,
        channel_id: &str,
        attributes: &[(&str, &str)],
    ) -> Result<Value> {
        let path = self.org_path(&format!("channels/{channel_id}/properties.json"));
        self.request_json(
            Method::PUT,
            ApiHost::Platform,
            &path,
            params(attributes.iter().copied()),
        )
        .await
    }

    /// Publishes a channel.
    ///
    /// Publishing is nothing more than an update of the channel's
    /// `state` field, so this delegates to
    /// [`LimelightClient::update_channel`].
    #[instrument(skip(self))]
    pub async fn publish_channel(&self, channel_id: &str) -> Result<Value> {
        self.update_channel(channel_id, &[("state", "Published")])
            .await
    }

    /// Deletes a channel. The response body is not decoded.
    #[instrument(skip(self))]
    pub async fn delete_channel(&self, channel_id: &str) -> Result<()> {
        let path = self.org_path(&format!("channels/{channel_id}"));
        self.request_ignore_body(Method::DELETE, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }

    /// Adds a media asset to a channel.
    #[instrument(skip(self))]
    pub async fn add_media_to_channel(&self, channel_id: &str, media_id: &str) -> Result<Value> {
        let path = self.org_path(&format!("channels/{channel_id}/media/{media_id}"));
        self.request_json(Method::PUT, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }

    /// Removes a media asset from a channel. The response body is not
    /// decoded.
    #[instrument(skip(self))]
    pub async fn remove_media_from_channel(&self, channel_id: &str, media_id: &str) -> Result<()> {
        let path = self.org_path(&format!("channels/{channel_id}/media/{media_id}"));
        self.request_ignore_body(Method::DELETE, ApiHost::Platform, &path, BTreeMap::new())
            .await
    }
}

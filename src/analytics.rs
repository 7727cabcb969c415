//! Analytics reports.
//!
//! Analytics are served by a separate host from the main platform
//! API. Requests here name [`ApiHost::Analytics`], which means they
//! are signed against and issued to that host by the same value; the
//! signature would not verify anywhere else.

use crate::client::{ApiHost, LimelightClient, params};
use crate::error::Result;
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

impl LimelightClient {
    /// Analytics report for one or more media assets.
    ///
    /// The IDs are joined with commas into a single `media_ids`
    /// parameter.
    pub async fn media_analytics<I, S>(&self, media_ids: I) -> Result<Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = media_ids
            .into_iter()
            .map(|id| id.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");
        let path = self.org_path("media/analytics.json");
        self.request_json(
            Method::GET,
            ApiHost::Analytics,
            &path,
            params([("media_ids", ids)]),
        )
        .await
    }

    /// Analytics report for a single channel.
    #[instrument(skip(self))]
    pub async fn channel_analytics(&self, channel_id: &str) -> Result<Value> {
        let path = self.org_path(&format!("channels/{channel_id}/analytics.json"));
        self.request_json(Method::GET, ApiHost::Analytics, &path, BTreeMap::new())
            .await
    }
}

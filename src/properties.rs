//! Custom media properties: account-level metadata keys.
//!
//! A property name must be registered for the organization before it
//! can be attached to a media asset. Uploads auto-register missing
//! names; see [`LimelightClient::upload`].

use crate::client::{ApiHost, LimelightClient};
use crate::error::Result;
use http::Method;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

/// Response of the custom-property listing call. Only the field the
/// crate consumes is typed.
#[derive(Debug, Deserialize)]
struct CustomPropertyListResponse {
    custom_property_types: Vec<CustomPropertyType>,
}

#[derive(Debug, Deserialize)]
struct CustomPropertyType {
    type_name: String,
}

impl LimelightClient {
    /// Names of the custom properties registered for the organization.
    #[instrument(skip(self))]
    pub async fn list_custom_properties(&self) -> Result<Vec<String>> {
        let path = self.org_path("media/properties/custom.json");
        let response: CustomPropertyListResponse = self
            .request_typed(Method::GET, ApiHost::Platform, &path, BTreeMap::new())
            .await?;
        Ok(response
            .custom_property_types
            .into_iter()
            .map(|property| property.type_name)
            .collect())
    }

    /// Registers custom property names, one signed PUT per name; the
    /// platform has no batch registration.
    pub async fn create_custom_properties<I, S>(&self, names: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut created = Vec::new();
        for name in names {
            let path = self.org_path(&format!("media/properties/custom/{}", name.as_ref()));
            created.push(
                self.request_json(Method::PUT, ApiHost::Platform, &path, BTreeMap::new())
                    .await?,
            );
        }
        Ok(created)
    }

    /// Unregisters custom property names, one signed DELETE per name.
    /// Response bodies are not decoded.
    pub async fn remove_custom_properties<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let path = self.org_path(&format!("media/properties/custom/{}", name.as_ref()));
            self.request_ignore_body(Method::DELETE, ApiHost::Platform, &path, BTreeMap::new())
                .await?;
        }
        Ok(())
    }
}

//! `DirectoryClient` implementation over the Azure DevOps Graph API.

use async_trait::async_trait;
use memberscope_core::{DirectoryClient, DirectoryError, Group, IdentityPage, SubjectEntry};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::graph_client::{GraphClient, ListResponse};
use crate::{AdoConfig, AdoCredentials, AdoResult};

/// One membership edge from `memberships/{subject}?direction=up`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipEdge {
    pub container_descriptor: String,
    #[serde(default)]
    pub member_descriptor: Option<String>,
}

/// Azure DevOps organization exposed as a read-only directory.
#[derive(Debug, Clone)]
pub struct AdoDirectory {
    client: GraphClient,
    organization: String,
}

impl AdoDirectory {
    /// Creates a directory client for the configured organization.
    pub fn new(config: &AdoConfig, credentials: &AdoCredentials) -> AdoResult<Self> {
        Ok(Self {
            client: GraphClient::new(config, credentials)?,
            organization: config.organization.clone(),
        })
    }

    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    #[must_use]
    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    async fn users_page(&self, cursor: Option<&str>) -> AdoResult<IdentityPage> {
        let query: Vec<(&str, &str)> = cursor
            .map(|c| vec![("continuationToken", c)])
            .unwrap_or_default();
        let url = self.client.url("users", &query)?;
        let response = self
            .client
            .get::<ListResponse<serde_json::Value>>(url)
            .await?;

        let rows = response.body.value.len();
        let entries = decode_entries(response.body.value);
        debug!(
            rows,
            entries = entries.len(),
            more = response.continuation_token.is_some(),
            "Fetched users page"
        );
        Ok(IdentityPage {
            entries,
            next_cursor: response.continuation_token,
        })
    }

    async fn memberships_up(&self, descriptor: &str) -> AdoResult<Vec<String>> {
        let path = format!("memberships/{}", urlencoding::encode(descriptor));
        let url = self.client.url(&path, &[("direction", "up")])?;
        let response = self.client.get::<ListResponse<MembershipEdge>>(url).await?;

        Ok(response
            .body
            .value
            .into_iter()
            .map(|edge| edge.container_descriptor)
            .collect())
    }

    async fn group(&self, descriptor: &str) -> AdoResult<Group> {
        let path = format!("groups/{}", urlencoding::encode(descriptor));
        let url = self.client.url(&path, &[])?;
        Ok(self.client.get::<Group>(url).await?.body)
    }
}

/// Decodes listing rows one by one, dropping rows that do not parse.
fn decode_entries(rows: Vec<serde_json::Value>) -> Vec<SubjectEntry> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<SubjectEntry>(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping malformed subject row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl DirectoryClient for AdoDirectory {
    #[instrument(skip(self))]
    async fn list_identities_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<IdentityPage, DirectoryError> {
        Ok(self.users_page(cursor).await?)
    }

    #[instrument(skip(self))]
    async fn list_upward_memberships(
        &self,
        descriptor: &str,
    ) -> Result<Vec<String>, DirectoryError> {
        Ok(self.memberships_up(descriptor).await?)
    }

    #[instrument(skip(self))]
    async fn fetch_group(&self, descriptor: &str) -> Result<Group, DirectoryError> {
        Ok(self.group(descriptor).await?)
    }
}

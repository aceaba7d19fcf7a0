//! Common test utilities for memberscope-connector-ado integration tests.

#![allow(dead_code)]

use memberscope_connector_ado::{AdoConfig, AdoCredentials, AdoDirectory, RetryConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ORG: &str = "contoso";
pub const PAT: &str = "abc123";
/// base64(":abc123")
pub const AUTH_HEADER: &str = "Basic OmFiYzEyMw==";
pub const GRAPH_PATH: &str = "/contoso/_apis/graph";

/// Test data factory for Graph users.
pub fn create_test_user(descriptor: &str, email: &str) -> Value {
    json!({
        "subjectKind": "user",
        "descriptor": descriptor,
        "principalName": email,
        "mailAddress": email,
        "displayName": format!("Test User {}", descriptor),
        "origin": "aad",
        "domain": "00000000-0000-0000-0000-000000000000"
    })
}

/// Test data factory for non-user subjects that must be filtered out.
pub fn create_service_principal(descriptor: &str) -> Value {
    json!({
        "subjectKind": "servicePrincipal",
        "descriptor": descriptor,
        "principalName": "Build Service",
        "displayName": "Build Service"
    })
}

/// Test data factory for Graph groups.
pub fn create_test_group(descriptor: &str, name: &str, principal_name: &str) -> Value {
    json!({
        "subjectKind": "group",
        "descriptor": descriptor,
        "displayName": name,
        "principalName": principal_name,
        "description": format!("Test group: {}", name),
        "origin": "vsts"
    })
}

/// Wraps items in the Graph list envelope.
pub fn create_list_response(items: Vec<Value>) -> Value {
    json!({ "count": items.len(), "value": items })
}

/// Membership list for `direction=up`.
pub fn create_memberships_response(member: &str, containers: &[&str]) -> Value {
    let edges = containers
        .iter()
        .map(|c| json!({ "containerDescriptor": c, "memberDescriptor": member }))
        .collect();
    create_list_response(edges)
}

/// Azure DevOps error body.
pub fn create_api_error(message: &str) -> Value {
    json!({
        "$id": "1",
        "innerException": null,
        "message": message,
        "typeName": "Microsoft.VisualStudio.Services.Graph.GraphSubjectNotFoundException",
        "typeKey": "GraphSubjectNotFoundException",
        "errorCode": 0,
        "eventId": 3000
    })
}

/// Mock server wrapper with common setup helpers.
pub struct MockAdoServer {
    pub server: MockServer,
}

impl MockAdoServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn graph_url(&self) -> String {
        format!("{}{}", self.server.uri(), GRAPH_PATH)
    }

    /// Directory client pointed at this server with short retry delays.
    pub fn directory(&self) -> AdoDirectory {
        self.directory_with_retry(RetryConfig::for_testing())
    }

    pub fn directory_with_retry(&self, retry: RetryConfig) -> AdoDirectory {
        let config = AdoConfig::builder()
            .organization(ORG)
            .base_url(self.graph_url())
            .retry(retry)
            .build()
            .unwrap();
        AdoDirectory::new(&config, &AdoCredentials::new(PAT)).unwrap()
    }

    /// Serves `pages` of users chained with `tokN` continuation headers.
    pub async fn mock_users_pages(&self, pages: Vec<Vec<Value>>) {
        let total = pages.len();
        // Later pages are mounted first so the token-specific mocks win.
        for (i, page) in pages.into_iter().enumerate().rev() {
            let mut response = ResponseTemplate::new(200).set_body_json(create_list_response(page));
            if i + 1 < total {
                response = response.insert_header("x-ms-continuationtoken", format!("tok{}", i + 1));
            }

            let mock = Mock::given(method("GET")).and(path(format!("{GRAPH_PATH}/users")));
            if i == 0 {
                mock.respond_with(response).mount(&self.server).await;
            } else {
                mock.and(query_param("continuationToken", format!("tok{i}")))
                    .respond_with(response)
                    .mount(&self.server)
                    .await;
            }
        }
    }

    pub async fn mock_memberships(&self, member: &str, containers: &[&str]) {
        Mock::given(method("GET"))
            .and(path(format!("{GRAPH_PATH}/memberships/{member}")))
            .and(query_param("direction", "up"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_memberships_response(member, containers)),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_group(&self, descriptor: &str, name: &str, principal_name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("{GRAPH_PATH}/groups/{descriptor}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_test_group(descriptor, name, principal_name)),
            )
            .mount(&self.server)
            .await;
    }
}

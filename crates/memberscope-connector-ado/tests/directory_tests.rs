//! Graph API directory tests against a mock server.

mod common;

use common::*;
use memberscope_core::{AuditConfig, Auditor, DirectoryClient, DirectoryError, ScopeType};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_users_page_follows_continuation_header() {
    let mock = MockAdoServer::new().await;
    mock.mock_users_pages(vec![
        vec![create_test_user("aad.1", "one@contoso.com")],
        vec![],
        vec![
            create_test_user("aad.3", "three@contoso.com"),
            create_service_principal("svc.1"),
        ],
    ])
    .await;

    let directory = mock.directory();
    let first = directory.list_identities_page(None).await.unwrap();
    assert_eq!(first.entries.len(), 1);
    assert_eq!(first.next_cursor.as_deref(), Some("tok1"));

    let second = directory.list_identities_page(Some("tok1")).await.unwrap();
    assert!(second.entries.is_empty());
    assert_eq!(second.next_cursor.as_deref(), Some("tok2"));

    let last = directory.list_identities_page(Some("tok2")).await.unwrap();
    assert_eq!(last.entries.len(), 2);
    assert!(last.next_cursor.is_none());
}

#[tokio::test]
async fn test_pat_sent_as_basic_auth() {
    let mock = MockAdoServer::new().await;
    Mock::given(method("GET"))
        .and(path(format!("{GRAPH_PATH}/users")))
        .and(header("authorization", AUTH_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_list_response(vec![])))
        .expect(1)
        .mount(&mock.server)
        .await;

    let page = mock.directory().list_identities_page(None).await.unwrap();
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn test_upward_memberships() {
    let mock = MockAdoServer::new().await;
    mock.mock_memberships("aad.1", &["vssgp.a", "vssgp.b"]).await;

    let containers = mock
        .directory()
        .list_upward_memberships("aad.1")
        .await
        .unwrap();
    assert_eq!(containers, ["vssgp.a", "vssgp.b"]);
}

#[tokio::test]
async fn test_fetch_group() {
    let mock = MockAdoServer::new().await;
    mock.mock_group("vssgp.a", "Contributors", "[Contoso]\\Contributors")
        .await;

    let group = mock.directory().fetch_group("vssgp.a").await.unwrap();
    assert_eq!(group.display_name(), "Contributors");
    assert_eq!(group.principal_name, "[Contoso]\\Contributors");
    assert_eq!(group.description, "Test group: Contributors");
}

#[tokio::test]
async fn test_missing_group_is_not_found() {
    let mock = MockAdoServer::new().await;
    Mock::given(method("GET"))
        .and(path(format!("{GRAPH_PATH}/groups/vssgp.gone")))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(create_api_error("VS860018: The requested group was not found.")),
        )
        .mount(&mock.server)
        .await;

    let err = mock.directory().fetch_group("vssgp.gone").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("VS860018"));
}

#[tokio::test]
async fn test_sign_in_page_reported_as_auth_failure() {
    let mock = MockAdoServer::new().await;
    Mock::given(method("GET"))
        .and(path(format!("{GRAPH_PATH}/users")))
        .respond_with(ResponseTemplate::new(203).set_body_string("<html>Sign In</html>"))
        .mount(&mock.server)
        .await;

    let err = mock.directory().list_identities_page(None).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Status { status: 203, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_payload_error() {
    let mock = MockAdoServer::new().await;
    Mock::given(method("GET"))
        .and(path(format!("{GRAPH_PATH}/groups/vssgp.bad")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock.server)
        .await;

    let err = mock.directory().fetch_group("vssgp.bad").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Payload(_)));
}

#[tokio::test]
async fn test_full_audit_over_graph_api() {
    let mock = MockAdoServer::new().await;
    mock.mock_users_pages(vec![
        vec![create_test_user("aad.1", "one@contoso.com")],
        vec![create_test_user("aad.2", "two@contoso.com")],
    ])
    .await;
    mock.mock_memberships("aad.1", &["vssgp.contrib", "vssgp.ssg"])
        .await;
    mock.mock_memberships("aad.2", &["vssgp.contrib", "vssgp.pca"])
        .await;
    mock.mock_memberships("vssgp.contrib", &[]).await;
    mock.mock_memberships("vssgp.ssg", &[]).await;
    mock.mock_memberships("vssgp.pca", &[]).await;
    mock.mock_group("vssgp.contrib", "Contributors", "[Fabrikam]\\Contributors")
        .await;
    mock.mock_group(
        "vssgp.ssg",
        "Security Service Group",
        "[contoso]\\Security Service Group",
    )
    .await;
    mock.mock_group(
        "vssgp.pca",
        "Project Collection Administrators",
        "[contoso]\\Project Collection Administrators",
    )
    .await;

    let directory = mock.directory();
    let config = AuditConfig::builder()
        .organization(ORG)
        .without_pacing()
        .build()
        .unwrap();
    let report = Auditor::new(&directory, config).audit_all().await.unwrap();

    let rows: Vec<_> = report
        .records
        .iter()
        .map(|r| (r.principal_name.as_str(), r.group_name.as_str(), r.scope_type))
        .collect();
    assert_eq!(
        rows,
        [
            ("one@contoso.com", "Contributors", Some(ScopeType::Project)),
            ("two@contoso.com", "Contributors", Some(ScopeType::Project)),
            (
                "two@contoso.com",
                "Project Collection Administrators",
                Some(ScopeType::Organization)
            ),
        ]
    );
    assert_eq!(report.records[0].scope_name, "Fabrikam");
    assert_eq!(report.summary.cache_fetches, 3);
    assert!(report.summary.is_complete());
}

#[tokio::test]
async fn test_malformed_user_rows_are_skipped() {
    let mock = MockAdoServer::new().await;
    mock.mock_users_pages(vec![vec![
        create_test_user("aad.1", "one@contoso.com"),
        serde_json::json!({ "subjectKind": "scope", "descriptor": null }),
        serde_json::json!({ "subjectKind": 42, "descriptor": "aad.bad" }),
        serde_json::json!({ "subjectKind": "user", "principalName": "ghost@contoso.com", "descriptor": null }),
    ]])
    .await;
    mock.mock_memberships("aad.1", &["vssgp.contrib"]).await;
    mock.mock_memberships("vssgp.contrib", &[]).await;
    mock.mock_group("vssgp.contrib", "Contributors", "[Fabrikam]\\Contributors")
        .await;

    let directory = mock.directory();
    let config = AuditConfig::builder()
        .organization(ORG)
        .without_pacing()
        .build()
        .unwrap();
    let report = Auditor::new(&directory, config).audit_all().await.unwrap();

    assert_eq!(report.summary.identities_total, 1);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].principal_name, "one@contoso.com");
    assert_eq!(report.records[0].group_name, "Contributors");
}

#[tokio::test]
async fn test_group_with_null_description_is_reported() {
    let mock = MockAdoServer::new().await;
    Mock::given(method("GET"))
        .and(path(format!("{GRAPH_PATH}/groups/vssgp.readers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "subjectKind": "group",
            "descriptor": "vssgp.readers",
            "displayName": "Readers",
            "principalName": "[Fabrikam]\\Readers",
            "description": null
        })))
        .mount(&mock.server)
        .await;

    let group = mock.directory().fetch_group("vssgp.readers").await.unwrap();
    assert_eq!(group.display_name(), "Readers");
    assert!(group.description.is_empty());
}

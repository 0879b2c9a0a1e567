//! End-to-end share flow: preference store → selection → catalog → upload →
//! host-app handoff, driven exactly the way the share sheet drives it.

use mockito::Matcher;
use serde_json::json;
use share_core::api::{CapitalClient, ClientConfig};
use share_core::items::{MediaType, ShareItem};
use share_core::storage::{
    handoff_url, keys, MemoryStore, PreferenceStore, SessionContext, ShareMode, SharePayload,
};
use share_core::workflow::ShareWorkflow;
use share_core::ShareError;

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.set_string(keys::USER_TOKEN, "tok");
    store.set_string(keys::LOGGED_IN_USER_NAME, "Görkem");
    store.set_string(keys::USER_RANK, "10");
    store.set_string(keys::COMPANIES, "Acme");
    store.set_string(keys::COMPANIES_JSON, r#"[{"compName":"Acme","compID":5}]"#);
    store
}

fn client_for(server: &mockito::ServerGuard) -> CapitalClient {
    CapitalClient::new(ClientConfig::with_base_url(server.url())).unwrap()
}

#[tokio::test]
async fn test_full_share_flow_ends_in_update_submission() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/account/projects/all")
        .match_query(Matcher::UrlEncoded("compID".into(), "5".into()))
        .with_status(200)
        .with_body(
            r#"{"success": true, "data": {"projects": [
                {"appID": 42, "appTitle": "Roof", "appCode": "RF", "compID": 5, "compName": "Acme"}
            ]}}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/user/account/projects/42")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"success": true, "data": {"project": {
                "compID": 5, "compAdrID": 77,
                "requiredDocuments": [
                    {"documentID": 1, "documentName": "Invoice", "isRequired": true, "isAdded": false},
                    {"documentID": 2, "documentName": "Contract", "isRequired": true, "isAdded": true}
                ],
                "documents": [{"documentID": 900, "documentType": "Contract"}]
            }}}"#,
        )
        .create_async()
        .await;
    let upload_mock = server
        .mock("PUT", "/user/account/company/documentUpdate")
        .match_body(Matcher::PartialJson(json!({
            "compID": 5,
            "documentID": 900,
            "documentType": 2,
        })))
        .with_status(200)
        .with_body(r#"{"success": true, "message": "Belge güncellendi"}"#)
        .create_async()
        .await;

    // Session snapshot the host app left behind
    let mut store = seeded_store();
    let session = SessionContext::load(&store);
    let client = client_for(&server);
    let mut workflow = ShareWorkflow::new(session);

    // company → project → document type, each step applying its fetch
    let acme = workflow.companies()[0].clone();
    let ticket = workflow.set_company(acme);
    let fetched = client.list_projects("tok", 5).await;
    workflow.apply_projects(ticket, fetched).unwrap();
    assert_eq!(workflow.projects().len(), 1);

    let roof = workflow.projects()[0].clone();
    let ticket = workflow.set_project(roof).unwrap();
    let fetched = client.fetch_project_detail("tok", 42).await;
    workflow.apply_documents(ticket, fetched).unwrap();

    workflow.set_document_type(2).unwrap();
    workflow.set_note("Not ekle..."); // untouched placeholder

    // Items collected by the OS share sheet
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contract.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();
    let items = vec![ShareItem::File {
        uri: path.to_str().unwrap().to_string(),
        media_type: MediaType::File,
    }];

    let outcome = workflow.submit(&client, &items).await.unwrap();
    assert!(outcome.success);
    upload_mock.assert_async().await;
    assert!(!workflow.is_submitting());

    // Hand the payload back to the host app
    let payload = SharePayload {
        mode: ShareMode::Project,
        account: workflow.session().account_name.clone(),
        folder: workflow.selection().project.as_ref().unwrap().name.clone(),
        share_with: workflow
            .selection()
            .document_type
            .as_ref()
            .unwrap()
            .document_name
            .clone(),
        text: Some(workflow.selection().note.clone()),
        items,
    };
    payload.write_to(&mut store).unwrap();

    let stored: serde_json::Value =
        serde_json::from_str(&store.get_string(keys::SHARE_MEDIA_JSON).unwrap()).unwrap();
    assert_eq!(stored["account"], "Acme");
    assert_eq!(stored["folder"], "Roof");
    assert_eq!(stored["shareWith"], "Contract");
    assert!(stored.get("text").is_none()); // placeholder note dropped

    assert_eq!(
        handoff_url("com.office701.articapital.ShareExtension"),
        "ShareMedia-com.office701.articapital://"
    );
}

#[tokio::test]
async fn test_preconditions_block_before_any_network_call() {
    let mut server = mockito::Server::new_async().await;
    let add_mock = server
        .mock("POST", "/user/account/projects/documentAdd")
        .expect(0)
        .create_async()
        .await;
    let update_mock = server
        .mock("PUT", "/user/account/company/documentUpdate")
        .expect(0)
        .create_async()
        .await;

    let store = seeded_store();
    let client = client_for(&server);
    let mut workflow = ShareWorkflow::new(SessionContext::load(&store));

    // Nothing selected yet: company precondition fires first
    let err = workflow.submit(&client, &[]).await.unwrap_err();
    assert!(matches!(err, ShareError::NoCompanySelected));

    add_mock.assert_async().await;
    update_mock.assert_async().await;
}

#[tokio::test]
async fn test_duplicate_failure_keeps_selection_for_retry() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/account/projects/all")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"success": true, "data": {"projects": [
                {"appID": 42, "appTitle": "Roof", "appCode": "RF", "compID": 5, "compName": "Acme"}
            ]}}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/user/account/projects/42")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"success": true, "data": {"project": {
                "compID": 5, "compAdrID": 77,
                "requiredDocuments": [
                    {"documentID": 1, "documentName": "Invoice", "isRequired": true, "isAdded": false},
                    {"documentID": 2, "documentName": "Contract", "isRequired": true, "isAdded": false}
                ],
                "documents": []
            }}}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/user/account/projects/documentAdd")
        .with_status(200)
        .with_body(r#"{"success": false, "message": "Duplicate", "statusCode": 409}"#)
        .create_async()
        .await;

    let store = seeded_store();
    let client = client_for(&server);
    let mut workflow = ShareWorkflow::new(SessionContext::load(&store));

    let acme = workflow.companies()[0].clone();
    let ticket = workflow.set_company(acme);
    let fetched = client.list_projects("tok", 5).await;
    workflow.apply_projects(ticket, fetched).unwrap();
    let roof = workflow.projects()[0].clone();
    let ticket = workflow.set_project(roof).unwrap();
    let fetched = client.fetch_project_detail("tok", 42).await;
    workflow.apply_documents(ticket, fetched).unwrap();
    workflow.set_document_type(2).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contract.pdf");
    std::fs::write(&path, b"x").unwrap();
    let items = vec![ShareItem::File {
        uri: path.to_str().unwrap().to_string(),
        media_type: MediaType::File,
    }];

    let err = workflow.submit(&client, &items).await.unwrap_err();
    let ShareError::Api { message } = err else {
        panic!("expected API-level failure");
    };
    assert!(message.contains("Duplicate") && message.contains("409"));

    // Selection untouched: the user switches document type and retries
    // without re-selecting company or project
    assert!(workflow.selection().company.is_some());
    assert_eq!(workflow.selection().project.as_ref().unwrap().id, 42);
    assert!(!workflow.is_submitting());
    workflow.set_document_type(1).unwrap();
    assert!(workflow.validate(&items).is_ok());
}

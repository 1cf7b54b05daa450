//! API client behavior against a mock backend: success envelopes, backend
//! failures, and malformed bodies all resolve locally at the call site.

use fitscope_core::api::{AdminClient, AnalysisClient, ConversationClient, DocsClient, SheetsClient};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_submit_transcript_returns_validated_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analysis/transcript"))
        .and(body_json(json!({"transcript": "we met Acme on Tuesday"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": {"customerName": "Acme Corp", "fitScore": 85}
        })))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(&server.uri());
    let analysis = client
        .submit_transcript("we met Acme on Tuesday", None)
        .await
        .unwrap();

    assert_eq!(analysis.display_name(), "Acme Corp");
    assert_eq!(analysis.fit_score(), Some(85));
}

#[tokio::test]
async fn test_backend_reported_failure_surfaces_its_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analysis/transcript"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "transcript too short"
        })))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(&server.uri());
    let err = client.submit_transcript("hi", None).await.unwrap_err();
    assert!(err.to_string().contains("transcript too short"));
}

#[tokio::test]
async fn test_invalid_analysis_is_rejected_at_the_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analysis/transcript"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": {"fitScore": 85}
        })))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(&server.uri());
    let err = client.submit_transcript("anonymous", None).await.unwrap_err();
    assert!(err.to_string().contains("customer name"));
}

#[tokio::test]
async fn test_history_passes_limit_and_unpacks_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/analysis/history"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"customerName": "Acme Corp", "fitScore": 85},
                {"customerName": "Beta Inc", "fitScore": 60}
            ]
        })))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(&server.uri());
    let history = client.history(5).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].display_name(), "Beta Inc");
}

#[tokio::test]
async fn test_transport_error_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/analysis/history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(&server.uri());
    assert!(client.history(10).await.is_err());
}

#[tokio::test]
async fn test_malformed_body_is_an_error_not_a_panic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/analysis/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = AnalysisClient::new(&server.uri());
    assert!(client.history(10).await.is_err());
}

#[tokio::test]
async fn test_conversation_query_carries_continuation_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/conversation/query"))
        .and(body_json(json!({
            "query": "why is the score low?",
            "analysisId": "a-17",
            "conversationId": "c-3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "In summary, integrations are missing.",
            "conversationId": "c-3"
        })))
        .mount(&server)
        .await;

    let client = ConversationClient::new(&server.uri());
    let reply = client
        .query("why is the score low?", Some("a-17"), Some("c-3"))
        .await
        .unwrap();

    assert_eq!(reply.text, "In summary, integrations are missing.");
    assert_eq!(reply.conversation_id.as_deref(), Some("c-3"));
}

#[tokio::test]
async fn test_docs_flow_from_folder_to_extract() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/docs/analysis-folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": "folder-1", "name": "Analysis Sources"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/list"))
        .and(query_param("folderId", "folder-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": "doc-1", "name": "Acme kickoff call", "modifiedTime": "2026-08-01"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/docs/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": "doc-1", "name": "Acme kickoff call", "content": "notes"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/docs/extract"))
        .and(body_json(json!({"documentId": "doc-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "content": "Acme has 120 field techs and wants scheduling."
        })))
        .mount(&server)
        .await;

    let client = DocsClient::new(&server.uri());
    let folder = client.analysis_folder().await.unwrap();
    let docs = client.list(Some(&folder.id)).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(client.get("doc-1").await.unwrap().name, "Acme kickoff call");

    let transcript = client.extract(&docs[0].id).await.unwrap();
    assert!(transcript.contains("field techs"));
}

#[tokio::test]
async fn test_doc_search_escapes_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/docs/search"))
        .and(query_param("query", "roofing & solar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": []
        })))
        .mount(&server)
        .await;

    let client = DocsClient::new(&server.uri());
    let docs = client.search("roofing & solar", None).await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_sheet_data_stringifies_cells() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sheets/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": "sheet-1", "name": "Won deals"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sheets/data"))
        .and(query_param("spreadsheetId", "sheet-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "range": "A1:C2",
            "values": [["Customer", "Score", "Won"], ["Acme Corp", 85, true]]
        })))
        .mount(&server)
        .await;

    let client = SheetsClient::new(&server.uri());
    let sheets = client.list().await.unwrap();
    let data = client.data(&sheets[0].id, None).await.unwrap();
    assert_eq!(data.range.as_deref(), Some("A1:C2"));
    assert_eq!(data.rows[1], vec!["Acme Corp", "85", "true"]);
}

#[tokio::test]
async fn test_template_crud_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/config/templates"))
        .and(body_json(json!({"name": "intro", "content": "Hi {name}"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": "t-1", "name": "intro", "content": "Hi {name}"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/config/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": "t-1", "name": "intro", "content": "Hi {name}"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/config/templates/t-1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = AdminClient::new(&server.uri());
    let created = client.create_template("intro", "Hi {name}").await.unwrap();
    assert_eq!(created.id, "t-1");

    let templates = client.templates().await.unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name, "intro");

    client.delete_template("t-1").await.unwrap();
}

#[tokio::test]
async fn test_dashboard_trends_unpack() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/trends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"label": "May", "value": 62.5},
                {"label": "June", "value": 71.0}
            ]
        })))
        .mount(&server)
        .await;

    let client = AdminClient::new(&server.uri());
    let trends = client.trends().await.unwrap();
    assert_eq!(trends.len(), 2);
    assert_eq!(trends[1].label, "June");
}

#[tokio::test]
async fn test_api_config_get_and_put() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"provider": "openai", "endpoint": "https://api.openai.com"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/config/api"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = AdminClient::new(&server.uri());
    let mut config = client.api_config().await.unwrap();
    assert_eq!(config.provider.as_deref(), Some("openai"));

    config.provider = Some("anthropic".to_string());
    client.set_api_config(&config).await.unwrap();
}

#[tokio::test]
async fn test_health_reflects_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = AdminClient::new(&server.uri());
    assert!(client.health().await.unwrap());
}

//! Advanced-capabilities contract tests: request shapes, status branching,
//! clone lifecycle, and the polymorphic suggestions payload.

use serde_json::json;
use wiremock::matchers::{ body_json, method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

use thor_console::api::new_client;
use thor_console::capabilities::CapabilitiesController;
use thor_console::error::ControlError;
use thor_console::models::capabilities::{ AnalysisReport, StatusBadge, Suggestions };

async fn controller(mock_server: &MockServer) -> CapabilitiesController {
    let api = new_client(&mock_server.uri(), None).unwrap();
    CapabilitiesController::new(api)
}

#[tokio::test]
async fn generate_code_posts_description_and_language() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/generate-code"))
        .and(body_json(json!({"description": "fizzbuzz", "language": "rust"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "success", "code": "fn main() {}"})
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    let generated = caps.generate_code("fizzbuzz", "rust").await.unwrap();
    assert_eq!(generated.language, "rust");
    assert_eq!(generated.code, "fn main() {}");
}

#[tokio::test]
async fn error_status_surfaces_the_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/generate-code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "error", "message": "Error generating code: quota exceeded"})
            )
        )
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    match caps.generate_code("anything", "python").await {
        Err(ControlError::Backend(detail)) => assert!(detail.contains("quota exceeded")),
        other => panic!("expected backend error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn structured_analysis_is_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/analyze-code"))
        .and(body_json(json!({"code": "x = 1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                    "status": "success",
                    "analysis": {
                        "issues": ["unused variable"],
                        "improvements": ["add tests"],
                        "summary": "minor issues"
                    }
                })
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    match caps.analyze_code("x = 1").await.unwrap() {
        AnalysisReport::Structured(analysis) => {
            assert_eq!(analysis.issues, vec!["unused variable"]);
            assert_eq!(analysis.summary.as_deref(), Some("minor issues"));
        }
        other => panic!("expected structured analysis, got {:?}", other),
    }
}

#[tokio::test]
async fn free_text_analysis_is_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/analyze-code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "success", "analysis": "looks fine to me"})
            )
        )
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    match caps.analyze_code("y = 2").await.unwrap() {
        AnalysisReport::Text(text) => assert_eq!(text, "looks fine to me"),
        other => panic!("expected text analysis, got {:?}", other),
    }
}

#[tokio::test]
async fn dataset_documents_are_pretty_printed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/create-dataset"))
        .and(body_json(json!({"description": "users", "format": "json", "size": 2})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "success", "dataset": [{"id": 1}, {"id": 2}]})
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    let preview = caps.create_dataset("users", "json", 2).await.unwrap();
    assert_eq!(preview.format, "json");
    assert!(preview.body.contains("\"id\": 1"));
}

#[tokio::test]
async fn network_script_returns_script_and_explanation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/network-scan"))
        .and(body_json(json!({"target_description": "ping the local subnet"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                    "status": "success",
                    "result": {"script": "import socket", "explanation": "opens a socket"}
                })
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    let bundle = caps.network_script("ping the local subnet").await.unwrap();
    assert_eq!(bundle.script, "import socket");
    assert_eq!(bundle.explanation.as_deref(), Some("opens a socket"));
}

#[tokio::test]
async fn clone_listing_maps_to_rows_with_badges() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/list-clones"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                    "status": "success",
                    "clones": [
                        {
                            "name": "THOR1",
                            "description": "baseline",
                            "base_version": "1.0",
                            "created_at": "2024-01-01T00:00:00",
                            "is_active": false,
                            "capabilities": {}
                        },
                        {
                            "name": "THOR2",
                            "description": "networking focus",
                            "base_version": "1.0",
                            "created_at": "2024-02-01T00:00:00",
                            "is_active": true,
                            "capabilities": {"network": true, "code": true}
                        }
                    ]
                })
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    let rows = caps.list_clones().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].badge, StatusBadge::Dormant);
    assert_eq!(rows[1].badge, StatusBadge::Active);
    assert_eq!(rows[1].capability_count, 2);
}

#[tokio::test]
async fn clone_lifecycle_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/thor/create-clone"))
        .and(body_json(json!({"description": "a careful reviewer"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "success", "clone": {"name": "THOR3"}})
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api/thor/update-clone"))
        .and(
            body_json(
                json!({
                    "clone_name": "THOR3",
                    "updates": {"capabilities": {"review": true}}
                })
            )
        )
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "success", "message": "Clone THOR3 updated"})
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api/thor/activate-clone"))
        .and(body_json(json!({"clone_name": "THOR3"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "success", "message": "Clone THOR3 activated"})
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api/thor/deactivate-clones"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({"status": "success", "message": "All clones deactivated"})
            )
        )
        .expect(1)
        .mount(&mock_server).await;

    let mut caps = controller(&mock_server).await;
    let name = caps.create_clone("a careful reviewer").await.unwrap();
    assert_eq!(name, "THOR3");

    caps.update_clone("THOR3", None, Some(r#"{"review": true}"#)).await.unwrap();
    caps.activate_clone("THOR3").await.unwrap();
    caps.deactivate_clones().await.unwrap();
}

#[tokio::test]
async fn suggestions_accept_all_three_shapes() {
    for body in [
        json!({"status": "success", "suggestions": "write more tests"}),
        json!({"status": "success", "suggestions": {"text": "write more tests"}}),
        json!({
            "status": "success",
            "suggestions": [
                {
                    "title": "Testing",
                    "description": "write more tests",
                    "priority": "high",
                    "implementation": "add a CI job"
                }
            ]
        }),
    ] {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/thor/suggest-improvements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server).await;

        let mut caps = controller(&mock_server).await;
        let suggestions = caps.suggest_improvements().await.unwrap();
        match suggestions {
            Suggestions::Text(text) | Suggestions::Wrapped { text } => {
                assert_eq!(text, "write more tests");
            }
            Suggestions::Detailed(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].title, "Testing");
            }
        }
    }
}

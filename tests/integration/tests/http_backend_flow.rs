//! Integration test: orchestrator against a real HTTP backend.
//!
//! Uses the universal-link prover from passgate-prover and the reqwest
//! backend from passgate-backend, with wiremock standing in for the
//! verification service.

use passgate_backend::{HttpBackend, HttpBackendConfig};
use passgate_core::{
    LifecycleState, ProofEvent, SessionConfig, SessionIdGenerator, UuidSessionIds,
};
use passgate_prover::UniversalLinkProver;
use passgate_session::Orchestrator;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn orchestrator_for(server: &MockServer) -> Orchestrator {
    let mut config = SessionConfig {
        backend_url: server.uri(),
        ..Default::default()
    };
    config.app.app_name = "Age Gate".into();
    config.app.scope = "age-gate".into();

    let backend = HttpBackend::new(
        HttpBackendConfig::from_session_config(&config, Duration::from_secs(5))
            .with_health_header("ngrok-skip-browser-warning", "true"),
    )
    .unwrap();
    let ids: Arc<dyn SessionIdGenerator> = Arc::new(UuidSessionIds);

    Orchestrator::new(
        config,
        Arc::new(UniversalLinkProver::default()),
        Arc::new(backend),
        ids,
    )
    .unwrap()
}

#[tokio::test]
async fn test_universal_link_points_at_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("ngrok-skip-browser-warning", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = orchestrator_for(&server).await;
    orchestrator.start().await.unwrap();
    assert!(orchestrator.connectivity_settled().await);

    let request = orchestrator.present().unwrap();
    let link = Url::parse(&request.universal_link).unwrap();
    assert_eq!(link.host_str(), Some("redirect.self.xyz"));

    let (_, encoded) = link
        .query_pairs()
        .find(|(k, _)| k == "selfApp")
        .expect("descriptor parameter");
    let descriptor: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(descriptor["appName"], "Age Gate");
    assert_eq!(descriptor["scope"], "age-gate");
    assert_eq!(descriptor["endpoint"], format!("{}/verify", server.uri()));
    assert_eq!(descriptor["userId"], request.session_id.as_str());
    assert_eq!(descriptor["userIdType"], "uuid");
    assert_eq!(descriptor["disclosures"]["minimumAge"], 18);
    assert_eq!(request.qr_payload, encoded);
}

#[tokio::test]
async fn test_proof_persisted_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = orchestrator_for(&server).await;
    orchestrator.start().await.unwrap();
    let session_id = orchestrator.session().unwrap().id().clone();

    let outcome = orchestrator
        .handle_proof_event(ProofEvent::succeeded(session_id.clone(), serde_json::json!({})))
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_durable());
    assert_eq!(outcome.source, "self-protocol");
    assert_eq!(orchestrator.state(), Some(&LifecycleState::Succeeded));

    let requests = server.received_requests().await.unwrap();
    let persisted = requests
        .iter()
        .find(|r| r.url.path() == "/verify")
        .expect("persistence request");
    let body: serde_json::Value = serde_json::from_slice(&persisted.body).unwrap();
    assert_eq!(body["sessionCorrelationId"], session_id.as_str());
    assert_eq!(body["claimMetadata"]["scope"], "age-gate");
}

#[tokio::test]
async fn test_backend_outage_then_retry_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut orchestrator = orchestrator_for(&server).await;
    orchestrator.start().await.unwrap();
    // No health mock: the probe fails but the session carries on.
    assert!(!orchestrator.connectivity_settled().await);

    let first = orchestrator.session().unwrap().id().clone();
    let outcome = orchestrator
        .handle_proof_event(ProofEvent::succeeded(first.clone(), serde_json::json!({})))
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.verified);
    assert!(outcome.persistence_error.unwrap().contains("maintenance"));

    orchestrator.retry().await.unwrap();
    let second = orchestrator.session().unwrap().id().clone();
    assert_ne!(first, second);

    let outcome = orchestrator
        .handle_proof_event(ProofEvent::succeeded(second, serde_json::json!({})))
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_durable());
}

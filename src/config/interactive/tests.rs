use super::{describe_config, test_ollama_connection};
use super::load_existing_config as load_existing_config_impl;
use crate::config::{ApiKey, Config, Credentials};
use tempfile::TempDir;

#[test]
fn load_existing_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config =
        load_existing_config_impl(temp_dir.path().to_path_buf()).expect("config loaded successfully");
    assert!(!config.embedding.host.is_empty());
    assert!(config.embedding.port > 0);
    assert!(!config.embedding.model.is_empty());
    assert!(config.embedding.batch_size > 0);
    assert_eq!(config.get_base_dir(), temp_dir.path());
}

#[test]
fn unreadable_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    std::fs::write(temp_dir.path().join("config.toml"), "[embedding\nport = ")
        .expect("should write config");

    let config =
        load_existing_config_impl(temp_dir.path().to_path_buf()).expect("falls back to defaults");
    assert_eq!(config.embedding, Config::default().embedding);
    assert_eq!(config.get_base_dir(), temp_dir.path());
}

#[test]
fn description_never_prints_keys() {
    let config = Config::default().with_credentials(Credentials {
        embedding_api_key: None,
        llm_api_key: ApiKey::new("gsk_topsecret"),
    });
    let description = describe_config(&config);

    assert!(!description.contains("gsk_topsecret"));
    assert!(description.contains("LLM API Key: set"));
    assert!(description.contains("Embedding API Key: not set"));
    assert!(description.contains("Max Documents: 20"));
    assert!(description.contains("Chunking: 1000 chars, 200 overlap"));
}

fn config_for(server: &wiremock::MockServer) -> Config {
    let mut config = Config::default();
    config.embedding.host = server.address().ip().to_string();
    config.embedding.port = server.address().port();
    config
}

#[tokio::test]
async fn connection_test_pings_model_list() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/api/tags"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "models": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let reachable = tokio::task::spawn_blocking(move || test_ollama_connection(&config))
        .await
        .expect("task joins");

    assert!(reachable);
}

#[tokio::test]
async fn connection_test_reports_server_errors() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/api/tags"))
        .respond_with(wiremock::ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let reachable = tokio::task::spawn_blocking(move || test_ollama_connection(&config))
        .await
        .expect("task joins");

    assert!(!reachable);
}

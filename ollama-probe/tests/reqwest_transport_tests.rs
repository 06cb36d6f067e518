use std::time::Duration;

use ollama_probe::{Error, OllamaClient, ProbeConfig, ProbeOutcome, ProbeRunner, Result};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_runner_against_http_server() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"models": ["llama3:8b"]}"#))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(serde_json::json!({
            "model": "llama3:8b",
            "messages": [{"role": "user", "content": "Say hello"}],
            "stream": false
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"message": {"role": "assistant", "content": "hello there"}}"#),
        )
        .mount(&server)
        .await;

    let config = ProbeConfig::default().with_ollama_host(&server.uri())?;
    let runner = ProbeRunner::from_config(config)?;

    let mut out = Vec::new();
    let report = runner.run(&mut out).await?;
    let text = String::from_utf8_lossy(&out);

    assert!(report.all_passed(), "unexpected report: {report:?}");
    assert!(text.contains("API tags response: 200"));
    assert!(text.contains(r#"Available models: {"models":["llama3:8b"]}"#));
    assert!(text.contains("Chat response: hello there"));
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_not_a_transport_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;

    let client = OllamaClient::builder().base_url(server.uri()).build()?;
    let response = client
        .chat_simple(Default::default(), Duration::from_secs(5))
        .await?;

    assert_eq!(response.status, 503);
    assert_eq!(response.text(), "service unavailable");
    Ok(())
}

#[tokio::test]
async fn test_api_key_is_sent_as_bearer_token() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = OllamaClient::builder()
        .base_url(server.uri())
        .api_key("secret")
        .build()?;
    let response = client.list_models(Duration::from_secs(5)).await?;

    assert_eq!(response.status, 200);
    Ok(())
}

#[tokio::test]
async fn test_slow_listing_times_out_and_skips_chat() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ProbeConfig::default()
        .with_ollama_host(&server.uri())?
        .with_tags_timeout(Duration::from_millis(100));
    let runner = ProbeRunner::from_config(config)?;

    let mut out = Vec::new();
    let report = runner.run(&mut out).await?;
    let text = String::from_utf8_lossy(&out);

    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("Error testing Ollama:"));
    assert!(matches!(report.tags, ProbeOutcome::Failed { .. }));
    assert_eq!(report.chat, ProbeOutcome::Skipped);
    Ok(())
}

#[tokio::test]
async fn test_refused_connection_is_a_transport_error() -> Result<()> {
    // Nothing listens on the discard port.
    let client = OllamaClient::builder()
        .base_url("http://127.0.0.1:9")
        .build()?;

    let result = client.list_models(Duration::from_secs(2)).await;
    assert!(matches!(result, Err(Error::Transport(_))));
    Ok(())
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ollama/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"models": []}"#))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ollama/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message": {"content": "hi"}}"#))
        .mount(&server)
        .await;

    let config = ProbeConfig::default().with_ollama_host(&format!("{}/ollama", server.uri()))?;
    let runner = ProbeRunner::from_config(config)?;

    let mut out = Vec::new();
    let report = runner.run(&mut out).await?;

    assert!(report.all_passed(), "unexpected report: {report:?}");
    assert!(String::from_utf8_lossy(&out).contains("Chat response: hi"));
    Ok(())
}

#[tokio::test]
async fn test_builder_base_url_without_trailing_slash_keeps_prefix() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ollama/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = OllamaClient::builder()
        .base_url(format!("{}/ollama", server.uri()))
        .build()?;
    let response = client.list_models(Duration::from_secs(5)).await?;

    assert_eq!(response.status, 200);
    Ok(())
}

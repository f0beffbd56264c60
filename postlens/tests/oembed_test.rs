use postlens::error::PipelineError;
use postlens::extract::EXTRACTION_FALLBACK;
use postlens::oembed::{fetch_post_content, OembedClient};

fn allowed_prefixes() -> Vec<String> {
    vec![
        "https://twitter.com/".to_string(),
        "https://x.com/".to_string(),
    ]
}

#[tokio::test]
async fn test_fetch_post_content_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/")
        .match_query(mockito::Matcher::UrlEncoded(
            "url".into(),
            "https://x.com/example/status/1".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "author_name": "ExampleUser",
                "author_url": "https://twitter.com/ExampleUser",
                "html": "<blockquote class=\"twitter-tweet\"><p>Hello</p><p>world</p></blockquote>",
                "provider_name": "Twitter"
            }"#,
        )
        .create_async()
        .await;

    let client = OembedClient::new(server.url());

    let result = fetch_post_content(
        &client,
        &allowed_prefixes(),
        "https://x.com/example/status/1",
    )
    .await;

    assert!(result.is_ok());
    let content = result.unwrap();
    assert_eq!(content.author_name, "ExampleUser");
    assert_eq!(content.text, "Hello world");
    assert_eq!(content.source_url, "https://x.com/example/status/1");
    assert!(content.embed_html.contains("twitter-tweet"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_extraction_fallback_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;

    // Embed HTML without the expected quote structure
    let _mock = server
        .mock("GET", "/")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"author_name": "ExampleUser", "html": "<div>opaque widget</div>"}"#)
        .create_async()
        .await;

    let client = OembedClient::new(server.url());

    let content = fetch_post_content(
        &client,
        &allowed_prefixes(),
        "https://x.com/example/status/2",
    )
    .await
    .expect("fallback text is a valid outcome");

    assert_eq!(content.text, EXTRACTION_FALLBACK);
}

#[tokio::test]
async fn test_provider_not_found_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let client = OembedClient::new(server.url());

    let err = fetch_post_content(
        &client,
        &allowed_prefixes(),
        "https://x.com/example/status/404",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[tokio::test]
async fn test_structured_error_body_maps_to_provider_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"errors": [{"message": "Sorry, that page does not exist"}]}"#)
        .create_async()
        .await;

    let client = OembedClient::new(server.url());

    let err = fetch_post_content(
        &client,
        &allowed_prefixes(),
        "https://x.com/example/status/3",
    )
    .await
    .unwrap_err();

    match err {
        PipelineError::Provider(msg) => {
            assert!(msg.contains("Sorry, that page does not exist"));
        }
        other => panic!("expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unstructured_failure_maps_to_unavailable() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .with_body("upstream melted")
        .create_async()
        .await;

    let client = OembedClient::new(server.url());

    let err = fetch_post_content(
        &client,
        &allowed_prefixes(),
        "https://x.com/example/status/4",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Unavailable(_)));
}

#[tokio::test]
async fn test_disallowed_url_fails_without_network_call() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/")
        .expect(0)
        .create_async()
        .await;

    let client = OembedClient::new(server.url());

    let err = fetch_post_content(
        &client,
        &allowed_prefixes(),
        "https://example.com/not-a-post",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));

    // The provider must never have been contacted
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_url_fails_validation() {
    let mut server = mockito::Server::new_async().await;

    let mock = server.mock("GET", "/").expect(0).create_async().await;

    let client = OembedClient::new(server.url());

    let err = fetch_post_content(&client, &allowed_prefixes(), "")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    mock.assert_async().await;
}

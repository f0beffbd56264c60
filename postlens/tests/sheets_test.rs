use postlens::error::PipelineError;
use postlens::sheets::{append_record, Record, SheetsClient};

fn full_record() -> Record {
    Record {
        author_name: "ExampleUser".to_string(),
        text: "Hello world".to_string(),
        sentiment: "neutral".to_string(),
        summary: "Bir selamlama gönderisi.".to_string(),
        analyzed_at: "7 Ağustos 2026 14:30".to_string(),
        source_url: "https://x.com/example/status/1".to_string(),
    }
}

fn client_for(server: &mockito::Server) -> SheetsClient {
    SheetsClient::new(server.url(), "fake-token", "sheet-id", "Sheet1!A:F")
}

#[tokio::test]
async fn test_append_record_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/sheet-id/values/Sheet1!A:F:append")
        .match_query(mockito::Matcher::UrlEncoded(
            "valueInputOption".into(),
            "USER_ENTERED".into(),
        ))
        .match_body(mockito::Matcher::Regex("Hello world".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"updates": {"updatedRange": "Sheet1!A5:F5", "updatedRows": 1}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let data = append_record(&client, &full_record())
        .await
        .expect("append should succeed");

    assert_eq!(data["updates"]["updatedRows"], 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_append_is_not_idempotent() {
    let mut server = mockito::Server::new_async().await;

    // Two identical calls are two appends; the provider is hit twice.
    let mock = server
        .mock("POST", "/sheet-id/values/Sheet1!A:F:append")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"updates": {"updatedRows": 1}}"#)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    let record = full_record();

    append_record(&client, &record).await.expect("first append");
    append_record(&client, &record).await.expect("second append");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_permission_denied_maps_to_permission_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/sheet-id/values/Sheet1!A:F:append")
        .match_query(mockito::Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error": {"status": "PERMISSION_DENIED"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = append_record(&client, &full_record()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Permission(_)));
}

#[tokio::test]
async fn test_missing_spreadsheet_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/sheet-id/values/Sheet1!A:F:append")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": {"status": "NOT_FOUND"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = append_record(&client, &full_record()).await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[tokio::test]
async fn test_other_failures_map_to_unavailable() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/sheet-id/values/Sheet1!A:F:append")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_body("backend error")
        .create_async()
        .await;

    let client = client_for(&server);

    let err = append_record(&client, &full_record()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Unavailable(_)));
}

#[tokio::test]
async fn test_incomplete_record_fails_without_network_call() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/sheet-id/values/Sheet1!A:F:append")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);

    let mut record = full_record();
    record.summary.clear();

    let err = append_record(&client, &record).await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));

    mock.assert_async().await;
}

use std::sync::Arc;

use postlens::llm::remote::RemoteLlmProvider;
use postlens::oembed::{OembedClient, DEFAULT_OEMBED_URL};
use postlens::pipeline::PostWorkflow;
use postlens::sheets::{SheetsClient, DEFAULT_RANGE, DEFAULT_SHEETS_API_URL};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let post_url = std::env::args()
        .nth(1)
        .expect("Usage: test_pipeline <post-url>");

    let api_key = std::env::var("OPENAI_API_KEY")
        .expect("Set OPENAI_API_KEY environment variable");

    let sheet_token = std::env::var("SHEETS_API_TOKEN")
        .expect("Set SHEETS_API_TOKEN environment variable");

    let spreadsheet_id = std::env::var("SPREADSHEET_ID")
        .expect("Set SPREADSHEET_ID environment variable");

    // Allow custom base URL or use OpenAI default
    let base_url = std::env::var("LLM_BASE_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

    let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

    println!("\n{}", "=".repeat(60));
    println!("Testing PostLens pipeline");
    println!("Post URL: {}", post_url);
    println!("Model: {}", model);
    println!("{}", "=".repeat(60));

    let llm: Arc<dyn postlens::llm::LlmProvider> = Arc::new(
        RemoteLlmProvider::new(&base_url, &api_key, &model).with_defaults(30, 100, 0.7),
    );

    let workflow = PostWorkflow::new(
        Arc::new(OembedClient::new(DEFAULT_OEMBED_URL)),
        llm.clone(),
        llm,
        Arc::new(SheetsClient::new(
            DEFAULT_SHEETS_API_URL,
            sheet_token,
            spreadsheet_id,
            DEFAULT_RANGE,
        )),
        vec![
            "https://twitter.com/".to_string(),
            "https://x.com/".to_string(),
        ],
    );

    println!("\n[Step 1] Fetching post content...");
    let content = match workflow.fetch(&post_url).await {
        Ok(content) => {
            println!("✓ Success!");
            println!("  Author: {}", content.author_name);
            println!("  Text: {}", content.text);
            content
        }
        Err(e) => {
            eprintln!("✗ Failed: {}", e);
            return;
        }
    };

    println!("\n[Step 2] Analyzing post text...");
    let analysis = match workflow.analyze(&content).await {
        Ok(analysis) => {
            println!("✓ Success!");
            println!("  Sentiment: {}", analysis.sentiment);
            println!("  Summary: {}", analysis.summary);
            println!("  Analyzed at: {}", analysis.analyzed_at);
            analysis
        }
        Err(e) => {
            eprintln!("✗ Failed: {}", e);
            return;
        }
    };

    println!("\n[Step 3] Appending record to sheet...");
    let record = PostWorkflow::assemble(&content, &analysis);
    match workflow.append(&record).await {
        Ok(data) => {
            println!("✓ Success!");
            println!("  Response: {}", data);
        }
        Err(e) => {
            eprintln!("✗ Failed: {}", e);
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Pipeline run completed");
    println!("{}", "=".repeat(60));
}

//! Example demonstrating how failures surface as `NetworkResult::Error`.
//!
//! This example shows how to:
//! - Branch exhaustively over the error taxonomy
//! - Recover the original cause of an unclassified failure
//! - Switch between status-first and decode-regardless handling
//! - Plug in a custom error classifier
//!
//! Run with: `cargo run --example error_handling`

use netresult::{Client, Error, ErrorClassifier, NetworkError, NetworkResult, StatusPolicy};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    id: u32,
    title: String,
}

fn describe<T: std::fmt::Debug>(result: &NetworkResult<T>) {
    match result {
        NetworkResult::Success { data } => println!("Success: {:?}", data),
        NetworkResult::Error { error, message } => {
            match error {
                NetworkError::Timeout => println!("Timed out"),
                NetworkError::NoInternet => println!("Server unreachable"),
                NetworkError::IoException => println!("Connection dropped"),
                NetworkError::ServerError { code, body } => {
                    println!("Server error {}: {:?}", code, body);
                }
                NetworkError::UnknownError { cause } => {
                    println!("Unclassified failure: {}", cause);
                }
            }
            println!("  Advisory message: {:?}", message);
        }
    }
}

/// Treats every 4xx as the caller's fault and reports it as unknown.
struct ClientErrorsAreBugs;

impl ErrorClassifier for ClientErrorsAreBugs {
    fn classify(&self, error: Error) -> NetworkError {
        match error {
            Error::Status { status, .. } if status.is_client_error() => {
                NetworkError::unknown(error)
            }
            other => netresult::DefaultErrorClassifier.classify(other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("netresult=info")
        .init();

    let client = Client::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .build()?;

    println!("=== Example 1: HTTP Errors ===");
    describe(&client.get::<Post>("/posts/999999").await);
    println!();

    println!("=== Example 2: Deserialization Errors ===");
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct WrongSchema {
        nonexistent_field: String,
    }
    describe(&client.get::<WrongSchema>("/posts/1").await);
    println!();

    println!("=== Example 3: Unreachable Server ===");
    let bad_client = Client::builder()
        .base_url("https://this-domain-does-not-exist-12345.com")?
        .build()?;
    describe(&bad_client.get::<serde_json::Value>("/").await);
    println!();

    println!("=== Example 4: Decode Regardless of Status ===");
    let forgiving = Client::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .status_policy(StatusPolicy::DecodeRegardless)
        .build()?;
    describe(&forgiving.get::<serde_json::Value>("/posts/999999").await);
    println!();

    println!("=== Example 5: Custom Classifier ===");
    let strict = Client::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .error_classifier(Box::new(ClientErrorsAreBugs))
        .build()?;
    describe(&strict.get::<Post>("/posts/999999").await);

    Ok(())
}

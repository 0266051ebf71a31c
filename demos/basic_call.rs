//! Basic example demonstrating simple GET and POST requests.
//!
//! This example shows how to:
//! - Create a client with basic configuration
//! - Make GET requests with the verb helpers
//! - Make POST requests with the configuration closure
//! - Fetch the raw response when headers matter
//!
//! Run with: `cargo run --example basic_call`

use netresult::{Client, Error, HttpMethod, NetworkResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("netresult=debug,basic_call=info")
        .init();

    let client = Client::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .build()?;

    println!("=== GET Request Example ===");
    match client.get::<Post>("/posts/1").await {
        NetworkResult::Success { data } => {
            println!("Post ID: {}", data.id);
            println!("Title: {}", data.title);
            println!("Body: {}", data.body);
        }
        NetworkResult::Error { error, message } => {
            println!("Failed: {} ({:?})", error, message);
        }
    }
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let created: NetworkResult<Post> = client
        .execute(|spec| {
            spec.set_url("/posts")
                .set_method(HttpMethod::Post)
                .headers([("X-Request-Source", "basic_call")])
                .body(&new_post);
        })
        .await;

    if let Some(post) = created.data() {
        println!("Created post ID: {}", post.id);
        println!("Title: {}", post.title);
    }
    println!();

    println!("=== Raw Response Example ===");
    if let NetworkResult::Success { data: raw } = client
        .execute_raw(|spec| {
            spec.set_url("/posts/1");
        })
        .await
    {
        println!("Status code: {}", raw.status);
        println!("Request latency: {:?}", raw.latency);
        println!("Content-Type: {:?}", raw.header("content-type"));
        println!("Raw response length: {} bytes", raw.body.len());
    }

    Ok(())
}

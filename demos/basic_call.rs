//! Basic example demonstrating decorated and raw calls.
//!
//! This example shows how to:
//! - Create a client with no authentication
//! - Make GET and POST requests that come back decoded
//! - Inspect the last response
//! - Switch the sticky content type
//! - Drop down to the raw transport
//!
//! Run with: `cargo run --example basic_call`

use restspeaker::{Error, NoAuth, RequestOptions, RestSpeaker, Transport};
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
    tracing_subscriber::fmt()
        .with_env_filter("restspeaker=debug,basic_call=info")
        .init();

    let transport = Transport::builder()
        .base_uri("https://jsonplaceholder.typicode.com")?
        .log_curl(true)
        .build()?;
    let mut api = RestSpeaker::with_transport(NoAuth::new(), transport);

    println!("=== GET Request Example ===");
    if let Some(body) = api.get("/posts/1", RequestOptions::new()).await? {
        let post: Post = body.deserialize()?;
        println!("Post ID: {}", post.id);
        println!("Title: {}", post.title);
    }
    if let Some(response) = api.last_response() {
        println!("Status code: {}", response.status);
        println!("Request latency: {:?}", response.latency);
    }
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };
    let created = api.post("/posts", &new_post, RequestOptions::new()).await?;
    println!("Created: {:?}", created);
    println!("Status code: {:?}", api.last_status_code());
    println!();

    println!("=== Sticky Content Type Example ===");
    let text = api
        .set_content_type("text/plain")
        .get("/posts/1", RequestOptions::new())
        .await?;
    println!("Raw text: {:?}", text.as_ref().and_then(|b| b.as_text()));
    api.set_content_type("application/json");
    println!();

    println!("=== Raw Transport Example ===");
    let raw = api
        .transport()
        .get("/posts/2", RequestOptions::new())
        .await?;
    println!("Raw body length: {} bytes", raw.body.len());
    println!("Content-Type: {:?}", raw.header("content-type"));
    println!("Base URI: {:?}", api.config("base_uri"));

    Ok(())
}

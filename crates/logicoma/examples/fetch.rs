//! Fetch a url from the command line and print the decoded response.
//!
//! ```bash
//! cargo run --example fetch -- http://httpbin.org/get
//! ```

use anyhow::Result;
use logicoma::qs::{Query, StringifyOptions};
use logicoma::{Body, HttpOptions, RetryPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://httpbin.org/get".to_string());
    let query = Query::new().push("source", "logicoma");

    let response = logicoma::get(
        &url,
        &query,
        HttpOptions::default(),
        StringifyOptions::default(),
        RetryPolicy::default(),
    )
    .await?;

    println!("status: {}", response.status);
    match response.body {
        Body::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Body::Text(text) => println!("{text}"),
    }
    Ok(())
}

//! Generate an image with the visual API.
//!
//! ```shell
//! VOLC_ACCESSKEY=... VOLC_SECRETKEY=... cargo run --example generate_image -- "a red fox in the snow"
//! ```

use std::env;

use anyhow::Result;
use volcsign_core::{Context, OsEnv};
use volcsign_http_send_reqwest::ReqwestHttpSend;
use volcsign_volcengine::{Client, Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let prompt = env::args()
        .nth(1)
        .unwrap_or_else(|| "a red fox in the snow".to_string());

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let client = Client::new(ctx, &config)?;

    let body = serde_json::json!({
        "req_key": "jimeng_high_aes_general_v21_L",
        "prompt": prompt,
        "width": 512,
        "height": 512,
        "return_url": true,
    });
    let resp = client
        .call(
            [("Action", "CVProcess"), ("Version", "2022-08-31")],
            serde_json::to_vec(&body)?,
        )
        .await?
        .error_for_status()?;

    let value: serde_json::Value = serde_json::from_str(resp.body())?;
    match value["data"]["image_urls"].as_array() {
        Some(urls) => urls.iter().for_each(|url| println!("{url}")),
        None => println!("{}", resp.body()),
    }
    Ok(())
}

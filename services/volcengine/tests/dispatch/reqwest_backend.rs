use std::time::Duration;

use anyhow::Result;
use http::StatusCode;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use volcsign_core::{Context, ErrorKind, StaticEnv};
use volcsign_http_send_reqwest::ReqwestHttpSend;
use volcsign_volcengine::{Client, Config};

use super::QUERY;
use crate::signing::BODY;

/// Serve one canned response and hand back the raw request that was received.
async fn serve_once(response: String) -> Result<(String, oneshot::Receiver<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0; 4096];
        while !is_complete(&raw) {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    Ok((format!("http://{addr}/"), rx))
}

/// Whether the headers and the whole body announced by content-length are in.
fn is_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };
    let len = head
        .lines()
        .find_map(|l| {
            l.to_lowercase()
                .strip_prefix("content-length:")
                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
        })
        .unwrap_or(0);
    body.len() >= len
}

fn client(endpoint: &str) -> Result<Client> {
    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(StaticEnv {
            envs: [
                ("VOLC_ACCESSKEY".to_string(), "AKLTlocal".to_string()),
                ("VOLC_SECRETKEY".to_string(), "secret".to_string()),
            ]
            .into(),
        });
    let config = Config::default().with_endpoint(endpoint).from_env(&ctx);
    Ok(Client::new(ctx, &config)?)
}

#[tokio::test]
async fn test_call_over_reqwest() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let body = r#"{"data":{"url":"https://cdn.example.com/a.png?x=1\u0026y=2"}}"#;
    let (endpoint, received) = serve_once(format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    ))
    .await?;

    let resp = client(&endpoint)?.call(QUERY, BODY).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.body(),
        r#"{"data":{"url":"https://cdn.example.com/a.png?x=1&y=2"}}"#
    );

    let raw = received.await?.to_lowercase();
    assert!(raw.starts_with("post /?action=cvprocess&version=2024-06-06 http/1.1\r\n"));
    assert!(raw.contains("authorization: hmac-sha256 credential=akltlocal/"));
    assert!(raw.contains("signedheaders=content-type;host;x-content-sha256;x-date"));
    assert!(raw.contains("x-date: "));
    assert!(raw.contains("content-type: application/json\r\n"));
    assert!(raw.ends_with(&BODY.to_lowercase()));
    Ok(())
}

#[tokio::test]
async fn test_connect_failure_is_transport_error() -> Result<()> {
    let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;

    let err = client(&format!("http://{addr}/"))?
        .with_timeout(Duration::from_secs(5))
        .call(QUERY, BODY)
        .await
        .expect_err("nobody listens on this port");
    assert_eq!(err.kind(), ErrorKind::Transport);
    Ok(())
}

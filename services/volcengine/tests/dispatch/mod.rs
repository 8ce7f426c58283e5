mod reqwest_backend;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use volcsign_core::{Context, ErrorKind, HttpSend, StaticEnv};
use volcsign_volcengine::{Client, Config};

use crate::signing::{golden_signer, BODY, GOLDEN_AUTHORIZATION};

const QUERY: [(&str, &str); 2] = [("Action", "CVProcess"), ("Version", "2024-06-06")];

/// HttpSend that records every request and answers with a canned response.
#[derive(Debug, Clone)]
pub struct RecordingHttpSend {
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    status: StatusCode,
    body: &'static str,
    delay: Option<Duration>,
}

impl RecordingHttpSend {
    pub fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            requests: Arc::default(),
            status,
            body,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Drain the requests recorded so far.
    pub fn take_requests(&self) -> Vec<http::Request<Bytes>> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl HttpSend for RecordingHttpSend {
    async fn http_send(
        &self,
        req: http::Request<Bytes>,
    ) -> volcsign_core::Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(http::Response::builder()
            .status(self.status)
            .body(Bytes::from_static(self.body.as_bytes()))?)
    }
}

fn static_env(vars: &[(&str, &str)]) -> StaticEnv {
    StaticEnv {
        envs: vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// Client whose signer is pinned to the golden time and credential.
fn golden_client(http: &RecordingHttpSend) -> Result<Client> {
    let ctx = Context::new().with_http_send(http.clone());
    let client = Client::new(ctx.clone(), &Config::default())?;
    Ok(client.with_signer(golden_signer(ctx)))
}

#[tokio::test]
async fn test_call_sends_signed_request() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let http = RecordingHttpSend::new(
        StatusCode::OK,
        r#"{"code":10000,"data":{"image_urls":["https://cdn.example.com/a.png?x=1\u0026y=2"]}}"#,
    );
    let resp = golden_client(&http)?.call(QUERY, BODY).await?;

    assert!(resp.is_success());
    assert_eq!(
        resp.body(),
        r#"{"code":10000,"data":{"image_urls":["https://cdn.example.com/a.png?x=1&y=2"]}}"#
    );

    let requests = http.take_requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method(), Method::POST);
    assert_eq!(
        req.uri().to_string(),
        "https://visual.volcengineapi.com/?Action=CVProcess&Version=2024-06-06"
    );
    assert_eq!(req.headers()[AUTHORIZATION], GOLDEN_AUTHORIZATION);
    assert_eq!(req.headers()["x-date"], "20240606T120000Z");
    assert_eq!(req.headers()["content-type"], "application/json");
    assert!(req.headers().contains_key("x-content-sha256"));
    assert_eq!(req.body().as_ref(), BODY.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_body_without_escapes_is_untouched() -> Result<()> {
    let http = RecordingHttpSend::new(StatusCode::OK, r#"{"msg":"a & b \n c"}"#);
    let resp = golden_client(&http)?.call(QUERY, BODY).await?;

    assert_eq!(resp.body(), r#"{"msg":"a & b \n c"}"#);
    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_returned() -> Result<()> {
    let http = RecordingHttpSend::new(
        StatusCode::UNAUTHORIZED,
        r#"{"code":50400,"message":"Access Denied"}"#,
    );
    let resp = golden_client(&http)?.call(QUERY, BODY).await?;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(!resp.is_success());
    assert_eq!(resp.body(), r#"{"code":50400,"message":"Access Denied"}"#);

    let err = resp.error_for_status().expect_err("401 must be an error");
    assert_eq!(err.kind(), ErrorKind::Upstream);
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_makes_no_call() -> Result<()> {
    let http = RecordingHttpSend::new(StatusCode::OK, "{}");
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_env(static_env(&[]));
    let config = Config::default().from_env(&ctx);
    let client = Client::new(ctx, &config)?;

    let err = client
        .call(QUERY, BODY)
        .await
        .expect_err("call without credential must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialMissing);
    assert!(http.take_requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_empty_access_key_makes_no_call() -> Result<()> {
    let http = RecordingHttpSend::new(StatusCode::OK, "{}");
    let ctx = Context::new().with_http_send(http.clone());
    let config = Config::default()
        .with_access_key_id("")
        .with_secret_access_key("secret");
    let client = Client::new(ctx, &config)?;

    let err = client
        .call(QUERY, BODY)
        .await
        .expect_err("call with empty access key must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialMissing);
    assert!(http.take_requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_credential_from_env() -> Result<()> {
    let http = RecordingHttpSend::new(StatusCode::OK, "{}");
    let ctx = Context::new().with_http_send(http.clone()).with_env(static_env(&[
        ("VOLC_ACCESSKEY", "AKLTfromenv"),
        ("VOLC_SECRETKEY", "secret"),
        ("VOLC_REGION", "cn-beijing"),
    ]));
    let config = Config::default().from_env(&ctx);
    Client::new(ctx, &config)?.call(QUERY, BODY).await?;

    let requests = http.take_requests();
    assert_eq!(requests.len(), 1);
    let authorization = requests[0].headers()[AUTHORIZATION].to_str()?;
    assert!(authorization.starts_with("HMAC-SHA256 Credential=AKLTfromenv/"));
    assert!(authorization.contains("/cn-beijing/cv/request, "));
    Ok(())
}

#[tokio::test]
async fn test_timeout_is_transport_error() -> Result<()> {
    let http = RecordingHttpSend::new(StatusCode::OK, "{}").with_delay(Duration::from_secs(10));
    let client = golden_client(&http)?.with_timeout(Duration::from_millis(50));

    let err = client
        .call(QUERY, BODY)
        .await
        .expect_err("slow call must time out");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(http.take_requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_without_http_backend_is_transport_error() -> Result<()> {
    let ctx = Context::new().with_env(static_env(&[
        ("VOLC_ACCESSKEY", "ak"),
        ("VOLC_SECRETKEY", "sk"),
    ]));
    let config = Config::default().from_env(&ctx);

    let err = Client::new(ctx, &config)?
        .call(QUERY, BODY)
        .await
        .expect_err("no http backend must fail");
    assert!(err.is_transport_error());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_calls() -> Result<()> {
    let http = RecordingHttpSend::new(StatusCode::OK, "{}");
    let client = golden_client(&http)?;

    let (a, b) = tokio::join!(client.call(QUERY, BODY), client.call(QUERY, BODY));
    assert!(a?.is_success());
    assert!(b?.is_success());

    let requests = http.take_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].headers()[AUTHORIZATION],
        requests[1].headers()[AUTHORIZATION]
    );
    Ok(())
}

mod reference;

use std::collections::HashMap;

use anyhow::Result;
use http::header::AUTHORIZATION;
use http::{Method, Uri};
use pretty_assertions::assert_eq;
use volcsign_core::hash::hex_sha256;
use volcsign_core::time::parse_iso8601;
use volcsign_core::{Context, Signer, SigningRequest};
use volcsign_volcengine::{canonical_query_string, RequestSigner, StaticCredentialProvider};

pub const ENDPOINT: &str = "https://visual.volcengineapi.com";
pub const ACCESS_KEY: &str = "AKLTtestaccesskey";
pub const SECRET_KEY: &str = "dGVzdHNlY3JldGtleQ==";
pub const X_DATE: &str = "20240606T120000Z";
pub const BODY: &str = r#"{"req_key":"jimeng_high_aes_general_v21_L","prompt":"test"}"#;

/// Authorization computed by an independent reference implementation.
pub const GOLDEN_AUTHORIZATION: &str = "HMAC-SHA256 \
    Credential=AKLTtestaccesskey/20240606/cn-beijing/cv/request, \
    SignedHeaders=content-type;host;x-content-sha256;x-date, \
    Signature=d758e7da49b33cd0fbdea25463541da7c9ca3d87fb73d75af7ec34eb2724806e";

pub fn golden_signer(ctx: Context) -> Signer<volcsign_volcengine::Credential> {
    let builder = RequestSigner::new("cv", "cn-beijing")
        .with_time(parse_iso8601(X_DATE).expect("time must be valid"));
    Signer::new(
        ctx,
        StaticCredentialProvider::new(ACCESS_KEY, SECRET_KEY),
        builder,
    )
}

fn golden_request() -> Result<SigningRequest> {
    let mut req = SigningRequest::new(Method::POST, &Uri::from_static(ENDPOINT))?
        .with_body(BODY);
    req.query_push("Action", "CVProcess");
    req.query_push("Version", "2024-06-06");
    Ok(req)
}

#[tokio::test]
async fn test_golden_authorization() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let req = golden_signer(Context::new()).sign(golden_request()?).await?;

    assert_eq!(req.method(), Method::POST);
    assert_eq!(
        req.uri().to_string(),
        "https://visual.volcengineapi.com/?Action=CVProcess&Version=2024-06-06"
    );
    assert_eq!(req.headers()[AUTHORIZATION], GOLDEN_AUTHORIZATION);
    assert_eq!(req.headers()["x-date"], X_DATE);
    assert_eq!(req.headers()["x-content-sha256"], hex_sha256(BODY.as_bytes()));
    assert_eq!(req.headers()["content-type"], "application/json");
    assert_eq!(req.body().as_ref(), BODY.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_signature_matches_reference() -> Result<()> {
    let query = HashMap::from([("Action", "CVProcess"), ("Version", "2024-06-06")]);
    let expected = reference::authorization(
        ACCESS_KEY,
        SECRET_KEY,
        "cn-beijing",
        "cv",
        "visual.volcengineapi.com",
        &canonical_query_string(query),
        BODY.as_bytes(),
        X_DATE,
    );

    let req = golden_signer(Context::new()).sign(golden_request()?).await?;
    assert_eq!(req.headers()[AUTHORIZATION], expected.as_str());
    Ok(())
}

#[tokio::test]
async fn test_query_order_does_not_matter() -> Result<()> {
    let mut req = SigningRequest::new(Method::POST, &Uri::from_static(ENDPOINT))?
        .with_body(BODY);
    req.query_push("Version", "2024-06-06");
    req.query_push("Action", "CVProcess");

    let req = golden_signer(Context::new()).sign(req).await?;
    assert_eq!(req.headers()[AUTHORIZATION], GOLDEN_AUTHORIZATION);
    Ok(())
}

#[tokio::test]
async fn test_empty_body_and_query() -> Result<()> {
    let req = SigningRequest::new(Method::POST, &Uri::from_static(ENDPOINT))?;
    let req = golden_signer(Context::new()).sign(req).await?;

    assert_eq!(req.uri().to_string(), "https://visual.volcengineapi.com/");
    assert_eq!(
        req.headers()["x-content-sha256"],
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );

    let expected = reference::authorization(
        ACCESS_KEY,
        SECRET_KEY,
        "cn-beijing",
        "cv",
        "visual.volcengineapi.com",
        "",
        b"",
        X_DATE,
    );
    assert_eq!(req.headers()[AUTHORIZATION], expected.as_str());
    Ok(())
}

#[tokio::test]
async fn test_body_change_changes_signature() -> Result<()> {
    let req = golden_request()?.with_body(r#"{"prompt":"other"}"#);
    let req = golden_signer(Context::new()).sign(req).await?;

    assert_ne!(req.headers()[AUTHORIZATION], GOLDEN_AUTHORIZATION);
    Ok(())
}

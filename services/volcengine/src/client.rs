// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use log::debug;
use volcsign_core::{Context, Error, Result, Signer, SigningRequest};

use crate::constants::ESCAPED_AMPERSAND;
use crate::{Config, Credential, DefaultCredentialProvider, RequestSigner};

/// Client signs and sends requests to a volcengine OpenAPI endpoint.
///
/// Every [`Client::call`] is a single round trip: no retries, no state kept
/// between calls.
///
/// # Example
///
/// ```no_run
/// use volcsign_core::{Context, OsEnv};
/// use volcsign_http_send_reqwest::ReqwestHttpSend;
/// use volcsign_volcengine::{Client, Config};
///
/// # async fn example() -> volcsign_core::Result<()> {
/// let ctx = Context::new()
///     .with_http_send(ReqwestHttpSend::default())
///     .with_env(OsEnv);
/// let config = Config::default().from_env(&ctx);
/// let client = Client::new(ctx, &config)?;
///
/// let resp = client
///     .call(
///         [("Action", "CVProcess"), ("Version", "2022-08-31")],
///         r#"{"req_key":"jimeng_high_aes_general_v21_L","prompt":"a cat"}"#,
///     )
///     .await?
///     .error_for_status()?;
/// println!("{}", resp.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    signer: Signer<Credential>,
    endpoint: Uri,
    timeout: Duration,
}

impl Client {
    /// Create a client from config.
    ///
    /// Credentials are resolved by [`DefaultCredentialProvider`] on every call.
    pub fn new(ctx: Context, config: &Config) -> Result<Self> {
        let endpoint = parse_endpoint(config.endpoint())?;
        let builder = RequestSigner::new(config.service(), config.region()).with_debug(config.debug);
        let loader = DefaultCredentialProvider::new(Arc::new(config.clone()));

        Ok(Self {
            signer: Signer::new(ctx, loader, builder),
            endpoint,
            timeout: config.timeout(),
        })
    }

    /// Replace the signer used by this client.
    pub fn with_signer(mut self, signer: Signer<Credential>) -> Self {
        self.signer = signer;
        self
    }

    /// Bound every call by the given timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint this client sends requests to.
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Sign and send a `POST` request with the given query and JSON body.
    ///
    /// Non-2xx responses are returned as is, use [`Response::error_for_status`]
    /// to turn them into errors. Returns
    /// [`ErrorKind::CredentialMissing`](volcsign_core::ErrorKind::CredentialMissing)
    /// without touching the network if no credential is available.
    pub async fn call<I, K, V>(&self, query: I, body: impl Into<Bytes>) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut req = SigningRequest::new(Method::POST, &self.endpoint)?.with_body(body);
        for (k, v) in query {
            req.query_push(k, v);
        }

        let req = self.signer.sign(req).await?;
        debug!("sending request to {}", req.uri());

        let resp = tokio::time::timeout(
            self.timeout,
            self.signer.context().http_send_as_string(req),
        )
        .await
        .map_err(|e| {
            Error::transport(format!("request timed out after {:?}", self.timeout)).with_source(e)
        })??;
        debug!("received response with status {}", resp.status());

        let (parts, body) = resp.into_parts();
        Ok(Response {
            status: parts.status,
            headers: parts.headers,
            body: unescape_ampersand(&body),
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Uri> {
    let uri: Uri = endpoint.parse().map_err(|e| {
        Error::config_invalid(format!("endpoint {endpoint} is not a valid uri")).with_source(e)
    })?;
    if uri.authority().is_none() {
        return Err(Error::config_invalid(format!(
            "endpoint {endpoint} must contain a host"
        )));
    }
    Ok(uri)
}

/// Replace every literal `\u0026` in the body with `&`.
///
/// The visual API escapes `&` inside the urls it returns. Nothing else is
/// unescaped.
pub fn unescape_ampersand(body: &str) -> String {
    body.replace(ESCAPED_AMPERSAND, "&")
}

/// Response returned by [`Client::call`].
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response body with `\u0026` already replaced.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consume the response and return its body.
    pub fn into_body(self) -> String {
        self.body
    }

    /// Returns true if status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-2xx response into an [`ErrorKind::Upstream`](volcsign_core::ErrorKind::Upstream) error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        Err(Error::upstream(format!(
            "upstream responded {}: {}",
            self.status, self.body
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use volcsign_core::ErrorKind;

    #[test_case(r#"{"url":"https://a.com/x?a=1\u0026b=2"}"#, r#"{"url":"https://a.com/x?a=1&b=2"}"#; "escaped")]
    #[test_case(r#"{"url":"https://a.com/x?a=1&b=2"}"#, r#"{"url":"https://a.com/x?a=1&b=2"}"#; "plain")]
    #[test_case(r#"\u0026\u0026"#, "&&"; "only escapes")]
    #[test_case(r#"\\u0026"#, r#"\&"#; "escaped backslash")]
    #[test_case("", ""; "empty")]
    fn test_unescape_ampersand(input: &str, expected: &str) {
        assert_eq!(unescape_ampersand(input), expected);
    }

    #[test_case("https://visual.volcengineapi.com"; "default")]
    #[test_case("http://127.0.0.1:8080/api"; "with path")]
    fn test_parse_endpoint(endpoint: &str) {
        assert!(parse_endpoint(endpoint).is_ok());
    }

    #[test_case("not a uri"; "invalid")]
    #[test_case("/relative"; "without host")]
    fn test_parse_endpoint_invalid(endpoint: &str) {
        let err = parse_endpoint(endpoint).expect_err("must be invalid");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_client_new_with_invalid_endpoint() {
        let config = Config::default().with_endpoint("/relative");
        let err = Client::new(Context::new(), &config).expect_err("must be invalid");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_error_for_status() {
        let resp = Response {
            status: StatusCode::UNAUTHORIZED,
            headers: HeaderMap::new(),
            body: r#"{"code":50400}"#.to_string(),
        };
        assert!(!resp.is_success());
        let err = resp.error_for_status().expect_err("401 must be an error");
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.message().contains("50400"));

        let resp = Response {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: "{}".to_string(),
        };
        assert_eq!(resp.error_for_status().map(Response::into_body).ok(), Some("{}".to_string()));
    }
}

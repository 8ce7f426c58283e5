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

//! Reqwest-based HTTP transport for volcsign.
//!
//! This crate provides `ReqwestHttpSend`, an implementation of the `HttpSend`
//! trait from `volcsign_core` backed by [`reqwest::Client`].
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use volcsign_core::{Context, OsEnv};
//! use volcsign_http_send_reqwest::ReqwestHttpSend;
//!
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default().with_timeout(Duration::from_secs(30)))
//!     .with_env(OsEnv);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};
use volcsign_core::{Error, HttpSend, Result};

/// Reqwest-based implementation of the `HttpSend` trait.
///
/// Every failure while sending or reading the response is reported as
/// [`ErrorKind::Transport`](volcsign_core::ErrorKind::Transport). Responses
/// are returned whatever their status code.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Bound every request sent by this backend, from connect until the body
    /// is fully read.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to convert request into reqwest").with_source(e)
        })?;
        if let Some(timeout) = self.timeout {
            *req.timeout_mut() = Some(timeout);
        }

        debug!("sending {} {}", req.method(), req.url());
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport(describe(&e)).with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

fn describe(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "failed to connect"
    } else {
        "failed to send request"
    }
}

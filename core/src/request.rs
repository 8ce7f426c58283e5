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

use std::str::FromStr;

use bytes::Bytes;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
///
/// Query pairs are kept verbatim: nothing is percent decoded when a request
/// is built and nothing is encoded when it is applied. Whatever the signer
/// leaves in `query` is exactly what goes on the wire.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// HTTP body.
    pub body: Bytes,
}

impl SigningRequest {
    /// Build a signing request against the given endpoint.
    ///
    /// Query pairs already present on the endpoint are kept.
    pub fn new(method: Method, endpoint: &Uri) -> Result<Self> {
        let authority = endpoint.authority().cloned().ok_or_else(|| {
            Error::request_invalid("request without authority is invalid for signing")
        })?;
        let scheme = endpoint.scheme().cloned().unwrap_or(Scheme::HTTPS);
        let authority = strip_default_port(&scheme, authority)?;
        let path = match endpoint.path() {
            "" => "/".to_string(),
            v => v.to_string(),
        };

        Ok(SigningRequest {
            method,
            scheme,
            authority,
            path,
            query: endpoint.query().map(Self::query_parse).unwrap_or_default(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        })
    }

    /// Set the body to send.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Convert the signing request into a ready to send http request.
    pub fn apply(self) -> Result<http::Request<Bytes>> {
        let paq = if self.query.is_empty() {
            self.path
        } else {
            let query = self.query_string();
            let mut s = self.path;
            s.reserve(query.len() + 1);
            s.push('?');
            s.push_str(&query);
            s
        };

        let uri = Uri::builder()
            .scheme(self.scheme)
            .authority(self.authority)
            .path_and_query(PathAndQuery::from_str(&paq)?)
            .build()?;

        let mut req = http::Request::builder()
            .method(self.method)
            .uri(uri)
            .body(self.body)?;
        *req.headers_mut() = self.headers;

        Ok(req)
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Join the query pairs of this request, see [`SigningRequest::query_join`].
    #[inline]
    pub fn query_string(&self) -> String {
        Self::query_join(&self.query)
    }

    /// Join query pairs in their given order.
    ///
    /// ```shell
    /// [(a, 1), (b, ""), (c, 3)] => "a=1&b=&c=3"
    /// ```
    ///
    /// `=` is always written, even for empty values. Nothing is encoded.
    pub fn query_join(query: &[(String, String)]) -> String {
        let size = query.iter().map(|(k, v)| k.len() + v.len() + 2).sum();
        let mut s = String::with_capacity(size);

        for (idx, (k, v)) in query.iter().enumerate() {
            if idx != 0 {
                s.push('&');
            }

            s.push_str(k);
            s.push('=');
            s.push_str(v);
        }

        s
    }

    /// Get header value by name.
    ///
    /// Returns `None` if header not found, an error if the value is not
    /// visible ascii.
    #[inline]
    pub fn header_get(&self, key: &str) -> Result<Option<&str>> {
        match self.headers.get(key) {
            Some(v) => v.to_str().map(Some).map_err(|e| {
                Error::request_invalid(format!("header {key} is not visible ascii")).with_source(e)
            }),
            None => Ok(None),
        }
    }

    fn query_parse(query: &str) -> Vec<(String, String)> {
        query
            .split('&')
            .filter(|v| !v.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect()
    }
}

/// Drop the port if it's the default one of the scheme.
///
/// http clients leave it out of the `Host` header, the signed host must do
/// the same.
fn strip_default_port(scheme: &Scheme, authority: Authority) -> Result<Authority> {
    let default_port = if *scheme == Scheme::HTTPS {
        443
    } else if *scheme == Scheme::HTTP {
        80
    } else {
        return Ok(authority);
    };

    match authority.port_u16() {
        Some(port) if port == default_port => Ok(Authority::from_str(authority.host())?),
        _ => Ok(authority),
    }
}

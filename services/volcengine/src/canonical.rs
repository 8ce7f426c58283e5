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

//! Canonical query string and canonical request.

use std::fmt::{self, Debug, Display, Write};

use http::header::{CONTENT_TYPE, HOST};
use percent_encoding::utf8_percent_encode;
use volcsign_core::hash::hex_sha256;
use volcsign_core::SigningRequest;

use crate::constants::{VOLC_QUERY_ENCODE_SET, X_CONTENT_SHA256, X_DATE};

/// QueryEncoder turns query pairs into their canonical form.
///
/// The output is used twice: for the request url and inside the canonical
/// request. Implementations must be deterministic.
pub trait QueryEncoder: Debug + Send + Sync + 'static {
    /// Sort and encode query pairs.
    fn encode(&self, query: Vec<(String, String)>) -> Vec<(String, String)>;
}

/// Sort pairs by key and keep them verbatim.
///
/// This is what the visual API expects today: values containing `&` or `=`
/// are not escaped and will break the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawQueryEncoder;

impl QueryEncoder for RawQueryEncoder {
    fn encode(&self, mut query: Vec<(String, String)>) -> Vec<(String, String)> {
        // Tuple ordering compares keys byte-wise first.
        query.sort();
        query
    }
}

/// Sort pairs by key, then percent encode keys and values.
///
/// Everything except `A-Z a-z 0-9 - . _ ~` is encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentQueryEncoder;

impl QueryEncoder for PercentQueryEncoder {
    fn encode(&self, mut query: Vec<(String, String)>) -> Vec<(String, String)> {
        query.sort();
        query
            .into_iter()
            .map(|(k, v)| {
                (
                    utf8_percent_encode(&k, &VOLC_QUERY_ENCODE_SET).to_string(),
                    utf8_percent_encode(&v, &VOLC_QUERY_ENCODE_SET).to_string(),
                )
            })
            .collect()
    }
}

/// Build the canonical query string of the given params with [`RawQueryEncoder`].
///
/// ```
/// use std::collections::HashMap;
/// use volcsign_volcengine::canonical_query_string;
///
/// let params = HashMap::from([("b", "2"), ("a", "1")]);
/// assert_eq!(canonical_query_string(params), "a=1&b=2");
/// ```
pub fn canonical_query_string<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let query = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    SigningRequest::query_join(&RawQueryEncoder.encode(query))
}

/// Ordered list of header names taking part in the signature.
///
/// The default is the closed set used by the visual API:
/// `content-type;host;x-content-sha256;x-date`. Names are lowercased and
/// kept sorted so the list always matches the server side canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders(Vec<String>);

impl Default for SignedHeaders {
    fn default() -> Self {
        Self(vec![
            CONTENT_TYPE.as_str().to_string(),
            HOST.as_str().to_string(),
            X_CONTENT_SHA256.to_string(),
            X_DATE.to_string(),
        ])
    }
}

impl SignedHeaders {
    /// Add a header name to the list.
    ///
    /// The request being signed must carry this header, otherwise signing
    /// fails.
    pub fn with(mut self, name: &str) -> Self {
        let name = name.to_lowercase();
        if let Err(idx) = self.0.binary_search(&name) {
            self.0.insert(idx, name);
        }
        self
    }

    /// Iterate over header names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for SignedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(";"))
    }
}

/// CanonicalRequest is the string representation of a request that gets hashed
/// into the string to sign.
///
/// ```text
/// POST
/// /
/// Action=CVProcess&Version=2024-06-06
/// content-type:application/json
/// host:visual.volcengineapi.com
/// x-content-sha256:<payload hash>
/// x-date:20240606T120000Z
///
/// content-type;host;x-content-sha256;x-date
/// <payload hash>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Create a canonical request without headers.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        query: impl Into<String>,
        payload_hash: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: query.into(),
            headers: Vec::new(),
            payload_hash: payload_hash.into(),
        }
    }

    /// Append a signed header. Headers are written in the order they are added.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Header names joined by `;`, the `SignedHeaders` part of `Authorization`.
    pub fn signed_headers(&self) -> String {
        self.headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Hex encoded SHA256 of the canonical request.
    pub fn hash(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.query)?;
        for (k, v) in &self.headers {
            writeln!(f, "{k}:{v}")?;
        }
        f.write_char('\n')?;
        writeln!(f, "{}", self.signed_headers())?;
        f.write_str(&self.payload_hash)
    }
}

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

use std::mem;
use std::sync::Arc;

use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use http::HeaderValue;
use log::debug;
use volcsign_core::hash::hex_sha256;
use volcsign_core::time::{now, DateTime};
use volcsign_core::{Context, Error, Result, SignRequest, SigningRequest};

use crate::canonical::{CanonicalRequest, QueryEncoder, RawQueryEncoder, SignedHeaders};
use crate::constants::{ALGORITHM, CONTENT_TYPE_JSON, X_CONTENT_SHA256, X_DATE};
use crate::signature::{calculate_signature, string_to_sign, SigningContext};
use crate::Credential;

/// RequestSigner that implements the volcengine `HMAC-SHA256` signing.
///
/// Signing writes `X-Date`, `X-Content-Sha256`, `Content-Type` (when absent)
/// and `Authorization` into the request and replaces its query with the
/// canonical one.
#[derive(Debug)]
pub struct RequestSigner {
    service: String,
    region: String,
    query_encoder: Arc<dyn QueryEncoder>,
    signed_headers: SignedHeaders,
    debug: bool,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            query_encoder: Arc::new(RawQueryEncoder),
            signed_headers: SignedHeaders::default(),
            debug: false,

            time: None,
        }
    }

    /// Use a different query encoder, [`RawQueryEncoder`] by default.
    pub fn with_query_encoder(mut self, encoder: impl QueryEncoder) -> Self {
        self.query_encoder = Arc::new(encoder);
        self
    }

    /// Use a different set of signed headers.
    pub fn with_signed_headers(mut self, headers: SignedHeaders) -> Self {
        self.signed_headers = headers;
        self
    }

    /// Log canonical request, string to sign and signature at debug level.
    ///
    /// Off by default. These values are derived from the secret key, don't
    /// enable this in production.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn canonical_request(
        &self,
        req: &SigningRequest,
        payload_hash: &str,
    ) -> Result<CanonicalRequest> {
        let mut creq =
            CanonicalRequest::new(req.method.as_str(), &req.path, req.query_string(), payload_hash);

        for name in self.signed_headers.iter() {
            let value = if name == HOST.as_str() {
                req.authority.as_str()
            } else {
                req.header_get(name)?.ok_or_else(|| {
                    Error::request_invalid(format!("signed header {name} is not set on request"))
                })?
            };
            creq = creq.with_header(name, value);
        }

        Ok(creq)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut SigningRequest,
        cred: &Self::Credential,
    ) -> Result<()> {
        let sctx = SigningContext::new(&self.region, &self.service, self.time.unwrap_or_else(now));

        // The same pairs end up in the url and in the canonical request.
        req.query = self.query_encoder.encode(mem::take(&mut req.query));

        let payload_hash = hex_sha256(&req.body);
        if !req.headers.contains_key(CONTENT_TYPE) {
            req.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        }
        req.headers.insert(X_DATE, HeaderValue::from_str(sctx.x_date())?);
        req.headers
            .insert(X_CONTENT_SHA256, HeaderValue::from_str(&payload_hash)?);

        let creq = self.canonical_request(req, &payload_hash)?;
        let scope = sctx.scope();
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(sctx.x_date(), &scope, &creq.hash());
        let signature = calculate_signature(
            &sctx.signing_key(&cred.secret_access_key),
            &string_to_sign,
        );
        if self.debug {
            debug!("calculated canonical request: {creq}");
            debug!("calculated string to sign: {string_to_sign}");
            debug!("calculated signature: {signature}");
        }

        let mut authorization = HeaderValue::from_str(&format!(
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id,
            scope,
            creq.signed_headers(),
            signature
        ))
        .map_err(|e| {
            Error::credential_invalid("access key id is not a valid header value").with_source(e)
        })?;
        authorization.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, authorization);

        Ok(())
    }
}

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

//! Signing key derivation and signature calculation.

use volcsign_core::hash::{hex_hmac_sha256, hmac_sha256};
use volcsign_core::time::{format_date, format_iso8601, DateTime};

use crate::constants::{ALGORITHM, SIGNING_TERMINATOR};

/// SigningContext carries the region, service and the instant a request is
/// signed at.
///
/// `date_stamp` and `x_date` are always derived from the same UTC instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    region: String,
    service: String,
    time: DateTime,
    date_stamp: String,
    x_date: String,
}

impl SigningContext {
    /// Create a new signing context at the given time.
    pub fn new(region: &str, service: &str, time: DateTime) -> Self {
        Self {
            region: region.to_string(),
            service: service.to_string(),
            time,
            date_stamp: format_date(time),
            x_date: format_iso8601(time),
        }
    }

    /// Region this context signs for.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service this context signs for.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The signing instant.
    pub fn time(&self) -> DateTime {
        self.time
    }

    /// `YYYYMMDD` in UTC.
    pub fn date_stamp(&self) -> &str {
        &self.date_stamp
    }

    /// `YYYYMMDD'T'HHMMSS'Z'` in UTC, the value of the `X-Date` header.
    pub fn x_date(&self) -> &str {
        &self.x_date
    }

    /// Credential scope of this context.
    pub fn scope(&self) -> String {
        credential_scope(&self.date_stamp, &self.region, &self.service)
    }

    /// Derive the signing key of this context.
    pub fn signing_key(&self, secret: &str) -> [u8; 32] {
        generate_signing_key(secret, &self.date_stamp, &self.region, &self.service)
    }
}

/// Derive the signing key from the secret key.
///
/// ```text
/// kDate    = HMAC(secret, date_stamp)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "request")
/// ```
///
/// The secret is used as is, no prefix is added.
pub fn generate_signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> [u8; 32] {
    let k_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, SIGNING_TERMINATOR.as_bytes())
}

/// Scope: `<date_stamp>/<region>/<service>/request`.
pub fn credential_scope(date_stamp: &str, region: &str, service: &str) -> String {
    format!("{date_stamp}/{region}/{service}/{SIGNING_TERMINATOR}")
}

/// Build the string to sign.
///
/// ```text
/// HMAC-SHA256
/// 20240606T120000Z
/// 20240606/cn-beijing/cv/request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(x_date: &str, scope: &str, canonical_request_hash: &str) -> String {
    format!("{ALGORITHM}\n{x_date}\n{scope}\n{canonical_request_hash}")
}

/// Lowercase hex HMAC of the string to sign under the signing key.
pub fn calculate_signature(signing_key: &[u8], string_to_sign: &str) -> String {
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}

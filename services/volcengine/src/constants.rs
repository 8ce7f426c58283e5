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

use std::time::Duration;

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Headers used in volcengine services.
pub const X_DATE: &str = "x-date";
pub const X_CONTENT_SHA256: &str = "x-content-sha256";

// Signing protocol.
pub const ALGORITHM: &str = "HMAC-SHA256";
pub const SIGNING_TERMINATOR: &str = "request";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// The upstream API escapes `&` inside JSON strings as this literal sequence.
pub const ESCAPED_AMPERSAND: &str = "\\u0026";

// Env values used in volcengine services.
pub const VOLC_ACCESSKEY: &str = "VOLC_ACCESSKEY";
pub const VOLC_SECRETKEY: &str = "VOLC_SECRETKEY";
pub const VOLC_REGION: &str = "VOLC_REGION";
pub const VOLC_SERVICE: &str = "VOLC_SERVICE";
pub const VOLC_ENDPOINT: &str = "VOLC_ENDPOINT";
pub const VOLC_TIMEOUT: &str = "VOLC_TIMEOUT";
pub const VOLC_SIGN_DEBUG: &str = "VOLC_SIGN_DEBUG";

// Defaults for the visual (image generation) API.
pub const DEFAULT_ENDPOINT: &str = "https://visual.volcengineapi.com";
pub const DEFAULT_REGION: &str = "cn-north-1";
pub const DEFAULT_SERVICE: &str = "cv";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// AsciiSet used by [`PercentQueryEncoder`](crate::PercentQueryEncoder).
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
pub static VOLC_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

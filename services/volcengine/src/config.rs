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

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use log::warn;
use volcsign_core::{utils::Redact, Context};

use crate::constants::*;

/// Config carries all the configuration for volcengine services.
///
/// Every `Option` field left as `None` falls back to the matching env value
/// in [`Config::from_env`], then to the built-in default.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VOLC_ACCESSKEY`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VOLC_SECRETKEY`]
    pub secret_access_key: Option<String>,
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VOLC_REGION`]
    /// - default: [`DEFAULT_REGION`]
    pub region: Option<String>,
    /// `service` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VOLC_SERVICE`]
    /// - default: [`DEFAULT_SERVICE`]
    pub service: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VOLC_ENDPOINT`]
    /// - default: [`DEFAULT_ENDPOINT`]
    pub endpoint: Option<String>,
    /// `timeout` bounds a whole dispatch, loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VOLC_TIMEOUT`] in seconds
    /// - default: [`DEFAULT_TIMEOUT`]
    pub timeout: Option<Duration>,
    /// Log canonical request, string to sign and signature at debug level.
    ///
    /// Off unless set here or env [`VOLC_SIGN_DEBUG`] is `on`/`true`/`1`.
    pub debug: bool,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set access_key_id
    pub fn with_access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    /// Set secret_access_key
    pub fn with_secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set service
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set endpoint, e.g. `https://visual.volcengineapi.com`
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable signing diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(VOLC_ACCESSKEY) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(VOLC_SECRETKEY) {
            self.secret_access_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(VOLC_REGION) {
            self.region.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(VOLC_SERVICE) {
            self.service.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(VOLC_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(VOLC_TIMEOUT) {
            match v.parse::<u64>() {
                Ok(secs) => {
                    self.timeout.get_or_insert(Duration::from_secs(secs));
                }
                Err(e) => warn!("ignore invalid {VOLC_TIMEOUT} {v:?}: {e}"),
            }
        }
        if let Some(v) = ctx.env_var(VOLC_SIGN_DEBUG) {
            self.debug |= matches!(v.to_lowercase().as_str(), "on" | "true" | "1");
        }

        self
    }

    /// Region to sign for.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Service to sign for.
    pub fn service(&self) -> &str {
        self.service.as_deref().unwrap_or(DEFAULT_SERVICE)
    }

    /// Endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Timeout of a whole dispatch.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &self.access_key_id.as_ref().map(Redact::from))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(Redact::from),
            )
            .field("region", &self.region)
            .field("service", &self.service)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish()
    }
}

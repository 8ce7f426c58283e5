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

//! Volcengine OpenAPI signer
//!
//! Signs requests with the volcengine `HMAC-SHA256` scheme used by the visual
//! (image generation) API and dispatches them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use volcsign_core::{Context, OsEnv, Result, Signer, SigningRequest};
//! use volcsign_http_send_reqwest::ReqwestHttpSend;
//! use volcsign_volcengine::{Config, DefaultCredentialProvider, RequestSigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!     let config = Config::default().from_env(&ctx);
//!
//!     let loader = DefaultCredentialProvider::new(config.clone().into());
//!     let builder = RequestSigner::new(config.service(), config.region());
//!     let signer = Signer::new(ctx, loader, builder);
//!
//!     let endpoint: http::Uri = config.endpoint().parse()?;
//!     let mut req = SigningRequest::new(http::Method::POST, &endpoint)?
//!         .with_body(r#"{"req_key":"jimeng_high_aes_general_v21_L","prompt":"a cat"}"#);
//!     req.query_push("Action", "CVProcess");
//!     req.query_push("Version", "2022-08-31");
//!
//!     let req = signer.sign(req).await?;
//!     println!("{:?}", req.headers());
//!     Ok(())
//! }
//! ```
//!
//! Use [`Client`] to sign and send in one step.
//!
//! ## Credential Sources
//!
//! ```bash
//! export VOLC_ACCESSKEY=your-access-key
//! export VOLC_SECRETKEY=your-secret-key
//! ```

#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod canonical;
pub use canonical::canonical_query_string;
pub use canonical::CanonicalRequest;
pub use canonical::PercentQueryEncoder;
pub use canonical::QueryEncoder;
pub use canonical::RawQueryEncoder;
pub use canonical::SignedHeaders;

mod signature;
pub use signature::calculate_signature;
pub use signature::credential_scope;
pub use signature::generate_signing_key;
pub use signature::string_to_sign;
pub use signature::SigningContext;

mod sign_request;
pub use sign_request::RequestSigner;

mod client;
pub use client::unescape_ampersand;
pub use client::Client;
pub use client::Response;

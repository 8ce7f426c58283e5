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

use crate::{
    Context, Error, ProvideCredential, Result, SignRequest, SigningCredential, SigningRequest,
};
use bytes::Bytes;
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// Every call loads the credential again and signs from scratch: nothing
/// derived from a secret outlives a single [`Signer::sign`] call.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
        }
    }

    /// The context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Sign the request and build the http request ready to be sent.
    ///
    /// Returns a [`ErrorKind::CredentialMissing`](crate::ErrorKind::CredentialMissing)
    /// error if no usable credential could be loaded.
    pub async fn sign(&self, mut req: SigningRequest) -> Result<http::Request<Bytes>> {
        let cred = self.loader.provide_credential(&self.ctx).await?;
        let Some(cred) = cred.filter(|v| v.is_valid()) else {
            return Err(Error::credential_missing(
                "access key and secret key must both be set before signing",
            ));
        };

        self.builder.sign_request(&self.ctx, &mut req, &cred).await?;
        req.apply()
    }
}

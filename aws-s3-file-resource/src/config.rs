/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tower::util::BoxCloneSyncService;
use tower::Service;

use crate::error::{self, BoxError, Error};
use crate::reporter::{CallbackTransport, HttpsTransport};
use crate::store::{ObjectStore, S3ObjectStore};

pub(crate) mod loader;

/// Label used to prefix storage failure messages.
pub const DEFAULT_RESOURCE_LABEL: &str = "PutS3File";

/// Configuration for a [`Handler`](crate::handler::Handler)
#[derive(Clone)]
pub struct Config {
    resource_label: String,
    store: Arc<dyn ObjectStore>,
    transport: CallbackTransport,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("resource_label", &self.resource_label)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Label used in storage failure messages, e.g. `PutS3File call to put object failed`
    pub fn resource_label(&self) -> &str {
        &self.resource_label
    }

    /// The storage capability objects are written through
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// The transport responses are delivered with
    pub fn transport(&self) -> &CallbackTransport {
        &self.transport
    }
}

/// Fluent style builder for [Config]
#[derive(Default)]
pub struct Builder {
    resource_label: Option<String>,
    store: Option<Arc<dyn ObjectStore>>,
    transport: Option<CallbackTransport>,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("resource_label", &self.resource_label)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Builder {
    /// Label used to prefix storage failure messages.
    ///
    /// Default is [`DEFAULT_RESOURCE_LABEL`].
    pub fn resource_label(mut self, label: impl Into<String>) -> Self {
        self.resource_label = Some(label.into());
        self
    }

    /// Set the storage capability to use.
    pub fn store(mut self, store: impl ObjectStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use Amazon S3 through `client` as the storage capability.
    pub fn s3_client(self, client: aws_sdk_s3::Client) -> Self {
        self.store(S3ObjectStore::new(client))
    }

    /// Set the service used to deliver responses.
    ///
    /// Default is [`HttpsTransport`].
    pub fn transport<S>(mut self, transport: S) -> Self
    where
        S: Service<http::Request<Bytes>, Response = http::Response<()>, Error = BoxError>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        self.transport = Some(BoxCloneSyncService::new(transport));
        self
    }

    /// Consumes the builder and constructs a [`Config`]
    pub fn build(self) -> Result<Config, Error> {
        let store = self
            .store
            .ok_or_else(|| error::invalid_config("an object store must be configured"))?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => BoxCloneSyncService::new(HttpsTransport::try_default()?),
        };

        Ok(Config {
            resource_label: self
                .resource_label
                .unwrap_or_else(|| DEFAULT_RESOURCE_LABEL.to_owned()),
            store,
            transport,
        })
    }
}

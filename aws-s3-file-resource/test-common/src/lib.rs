/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_s3_file_resource::error::{Error, ErrorKind};
use aws_s3_file_resource::store::ObjectStore;
use bytes::Bytes;

/// A single call made against a [`RecordingStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put {
        bucket: String,
        key: String,
        body: String,
        content_type: Option<String>,
        acl: Option<String>,
    },
    Copy {
        bucket: String,
        key: String,
        copy_source: String,
        acl: Option<String>,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

/// In-memory [`ObjectStore`] that records every call and optionally fails them.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    calls: Arc<Mutex<Vec<StoreCall>>>,
    fail_with: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_owned()),
            ..Default::default()
        }
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) -> Result<(), Error> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(message) => Err(Error::new(ErrorKind::StorageFault, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
        acl: Option<&str>,
    ) -> Result<(), Error> {
        self.record(StoreCall::Put {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            body: String::from_utf8(body.to_vec()).unwrap(),
            content_type: content_type.map(str::to_owned),
            acl: acl.map(str::to_owned),
        })
    }

    async fn copy(
        &self,
        bucket: &str,
        key: &str,
        copy_source: &str,
        acl: Option<&str>,
    ) -> Result<(), Error> {
        self.record(StoreCall::Copy {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            copy_source: copy_source.to_owned(),
            acl: acl.map(str::to_owned),
        })
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), Error> {
        self.record(StoreCall::Delete {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        })
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;

use crate::error::Error;

/// Object operations the custom resource relies on.
///
/// Each call either completes or fails with a storage error. Retrying, if any, is the
/// responsibility of the implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Write `body` to `bucket/key`.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
        acl: Option<&str>,
    ) -> Result<(), Error>;

    /// Server side copy of `copy_source` into `bucket/key`.
    async fn copy(
        &self,
        bucket: &str,
        key: &str,
        copy_source: &str,
        acl: Option<&str>,
    ) -> Result<(), Error>;

    /// Remove `bucket/key`.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), Error>;
}

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Create a store that issues requests with `client`.
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// The underlying S3 client
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
        acl: Option<&str>,
    ) -> Result<(), Error> {
        tracing::trace!("sending PutObject for {bucket}/{key} ({} bytes)", body.len());
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_content_type(content_type.map(str::to_owned))
            .set_acl(acl.map(ObjectCannedAcl::from))
            .send()
            .await?;
        Ok(())
    }

    async fn copy(
        &self,
        bucket: &str,
        key: &str,
        copy_source: &str,
        acl: Option<&str>,
    ) -> Result<(), Error> {
        tracing::trace!("sending CopyObject from {copy_source} to {bucket}/{key}");
        self.client
            .copy_object()
            .bucket(bucket)
            .key(key)
            .copy_source(copy_source)
            .set_acl(acl.map(ObjectCannedAcl::from))
            .send()
            .await?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), Error> {
        tracing::trace!("sending DeleteObject for {bucket}/{key}");
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use aws_sdk_s3::operation::copy_object::CopyObjectOutput;
    use aws_sdk_s3::operation::delete_object::{DeleteObjectError, DeleteObjectOutput};
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_sdk_s3::types::ObjectCannedAcl;
    use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
    use aws_sdk_s3::Client;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use aws_smithy_types::error::ErrorMetadata;
    use bytes::Bytes;

    use super::{ObjectStore, S3ObjectStore};
    use crate::error::{Error, ErrorKind};

    #[tokio::test]
    async fn test_put_sets_content_type_and_acl() {
        let put_object = mock!(Client::put_object)
            .match_requests(|r| {
                r.bucket() == Some("test-bucket")
                    && r.key() == Some("config.json")
                    && r.content_type() == Some("application/json")
                    && r.acl() == Some(&ObjectCannedAcl::BucketOwnerFullControl)
            })
            .then_output(|| PutObjectOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&put_object]);

        let store = S3ObjectStore::new(client);
        store
            .put(
                "test-bucket",
                "config.json",
                Bytes::from_static(b"{}"),
                Some("application/json"),
                Some("bucket-owner-full-control"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_copy_sets_copy_source() {
        let copy_object = mock!(Client::copy_object)
            .match_requests(|r| {
                r.bucket() == Some("test-bucket")
                    && r.key() == Some("config.json")
                    && r.copy_source() == Some("src-bucket/prod/config.json")
                    && r.acl().is_none()
            })
            .then_output(|| CopyObjectOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&copy_object]);

        let store = S3ObjectStore::new(client);
        store
            .copy(
                "test-bucket",
                "config.json",
                "src-bucket/prod/config.json",
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete() {
        let delete_object = mock!(Client::delete_object)
            .match_requests(|r| r.bucket() == Some("test-bucket") && r.key() == Some("k"))
            .then_output(|| DeleteObjectOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&delete_object]);

        S3ObjectStore::new(client)
            .delete("test-bucket", "k")
            .await
            .unwrap();
    }

    #[test]
    fn test_sdk_error_is_storage_fault() {
        let sdk_err: SdkError<DeleteObjectError, ()> = SdkError::service_error(
            DeleteObjectError::generic(ErrorMetadata::builder().code("AccessDenied").build()),
            (),
        );

        let err = Error::from(sdk_err);
        assert_eq!(&ErrorKind::StorageFault, err.kind());
        assert!(format!("{}", DisplayErrorContext(&err)).contains("AccessDenied"));
    }
}

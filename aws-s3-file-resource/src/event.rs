/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{self, Error};
use crate::types::{DeletionPolicy, RequestType, ResourceSpec, SourceSpec, TargetSpec};

/// A custom resource lifecycle request as delivered by CloudFormation.
///
/// Only the request header is validated on decode. The resource properties stay
/// untyped until [`ResourceProperties::validate`] is called so that a malformed
/// `Source` or `Target` can still be answered with a `FAILED` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    request_type: RequestType,
    #[serde(default, deserialize_with = "null_as_default")]
    stack_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    request_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    logical_resource_id: String,
    #[serde(rename = "ResponseURL", default)]
    response_url: Option<String>,
    #[serde(default)]
    physical_resource_id: Option<String>,
    #[serde(default)]
    deletion_policy: DeletionPolicy,
    #[serde(default, deserialize_with = "null_as_default")]
    resource_properties: ResourceProperties,
}

impl LifecycleEvent {
    /// Decode an event from the raw invocation payload.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    /// The lifecycle stage being requested
    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// ARN of the stack that owns the resource
    pub fn stack_id(&self) -> &str {
        &self.stack_id
    }

    /// Unique id of this request
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Template name of the resource
    pub fn logical_resource_id(&self) -> &str {
        &self.logical_resource_id
    }

    /// Pre-signed URL the response must be sent to, if any
    pub fn response_url(&self) -> Option<&str> {
        self.response_url.as_deref()
    }

    /// Physical id assigned by a previous invocation, if any
    pub fn physical_resource_id(&self) -> Option<&str> {
        self.physical_resource_id.as_deref()
    }

    /// Effective deletion policy
    pub fn deletion_policy(&self) -> &DeletionPolicy {
        &self.deletion_policy
    }

    /// Unvalidated resource properties
    pub fn resource_properties(&self) -> &ResourceProperties {
        &self.resource_properties
    }
}

/// The `ResourceProperties` bag of a request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(default)]
    source: Option<Value>,
    #[serde(default)]
    target: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(rename = "S3Url", default)]
    s3_url: Option<String>,
    #[serde(default)]
    filetext: Option<String>,
    #[serde(rename = "contentType", default)]
    content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    #[serde(rename = "Bucket", default)]
    bucket: Option<String>,
    #[serde(rename = "Key", default)]
    key: Option<String>,
    #[serde(rename = "ACL", default)]
    acl: Option<String>,
}

impl ResourceProperties {
    /// Check required fields and convert into a typed [`ResourceSpec`].
    pub fn validate(&self) -> Result<ResourceSpec, Error> {
        let source = self
            .source
            .clone()
            .filter(|v| !v.is_null())
            .ok_or_else(|| error::invalid_config("missing required property `Source`"))?;
        let target = self
            .target
            .clone()
            .filter(|v| !v.is_null())
            .ok_or_else(|| error::invalid_config("missing required property `Target`"))?;

        let target: RawTarget = serde_json::from_value(target)?;
        let source: RawSource = serde_json::from_value(source)?;

        let target = TargetSpec {
            bucket: required(target.bucket, "Target.Bucket")?,
            key: required(target.key, "Target.Key")?,
            acl: non_empty(target.acl),
        };

        // an S3 URL wins over inline content
        let source = match non_empty(source.s3_url) {
            Some(copy_source) => SourceSpec::Copy { copy_source },
            None => SourceSpec::Inline {
                body: source.filetext.ok_or_else(|| {
                    error::invalid_config("`Source` requires either `S3Url` or `filetext`")
                })?,
                content_type: non_empty(source.content_type),
            },
        };

        Ok(ResourceSpec { source, target })
    }
}

/// Decode a field whose `null` means the same as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn required(value: Option<String>, name: &str) -> Result<String, Error> {
    non_empty(value)
        .ok_or_else(|| error::invalid_config(format!("missing required property `{name}`")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

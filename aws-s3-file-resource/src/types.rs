/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Scheme prefix used when naming the provisioned object.
pub(crate) const RESOURCE_SCHEME: &str = "S3";

/// Lifecycle stage the stack is asking the resource to move through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    /// The resource is being added to the stack.
    Create,
    /// A property of the resource changed.
    Update,
    /// The resource is being removed from the stack.
    Delete,
}

impl RequestType {
    /// The request type as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a `Delete` request should remove the object from the bucket.
///
/// A missing, `null`, or empty policy decodes as [`DeletionPolicy::Delete`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeletionPolicy {
    /// Delete the object (the default).
    #[default]
    Delete,
    /// Leave the object in place.
    Retain,
    /// Any other policy name, e.g. `Snapshot`. A `Delete` request with this policy
    /// writes the object from its source the same way `Create` and `Update` do.
    Other,
}

impl<'de> Deserialize<'de> for DeletionPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let policy = Option::<String>::deserialize(deserializer)?;
        Ok(match policy.as_deref() {
            None | Some("") | Some("Delete") => DeletionPolicy::Delete,
            Some("Retain") => DeletionPolicy::Retain,
            Some(_) => DeletionPolicy::Other,
        })
    }
}

/// Outcome reported back to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// The requested lifecycle action completed.
    Success,
    /// The requested lifecycle action did not complete.
    Failed,
}

/// Where the content of the target object comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Server side copy of an existing object (`bucket/key` form, as accepted by `CopyObject`).
    Copy {
        /// Reference to the object to copy from
        copy_source: String,
    },
    /// Literal content written with `PutObject`.
    Inline {
        /// Object body
        body: String,
        /// Optional `Content-Type` for the object
        content_type: Option<String>,
    },
}

impl SourceSpec {
    /// Name of the storage operation this source maps to.
    pub fn operation(&self) -> &'static str {
        match self {
            SourceSpec::Copy { .. } => "copy",
            SourceSpec::Inline { .. } => "put",
        }
    }
}

/// The object being managed by the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub key: String,
    /// Optional canned ACL applied on put/copy
    pub acl: Option<String>,
}

impl TargetSpec {
    /// Canonical name of the target object, e.g. `S3://bucket/key`.
    pub fn resource_name(&self) -> String {
        format!("{RESOURCE_SCHEME}://{}/{}", self.bucket, self.key)
    }
}

/// Validated resource properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Content source
    pub source: SourceSpec,
    /// Object to write or delete
    pub target: TargetSpec,
}

/// Details of the current invocation supplied by the hosting runtime.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    log_stream_name: String,
}

impl InvocationContext {
    /// Create a context for an invocation logging to `log_stream_name`.
    pub fn new(log_stream_name: impl Into<String>) -> Self {
        Self {
            log_stream_name: log_stream_name.into(),
        }
    }

    /// The log stream this invocation writes to.
    pub fn log_stream_name(&self) -> &str {
        &self.log_stream_name
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::event::LifecycleEvent;
use crate::types::{InvocationContext, ResponseStatus};

/// Version marker included in every response's `Data`.
pub const SELF_VERSION: &str = "1.0";

/// Values returned to the stack in the `Data` field of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Always [`SELF_VERSION`]
    #[serde(rename = "_self_version")]
    pub self_version: String,
    /// Human readable summary of a successful action
    #[serde(rename = "Result", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Summary of why the action failed
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for ResponseData {
    fn default() -> Self {
        Self {
            self_version: SELF_VERSION.to_owned(),
            result: None,
            error: None,
        }
    }
}

impl ResponseData {
    pub(crate) fn result(message: impl Into<String>) -> Self {
        Self {
            result: Some(message.into()),
            ..Default::default()
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// The completion report sent to the stack's callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultEnvelope {
    /// Whether the requested action completed
    pub status: ResponseStatus,
    /// Pointer to where the details of this invocation are logged
    pub reason: String,
    /// Stable id of the provisioned object
    pub physical_resource_id: String,
    /// Echoed from the request
    pub stack_id: String,
    /// Echoed from the request
    pub request_id: String,
    /// Echoed from the request
    pub logical_resource_id: String,
    /// Action specific result values
    pub data: ResponseData,
}

impl ResultEnvelope {
    /// Build the response to `event`.
    ///
    /// When `physical_resource_id` is `None` the invocation's log stream name is reported
    /// in its place.
    pub fn new(
        event: &LifecycleEvent,
        cx: &InvocationContext,
        status: ResponseStatus,
        data: ResponseData,
        physical_resource_id: Option<&str>,
    ) -> Self {
        Self {
            status,
            reason: format!(
                "See the details in CloudWatch Log Stream: {}",
                cx.log_stream_name()
            ),
            physical_resource_id: physical_resource_id
                .unwrap_or(cx.log_stream_name())
                .to_owned(),
            stack_id: event.stack_id().to_owned(),
            request_id: event.request_id().to_owned(),
            logical_resource_id: event.logical_resource_id().to_owned(),
            data,
        }
    }

    /// Build a `FAILED` response for a payload that could not be decoded.
    ///
    /// Request fields are echoed back when they are present as strings.
    pub fn from_raw_event(payload: &Value, cx: &InvocationContext, data: ResponseData) -> Self {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        Self {
            status: ResponseStatus::Failed,
            reason: format!(
                "See the details in CloudWatch Log Stream: {}",
                cx.log_stream_name()
            ),
            physical_resource_id: cx.log_stream_name().to_owned(),
            stack_id: field("StackId"),
            request_id: field("RequestId"),
            logical_resource_id: field("LogicalResourceId"),
            data,
        }
    }

    /// Serialize to the JSON wire format.
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        Ok(serde_json::to_vec(self)?.into())
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_smithy_types::error::display::DisplayErrorContext;
use bytes::Bytes;
use serde_json::Value;

use crate::error::Error;
use crate::event::LifecycleEvent;
use crate::reporter::{Delivery, Reporter};
use crate::response::{ResponseData, ResultEnvelope};
use crate::types::{
    DeletionPolicy, InvocationContext, RequestType, ResponseStatus, ResourceSpec, SourceSpec,
};
use crate::Config;

const RETAIN_MESSAGE: &str = "Delete requires no action when deletion policy is Retain.";

/// Custom resource handler.
///
/// Each call to [`handle`](Handler::handle) interprets one lifecycle event, performs at most
/// one storage operation, and makes exactly one attempt to report the result.
#[derive(Debug, Clone)]
pub struct Handler {
    handle: Arc<Handle>,
}

#[derive(Debug)]
struct Handle {
    config: Config,
    reporter: Reporter,
}

/// Result of interpreting an event that did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) status: ResponseStatus,
    pub(crate) data: ResponseData,
    pub(crate) physical_resource_id: Option<String>,
}

impl Outcome {
    fn success(message: String, physical_resource_id: Option<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: ResponseData::result(message),
            physical_resource_id,
        }
    }

    fn failed(message: String, physical_resource_id: String) -> Self {
        Self {
            status: ResponseStatus::Failed,
            data: ResponseData::error(message),
            physical_resource_id: Some(physical_resource_id),
        }
    }
}

impl Handler {
    /// Creates a new handler from a config.
    pub fn new(config: Config) -> Handler {
        let reporter = Reporter::new(config.transport().clone());
        Handler {
            handle: Arc::new(Handle { config, reporter }),
        }
    }

    /// Returns the handler's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// Handle a raw invocation payload.
    ///
    /// A payload that cannot be decoded is still answered with a `FAILED` response when it
    /// carries a `ResponseURL`.
    pub async fn handle_value(
        &self,
        payload: Value,
        cx: &InvocationContext,
    ) -> Result<Delivery, Error> {
        tracing::info!(
            "Received event: {}",
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
        );

        match LifecycleEvent::from_value(payload.clone()) {
            Ok(event) => self.handle(&event, cx).await,
            Err(err) => {
                tracing::error!("unable to decode event: {}", DisplayErrorContext(&err));
                let envelope = ResultEnvelope::from_raw_event(
                    &payload,
                    cx,
                    ResponseData::error(err.to_report_string()),
                );
                let response_url = payload.get("ResponseURL").and_then(Value::as_str);
                self.handle.reporter.send(response_url, &envelope).await
            }
        }
    }

    /// Handle a decoded lifecycle event and report the result.
    pub async fn handle(
        &self,
        event: &LifecycleEvent,
        cx: &InvocationContext,
    ) -> Result<Delivery, Error> {
        let envelope = match self.interpret(event).await {
            Ok(outcome) => ResultEnvelope::new(
                event,
                cx,
                outcome.status,
                outcome.data,
                outcome.physical_resource_id.as_deref(),
            ),
            Err(err) => {
                let message = err.to_report_string();
                tracing::error!("{message}");
                // the physical id may not have been computed yet
                ResultEnvelope::new(
                    event,
                    cx,
                    ResponseStatus::Failed,
                    ResponseData::error(message),
                    None,
                )
            }
        };

        self.handle
            .reporter
            .send(event.response_url(), &envelope)
            .await
    }

    /// Map `event` to a storage effect and run it.
    ///
    /// Storage failures are reported in the returned [`Outcome`]. Any other error aborts
    /// interpretation.
    pub(crate) async fn interpret(&self, event: &LifecycleEvent) -> Result<Outcome, Error> {
        let request_type = event.request_type();
        let policy = event.deletion_policy();

        if request_type == RequestType::Delete && *policy == DeletionPolicy::Retain {
            tracing::debug!("retaining object for {}", event.logical_resource_id());
            return Ok(Outcome::success(
                RETAIN_MESSAGE.to_owned(),
                event.physical_resource_id().map(str::to_owned),
            ));
        }

        let ResourceSpec { source, target } = event.resource_properties().validate()?;

        let name = target.resource_name();
        let physical_resource_id = match event.physical_resource_id() {
            Some(id) => id.to_owned(),
            None => format!("{name}:{}", event.request_id()),
        };

        let store = self.config().store();
        let label = self.config().resource_label();

        if request_type == RequestType::Delete && *policy == DeletionPolicy::Delete {
            return match store.delete(&target.bucket, &target.key).await {
                Ok(()) => {
                    tracing::info!("deleted {name}");
                    Ok(Outcome::success(
                        format!("Deleted File {name}"),
                        Some(physical_resource_id),
                    ))
                }
                Err(err) => Ok(storage_failure(label, "delete", &err, physical_resource_id)),
            };
        }

        let acl = target.acl.as_deref();
        let operation = source.operation();
        let result = match &source {
            SourceSpec::Copy { copy_source } => {
                store
                    .copy(&target.bucket, &target.key, copy_source, acl)
                    .await
            }
            SourceSpec::Inline { body, content_type } => {
                store
                    .put(
                        &target.bucket,
                        &target.key,
                        Bytes::from(body.clone()),
                        content_type.as_deref(),
                        acl,
                    )
                    .await
            }
        };

        match result {
            Ok(()) => {
                tracing::info!("{operation} of {name} complete");
                Ok(Outcome::success(
                    format!("{request_type}d File{name}"),
                    Some(physical_resource_id),
                ))
            }
            Err(err) => Ok(storage_failure(label, operation, &err, physical_resource_id)),
        }
    }
}

fn storage_failure(
    label: &str,
    operation: &str,
    err: &Error,
    physical_resource_id: String,
) -> Outcome {
    let message = format!("{label} call to {operation} object failed");
    tracing::error!("{message}:\n{}", DisplayErrorContext(err));
    Outcome::failed(message, physical_resource_id)
}

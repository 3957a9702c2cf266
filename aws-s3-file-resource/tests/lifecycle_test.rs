/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_s3_file_resource::error::ErrorKind;
use aws_s3_file_resource::reporter::Delivery;
use aws_s3_file_resource::response::{ResultEnvelope, SELF_VERSION};
use aws_s3_file_resource::types::{InvocationContext, ResponseStatus};
use aws_s3_file_resource::{Config, Handler};
use aws_smithy_runtime::test_util::capture_test_logs::capture_test_logs;
use bytes::Bytes;
use futures_util::FutureExt;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use serde_json::{json, Value};
use test_common::{RecordingStore, StoreCall};

type CallbackHandle = tower_test::mock::Handle<Request<Bytes>, Response<()>>;

const LOG_STREAM: &str = "2024/05/01/[$LATEST]0123456789abcdef";
const RESPONSE_URL: &str = "https://cfn-responses.example.com/stack/req-1?X-Amz-Signature=abc";

fn test_handler(store: &RecordingStore) -> (Handler, CallbackHandle) {
    let (transport, callback) = tower_test::mock::pair::<Request<Bytes>, Response<()>>();
    let config = Config::builder()
        .store(store.clone())
        .transport(transport)
        .build()
        .unwrap();
    (Handler::new(config), callback)
}

fn event(request_type: &str, extra: Value) -> Value {
    let mut event = json!({
        "RequestType": request_type,
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:PutS3File",
        "ResponseURL": RESPONSE_URL,
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/app/guid",
        "RequestId": "req-1",
        "LogicalResourceId": "AppConfig",
        "ResourceType": "Custom::PutS3File",
        "ResourceProperties": {
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:PutS3File",
            "Source": { "filetext": "hello", "contentType": "text/plain" },
            "Target": { "Bucket": "b", "Key": "k" },
        },
    });
    if let (Some(fields), Value::Object(extra)) = (event.as_object_mut(), extra) {
        fields.extend(extra);
    }
    event
}

/// Invoke the handler and answer its callback request with `200 OK`.
async fn invoke(
    handler: &Handler,
    callback: &mut CallbackHandle,
    payload: Value,
) -> (Delivery, Request<Bytes>, ResultEnvelope) {
    let cx = InvocationContext::new(LOG_STREAM);
    let (delivery, request) = tokio::join!(handler.handle_value(payload, &cx), async {
        let (request, send) = callback.next_request().await.expect("callback request");
        send.send_response(Response::builder().status(200).body(()).unwrap());
        request
    });
    let envelope: ResultEnvelope = serde_json::from_slice(request.body()).unwrap();
    (delivery.unwrap(), request, envelope)
}

#[tokio::test]
async fn test_create_puts_inline_content() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);

    let (delivery, _, envelope) = invoke(&handler, &mut callback, event("Create", json!({}))).await;

    assert_eq!(Delivery::Sent(StatusCode::OK), delivery);
    assert_eq!(
        vec![StoreCall::Put {
            bucket: "b".to_owned(),
            key: "k".to_owned(),
            body: "hello".to_owned(),
            content_type: Some("text/plain".to_owned()),
            acl: None,
        }],
        store.calls()
    );
    assert_eq!(ResponseStatus::Success, envelope.status);
    assert_eq!(Some("Created FileS3://b/k"), envelope.data.result.as_deref());
    assert_eq!(None, envelope.data.error);
    assert_eq!("S3://b/k:req-1", envelope.physical_resource_id);
}

#[tokio::test]
async fn test_copy_source_never_puts() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event(
        "Update",
        json!({
            "PhysicalResourceId": "S3://b/k:req-0",
            "ResourceProperties": {
                "Source": { "S3Url": "config-bucket/prod/app.json", "filetext": "unused" },
                "Target": { "Bucket": "b", "Key": "k", "ACL": "public-read" },
            },
        }),
    );

    let (_, _, envelope) = invoke(&handler, &mut callback, payload).await;

    assert_eq!(
        vec![StoreCall::Copy {
            bucket: "b".to_owned(),
            key: "k".to_owned(),
            copy_source: "config-bucket/prod/app.json".to_owned(),
            acl: Some("public-read".to_owned()),
        }],
        store.calls()
    );
    assert_eq!(Some("Updated FileS3://b/k"), envelope.data.result.as_deref());
    assert_eq!("S3://b/k:req-0", envelope.physical_resource_id);
}

#[tokio::test]
async fn test_put_failure_reports_failed() {
    let store = RecordingStore::failing("AccessDenied");
    let (handler, mut callback) = test_handler(&store);

    let (_, _, envelope) = invoke(&handler, &mut callback, event("Create", json!({}))).await;

    assert_eq!(1, store.calls().len());
    assert_eq!(ResponseStatus::Failed, envelope.status);
    assert_eq!(
        Some("PutS3File call to put object failed"),
        envelope.data.error.as_deref()
    );
    assert_eq!("S3://b/k:req-1", envelope.physical_resource_id);
}

#[tokio::test]
async fn test_delete_removes_object() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event("Delete", json!({ "PhysicalResourceId": "S3://b/k:req-0" }));

    let (_, _, envelope) = invoke(&handler, &mut callback, payload).await;

    assert_eq!(
        vec![StoreCall::Delete {
            bucket: "b".to_owned(),
            key: "k".to_owned(),
        }],
        store.calls()
    );
    assert_eq!(ResponseStatus::Success, envelope.status);
    assert_eq!(Some("Deleted File S3://b/k"), envelope.data.result.as_deref());
    assert_eq!("S3://b/k:req-0", envelope.physical_resource_id);
}

#[tokio::test]
async fn test_delete_failure() {
    let store = RecordingStore::failing("NoSuchBucket");
    let (handler, mut callback) = test_handler(&store);

    let (_, _, envelope) = invoke(&handler, &mut callback, event("Delete", json!({}))).await;

    assert_eq!(1, store.calls().len());
    assert_eq!(ResponseStatus::Failed, envelope.status);
    assert_eq!(
        Some("PutS3File call to delete object failed"),
        envelope.data.error.as_deref()
    );
}

#[tokio::test]
async fn test_delete_with_retain_policy_leaves_object() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event(
        "Delete",
        json!({
            "DeletionPolicy": "Retain",
            "PhysicalResourceId": "S3://b/k:req-0",
        }),
    );

    let (_, _, envelope) = invoke(&handler, &mut callback, payload).await;

    assert!(store.calls().is_empty());
    assert_eq!(ResponseStatus::Success, envelope.status);
    assert_eq!(
        Some("Delete requires no action when deletion policy is Retain."),
        envelope.data.result.as_deref()
    );
    assert_eq!("S3://b/k:req-0", envelope.physical_resource_id);
}

#[tokio::test]
async fn test_delete_with_blank_policy_removes_object() {
    for policy in [json!(""), Value::Null] {
        let store = RecordingStore::new();
        let (handler, mut callback) = test_handler(&store);
        let payload = event(
            "Delete",
            json!({
                "DeletionPolicy": policy,
                "PhysicalResourceId": "S3://b/k:req-0",
            }),
        );

        let (_, _, envelope) = invoke(&handler, &mut callback, payload).await;

        assert_eq!(
            vec![StoreCall::Delete {
                bucket: "b".to_owned(),
                key: "k".to_owned(),
            }],
            store.calls(),
            "policy {policy}"
        );
        assert_eq!(ResponseStatus::Success, envelope.status);
        assert_eq!(Some("Deleted File S3://b/k"), envelope.data.result.as_deref());
    }
}

#[tokio::test]
async fn test_retain_with_null_properties() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event(
        "Delete",
        json!({
            "DeletionPolicy": "Retain",
            "PhysicalResourceId": "S3://b/k:req-0",
            "ResourceProperties": null,
            "StackId": null,
        }),
    );

    let (_, _, envelope) = invoke(&handler, &mut callback, payload).await;

    assert!(store.calls().is_empty());
    assert_eq!(ResponseStatus::Success, envelope.status);
    assert_eq!(
        Some("Delete requires no action when deletion policy is Retain."),
        envelope.data.result.as_deref()
    );
    assert_eq!("S3://b/k:req-0", envelope.physical_resource_id);
    assert_eq!("", envelope.stack_id);
}

#[tokio::test]
async fn test_callback_request_shape() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event("Create", json!({ "ResponseURL": "https://host/path?X" }));

    let (_, request, envelope) = invoke(&handler, &mut callback, payload).await;

    assert_eq!(Method::PUT, request.method());
    assert_eq!(Some("host"), request.uri().host());
    assert_eq!(Some(443), request.uri().port_u16());
    assert_eq!(
        Some("/path?X"),
        request.uri().path_and_query().map(|pq| pq.as_str())
    );
    assert_eq!("", request.headers()[CONTENT_TYPE].to_str().unwrap());
    assert_eq!(
        request.body().len().to_string(),
        request.headers()[CONTENT_LENGTH].to_str().unwrap()
    );

    assert_eq!(
        format!("See the details in CloudWatch Log Stream: {LOG_STREAM}"),
        envelope.reason
    );
    assert_eq!(
        "arn:aws:cloudformation:us-east-1:123456789012:stack/app/guid",
        envelope.stack_id
    );
    assert_eq!("req-1", envelope.request_id);
    assert_eq!("AppConfig", envelope.logical_resource_id);
    assert_eq!(SELF_VERSION, envelope.data.self_version);

    let raw: Value = serde_json::from_slice(request.body()).unwrap();
    assert_eq!(json!("1.0"), raw["Data"]["_self_version"]);
    assert!(raw["Data"].get("Error").is_none());
}

#[tokio::test]
async fn test_missing_target_reports_single_failure() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event(
        "Create",
        json!({ "ResourceProperties": { "Source": { "filetext": "hello" } } }),
    );

    let (_, _, envelope) = invoke(&handler, &mut callback, payload).await;

    assert!(store.calls().is_empty());
    assert_eq!(ResponseStatus::Failed, envelope.status);
    assert_eq!(
        Some("ConfigurationFault: missing required property `Target`"),
        envelope.data.error.as_deref()
    );
    // no physical id was computed, so the log stream name stands in
    assert_eq!(LOG_STREAM, envelope.physical_resource_id);
    assert!(callback.next_request().now_or_never().is_none());
}

#[tokio::test]
async fn test_undecodable_event_still_responds() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event("Rollback", json!({}));

    let (_, _, envelope) = invoke(&handler, &mut callback, payload).await;

    assert!(store.calls().is_empty());
    assert_eq!(ResponseStatus::Failed, envelope.status);
    assert_eq!("req-1", envelope.request_id);
    assert!(envelope
        .data
        .error
        .as_deref()
        .unwrap()
        .starts_with("ConfigurationFault: "));
}

#[tokio::test]
async fn test_no_response_url_skips_delivery() {
    let (_guard, rx) = capture_test_logs();
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let mut payload = event("Create", json!({}));
    payload.as_object_mut().unwrap().remove("ResponseURL");

    let delivery = handler
        .handle_value(payload, &InvocationContext::new(LOG_STREAM))
        .await
        .unwrap();

    assert_eq!(Delivery::NoResponseUrl, delivery);
    assert_eq!(1, store.calls().len());
    assert!(callback.next_request().now_or_never().is_none());
    assert!(rx.contents().contains("no ResponseURL in event"));
}

#[tokio::test]
async fn test_transport_error_is_delivery_fault() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let cx = InvocationContext::new(LOG_STREAM);

    let (result, _) = tokio::join!(
        handler.handle_value(event("Create", json!({})), &cx),
        async {
            let (_, send) = callback.next_request().await.expect("callback request");
            send.send_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ));
        }
    );

    let err = result.unwrap_err();
    assert_eq!(&ErrorKind::DeliveryFault, err.kind());
    // exactly one attempt
    assert!(callback.next_request().now_or_never().is_none());
}

#[tokio::test]
async fn test_unparseable_response_url() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let payload = event("Create", json!({ "ResponseURL": "not a url" }));

    let err = handler
        .handle_value(payload, &InvocationContext::new(LOG_STREAM))
        .await
        .unwrap_err();

    assert_eq!(&ErrorKind::ConfigurationFault, err.kind());
    assert!(callback.next_request().now_or_never().is_none());
}

#[tokio::test]
async fn test_non_success_status_still_counts_as_delivered() {
    let store = RecordingStore::new();
    let (handler, mut callback) = test_handler(&store);
    let cx = InvocationContext::new(LOG_STREAM);

    let (result, _) = tokio::join!(
        handler.handle_value(event("Create", json!({})), &cx),
        async {
            let (_, send) = callback.next_request().await.expect("callback request");
            send.send_response(Response::builder().status(403).body(()).unwrap());
        }
    );

    assert_eq!(Delivery::Sent(StatusCode::FORBIDDEN), result.unwrap());
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_s3_file_resource::types::InvocationContext;
use aws_s3_file_resource::Handler;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // CloudWatch timestamps every line already
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();

    tracing::info!("Loading function PutS3File");
    let config = aws_s3_file_resource::from_env().load().await?;
    let handler = Handler::new(config);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move {
            let cx = InvocationContext::new(event.context.env_config.log_stream.clone());
            let delivery = handler.handle_value(event.payload, &cx).await?;
            Ok::<_, lambda_runtime::Error>(Value::from(delivery.message()))
        }
    }))
    .await
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! A CloudFormation custom resource that manages a single Amazon S3 object.
//!
//! On `Create` and `Update` the target object is written either from inline text or by
//! copying an existing object. On `Delete` the object is removed unless the resource's
//! deletion policy is `Retain`. The outcome is always reported back to the stack by a
//! single `PUT` to the pre-signed `ResponseURL` supplied with the request.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example(payload: serde_json::Value) -> Result<(), aws_s3_file_resource::error::Error> {
//! use aws_s3_file_resource::types::InvocationContext;
//!
//! let config = aws_s3_file_resource::from_env().load().await?;
//! let handler = aws_s3_file_resource::Handler::new(config);
//!
//! let cx = InvocationContext::new("2024/01/01/[$LATEST]0123456789abcdef");
//! handler.handle_value(payload, &cx).await?;
//! # Ok(())
//! # }
//! ```

/// Error types emitted by `aws-s3-file-resource`
pub mod error;

/// Common types used by `aws-s3-file-resource`
pub mod types;

/// Lifecycle event decoding
pub mod event;

/// Storage capability and its Amazon S3 implementation
pub mod store;

/// Response envelope sent back to the stack
pub mod response;

/// Delivery of responses to the callback URL
pub mod reporter;

/// Lifecycle event handler
pub mod handler;

/// Handler configuration
pub mod config;

pub use self::config::Config;
use self::config::loader::ConfigLoader;
pub use self::handler::Handler;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}

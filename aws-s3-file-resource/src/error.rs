/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_sdk_s3::error::ProvideErrorMetadata;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of custom resource errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Missing or malformed event properties, or an unusable callback URL
    ConfigurationFault,

    /// The storage backend rejected or failed an object operation
    StorageFault,

    /// The completion report could not be delivered to the callback URL
    DeliveryFault,
}

impl ErrorKind {
    /// Short name of this kind as reported in the `Error` field of a response.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationFault => "ConfigurationFault",
            ErrorKind::StorageFault => "StorageFault",
            ErrorKind::DeliveryFault => "DeliveryFault",
        }
    }
}

impl Error {
    /// Creates a new [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Render as `<kind>: <message>`, the form reported back to the stack.
    pub(crate) fn to_report_string(&self) -> String {
        format!("{}: {}", self.kind.name(), self.source)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::ConfigurationFault => write!(f, "invalid resource configuration"),
            ErrorKind::StorageFault => write!(f, "storage operation failed"),
            ErrorKind::DeliveryFault => write!(f, "failed to deliver response"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ErrorKind::ConfigurationFault, value)
    }
}

impl From<http::Error> for Error {
    fn from(value: http::Error) -> Self {
        Self::new(ErrorKind::ConfigurationFault, value)
    }
}

impl<E, R> From<aws_sdk_s3::error::SdkError<E, R>> for Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: Send + Sync + fmt::Debug + 'static,
{
    fn from(value: aws_sdk_s3::error::SdkError<E, R>) -> Self {
        if let Some(code) = value.code() {
            tracing::debug!("storage operation failed with error code {code}");
        }
        Error::new(ErrorKind::StorageFault, value)
    }
}

pub(crate) fn invalid_config<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::ConfigurationFault, err)
}

pub(crate) fn delivery_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::DeliveryFault, err)
}

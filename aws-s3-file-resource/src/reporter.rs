/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, StatusCode, Uri};
use tower::util::BoxCloneSyncService;
use tower::{Service, ServiceExt};

use crate::error::{self, BoxError, Error};
use crate::response::ResultEnvelope;

/// Port the callback is always delivered to, regardless of the URL.
pub const CALLBACK_PORT: u16 = 443;

/// Type-erased service used to deliver callback requests.
pub type CallbackTransport =
    BoxCloneSyncService<http::Request<Bytes>, http::Response<()>, BoxError>;

/// Where a response is delivered, parsed from the request's `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTarget {
    host: String,
    port: u16,
    path_and_query: String,
}

impl CallbackTarget {
    /// Parse a callback URL. Only the host and the path and query are kept.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let uri: Uri = url.parse().map_err(error::invalid_config)?;
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| error::invalid_config(format!("callback URL has no host: {url}")))?;
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .filter(|pq| !pq.is_empty())
            .unwrap_or("/");

        Ok(Self {
            host: host.to_owned(),
            port: CALLBACK_PORT,
            path_and_query: path_and_query.to_owned(),
        })
    }

    /// Host name to connect to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port to connect to
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request path including the (pre-signed) query string
    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }

    fn uri(&self) -> Result<Uri, Error> {
        let authority = format!("{}:{}", self.host, self.port);
        Ok(Uri::builder()
            .scheme("https")
            .authority(authority.as_str())
            .path_and_query(self.path_and_query.as_str())
            .build()?)
    }

    /// Build the `PUT` request carrying `body`.
    ///
    /// The callback receiver requires an empty `Content-Type` header and an exact
    /// `Content-Length`.
    pub fn build_request(&self, body: Bytes) -> Result<http::Request<Bytes>, Error> {
        Ok(http::Request::builder()
            .method(Method::PUT)
            .uri(self.uri()?)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len().to_string())
            .body(body)?)
    }
}

/// How a response was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The callback request completed with the given status.
    Sent(StatusCode),
    /// The request carried no `ResponseURL`; nothing was sent.
    NoResponseUrl,
}

impl Delivery {
    /// Completion message reported to the invocation runtime.
    pub fn message(&self) -> &'static str {
        match self {
            Delivery::Sent(_) => "Successfully sent stack response!",
            Delivery::NoResponseUrl => "No ResponseURL in event, response not sent",
        }
    }
}

/// Delivers a [`ResultEnvelope`] to a callback URL, once.
#[derive(Clone)]
pub struct Reporter {
    transport: CallbackTransport,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

impl Reporter {
    /// Create a reporter that sends requests through `transport`.
    pub fn new(transport: CallbackTransport) -> Self {
        Self { transport }
    }

    /// Send `envelope` to `response_url`.
    ///
    /// Any HTTP status from the receiver counts as delivered. A transport failure is
    /// returned as [`ErrorKind::DeliveryFault`](crate::error::ErrorKind::DeliveryFault)
    /// and is not retried.
    pub async fn send(
        &self,
        response_url: Option<&str>,
        envelope: &ResultEnvelope,
    ) -> Result<Delivery, Error> {
        let body = envelope.to_bytes()?;
        tracing::info!("RESPONSE BODY: {}", String::from_utf8_lossy(&body));

        let Some(url) = response_url else {
            tracing::warn!("Warning - no ResponseURL in event!");
            return Ok(Delivery::NoResponseUrl);
        };

        let request = CallbackTarget::parse(url)?.build_request(body)?;
        let response = match self.transport.clone().oneshot(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("sendResponse Error: {err}");
                return Err(error::delivery_failed(err));
            }
        };

        tracing::info!("STATUS: {}", response.status());
        tracing::info!("HEADERS: {:?}", response.headers());
        Ok(Delivery::Sent(response.status()))
    }
}

/// Production transport: HTTPS via `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    client: reqwest::Client,
}

impl HttpsTransport {
    /// Create a transport from an existing `reqwest` client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Create a transport with a default HTTPS-only client.
    pub fn try_default() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .https_only(true)
            .build()
            .map_err(error::invalid_config)?;
        Ok(Self::new(client))
    }
}

impl Service<http::Request<Bytes>> for HttpsTransport {
    type Response = http::Response<()>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Bytes>) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move {
            let req = reqwest::Request::try_from(req)?;
            let resp = client.execute(req).await?;

            let mut response = http::Response::new(());
            *response.status_mut() = resp.status();
            *response.headers_mut() = resp.headers().clone();
            Ok(response)
        })
    }
}

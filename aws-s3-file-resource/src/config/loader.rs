/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_types::SdkConfig;

use crate::config::Builder;
use crate::error::Error;
use crate::Config;

/// Load custom resource [`Config`] from the environment.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    builder: Builder,
    sdk_config: Option<SdkConfig>,
}

impl ConfigLoader {
    /// Label used to prefix storage failure messages.
    pub fn resource_label(mut self, label: impl Into<String>) -> Self {
        self.builder = self.builder.resource_label(label);
        self
    }

    /// Use an already loaded AWS configuration instead of resolving one from the environment.
    pub fn sdk_config(mut self, sdk_config: SdkConfig) -> Self {
        self.sdk_config = Some(sdk_config);
        self
    }

    /// Load the default configuration
    ///
    /// The S3 client is constructed once here and shared by every invocation handled by
    /// the resulting config.
    pub async fn load(self) -> Result<Config, Error> {
        let shared_config = match self.sdk_config {
            Some(sdk_config) => sdk_config,
            None => aws_config::from_env().load().await,
        };
        let s3_client = aws_sdk_s3::Client::new(&shared_config);
        self.builder.s3_client(s3_client).build()
    }
}

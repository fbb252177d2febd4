/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Configuration of a tool facade. A [ToolConfig] is created once when the facade is constructed and
//! is not changed afterwards.

use crate::platform::Platform;

/// Docker Hub repository of the Solidity compiler image.
pub const SOLC_IMAGE: &str = "ethereum/solc";

/// Docker Hub repository of the geth tools image. Tags with the `alltools-` prefix contain `abigen`.
pub const GETH_TOOLS_IMAGE: &str = "ethereum/client-go";

/// Image and platform used for every build of a tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolConfig {
    /// Image reference, for example `ethereum/solc:0.8.28`.
    pub image: String,
    /// Platform of the image variant to pull and run.
    pub platform: Platform,
}

impl ToolConfig {
    /// Configuration for `image` on linux/amd64.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            platform: Platform::linux_amd64(),
        }
    }

    /// Configuration for `<repository>:<tag>` on linux/amd64.
    pub fn tagged(repository: &str, tag: &str) -> Self {
        Self::new(format!("{repository}:{tag}"))
    }

    pub fn with_platform(self, platform: Platform) -> Self {
        Self { platform, ..self }
    }
}

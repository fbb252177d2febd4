/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Go binding generator (`abigen`) running in the `ethereum/client-go` tools image.

use std::path::Path;

use bollard::Docker;

use crate::{
    config::{ToolConfig, GETH_TOOLS_IMAGE},
    error::Error,
    request::{AbiGenerate, ToolKind},
    runner::BuildResult,
    runtime::ContainerRuntime,
};

use super::Toolchain;

#[derive(Debug, Clone)]
pub struct Abigen<R = Docker> {
    toolchain: Toolchain<R>,
}

impl Abigen<Docker> {
    /// Connect to Docker and pull `ethereum/client-go:<image_tag>` for linux/amd64. The tag must name
    /// an image that ships `abigen`, such as `alltools-stable`.
    pub async fn connect(image_tag: &str) -> Result<Self, Error> {
        Self::connect_with_config(ToolConfig::tagged(GETH_TOOLS_IMAGE, image_tag)).await
    }

    pub async fn connect_with_config(config: ToolConfig) -> Result<Self, Error> {
        Ok(Self {
            toolchain: Toolchain::connect(config, true).await?,
        })
    }
}

impl<R: ContainerRuntime> Abigen<R> {
    pub fn with_runtime(runtime: R, config: ToolConfig) -> Self {
        Self {
            toolchain: Toolchain::with_runtime(runtime, config),
        }
    }

    pub fn toolchain(&self) -> &Toolchain<R> {
        &self.toolchain
    }

    /// Generate `output_dir/<local_type>.go` in package `package` from `<local_type>.abi` and
    /// `<local_type>.bin` found in `abi_dir`.
    pub async fn generate_go_binding(
        &self,
        container_name: &str,
        abi_dir: &Path,
        output_dir: &Path,
        package: &str,
        local_type: &str,
    ) -> Result<BuildResult, Error> {
        let kind = ToolKind::AbiGenerate(AbiGenerate {
            abi_dir: abi_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            package: package.to_string(),
            local_type: local_type.to_string(),
        });
        self.toolchain.submit(&kind, container_name).await
    }

    pub async fn remove_container(&self, container_id: &str) -> Result<(), Error> {
        self.toolchain.remove_container(container_id).await
    }

    pub async fn remove_container_force(&self, container_id: &str) -> Result<(), Error> {
        self.toolchain.remove_container_force(container_id).await
    }
}

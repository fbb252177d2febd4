/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Solidity compiler running in the `ethereum/solc` image.

use std::path::Path;

use bollard::Docker;

use crate::{
    config::{ToolConfig, SOLC_IMAGE},
    error::Error,
    evm::EvmVersion,
    request::{SolidityCompile, ToolKind},
    runner::BuildResult,
    runtime::ContainerRuntime,
};

use super::Toolchain;

/// Compiles Solidity sources into `.abi` and `.bin` artifacts.
#[derive(Debug, Clone)]
pub struct Solc<R = Docker> {
    toolchain: Toolchain<R>,
}

impl Solc<Docker> {
    /// Connect to Docker and pull `ethereum/solc:<image_tag>` for linux/amd64.
    pub async fn connect(image_tag: &str) -> Result<Self, Error> {
        Self::connect_with_config(ToolConfig::tagged(SOLC_IMAGE, image_tag)).await
    }

    pub async fn connect_with_config(config: ToolConfig) -> Result<Self, Error> {
        Ok(Self {
            toolchain: Toolchain::connect(config, true).await?,
        })
    }
}

impl<R: ContainerRuntime> Solc<R> {
    pub fn with_runtime(runtime: R, config: ToolConfig) -> Self {
        Self {
            toolchain: Toolchain::with_runtime(runtime, config),
        }
    }

    pub fn toolchain(&self) -> &Toolchain<R> {
        &self.toolchain
    }

    /// Compile `source_dir/source_file` into `output_dir`.
    ///
    /// `evm_version` is checked before anything is sent to the runtime; an unknown or miscased
    /// name fails with [Error::InvalidEvmVersion].
    pub async fn compile(
        &self,
        container_name: &str,
        source_dir: &Path,
        source_file: &str,
        output_dir: &Path,
        evm_version: &str,
    ) -> Result<BuildResult, Error> {
        self.compile_sol(container_name, source_dir, source_file, output_dir, evm_version, false)
            .await
    }

    /// Same as [Solc::compile], replacing artifacts already present in `output_dir`.
    pub async fn compile_with_overwrite(
        &self,
        container_name: &str,
        source_dir: &Path,
        source_file: &str,
        output_dir: &Path,
        evm_version: &str,
    ) -> Result<BuildResult, Error> {
        self.compile_sol(container_name, source_dir, source_file, output_dir, evm_version, true)
            .await
    }

    async fn compile_sol(
        &self,
        container_name: &str,
        source_dir: &Path,
        source_file: &str,
        output_dir: &Path,
        evm_version: &str,
        overwrite: bool,
    ) -> Result<BuildResult, Error> {
        let evm_version: EvmVersion = evm_version.parse()?;
        let kind = ToolKind::SolidityCompile(SolidityCompile {
            source_dir: source_dir.to_path_buf(),
            source_file: source_file.to_string(),
            output_dir: output_dir.to_path_buf(),
            evm_version,
            overwrite,
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

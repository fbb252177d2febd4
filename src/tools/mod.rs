/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Tool facades. Each facade owns a [Toolchain], the image it runs and the runner that talks to the
//! container runtime, and turns its named operations into a [ToolKind] submitted to the toolchain.

pub mod abigen;
pub use abigen::Abigen;

pub mod protoc;
pub use protoc::Protoc;

pub mod solc;
pub use solc::Solc;

use bollard::Docker;

use crate::{
    config::ToolConfig,
    error::Error,
    request::{BuildRequest, ToolKind},
    runner::{BuildResult, ContainerRunner},
    runtime::ContainerRuntime,
};

/// Shared core of the tool facades.
#[derive(Debug, Clone)]
pub struct Toolchain<R = Docker> {
    config: ToolConfig,
    runner: ContainerRunner<R>,
}

impl Toolchain<Docker> {
    /// Connect to the local Docker daemon and, if `pull` is set, pull the configured image.
    pub async fn connect(config: ToolConfig, pull: bool) -> Result<Self, Error> {
        let docker = crate::runtime::connect().await?;
        let toolchain = Self::with_runtime(docker, config);
        if pull {
            toolchain
                .runner
                .pull(&toolchain.config.image, &toolchain.config.platform)
                .await?;
        }
        Ok(toolchain)
    }
}

impl<R: ContainerRuntime> Toolchain<R> {
    pub fn with_runtime(runtime: R, config: ToolConfig) -> Self {
        Self {
            config,
            runner: ContainerRunner::new(runtime),
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn runner(&self) -> &ContainerRunner<R> {
        &self.runner
    }

    /// The request that [Toolchain::submit] would run.
    pub fn request(&self, kind: &ToolKind, container_name: &str) -> BuildRequest {
        BuildRequest::new(kind, &self.config.image, container_name)
    }

    /// Run `kind` in a new container named `container_name`. Parameters are validated first, so a
    /// rejected request never reaches the runtime.
    pub async fn submit(&self, kind: &ToolKind, container_name: &str) -> Result<BuildResult, Error> {
        kind.validate()?;
        let request = self.request(kind, container_name);
        self.runner.run(&request, &self.config.platform).await
    }

    pub async fn remove_container(&self, container_id: &str) -> Result<(), Error> {
        self.runner.remove(container_id).await
    }

    pub async fn remove_container_force(&self, container_id: &str) -> Result<(), Error> {
        self.runner.remove_force(container_id).await
    }
}

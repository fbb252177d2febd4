/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Protocol Buffer compiler with the Go and Go gRPC plugins. There is no official image, so the image
//! reference is always supplied by the caller, typically a locally built one.

use std::path::{Path, PathBuf};

use bollard::Docker;

use crate::{
    config::ToolConfig,
    error::Error,
    request::{ProtoCompile, ProtoPlugin, ToolKind},
    runner::BuildResult,
    runtime::ContainerRuntime,
};

use super::Toolchain;

#[derive(Debug, Clone)]
pub struct Protoc<R = Docker> {
    toolchain: Toolchain<R>,
}

impl Protoc<Docker> {
    /// Connect to Docker and pull `image` for linux/amd64.
    pub async fn connect(image: &str) -> Result<Self, Error> {
        Self::connect_with_config(ToolConfig::new(image), true).await
    }

    /// Connect to Docker and use `image` as found in the local image store.
    pub async fn with_local_image(image: &str) -> Result<Self, Error> {
        Self::connect_with_config(ToolConfig::new(image), false).await
    }

    pub async fn connect_with_config(config: ToolConfig, pull: bool) -> Result<Self, Error> {
        Ok(Self {
            toolchain: Toolchain::connect(config, pull).await?,
        })
    }
}

impl<R: ContainerRuntime> Protoc<R> {
    pub fn with_runtime(runtime: R, config: ToolConfig) -> Self {
        Self {
            toolchain: Toolchain::with_runtime(runtime, config),
        }
    }

    pub fn toolchain(&self) -> &Toolchain<R> {
        &self.toolchain
    }

    /// Generate Go messages for `proto_file` into `output_dir`, resolving imports against
    /// `proto_paths`. Output paths are relative to the proto file's directory.
    pub async fn compile_go(
        &self,
        container_name: &str,
        proto_paths: &[PathBuf],
        output_dir: &Path,
        proto_file: &Path,
    ) -> Result<BuildResult, Error> {
        self.compile_protos(container_name, proto_paths, output_dir, proto_file, ProtoPlugin::Go)
            .await
    }

    /// Same as [Protoc::compile_go], also generating gRPC service stubs.
    pub async fn compile_grpc(
        &self,
        container_name: &str,
        proto_paths: &[PathBuf],
        output_dir: &Path,
        proto_file: &Path,
    ) -> Result<BuildResult, Error> {
        self.compile_protos(container_name, proto_paths, output_dir, proto_file, ProtoPlugin::Grpc)
            .await
    }

    async fn compile_protos(
        &self,
        container_name: &str,
        proto_paths: &[PathBuf],
        output_dir: &Path,
        proto_file: &Path,
        plugin: ProtoPlugin,
    ) -> Result<BuildResult, Error> {
        let kind = ToolKind::ProtoCompile(ProtoCompile {
            proto_paths: proto_paths.to_vec(),
            output_dir: output_dir.to_path_buf(),
            proto_file: proto_file.to_path_buf(),
            plugin,
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

/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Assembly of build requests. A [ToolKind] carries the parameters of one tool invocation and knows
//! the command line and the bind mounts the tool's image expects. Assembly is a pure function of
//! those parameters: nothing here touches the file system or the container runtime.
//! [ToolKind::validate] rejects parameters that could only produce a failing container; callers run
//! it before anything is sent to the runtime.
//!
//! Host directories are bound to fixed paths inside the container:
//!
//! | Tool   | Inputs                                       | Outputs              |
//! |--------|----------------------------------------------|----------------------|
//! | solc   | `/opt/solidity/<file>`                       | `/opt/abi`           |
//! | abigen | `/opt/abi/<type>.abi`, `/opt/abi/<type>.bin` | `/opt/binding/<pkg>` |
//! | protoc | search directories at their host path        | `/opt/out`           |

use std::path::{Path, PathBuf};

use crate::{error::Error, evm::EvmVersion, mount::MountSpec};

pub const SOLIDITY_DIR: &str = "/opt/solidity";
pub const ABI_DIR: &str = "/opt/abi";
pub const BINDING_DIR: &str = "/opt/binding";
pub const OUT_DIR: &str = "/opt/out";
pub const PROTO_SYSTEM_INCLUDE: &str = "/usr/local/include";

/// Compile a Solidity source file into `.abi` and `.bin` artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidityCompile {
    pub source_dir: PathBuf,
    pub source_file: String,
    pub output_dir: PathBuf,
    pub evm_version: EvmVersion,
    /// Passes `--overwrite` so existing artifacts in the output directory are replaced.
    pub overwrite: bool,
}

/// Generate a Go binding from the `<local_type>.abi` and `<local_type>.bin` pair in `abi_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiGenerate {
    pub abi_dir: PathBuf,
    pub output_dir: PathBuf,
    pub package: String,
    pub local_type: String,
}

/// protoc plugins to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoPlugin {
    /// `protoc-gen-go` only.
    Go,
    /// `protoc-gen-go` and `protoc-gen-go-grpc`.
    Grpc,
}

/// Compile a proto file into Go sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoCompile {
    /// Directories searched for imports, each mounted at the same path inside the container. At
    /// least one is required.
    pub proto_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Proto file to compile. It must reside within one of `proto_paths`.
    pub proto_file: PathBuf,
    pub plugin: ProtoPlugin,
}

/// A tool invocation, one variant per supported toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    SolidityCompile(SolidityCompile),
    AbiGenerate(AbiGenerate),
    ProtoCompile(ProtoCompile),
}

impl ToolKind {
    /// Checks the parameters before a container is created.
    ///
    /// Host paths must be valid UTF-8 since the runtime receives them as strings. A proto file must
    /// reside within one of the search paths, otherwise it is not mounted into the container.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            ToolKind::SolidityCompile(p) => {
                utf8_path(&p.source_dir.join(&p.source_file))?;
                utf8_path(&p.output_dir)
            }
            ToolKind::AbiGenerate(p) => {
                utf8_path(&p.abi_dir)?;
                utf8_path(&p.output_dir)
            }
            ToolKind::ProtoCompile(p) => {
                for dir in &p.proto_paths {
                    utf8_path(dir)?;
                }
                utf8_path(&p.output_dir)?;
                utf8_path(&p.proto_file)?;
                if !p.proto_paths.iter().any(|dir| p.proto_file.starts_with(dir)) {
                    return Err(Error::InvalidProtoPath(p.proto_file.clone()));
                }
                Ok(())
            }
        }
    }

    /// Short name used as operation context in errors and logs.
    pub fn operation(&self) -> &'static str {
        match self {
            ToolKind::SolidityCompile(_) => "solc",
            ToolKind::AbiGenerate(_) => "abigen",
            ToolKind::ProtoCompile(ProtoCompile {
                plugin: ProtoPlugin::Go,
                ..
            }) => "protoc-go",
            ToolKind::ProtoCompile(ProtoCompile {
                plugin: ProtoPlugin::Grpc,
                ..
            }) => "protoc-grpc",
        }
    }

    /// Arguments passed to the image's entrypoint.
    pub fn command(&self) -> Vec<String> {
        match self {
            ToolKind::SolidityCompile(p) => {
                let mut cmd = vec![
                    "--abi".to_string(),
                    "--bin".to_string(),
                    format!("{SOLIDITY_DIR}/{}", p.source_file),
                    "-o".to_string(),
                    ABI_DIR.to_string(),
                    "--evm-version".to_string(),
                    p.evm_version.to_string(),
                ];
                if p.overwrite {
                    cmd.push("--overwrite".to_string());
                }
                cmd
            }
            ToolKind::AbiGenerate(p) => vec![
                "abigen".to_string(),
                "--abi".to_string(),
                format!("{ABI_DIR}/{}.abi", p.local_type),
                "--bin".to_string(),
                format!("{ABI_DIR}/{}.bin", p.local_type),
                "--pkg".to_string(),
                p.package.clone(),
                "--type".to_string(),
                p.local_type.clone(),
                "--out".to_string(),
                format!("{BINDING_DIR}/{}/{}.go", p.package, p.local_type),
            ],
            ToolKind::ProtoCompile(p) => {
                let mut cmd = vec![format!("--proto_path={PROTO_SYSTEM_INCLUDE}")];
                cmd.extend(
                    p.proto_paths
                        .iter()
                        .map(|dir| format!("--proto_path={}", dir.to_string_lossy())),
                );
                cmd.push(format!("--go_out={OUT_DIR}"));
                cmd.push("--go_opt=paths=source_relative".to_string());
                if p.plugin == ProtoPlugin::Grpc {
                    cmd.push(format!("--go-grpc_out={OUT_DIR}"));
                    cmd.push("--go-grpc_opt=paths=source_relative".to_string());
                }
                cmd.push(p.proto_file.to_string_lossy().into_owned());
                cmd
            }
        }
    }

    /// Bind mounts, inputs first and the output directory last.
    pub fn mounts(&self) -> Vec<MountSpec> {
        match self {
            ToolKind::SolidityCompile(p) => vec![
                MountSpec::bind(
                    p.source_dir.join(&p.source_file),
                    format!("{SOLIDITY_DIR}/{}", p.source_file),
                ),
                MountSpec::bind(&p.output_dir, ABI_DIR),
            ],
            ToolKind::AbiGenerate(p) => {
                let abi = format!("{}.abi", p.local_type);
                let bin = format!("{}.bin", p.local_type);
                vec![
                    MountSpec::bind(p.abi_dir.join(&abi), format!("{ABI_DIR}/{abi}")),
                    MountSpec::bind(p.abi_dir.join(&bin), format!("{ABI_DIR}/{bin}")),
                    MountSpec::bind(&p.output_dir, format!("{BINDING_DIR}/{}", p.package)),
                ]
            }
            ToolKind::ProtoCompile(p) => p
                .proto_paths
                .iter()
                .map(|dir| MountSpec::bind(dir, dir.to_string_lossy()))
                .chain(std::iter::once(MountSpec::bind(&p.output_dir, OUT_DIR)))
                .collect(),
        }
    }
}

fn utf8_path(path: &Path) -> Result<(), Error> {
    match path.to_str() {
        Some(_) => Ok(()),
        None => Err(Error::InvalidHostPath(path.to_path_buf())),
    }
}

/// Everything the runtime needs to create one build container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub operation: &'static str,
    pub image: String,
    pub container_name: String,
    pub command: Vec<String>,
    pub mounts: Vec<MountSpec>,
}

impl BuildRequest {
    pub fn new(kind: &ToolKind, image: impl Into<String>, container_name: impl Into<String>) -> Self {
        BuildRequest {
            operation: kind.operation(),
            image: image.into(),
            container_name: container_name.into(),
            command: kind.command(),
            mounts: kind.mounts(),
        }
    }
}

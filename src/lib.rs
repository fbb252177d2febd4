/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! `narwhal` is a library to run compiler toolchains in short-lived Docker containers, so that the
//! toolchains do not need to be installed locally: the image is the toolchain. It wraps the Solidity
//! compiler (`ethereum/solc`), the Go binding generator `abigen` (`ethereum/client-go`) and the
//! Protocol Buffer compiler with its Go plugins.
//!
//! Every tool follows the same protocol: build a [BuildRequest] (image, command, bind mounts), create
//! a container from it, start it, copy its output to stdout until it exits, and hand back the
//! container id so the caller can remove the container.
//!
//! # Example
//! ```no_run
//! # async fn example() -> Result<(), narwhal::Error> {
//! use std::path::Path;
//!
//! let solc = narwhal::Solc::connect("0.8.28").await?;
//! let result = solc
//!     .compile_with_overwrite(
//!         "solc_container",
//!         Path::new("/home/user/contracts"),
//!         "hello.sol",
//!         Path::new("/home/user/out"),
//!         "paris",
//!     )
//!     .await?;
//! solc.remove_container_force(&result.container_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Custom protoc image
//! ```no_run
//! # async fn example() -> Result<(), narwhal::Error> {
//! use std::path::{Path, PathBuf};
//!
//! let protoc = narwhal::Protoc::with_local_image("narwhal/protoc:current").await?;
//! let protos = PathBuf::from("/home/user/protos");
//! let result = protoc
//!     .compile_grpc(
//!         "grpc_container",
//!         &[protos.clone()],
//!         Path::new("/home/user/out"),
//!         &protos.join("person.proto"),
//!     )
//!     .await?;
//! protoc.remove_container_force(&result.container_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub use config::ToolConfig;

pub mod error;
pub use error::Error;

pub mod evm;
pub use evm::EvmVersion;

pub mod mount;
pub use mount::MountSpec;

pub mod paths;

pub mod platform;
pub use platform::Platform;

pub mod request;
pub use request::{BuildRequest, ToolKind};

pub mod runner;
pub use runner::{BuildResult, ContainerRunner};

pub mod runtime;
pub use runtime::ContainerRuntime;

pub mod tools;
pub use tools::{Abigen, Protoc, Solc, Toolchain};

/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Bind mounts exposing host files and directories inside a build container.

use std::path::PathBuf;

use bollard::service::{Mount, MountTypeEnum};

/// A read-write bind mount of `host_path` at `container_path`.
///
/// The host path is passed to the runtime as a string; it must exist when the container is created
/// and must be valid UTF-8. Requests are checked by [crate::request::ToolKind::validate] before they
/// reach this conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    pub host_path: PathBuf,
    pub container_path: String,
}

impl MountSpec {
    pub fn bind(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        MountSpec {
            host_path: host_path.into(),
            container_path: container_path.into(),
        }
    }
}

impl From<&MountSpec> for Mount {
    fn from(spec: &MountSpec) -> Self {
        Mount {
            typ: Some(MountTypeEnum::BIND),
            source: Some(spec.host_path.to_string_lossy().into_owned()),
            target: Some(spec.container_path.clone()),
            read_only: Some(false),
            ..Default::default()
        }
    }
}

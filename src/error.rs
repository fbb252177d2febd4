/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines the error kinds returned by the tool facades and the container runner.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised by the Docker client.
pub type RuntimeError = bollard::errors::Error;

/// Describes why an operation against the container runtime did not complete.
///
/// Validation errors ([Error::InvalidEvmVersion], [Error::UnsupportedPlatform],
/// [Error::InvalidHostPath], [Error::InvalidProtoPath]) are raised before any container is created.
/// All other kinds carry the name of the operation that failed and the error reported by the runtime.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Docker daemon service is not reachable.")]
    ClientUnavailable(#[source] RuntimeError),

    #[error("Invalid EVM version `{0}`.")]
    InvalidEvmVersion(String),

    #[error("Unsupported platform `{0}`.")]
    UnsupportedPlatform(String),

    #[error("Host path `{0}` is not valid.")]
    InvalidHostPath(PathBuf),

    #[error("Proto file `{0}` is not within any proto search path.")]
    InvalidProtoPath(PathBuf),

    #[error("Unable to pull image `{image}`.")]
    ImagePullFailed {
        image: String,
        #[source]
        source: RuntimeError,
    },

    #[error("{operation}: unable to create container `{container_name}`.")]
    ContainerCreateFailed {
        operation: &'static str,
        container_name: String,
        #[source]
        source: RuntimeError,
    },

    #[error("{operation}: unable to start container `{container_id}`.")]
    ContainerStartFailed {
        operation: &'static str,
        container_id: String,
        #[source]
        source: RuntimeError,
    },

    #[error("{operation}: unable to stream logs of container `{container_id}`.")]
    LogStreamFailed {
        operation: &'static str,
        container_id: String,
        #[source]
        source: RuntimeError,
    },

    #[error("{operation}: unable to wait for container `{container_id}`.")]
    ContainerWaitFailed {
        operation: &'static str,
        container_id: String,
        #[source]
        source: RuntimeError,
    },

    #[error("{operation}: unable to remove container `{container_id}`.")]
    ContainerRemoveFailed {
        operation: &'static str,
        container_id: String,
        #[source]
        source: RuntimeError,
    },
}

impl Error {
    pub fn detail(&self) -> String {
        match self {
            Error::ClientUnavailable(e) => format!("Details: {e}. Check if Docker is running on your machine and confirm read/write access privileges."),
            Error::InvalidEvmVersion(v) => format!("Details: `{v}` is not one of frontier, homestead, byzantium, constantinople, istanbul, berlin, london, shanghai, cancun, paris. Names are case-sensitive."),
            Error::UnsupportedPlatform(p) => format!("Details: `{p}` is not an os/arch pair recognised by Docker, for example linux/amd64."),
            Error::InvalidHostPath(_) => "Details: Check if the path exists, is valid UTF-8 and confirm read/write access privileges.".to_string(),
            Error::InvalidProtoPath(_) => "Details: Provide at least one proto search path and make sure the proto file is located under one of them.".to_string(),
            Error::ImagePullFailed { source, .. } => format!("Details: {source}. Check if the image tag exists and the registry is reachable."),
            Error::ContainerCreateFailed { source, .. } => format!("Details: {source}. A container with the same name may already exist. Check if the host paths exist."),
            Error::ContainerStartFailed { source, .. }
            | Error::LogStreamFailed { source, .. }
            | Error::ContainerWaitFailed { source, .. } => format!("Details: {source}. The container was not removed. Please remove it manually."),
            Error::ContainerRemoveFailed { source, .. } => format!("Details: {source}. A running container can only be removed by force."),
        }
    }

    /// The underlying runtime error, if any.
    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match self {
            Error::ClientUnavailable(source)
            | Error::ImagePullFailed { source, .. }
            | Error::ContainerCreateFailed { source, .. }
            | Error::ContainerStartFailed { source, .. }
            | Error::LogStreamFailed { source, .. }
            | Error::ContainerWaitFailed { source, .. }
            | Error::ContainerRemoveFailed { source, .. } => Some(source),
            Error::InvalidEvmVersion(_)
            | Error::UnsupportedPlatform(_)
            | Error::InvalidHostPath(_)
            | Error::InvalidProtoPath(_) => None,
        }
    }

    /// True if the runtime reported that the addressed container or image does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.runtime_error(),
            Some(RuntimeError::DockerResponseServerError {
                status_code: 404,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(status_code: u16) -> RuntimeError {
        RuntimeError::DockerResponseServerError {
            status_code,
            message: "no such container".to_string(),
        }
    }

    #[test]
    fn not_found_is_detected_on_remove() {
        let e = Error::ContainerRemoveFailed {
            operation: "remove_force",
            container_id: "abc".to_string(),
            source: server_error(404),
        };
        assert!(e.is_not_found());
        assert_eq!(
            e.to_string(),
            "remove_force: unable to remove container `abc`."
        );
    }

    #[test]
    fn conflict_is_not_not_found() {
        let e = Error::ContainerRemoveFailed {
            operation: "remove",
            container_id: "abc".to_string(),
            source: server_error(409),
        };
        assert!(!e.is_not_found());
        assert!(!Error::InvalidEvmVersion("Cancun".to_string()).is_not_found());
    }
}

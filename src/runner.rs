/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Runs a [BuildRequest] in a short-lived container.
//!
//! The flow of a build is as follows:
//! 1. Create the container from the request's image, command and bind mounts for the target platform.
//! 2. Start the container.
//! 3. Follow the combined stdout/stderr log stream and copy it to the output until the stream closes,
//!    which happens when the process in the container terminates.
//! 4. Wait for the container to obtain its exit code.
//!
//! Any failure aborts the build. Nothing is retried and nothing is cleaned up: a container that was
//! created stays in the runtime until the caller removes it with [ContainerRunner::remove] or
//! [ContainerRunner::remove_force].

use std::{fmt, io::Write};

use bollard::container::LogOutput;
use futures_util::StreamExt;

use crate::{
    error::Error,
    platform::Platform,
    request::BuildRequest,
    runtime::ContainerRuntime,
};

/// Outcome of a build. The container is left in the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub container_id: String,
    /// Exit code of the tool inside the container.
    pub exit_code: i64,
    /// Set if the container output could not be written. The build itself still ran to completion.
    pub log_copy_error: Option<String>,
}

impl BuildResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container: {}", self.container_id)?;
        write!(f, "Exit code: {}", self.exit_code)?;
        if let Some(e) = &self.log_copy_error {
            write!(f, "\nWarning: container output was not fully copied: {e}")?;
        }
        Ok(())
    }
}

/// Drives the create, start, logs, wait sequence against a [ContainerRuntime].
#[derive(Debug, Clone)]
pub struct ContainerRunner<R> {
    runtime: R,
}

impl<R: ContainerRuntime> ContainerRunner<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Pull an image, printing progress to stdout.
    pub async fn pull(&self, image: &str, platform: &Platform) -> Result<(), Error> {
        tracing::info!(image, %platform, "pulling image");
        let mut progress = self.runtime.pull_image(image, platform);
        while let Some(info) = progress.next().await {
            let info = info.map_err(|source| Error::ImagePullFailed {
                image: image.to_string(),
                source,
            })?;
            if let Some(error) = info.error {
                return Err(Error::ImagePullFailed {
                    image: image.to_string(),
                    source: bollard::errors::Error::DockerStreamError { error },
                });
            }
            match (info.status, info.progress) {
                (Some(status), Some(progress)) => println!("{status} {progress}"),
                (Some(status), None) => println!("{status}"),
                _ => {}
            }
        }
        Ok(())
    }

    /// Run the request, copying the container output to stdout.
    pub async fn run(&self, request: &BuildRequest, platform: &Platform) -> Result<BuildResult, Error> {
        self.run_with_output(request, platform, &mut std::io::stdout())
            .await
    }

    /// Run the request, copying the container output to `output`.
    ///
    /// Returns once the log stream has closed and the exit code is known. A non-zero exit code is
    /// reported in the [BuildResult], not as an error.
    pub async fn run_with_output<W: Write + Send>(
        &self,
        request: &BuildRequest,
        platform: &Platform,
        output: &mut W,
    ) -> Result<BuildResult, Error> {
        let operation = request.operation;
        tracing::debug!(
            operation,
            image = %request.image,
            name = %request.container_name,
            command = ?request.command,
            "creating container"
        );

        let container_id = self
            .runtime
            .create_container(request, platform)
            .await
            .map_err(|source| Error::ContainerCreateFailed {
                operation,
                container_name: request.container_name.clone(),
                source,
            })?;

        self.runtime
            .start_container(&container_id)
            .await
            .map_err(|source| Error::ContainerStartFailed {
                operation,
                container_id: container_id.clone(),
                source,
            })?;
        tracing::debug!(operation, %container_id, "container started");

        let mut log_copy_error = None;
        let mut logs = self.runtime.logs(&container_id);
        while let Some(chunk) = logs.next().await {
            let chunk = chunk.map_err(|source| Error::LogStreamFailed {
                operation,
                container_id: container_id.clone(),
                source,
            })?;
            if log_copy_error.is_some() {
                continue;
            }
            if let Err(e) = copy_chunk(output, &chunk) {
                tracing::warn!(operation, %container_id, "unable to copy container output: {e}");
                log_copy_error = Some(e.to_string());
            }
        }
        drop(logs);

        let exit_code = self
            .runtime
            .wait_container(&container_id)
            .await
            .map_err(|source| Error::ContainerWaitFailed {
                operation,
                container_id: container_id.clone(),
                source,
            })?;
        if exit_code == 0 {
            tracing::info!(operation, %container_id, "build finished");
        } else {
            tracing::warn!(operation, %container_id, exit_code, "build exited with non-zero status");
        }

        Ok(BuildResult {
            container_id,
            exit_code,
            log_copy_error,
        })
    }

    /// Remove a stopped container. The runtime refuses to remove a running container.
    pub async fn remove(&self, container_id: &str) -> Result<(), Error> {
        self.remove_container(container_id, false, "remove").await
    }

    /// Remove a container regardless of its state.
    pub async fn remove_force(&self, container_id: &str) -> Result<(), Error> {
        self.remove_container(container_id, true, "remove_force").await
    }

    async fn remove_container(
        &self,
        container_id: &str,
        force: bool,
        operation: &'static str,
    ) -> Result<(), Error> {
        self.runtime
            .remove_container(container_id, force)
            .await
            .map_err(|source| Error::ContainerRemoveFailed {
                operation,
                container_id: container_id.to_string(),
                source,
            })?;
        tracing::debug!(operation, container_id, "container removed");
        Ok(())
    }
}

fn copy_chunk<W: Write>(output: &mut W, chunk: &LogOutput) -> std::io::Result<()> {
    let bytes = match chunk {
        LogOutput::StdOut { message }
        | LogOutput::StdErr { message }
        | LogOutput::Console { message }
        | LogOutput::StdIn { message } => message,
    };
    output.write_all(bytes)?;
    output.flush()
}

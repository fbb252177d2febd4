/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The container runtime as seen by the runner. [ContainerRuntime] lists the calls a build needs and
//! is implemented for the bollard [Docker] client.

use async_trait::async_trait;
use bollard::{
    container::{
        Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
        StartContainerOptions, WaitContainerOptions,
    },
    image::CreateImageOptions,
    service::{CreateImageInfo, HostConfig, Mount},
    Docker,
};
use futures_util::{
    stream::{BoxStream, StreamExt},
    TryStreamExt,
};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::{
    error::{Error, RuntimeError},
    platform::Platform,
    request::BuildRequest,
};

/// Lifecycle calls against a container runtime. Implementations must be safe to share between
/// concurrent builds.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Pulls `image` for `platform`, yielding progress messages.
    fn pull_image<'a>(
        &'a self,
        image: &'a str,
        platform: &Platform,
    ) -> BoxStream<'a, Result<CreateImageInfo, RuntimeError>>;

    /// Creates a container for `request`, returning the id assigned by the runtime.
    async fn create_container(
        &self,
        request: &BuildRequest,
        platform: &Platform,
    ) -> Result<String, RuntimeError>;

    async fn start_container(&self, container_id: &str) -> Result<(), RuntimeError>;

    /// Combined stdout and stderr with timestamps, following until the container exits.
    fn logs<'a>(&'a self, container_id: &'a str) -> BoxStream<'a, Result<LogOutput, RuntimeError>>;

    /// Waits for the container to stop, returning its exit code.
    async fn wait_container(&self, container_id: &str) -> Result<i64, RuntimeError>;

    async fn remove_container(&self, container_id: &str, force: bool) -> Result<(), RuntimeError>;
}

/// Connects to the Docker daemon and negotiates the API version with it.
///
/// A `tcp://` or `http://` `DOCKER_HOST` is reached over HTTP. Otherwise the local socket is used:
/// `DOCKER_HOST` if it names a `unix://` socket, the platform default if not.
pub async fn connect() -> Result<Docker, Error> {
    let docker = match std::env::var("DOCKER_HOST") {
        Ok(host) if is_http_host(&host) => Docker::connect_with_http_defaults(),
        _ => Docker::connect_with_local_defaults(),
    }
    .map_err(Error::ClientUnavailable)?;
    docker
        .negotiate_version()
        .await
        .map_err(Error::ClientUnavailable)
}

fn is_http_host(host: &str) -> bool {
    host.starts_with("tcp://") || host.starts_with("http://")
}

/// get a random container name with the given prefix.
pub fn random_container_name(prefix: &str) -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();
    format!("{prefix}_{suffix}")
}

#[async_trait]
impl ContainerRuntime for Docker {
    fn pull_image<'a>(
        &'a self,
        image: &'a str,
        platform: &Platform,
    ) -> BoxStream<'a, Result<CreateImageInfo, RuntimeError>> {
        self.create_image(
            Some(CreateImageOptions {
                from_image: image.to_string(),
                platform: platform.to_string(),
                ..Default::default()
            }),
            None,
            None,
        )
        .boxed()
    }

    async fn create_container(
        &self,
        request: &BuildRequest,
        platform: &Platform,
    ) -> Result<String, RuntimeError> {
        let response = Docker::create_container(
            self,
            Some(CreateContainerOptions {
                name: request.container_name.clone(),
                platform: Some(platform.to_string()),
            }),
            Config {
                image: Some(request.image.clone()),
                cmd: Some(request.command.clone()),
                host_config: Some(HostConfig {
                    mounts: Some(request.mounts.iter().map(Mount::from).collect()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await?;
        Ok(response.id)
    }

    async fn start_container(&self, container_id: &str) -> Result<(), RuntimeError> {
        Docker::start_container(self, container_id, None::<StartContainerOptions<String>>).await
    }

    fn logs<'a>(&'a self, container_id: &'a str) -> BoxStream<'a, Result<LogOutput, RuntimeError>> {
        Docker::logs(
            self,
            container_id,
            Some(LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                timestamps: true,
                tail: "all".to_string(),
                ..Default::default()
            }),
        )
        .boxed()
    }

    async fn wait_container(&self, container_id: &str) -> Result<i64, RuntimeError> {
        let responses = Docker::wait_container(
            self,
            container_id,
            None::<WaitContainerOptions<String>>,
        )
        .try_collect::<Vec<_>>()
        .await;

        match responses {
            Ok(responses) => Ok(responses.last().map(|r| r.status_code).unwrap_or_default()),
            // bollard reports a non-zero exit status as an error
            Err(RuntimeError::DockerContainerWaitError { code, .. }) => Ok(code),
            Err(e) => Err(e),
        }
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> Result<(), RuntimeError> {
        Docker::remove_container(
            self,
            container_id,
            Some(RemoveContainerOptions {
                force,
                ..Default::default()
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_and_http_hosts_use_http() {
        assert!(is_http_host("tcp://127.0.0.1:2375"));
        assert!(is_http_host("http://docker.internal:2375"));
        assert!(!is_http_host("unix:///var/run/docker.sock"));
        assert!(!is_http_host("npipe:////./pipe/docker_engine"));
    }

    #[test]
    fn container_name_has_prefix_and_suffix() {
        let name = random_container_name("solc");
        let (prefix, suffix) = name.split_once('_').unwrap();
        assert_eq!(prefix, "solc");
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! In-memory container runtime that records every call.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use bollard::{container::LogOutput, errors::Error as RuntimeError, service::CreateImageInfo};
use futures_util::stream::{self, BoxStream, StreamExt};
use narwhal::{BuildRequest, ContainerRuntime, Platform};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Pull { image: String, platform: String },
    Create { request: BuildRequest, platform: String },
    Start(String),
    Logs(String),
    Wait(String),
    Remove { container_id: String, force: bool },
}

/// Which step of the lifecycle should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Pull,
    Create,
    Start,
    Logs,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Running,
    Exited,
}

#[derive(Default)]
pub struct MockRuntime {
    calls: Mutex<Vec<Call>>,
    containers: Mutex<HashMap<String, State>>,
    fail_at: Option<FailAt>,
    output: Vec<&'static str>,
    exit_code: i64,
    /// Leave containers running after their log stream closes.
    keep_running: bool,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at: Some(fail_at),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output: Vec<&'static str>) -> Self {
        self.output = output;
        self
    }

    pub fn with_exit_code(mut self, exit_code: i64) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn keep_running(mut self) -> Self {
        self.keep_running = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_requests(&self) -> Vec<BuildRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn container_count(&self) -> usize {
        self.containers.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fails(&self, step: FailAt) -> bool {
        self.fail_at == Some(step)
    }
}

pub fn server_error(status_code: u16, message: &str) -> RuntimeError {
    RuntimeError::DockerResponseServerError {
        status_code,
        message: message.to_string(),
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    fn pull_image<'a>(
        &'a self,
        image: &'a str,
        platform: &Platform,
    ) -> BoxStream<'a, Result<CreateImageInfo, RuntimeError>> {
        self.record(Call::Pull {
            image: image.to_string(),
            platform: platform.to_string(),
        });
        if self.fails(FailAt::Pull) {
            let info = CreateImageInfo {
                error: Some(format!("manifest for {image} not found")),
                ..Default::default()
            };
            return stream::iter(vec![Ok(info)]).boxed();
        }
        let progress = ["Pulling fs layer", "Download complete", "Pull complete"]
            .into_iter()
            .map(|status| {
                Ok(CreateImageInfo {
                    status: Some(status.to_string()),
                    ..Default::default()
                })
            })
            .collect::<Vec<_>>();
        stream::iter(progress).boxed()
    }

    async fn create_container(
        &self,
        request: &BuildRequest,
        platform: &Platform,
    ) -> Result<String, RuntimeError> {
        self.record(Call::Create {
            request: request.clone(),
            platform: platform.to_string(),
        });
        if self.fails(FailAt::Create) {
            return Err(server_error(409, "Conflict. The container name is already in use"));
        }
        let mut containers = self.containers.lock().unwrap();
        let container_id = format!("{:012x}", containers.len() + 1);
        containers.insert(container_id.clone(), State::Created);
        Ok(container_id)
    }

    async fn start_container(&self, container_id: &str) -> Result<(), RuntimeError> {
        self.record(Call::Start(container_id.to_string()));
        if self.fails(FailAt::Start) {
            return Err(server_error(500, "invalid mount config"));
        }
        match self.containers.lock().unwrap().get_mut(container_id) {
            Some(state) => {
                *state = State::Running;
                Ok(())
            }
            None => Err(server_error(404, "No such container")),
        }
    }

    fn logs<'a>(&'a self, container_id: &'a str) -> BoxStream<'a, Result<LogOutput, RuntimeError>> {
        self.record(Call::Logs(container_id.to_string()));
        if self.fails(FailAt::Logs) {
            return stream::iter(vec![Err(server_error(500, "log driver unavailable"))]).boxed();
        }
        if !self.keep_running {
            if let Some(state) = self.containers.lock().unwrap().get_mut(container_id) {
                *state = State::Exited;
            }
        }
        let chunks = self
            .output
            .iter()
            .enumerate()
            .map(|(i, line)| {
                Ok(if i % 2 == 0 {
                    LogOutput::StdOut {
                        message: (*line).into(),
                    }
                } else {
                    LogOutput::StdErr {
                        message: (*line).into(),
                    }
                })
            })
            .collect::<Vec<_>>();
        stream::iter(chunks).boxed()
    }

    async fn wait_container(&self, container_id: &str) -> Result<i64, RuntimeError> {
        self.record(Call::Wait(container_id.to_string()));
        if self.fails(FailAt::Wait) {
            return Err(server_error(500, "wait interrupted"));
        }
        Ok(self.exit_code)
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> Result<(), RuntimeError> {
        self.record(Call::Remove {
            container_id: container_id.to_string(),
            force,
        });
        let mut containers = self.containers.lock().unwrap();
        match containers.get(container_id) {
            None => Err(server_error(404, "No such container")),
            Some(State::Running) if !force => Err(server_error(
                409,
                "You cannot remove a running container. Stop the container before attempting removal or force remove",
            )),
            Some(_) => {
                containers.remove(container_id);
                Ok(())
            }
        }
    }
}

/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Tests of the container runner: output copying, exit codes and error mapping.

mod common;

use std::{io, path::PathBuf};

use common::{Call, FailAt, MockRuntime};
use narwhal::{
    evm::EvmVersion,
    request::{SolidityCompile, ToolKind},
    BuildRequest, ContainerRunner, Error, Platform,
};

fn hello_request() -> BuildRequest {
    let kind = ToolKind::SolidityCompile(SolidityCompile {
        source_dir: PathBuf::from("/work/testdata/solidity"),
        source_file: "hello.sol".to_string(),
        output_dir: PathBuf::from("/work/tmp/hello"),
        evm_version: EvmVersion::Paris,
        overwrite: true,
    });
    BuildRequest::new(&kind, "solc:0.8.28", "solc_container")
}

struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn copies_combined_output_in_order() {
    let runner = ContainerRunner::new(MockRuntime::new().with_output(vec![
        "Compiler run successful.\n",
        "Warning: unused variable\n",
        "Artifacts written\n",
    ]));
    let mut output = Vec::new();
    let result = runner
        .run_with_output(&hello_request(), &Platform::linux_amd64(), &mut output)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "Compiler run successful.\nWarning: unused variable\nArtifacts written\n"
    );
    assert_eq!(result.exit_code, 0);
    assert!(result.log_copy_error.is_none());
}

#[tokio::test]
async fn end_to_end_command_for_hello() {
    let runner = ContainerRunner::new(MockRuntime::new());
    runner
        .run_with_output(&hello_request(), &Platform::linux_amd64(), &mut io::sink())
        .await
        .unwrap();
    let created = runner.runtime().created_requests();
    assert_eq!(
        created[0].command,
        vec![
            "--abi",
            "--bin",
            "/opt/solidity/hello.sol",
            "-o",
            "/opt/abi",
            "--evm-version",
            "paris",
            "--overwrite"
        ]
    );
    assert_eq!(created[0].image, "solc:0.8.28");
}

#[tokio::test]
async fn broken_output_is_a_warning() {
    let runner = ContainerRunner::new(MockRuntime::new().with_output(vec!["a\n", "b\n"]));
    let result = runner
        .run_with_output(&hello_request(), &Platform::linux_amd64(), &mut BrokenPipe)
        .await
        .unwrap();
    assert!(result.log_copy_error.unwrap().contains("stdout closed"));
    // the build still ran to completion
    assert!(runner
        .runtime()
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Wait(_))));
}

#[tokio::test]
async fn non_zero_exit_still_returns_container_id() {
    let runner = ContainerRunner::new(MockRuntime::new().with_exit_code(1));
    let result = runner
        .run_with_output(&hello_request(), &Platform::linux_amd64(), &mut io::sink())
        .await
        .unwrap();
    assert!(!result.succeeded());
    assert_eq!(result.exit_code, 1);
    assert!(!result.container_id.is_empty());
}

#[tokio::test]
async fn each_step_failure_maps_to_its_kind() {
    let cases = [
        (FailAt::Create, 1),
        (FailAt::Start, 2),
        (FailAt::Logs, 3),
        (FailAt::Wait, 4),
    ];
    for (fail_at, expected_calls) in cases {
        let runner = ContainerRunner::new(MockRuntime::failing_at(fail_at));
        let err = runner
            .run_with_output(&hello_request(), &Platform::linux_amd64(), &mut io::sink())
            .await
            .unwrap_err();
        let kind_matches = match fail_at {
            FailAt::Create => matches!(
                err,
                Error::ContainerCreateFailed { operation: "solc", ref container_name, .. } if container_name == "solc_container"
            ),
            FailAt::Start => matches!(err, Error::ContainerStartFailed { operation: "solc", .. }),
            FailAt::Logs => matches!(err, Error::LogStreamFailed { operation: "solc", .. }),
            FailAt::Wait => matches!(err, Error::ContainerWaitFailed { operation: "solc", .. }),
            FailAt::Pull => unreachable!(),
        };
        assert!(kind_matches, "{fail_at:?} produced {err:?}");
        assert!(err.runtime_error().is_some());
        // nothing is retried
        assert_eq!(runner.runtime().calls().len(), expected_calls);
    }
}

#[tokio::test]
async fn pull_reports_progress_and_errors() {
    let runner = ContainerRunner::new(MockRuntime::new());
    runner
        .pull("ethereum/solc:0.8.28", &Platform::linux_amd64())
        .await
        .unwrap();
    assert_eq!(
        runner.runtime().calls(),
        vec![Call::Pull {
            image: "ethereum/solc:0.8.28".to_string(),
            platform: "linux/amd64".to_string()
        }]
    );

    let runner = ContainerRunner::new(MockRuntime::failing_at(FailAt::Pull));
    let err = runner
        .pull("ethereum/solc:9.9.9", &Platform::linux_amd64())
        .await
        .unwrap_err();
    match err {
        Error::ImagePullFailed { image, .. } => assert_eq!(image, "ethereum/solc:9.9.9"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn repeated_runs_create_identical_requests() {
    let runner = ContainerRunner::new(MockRuntime::new());
    for _ in 0..2 {
        runner
            .run_with_output(&hello_request(), &Platform::linux_amd64(), &mut io::sink())
            .await
            .unwrap();
    }
    let created = runner.runtime().created_requests();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0], created[1]);
}

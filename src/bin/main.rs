/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! `narwhal` is a command line interface tool to run the Solidity compiler, abigen and protoc in
//! Docker containers without installing them locally.

use clap::{Parser, Subcommand};
use narwhal::{
    config::{GETH_TOOLS_IMAGE, SOLC_IMAGE},
    paths, runtime, Abigen, BuildResult, Error, Platform, Protoc, Solc, ToolConfig,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(
    name = "narwhal",
    version = env!("CARGO_PKG_VERSION"),
    about = "Narwhal\n\n\
             Run Solidity, abigen and protoc toolchains in short-lived Docker containers.",
    long_about = None
)]
struct Narwhal {
    #[clap(subcommand)]
    command: Command,

    /// Name of the build container. Defaults to the tool name with a random suffix.
    #[clap(long = "name", global = true)]
    container_name: Option<String>,

    /// Platform of the image variant, as os/arch.
    #[clap(long = "platform", global = true, default_value = "linux/amd64")]
    platform: String,

    /// Keep the container after the build instead of removing it.
    #[clap(long = "keep", global = true)]
    keep: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a Solidity source file into .abi and .bin artifacts. Please make sure:
    /// 1. Docker is installed and its execution permission under current user is granted.
    /// 2. Internet is reachable. (for pulling the docker image from docker hub)
    #[clap(arg_required_else_help = true, display_order = 1, verbatim_doc_comment)]
    Solc {
        /// Path to the Solidity source file.
        #[clap(long = "source")]
        source: PathBuf,
        /// Directory for the compiled artifacts. Created if it does not exist.
        #[clap(long = "destination")]
        destination: PathBuf,
        /// Target EVM version, for example paris or cancun.
        #[clap(long = "evm-version", default_value = "paris")]
        evm_version: String,
        /// Tag of the ethereum/solc image.
        #[clap(long = "tag", default_value = "0.8.28")]
        tag: String,
        /// Replace artifacts already present in the destination.
        #[clap(long = "overwrite")]
        overwrite: bool,
    },

    /// Generate a Go binding from a compiled contract's .abi and .bin files.
    #[clap(arg_required_else_help = true, display_order = 2)]
    Abigen {
        /// Directory containing <type>.abi and <type>.bin.
        #[clap(long = "abi-dir")]
        abi_dir: PathBuf,
        /// Directory for the generated Go file. Created if it does not exist.
        #[clap(long = "destination")]
        destination: PathBuf,
        /// Go package name.
        #[clap(long = "pkg")]
        package: String,
        /// Go type name, also the base name of the .abi and .bin files.
        #[clap(long = "type")]
        local_type: String,
        /// Tag of the ethereum/client-go image. It must contain abigen.
        #[clap(long = "tag", default_value = "alltools-stable")]
        tag: String,
    },

    /// Compile a proto file into Go sources.
    #[clap(arg_required_else_help = true, display_order = 3)]
    Protoc {
        /// Proto file to compile.
        #[clap(long = "proto")]
        proto: PathBuf,
        /// Import search directory. Can be used multiple times. Defaults to the proto file's directory.
        #[clap(long = "proto-path")]
        proto_paths: Vec<PathBuf>,
        /// Directory for the generated Go files. Created if it does not exist.
        #[clap(long = "destination")]
        destination: PathBuf,
        /// Image containing protoc, protoc-gen-go and protoc-gen-go-grpc.
        #[clap(long = "image")]
        image: String,
        /// Also generate gRPC service stubs.
        #[clap(long = "grpc")]
        grpc: bool,
        /// Pull the image before building instead of using the local one.
        #[clap(long = "pull")]
        pull: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Narwhal::parse();

    let result = tokio::select! {
        result = run(args) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("Interrupted. The build container may still exist. Please remove it manually.");
            std::process::exit(130);
        }
    };

    match result {
        Ok(result) => {
            if !result.succeeded() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            println!("{}\n{}\n", e, e.detail());
            std::process::exit(-1);
        }
    }
}

async fn run(args: Narwhal) -> Result<BuildResult, Error> {
    let platform: Platform = args.platform.parse()?;
    let keep = args.keep;

    match args.command {
        Command::Solc {
            source,
            destination,
            evm_version,
            tag,
            overwrite,
        } => {
            let source = paths::absolute_path(&source)?;
            let (source_dir, source_file) = match (source.parent(), source.file_name()) {
                (Some(dir), Some(file)) => match file.to_str() {
                    Some(file) => (dir.to_path_buf(), file.to_string()),
                    None => return Err(Error::InvalidHostPath(source.clone())),
                },
                _ => return Err(Error::InvalidHostPath(source.clone())),
            };
            // fail on a bad version before pulling the image
            evm_version.parse::<narwhal::EvmVersion>()?;
            let destination = paths::writable_dir(&destination)?;
            let name = args
                .container_name
                .unwrap_or_else(|| runtime::random_container_name("solc"));

            let solc = Solc::connect_with_config(
                ToolConfig::tagged(SOLC_IMAGE, &tag).with_platform(platform),
            )
            .await?;
            let result = if overwrite {
                solc.compile_with_overwrite(&name, &source_dir, &source_file, &destination, &evm_version)
                    .await?
            } else {
                solc.compile(&name, &source_dir, &source_file, &destination, &evm_version)
                    .await?
            };
            // reported even if removal fails
            println!("{result}");
            if !keep {
                solc.remove_container_force(&result.container_id).await?;
            }
            Ok(result)
        }
        Command::Abigen {
            abi_dir,
            destination,
            package,
            local_type,
            tag,
        } => {
            let abi_dir = paths::absolute_path(&abi_dir)?;
            let destination = paths::writable_dir(&destination)?;
            let name = args
                .container_name
                .unwrap_or_else(|| runtime::random_container_name("abigen"));

            let abigen = Abigen::connect_with_config(
                ToolConfig::tagged(GETH_TOOLS_IMAGE, &tag).with_platform(platform),
            )
            .await?;
            let result = abigen
                .generate_go_binding(&name, &abi_dir, &destination, &package, &local_type)
                .await?;
            println!("{result}");
            if !keep {
                abigen.remove_container_force(&result.container_id).await?;
            }
            Ok(result)
        }
        Command::Protoc {
            proto,
            proto_paths,
            destination,
            image,
            grpc,
            pull,
        } => {
            let proto = paths::absolute_path(&proto)?;
            let proto_paths = if proto_paths.is_empty() {
                match proto.parent() {
                    Some(dir) => vec![dir.to_path_buf()],
                    None => return Err(Error::InvalidHostPath(proto.clone())),
                }
            } else {
                proto_paths
                    .iter()
                    .map(|p| paths::absolute_path(p))
                    .collect::<Result<Vec<_>, _>>()?
            };
            let destination = paths::writable_dir(&destination)?;
            let name = args
                .container_name
                .unwrap_or_else(|| runtime::random_container_name("protoc"));

            let protoc =
                Protoc::connect_with_config(ToolConfig::new(image).with_platform(platform), pull).await?;
            let result = if grpc {
                protoc.compile_grpc(&name, &proto_paths, &destination, &proto).await?
            } else {
                protoc.compile_go(&name, &proto_paths, &destination, &proto).await?
            };
            println!("{result}");
            if !keep {
                protoc.remove_container_force(&result.container_id).await?;
            }
            Ok(result)
        }
    }
}

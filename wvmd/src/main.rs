// WVM - wvmd
// Module: Command-Line Runner
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! # WebAssembly VM Driver (wvmd)
//!
//! Loads a WebAssembly module, compiles it to the internal bytecode, and
//! runs it under the WASI preview1 host.
//!
//! ## Usage
//!
//! ```bash
//! wvmd <wasm-file> [guest args...] [--dir <path>]... [--env KEY=VALUE]... [--invoke <export>] [--stats]
//! ```
//!
//! Guest arguments after the module path become the guest's argv (with
//! the module path as `argv[0]`). Each `--dir` preopens a host directory
//! for the guest, mapped to fds 3 and up in the order given. The process
//! exits with the guest's `proc_exit` code; fatal VM errors exit with
//! code 1 after logging the error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use wvm_loader::Module;
use wvm_runtime::{compile_module, Engine};
use wvm_wasi::WasiHost;

/// WebAssembly VM driver CLI arguments
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the WebAssembly module to execute
    wasm_file: PathBuf,

    /// Arguments passed through to the guest
    #[arg(trailing_var_arg = true)]
    guest_args: Vec<String>,

    /// Preopen a host directory for the guest (repeatable)
    #[arg(long = "dir", value_name = "PATH")]
    dirs: Vec<PathBuf>,

    /// Set a guest environment variable (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Exported function to invoke
    #[arg(long, default_value = "_start")]
    invoke: String,

    /// Show execution statistics after running
    #[arg(short, long, help = "Show execution statistics")]
    stats: bool,
}

fn main() -> ExitCode {
    initialize_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => {
            if code != 0 {
                debug!("guest exited with code {code}");
            }
            ExitCode::from(code.min(255) as u8)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<u32> {
    let env = parse_env(&args.env)?;

    let wasm_bytes = std::fs::read(&args.wasm_file)
        .with_context(|| format!("failed to read {}", args.wasm_file.display()))?;
    info!(
        "loaded {} ({} bytes)",
        args.wasm_file.display(),
        wasm_bytes.len()
    );

    let load_start = Instant::now();
    let mut module = Module::load(&wasm_bytes).context("failed to load module")?;
    let program = compile_module(&mut module).context("failed to compile module")?;
    let start = module
        .find_start(&args.invoke)
        .with_context(|| format!("no runnable export {:?}", args.invoke))?;
    debug!(
        "compiled {} functions to {} ops in {:?}",
        module.functions.len(),
        program.ops.len(),
        load_start.elapsed()
    );

    let mut guest_args = vec![args.wasm_file.display().to_string()];
    guest_args.extend(args.guest_args.iter().cloned());
    let mut host = WasiHost::new(guest_args, env, args.dirs.clone());

    let mut engine = Engine::new(&module, &program);
    let run_start = Instant::now();
    let result = engine.run(&mut host, start);

    if args.stats {
        eprintln!("instructions executed: {}", engine.executed());
        eprintln!("wall time: {:?}", run_start.elapsed());
    }

    result.context("execution failed")
}

/// Parse repeated `KEY=VALUE` arguments.
fn parse_env(pairs: &[String]) -> Result<Vec<(String, String)>> {
    let mut env = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --env value {pair:?}, expected KEY=VALUE");
        };
        env.push((key.to_string(), value.to_string()));
    }
    Ok(env)
}

/// Initialize the tracing system for logging
fn initialize_tracing() {
    let format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false);

    match format.as_str() {
        "json" => subscriber.json().init(),
        "pretty" => subscriber.pretty().init(),
        _ => subscriber.compact().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_pairs_parse() {
        let env = parse_env(&["HOME=/guest".into(), "EMPTY=".into()]).unwrap();
        assert_eq!(env[0], ("HOME".into(), "/guest".into()));
        assert_eq!(env[1], ("EMPTY".into(), String::new()));
        assert!(parse_env(&["NOEQUALS".into()]).is_err());
    }
}

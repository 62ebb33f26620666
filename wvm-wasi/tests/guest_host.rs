// WVM - wvm-wasi
// Module: Guest/Host Integration Tests
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! End-to-end runs: wasm text modules executed by the engine against the
//! real WASI host.

use std::path::PathBuf;

use wvm_loader::Module;
use wvm_runtime::{compile_module, Engine};
use wvm_wasi::WasiHost;

fn run(wat: &str, args: Vec<String>, preopens: Vec<PathBuf>) -> u32 {
    let bytes = wat::parse_str(wat).unwrap();
    let mut module = Module::load(&bytes).unwrap();
    let program = compile_module(&mut module).unwrap();
    let start = module.find_start("_start").unwrap();
    let mut host = WasiHost::new(args, Vec::new(), preopens);
    let mut engine = Engine::new(&module, &program);
    engine.run(&mut host, start).unwrap()
}

#[test]
fn exit_code_flows_through_proc_exit() {
    let code = run(
        r#"(module
            (import "wasi_snapshot_preview1" "proc_exit" (func $exit (param i32)))
            (func (export "_start")
                i32.const 2
                i32.const 3
                i32.add
                call $exit))"#,
        Vec::new(),
        Vec::new(),
    );
    assert_eq!(code, 5);
}

#[test]
fn guest_counts_its_arguments() {
    let code = run(
        r#"(module
            (import "wasi_snapshot_preview1" "args_sizes_get"
                (func $args_sizes_get (param i32 i32) (result i32)))
            (import "wasi_snapshot_preview1" "proc_exit" (func $exit (param i32)))
            (memory (export "memory") 1)
            (func (export "_start")
                i32.const 0
                i32.const 4
                call $args_sizes_get
                drop
                i32.const 0
                i32.load
                call $exit))"#,
        vec!["app".into(), "one".into(), "two".into()],
        Vec::new(),
    );
    assert_eq!(code, 3);
}

#[test]
fn guest_writes_a_file_through_preopen() {
    let dir = tempfile::tempdir().unwrap();
    let code = run(
        r#"(module
            (import "wasi_snapshot_preview1" "path_open"
                (func $path_open (param i32 i32 i32 i32 i32 i64 i64 i32 i32) (result i32)))
            (import "wasi_snapshot_preview1" "fd_write"
                (func $fd_write (param i32 i32 i32 i32) (result i32)))
            (import "wasi_snapshot_preview1" "proc_exit" (func $exit (param i32)))
            (memory (export "memory") 1)
            (data (i32.const 0) "out.txt")
            (data (i32.const 16) "hello from wasm")
            (func (export "_start") (local i32)
                ;; open "out.txt" under the first preopen, creating it
                i32.const 3      ;; dirfd
                i32.const 0      ;; dirflags
                i32.const 0      ;; path ptr
                i32.const 7      ;; path len
                i32.const 1      ;; oflags: CREAT
                i64.const 64     ;; rights: fd_write
                i64.const 0
                i32.const 0      ;; fdflags
                i32.const 64     ;; opened fd out ptr
                call $path_open
                drop
                i32.const 64
                i32.load
                local.set 0
                ;; iovec at 96: ptr 16, len 15
                i32.const 96
                i32.const 16
                i32.store
                i32.const 100
                i32.const 15
                i32.store
                local.get 0
                i32.const 96     ;; iovs
                i32.const 1      ;; iovs_len
                i32.const 104    ;; nwritten out
                call $fd_write
                call $exit))"#,
        Vec::new(),
        vec![dir.path().to_path_buf()],
    );
    assert_eq!(code, 0); // fd_write errno
    let content = std::fs::read(dir.path().join("out.txt")).unwrap();
    assert_eq!(content, b"hello from wasm");
}

#[test]
fn environment_reaches_the_guest() {
    let bytes = wat::parse_str(
        r#"(module
            (import "wasi_snapshot_preview1" "environ_sizes_get"
                (func $environ_sizes_get (param i32 i32) (result i32)))
            (import "wasi_snapshot_preview1" "proc_exit" (func $exit (param i32)))
            (memory (export "memory") 1)
            (func (export "_start")
                i32.const 0
                i32.const 4
                call $environ_sizes_get
                drop
                i32.const 4
                i32.load     ;; total byte length of the environment block
                call $exit))"#,
    )
    .unwrap();
    let mut module = Module::load(&bytes).unwrap();
    let program = compile_module(&mut module).unwrap();
    let start = module.find_start("_start").unwrap();
    let mut host = WasiHost::new(
        Vec::new(),
        vec![("K".into(), "V".into())],
        Vec::new(),
    );
    let mut engine = Engine::new(&module, &program);
    // "K=V\0"
    assert_eq!(engine.run(&mut host, start).unwrap(), 4);
}

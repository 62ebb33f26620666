// WVM - wvm-wasi
// Module: File and Path Host Calls
//
// Copyright (c) 2026 The WVM Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Descriptor and path host calls.
//!
//! Every method pops its guest arguments in reverse push order, performs
//! the host I/O, and returns the errno for the guest. Guest pointers that
//! do not describe valid memory propagate as fatal errors through `?`.

use std::fs::{File, Metadata, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use wvm_error::Result;
use wvm_runtime::{LinearMemory, ValueStack};

use crate::errno;
use crate::fd::{FdEntry, FILETYPE_SYMBOLIC_LINK, FILETYPE_UNKNOWN};
use crate::{write_u32, WasiHost};

const OFLAG_CREAT: u32 = 1;
const OFLAG_DIRECTORY: u32 = 2;
const OFLAG_EXCL: u32 = 4;
const OFLAG_TRUNC: u32 = 8;

const RIGHT_FD_READ: u64 = 1 << 1;
const RIGHT_FD_WRITE: u64 = 1 << 6;

const FDFLAG_APPEND: u32 = 1;

impl WasiHost {
    pub(crate) fn fd_prestat_get(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let buf_ptr = stack.pop() as u32;
        let fd = stack.pop() as u32;
        let Some(FdEntry::Dir { path, preopen: true }) = self.fds().get(fd) else {
            return Ok(errno::BADF);
        };
        let name_len = path.to_string_lossy().len() as u32;
        let out = memory.range_mut(buf_ptr, 8)?;
        out.fill(0); // tag 0: preopened directory
        out[4..8].copy_from_slice(&name_len.to_le_bytes());
        Ok(errno::SUCCESS)
    }

    pub(crate) fn fd_prestat_dir_name(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let path_len = stack.pop() as u32;
        let path_ptr = stack.pop() as u32;
        let fd = stack.pop() as u32;
        let Some(FdEntry::Dir { path, preopen: true }) = self.fds().get(fd) else {
            return Ok(errno::BADF);
        };
        let name = path.to_string_lossy().into_owned();
        if (path_len as usize) < name.len() {
            return Ok(errno::INVAL);
        }
        memory
            .range_mut(path_ptr, name.len() as u32)?
            .copy_from_slice(name.as_bytes());
        Ok(errno::SUCCESS)
    }

    pub(crate) fn fd_close(&mut self, stack: &mut ValueStack) -> Result<u16> {
        let fd = stack.pop() as u32;
        if self.fds().close(fd) {
            Ok(errno::SUCCESS)
        } else {
            Ok(errno::BADF)
        }
    }

    pub(crate) fn fd_read(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let nread_ptr = stack.pop() as u32;
        let iovs_len = stack.pop() as u32;
        let iovs_ptr = stack.pop() as u32;
        let fd = stack.pop() as u32;
        let iovecs = read_iovecs(memory, iovs_ptr, iovs_len)?;

        let mut total = 0u32;
        for (ptr, len) in iovecs {
            let mut buf = vec![0u8; len as usize];
            let read = match self.fds().get_mut(fd) {
                Some(FdEntry::Stdin) => std::io::stdin().read(&mut buf),
                Some(FdEntry::File(file)) => file.read(&mut buf),
                Some(FdEntry::Dir { .. }) => return Ok(errno::ISDIR),
                Some(_) => return Ok(errno::BADF),
                None => return Ok(errno::BADF),
            };
            match read {
                Ok(n) => {
                    memory
                        .range_mut(ptr, n as u32)?
                        .copy_from_slice(&buf[..n]);
                    total += n as u32;
                    if n < len as usize {
                        break;
                    }
                }
                Err(err) => return Ok(errno::from_io(&err)),
            }
        }
        write_u32(memory, nread_ptr, total)?;
        Ok(errno::SUCCESS)
    }

    pub(crate) fn fd_write(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let nwritten_ptr = stack.pop() as u32;
        let iovs_len = stack.pop() as u32;
        let iovs_ptr = stack.pop() as u32;
        let fd = stack.pop() as u32;
        let data = gather_iovecs(memory, iovs_ptr, iovs_len)?;

        let written = match self.fds().get_mut(fd) {
            Some(FdEntry::Stdout) => std::io::stdout().write_all(&data),
            Some(FdEntry::Stderr) => std::io::stderr().write_all(&data),
            Some(FdEntry::File(file)) => file.write_all(&data),
            Some(_) => return Ok(errno::BADF),
            None => return Ok(errno::BADF),
        };
        match written {
            Ok(()) => {
                write_u32(memory, nwritten_ptr, data.len() as u32)?;
                Ok(errno::SUCCESS)
            }
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    pub(crate) fn fd_pwrite(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let nwritten_ptr = stack.pop() as u32;
        let offset = stack.pop();
        let iovs_len = stack.pop() as u32;
        let iovs_ptr = stack.pop() as u32;
        let fd = stack.pop() as u32;
        let data = gather_iovecs(memory, iovs_ptr, iovs_len)?;

        let Some(FdEntry::File(file)) = self.fds().get_mut(fd) else {
            return Ok(errno::SPIPE);
        };
        match pwrite(file, offset, &data) {
            Ok(()) => {
                write_u32(memory, nwritten_ptr, data.len() as u32)?;
                Ok(errno::SUCCESS)
            }
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    pub(crate) fn fd_filestat_get(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let buf_ptr = stack.pop() as u32;
        let fd = stack.pop() as u32;
        let Some(entry) = self.fds().get(fd) else {
            return Ok(errno::BADF);
        };
        let filetype = entry.filetype();
        let meta = match entry {
            FdEntry::File(file) => file.metadata(),
            FdEntry::Dir { path, .. } => std::fs::metadata(path),
            _ => {
                // stdio: report a character device with no further detail
                let out = memory.range_mut(buf_ptr, 64)?;
                out.fill(0);
                out[16] = filetype;
                return Ok(errno::SUCCESS);
            }
        };
        match meta {
            Ok(meta) => {
                write_filestat(memory, buf_ptr, &meta)?;
                Ok(errno::SUCCESS)
            }
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    pub(crate) fn fd_filestat_set_size(&mut self, stack: &mut ValueStack) -> Result<u16> {
        let size = stack.pop();
        let fd = stack.pop() as u32;
        let Some(FdEntry::File(file)) = self.fds().get_mut(fd) else {
            return Ok(errno::BADF);
        };
        match file.set_len(size) {
            Ok(()) => Ok(errno::SUCCESS),
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    pub(crate) fn fd_fdstat_get(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let buf_ptr = stack.pop() as u32;
        let fd = stack.pop() as u32;
        let Some(entry) = self.fds().get(fd) else {
            return Ok(errno::BADF);
        };
        let filetype = entry.filetype();
        let out = memory.range_mut(buf_ptr, 24)?;
        out.fill(0);
        out[0] = filetype;
        // the host does not narrow rights
        out[8..16].copy_from_slice(&u64::MAX.to_le_bytes());
        out[16..24].copy_from_slice(&u64::MAX.to_le_bytes());
        Ok(errno::SUCCESS)
    }

    pub(crate) fn path_open(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let opened_fd_ptr = stack.pop() as u32;
        let fdflags = stack.pop() as u32;
        let _rights_inheriting = stack.pop();
        let rights = stack.pop();
        let oflags = stack.pop() as u32;
        let path_len = stack.pop() as u32;
        let path_ptr = stack.pop() as u32;
        let _dirflags = stack.pop() as u32;
        let dirfd = stack.pop() as u32;
        let raw = memory.range(path_ptr, path_len)?.to_vec();

        let full = match self.resolve_path(dirfd, &raw) {
            Ok(path) => path,
            Err(code) => return Ok(code),
        };
        log::debug!("path_open {:?} oflags={oflags:#x} rights={rights:#x}", full);

        if oflags & OFLAG_DIRECTORY != 0 {
            return match std::fs::metadata(&full) {
                Ok(meta) if meta.is_dir() => {
                    let fd = self.fds().insert(FdEntry::Dir {
                        path: full,
                        preopen: false,
                    });
                    write_u32(memory, opened_fd_ptr, fd)?;
                    Ok(errno::SUCCESS)
                }
                Ok(_) => Ok(errno::NOTDIR),
                Err(err) => Ok(errno::from_io(&err)),
            };
        }

        let writes = rights & RIGHT_FD_WRITE != 0
            || oflags & (OFLAG_CREAT | OFLAG_TRUNC) != 0
            || fdflags & FDFLAG_APPEND != 0;
        let mut opts = OpenOptions::new();
        opts.read(rights & RIGHT_FD_READ != 0 || !writes);
        opts.write(writes);
        if oflags & OFLAG_CREAT != 0 {
            opts.create(true);
        }
        if oflags & OFLAG_EXCL != 0 {
            opts.create_new(true);
        }
        if oflags & OFLAG_TRUNC != 0 {
            opts.truncate(true);
        }
        if fdflags & FDFLAG_APPEND != 0 {
            opts.append(true);
        }

        match opts.open(&full) {
            Ok(file) => {
                let fd = self.fds().insert(FdEntry::File(file));
                write_u32(memory, opened_fd_ptr, fd)?;
                Ok(errno::SUCCESS)
            }
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    pub(crate) fn path_filestat_get(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let buf_ptr = stack.pop() as u32;
        let path_len = stack.pop() as u32;
        let path_ptr = stack.pop() as u32;
        let _flags = stack.pop() as u32;
        let dirfd = stack.pop() as u32;
        let raw = memory.range(path_ptr, path_len)?.to_vec();

        let full = match self.resolve_path(dirfd, &raw) {
            Ok(path) => path,
            Err(code) => return Ok(code),
        };
        match std::fs::metadata(&full) {
            Ok(meta) => {
                write_filestat(memory, buf_ptr, &meta)?;
                Ok(errno::SUCCESS)
            }
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    pub(crate) fn path_create_directory(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let path_len = stack.pop() as u32;
        let path_ptr = stack.pop() as u32;
        let dirfd = stack.pop() as u32;
        let raw = memory.range(path_ptr, path_len)?.to_vec();

        let full = match self.resolve_path(dirfd, &raw) {
            Ok(path) => path,
            Err(code) => return Ok(code),
        };
        match std::fs::create_dir(&full) {
            Ok(()) => Ok(errno::SUCCESS),
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    pub(crate) fn path_rename(
        &mut self,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
    ) -> Result<u16> {
        let new_len = stack.pop() as u32;
        let new_ptr = stack.pop() as u32;
        let new_dirfd = stack.pop() as u32;
        let old_len = stack.pop() as u32;
        let old_ptr = stack.pop() as u32;
        let old_dirfd = stack.pop() as u32;
        let old_raw = memory.range(old_ptr, old_len)?.to_vec();
        let new_raw = memory.range(new_ptr, new_len)?.to_vec();

        let old_full = match self.resolve_path(old_dirfd, &old_raw) {
            Ok(path) => path,
            Err(code) => return Ok(code),
        };
        let new_full = match self.resolve_path(new_dirfd, &new_raw) {
            Ok(path) => path,
            Err(code) => return Ok(code),
        };
        match std::fs::rename(&old_full, &new_full) {
            Ok(()) => Ok(errno::SUCCESS),
            Err(err) => Ok(errno::from_io(&err)),
        }
    }

    /// Resolve a guest path relative to a directory fd, refusing
    /// absolute paths and parent-directory escapes.
    fn resolve_path(&mut self, dirfd: u32, raw: &[u8]) -> std::result::Result<PathBuf, u16> {
        let Some(FdEntry::Dir { path: base, .. }) = self.fds().get(dirfd) else {
            return Err(errno::NOTDIR);
        };
        let rel = std::str::from_utf8(raw).map_err(|_| errno::INVAL)?;
        let rel = Path::new(rel);
        if rel.is_absolute() {
            return Err(errno::NOTCAPABLE);
        }
        if rel
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(errno::NOTCAPABLE);
        }
        Ok(base.join(rel))
    }
}

fn read_iovecs(memory: &LinearMemory, iovs_ptr: u32, count: u32) -> Result<Vec<(u32, u32)>> {
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let raw = memory.range(iovs_ptr + i * 8, 8)?;
        let ptr = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let len = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
        out.push((ptr, len));
    }
    Ok(out)
}

fn gather_iovecs(memory: &LinearMemory, iovs_ptr: u32, count: u32) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    for (ptr, len) in read_iovecs(memory, iovs_ptr, count)? {
        data.extend_from_slice(memory.range(ptr, len)?);
    }
    Ok(data)
}

/// Positioned write that leaves the cursor where it was.
fn pwrite(file: &mut File, offset: u64, data: &[u8]) -> std::io::Result<()> {
    let saved = file.stream_position()?;
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(data)?;
    file.seek(SeekFrom::Start(saved))?;
    Ok(())
}

/// Fill a 64-byte WASI filestat record.
fn write_filestat(memory: &mut LinearMemory, buf_ptr: u32, meta: &Metadata) -> Result<()> {
    let mtim = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos() as u64);
    let filetype = if meta.is_dir() {
        crate::fd::FILETYPE_DIRECTORY
    } else if meta.is_file() {
        crate::fd::FILETYPE_REGULAR_FILE
    } else if meta.is_symlink() {
        FILETYPE_SYMBOLIC_LINK
    } else {
        FILETYPE_UNKNOWN
    };

    let out = memory.range_mut(buf_ptr, 64)?;
    out.fill(0);
    out[16] = filetype;
    out[24..32].copy_from_slice(&1u64.to_le_bytes()); // nlink
    out[32..40].copy_from_slice(&meta.len().to_le_bytes());
    out[48..56].copy_from_slice(&mtim.to_le_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wvm_loader::HostCall;
    use wvm_runtime::HostBridge;

    fn fixture(preopen: &Path) -> (WasiHost, ValueStack, LinearMemory) {
        let host = WasiHost::new(Vec::new(), Vec::new(), vec![preopen.to_path_buf()]);
        (host, ValueStack::new(), LinearMemory::new(vec![0; 0x10000], None))
    }

    fn pop_errno(stack: &mut ValueStack) -> u16 {
        stack.pop() as u16
    }

    /// path_open with the given path already written at guest address 0.
    fn open_path(
        host: &mut WasiHost,
        stack: &mut ValueStack,
        memory: &mut LinearMemory,
        path: &str,
        oflags: u32,
        rights: u64,
    ) -> (u16, u32) {
        memory
            .range_mut(0, path.len() as u32)
            .unwrap()
            .copy_from_slice(path.as_bytes());
        stack.push(3); // dirfd: first preopen
        stack.push(0); // dirflags
        stack.push(0); // path ptr
        stack.push(path.len() as u64);
        stack.push(u64::from(oflags));
        stack.push(rights);
        stack.push(0); // rights inheriting
        stack.push(0); // fdflags
        stack.push(1024); // opened fd out ptr
        host.dispatch(HostCall::PathOpen, stack, memory).unwrap();
        let errno = pop_errno(stack);
        let raw = memory.range(1024, 4).unwrap();
        (errno, u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    #[test]
    fn create_write_close_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());

        let (code, fd) = open_path(
            &mut host,
            &mut stack,
            &mut memory,
            "out.txt",
            OFLAG_CREAT,
            RIGHT_FD_WRITE,
        );
        assert_eq!(code, errno::SUCCESS);
        assert_eq!(fd, 4);

        // one iovec at 2048 pointing at "hello" at 2064
        memory.range_mut(2064, 5).unwrap().copy_from_slice(b"hello");
        memory
            .range_mut(2048, 8)
            .unwrap()
            .copy_from_slice(&[0x10, 0x08, 0, 0, 5, 0, 0, 0]);
        stack.push(u64::from(fd));
        stack.push(2048); // iovs
        stack.push(1); // iovs_len
        stack.push(3000); // nwritten out
        host.dispatch(HostCall::FdWrite, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);

        stack.push(u64::from(fd));
        host.dispatch(HostCall::FdClose, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);

        let written = std::fs::read(dir.path().join("out.txt")).unwrap();
        assert_eq!(written, b"hello");
    }

    #[test]
    fn read_existing_file_through_iovec() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("in.txt"), b"wasm!").unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());

        let (code, fd) = open_path(
            &mut host,
            &mut stack,
            &mut memory,
            "in.txt",
            0,
            RIGHT_FD_READ,
        );
        assert_eq!(code, errno::SUCCESS);

        memory
            .range_mut(2048, 8)
            .unwrap()
            .copy_from_slice(&[0x00, 0x10, 0, 0, 16, 0, 0, 0]); // 16 bytes at 0x1000
        stack.push(u64::from(fd));
        stack.push(2048);
        stack.push(1);
        stack.push(3000);
        host.dispatch(HostCall::FdRead, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);
        let raw = memory.range(3000, 4).unwrap();
        assert_eq!(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]), 5);
        assert_eq!(memory.range(0x1000, 5).unwrap(), b"wasm!");
    }

    #[test]
    fn parent_escape_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());
        let (code, _) = open_path(
            &mut host,
            &mut stack,
            &mut memory,
            "../escape.txt",
            OFLAG_CREAT,
            RIGHT_FD_WRITE,
        );
        assert_eq!(code, errno::NOTCAPABLE);
    }

    #[test]
    fn absolute_path_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());
        let (code, _) = open_path(
            &mut host,
            &mut stack,
            &mut memory,
            "/etc/hosts",
            0,
            RIGHT_FD_READ,
        );
        assert_eq!(code, errno::NOTCAPABLE);
    }

    #[test]
    fn exclusive_create_fails_on_existing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dup.txt"), b"x").unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());
        let (code, _) = open_path(
            &mut host,
            &mut stack,
            &mut memory,
            "dup.txt",
            OFLAG_CREAT | OFLAG_EXCL,
            RIGHT_FD_WRITE,
        );
        assert_eq!(code, errno::EXIST);
    }

    #[test]
    fn prestat_reports_preopen() {
        let dir = tempfile::tempdir().unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());
        let name = dir.path().to_string_lossy().into_owned();

        stack.push(3);
        stack.push(64); // prestat buf
        host.dispatch(HostCall::FdPrestatGet, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);
        let raw = memory.range(64, 8).unwrap();
        assert_eq!(raw[0], 0);
        let len = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
        assert_eq!(len as usize, name.len());

        stack.push(3);
        stack.push(256); // name buf
        stack.push(u64::from(len));
        host.dispatch(HostCall::FdPrestatDirName, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);
        assert_eq!(memory.range(256, len).unwrap(), name.as_bytes());

        // fd 0 is not a preopen
        stack.push(0);
        stack.push(64);
        host.dispatch(HostCall::FdPrestatGet, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::BADF);
    }

    #[test]
    fn filestat_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sized.bin"), vec![0u8; 321]).unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());

        memory.range_mut(0, 9).unwrap().copy_from_slice(b"sized.bin");
        stack.push(3); // dirfd
        stack.push(0); // flags
        stack.push(0); // path ptr
        stack.push(9); // path len
        stack.push(512); // stat buf
        host.dispatch(HostCall::PathFilestatGet, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);
        let raw = memory.range(512, 64).unwrap();
        assert_eq!(raw[16], crate::fd::FILETYPE_REGULAR_FILE);
        let size = u64::from_le_bytes(raw[32..40].try_into().unwrap());
        assert_eq!(size, 321);
    }

    #[test]
    fn create_directory_and_rename() {
        let dir = tempfile::tempdir().unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());

        memory.range_mut(0, 3).unwrap().copy_from_slice(b"sub");
        stack.push(3);
        stack.push(0);
        stack.push(3);
        host.dispatch(HostCall::PathCreateDirectory, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);
        assert!(dir.path().join("sub").is_dir());

        memory.range_mut(16, 5).unwrap().copy_from_slice(b"moved");
        stack.push(3); // old dirfd
        stack.push(0); // old ptr
        stack.push(3); // old len
        stack.push(3); // new dirfd
        stack.push(16); // new ptr
        stack.push(5); // new len
        host.dispatch(HostCall::PathRename, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);
        assert!(dir.path().join("moved").is_dir());
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn pwrite_preserves_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("p.bin")).unwrap();
        file.write_all(b"AAAAAAAA").unwrap();
        file.seek(SeekFrom::Start(2)).unwrap();
        pwrite(&mut file, 4, b"ZZ").unwrap();
        assert_eq!(file.stream_position().unwrap(), 2);
        let content = std::fs::read(dir.path().join("p.bin")).unwrap();
        assert_eq!(content, b"AAAAZZAA");
    }

    #[test]
    fn fdstat_reports_filetype() {
        let dir = tempfile::tempdir().unwrap();
        let (mut host, mut stack, mut memory) = fixture(dir.path());
        stack.push(1); // stdout
        stack.push(128);
        host.dispatch(HostCall::FdFdstatGet, &mut stack, &mut memory)
            .unwrap();
        assert_eq!(pop_errno(&mut stack), errno::SUCCESS);
        let raw = memory.range(128, 24).unwrap();
        assert_eq!(raw[0], crate::fd::FILETYPE_CHARACTER_DEVICE);
    }
}

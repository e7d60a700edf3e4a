use crate::error::{MemoryError, Result};
use process_memory::{CopyAddress, TryIntoProcessHandle};

/// Reads raw bytes from some backing address space.
///
/// Implementations must either fill `buf` completely or fail; a short read
/// is a failure. Callers treat any failure as "data unavailable".
pub trait MemorySource {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()>;
}

/// Live foreign process, accessed through a read-only OS handle.
///
/// The handle stays valid for the lifetime of the value; dropping it
/// releases the OS resources. [`crate::RemoteReader`] keeps at most one
/// `ProcessSource` alive and swaps it out when the observed pid changes.
pub struct ProcessSource {
    pid: u32,
    handle: process_memory::ProcessHandle,
}

impl ProcessSource {
    pub fn open(pid: u32) -> Result<Self> {
        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|e| MemoryError::Attach {
                pid,
                reason: e.to_string(),
            })?;
        Ok(Self { pid, handle })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl MemorySource for ProcessSource {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        self.handle
            .copy_address(address as usize, buf)
            .map_err(|e| MemoryError::ReadFailed {
                address,
                len: buf.len(),
                reason: e.to_string(),
            })
    }
}

/// Byte snapshot of (part of) an address space.
///
/// Backs memory-dump analysis and every test fixture: the snapshot is
/// addressed with the same virtual addresses the live process would use.
/// A read that leaves the snapshot, even partially, fails like an OS-level
/// read failure would.
#[derive(Debug, Clone, Default)]
pub struct ImageSource {
    base: u64,
    bytes: Vec<u8>,
}

impl ImageSource {
    pub fn new(base: u64, bytes: Vec<u8>) -> Self {
        Self { base, bytes }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Place bytes at a virtual address, growing the image with zeroes as
    /// needed. Used when composing an image out of captured records.
    pub fn write(&mut self, address: u64, data: &[u8]) {
        if address < self.base {
            return;
        }
        let start = (address - self.base) as usize;
        let end = start + data.len();
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(data);
    }
}

impl MemorySource for ImageSource {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        let oob = || MemoryError::OutOfImage {
            address,
            len: buf.len(),
        };
        let start = address.checked_sub(self.base).ok_or_else(oob)? as usize;
        let end = start.checked_add(buf.len()).ok_or_else(oob)?;
        if end > self.bytes.len() {
            return Err(oob());
        }
        buf.copy_from_slice(&self.bytes[start..end]);
        Ok(())
    }
}

use crate::source::{ImageSource, MemorySource, ProcessSource};
use std::mem;
use std::slice;

/// Marker for record types that can be materialized from raw foreign bytes.
///
/// # Safety
///
/// Implementors must be `#[repr(C, packed)]` (or a primitive) and valid for
/// every bit pattern, including all zeroes. Pointers are carried as `u64`,
/// never as references.
pub unsafe trait FromMemory: Copy + 'static {
    /// The "unavailable" value every failed read decays to.
    fn zeroed() -> Self {
        // Safety: the trait contract requires all-zero bytes to be valid.
        unsafe { mem::zeroed() }
    }
}

unsafe impl FromMemory for u8 {}
unsafe impl FromMemory for u16 {}
unsafe impl FromMemory for u32 {}
unsafe impl FromMemory for u64 {}
unsafe impl FromMemory for i32 {}
unsafe impl FromMemory for i64 {}
unsafe impl FromMemory for f32 {}

/// Wire image of a record, as the foreign process stores it. Counterpart of
/// [`RemoteReader::read`]; used when composing an [`ImageSource`].
pub fn bytes_of<T: FromMemory>(value: &T) -> Vec<u8> {
    // Safety: T is packed with no padding, so every byte is initialized.
    unsafe { slice::from_raw_parts(value as *const T as *const u8, mem::size_of::<T>()) }.to_vec()
}

enum Backing {
    Process(ProcessSource),
    Image(ImageSource),
}

impl Backing {
    fn source(&self) -> &dyn MemorySource {
        match self {
            Backing::Process(p) => p,
            Backing::Image(i) => i,
        }
    }
}

/// Typed reads against the current target, with a cached process handle.
///
/// All read failures are swallowed here: callers receive zeroed records and
/// empty strings and must treat those as "unavailable", not as valid data.
#[derive(Default)]
pub struct RemoteReader {
    backing: Option<Backing>,
}

impl RemoteReader {
    /// Reader with no target; every read yields the zeroed value until
    /// [`Self::ensure_attached`] succeeds.
    pub fn new() -> Self {
        Self { backing: None }
    }

    /// Reader over a memory image (dump file or composed fixture).
    pub fn from_image(image: ImageSource) -> Self {
        Self {
            backing: Some(Backing::Image(image)),
        }
    }

    /// Open (or reuse) the read-only handle for `pid`. When the observed
    /// pid changes the old handle is dropped before the new one is opened,
    /// keeping at most one live handle at a time. A failed open leaves the
    /// reader detached; it is retried on the next call.
    pub fn ensure_attached(&mut self, pid: u32) {
        if let Some(Backing::Process(p)) = &self.backing {
            if p.pid() == pid {
                return;
            }
        }
        self.backing = None;
        match ProcessSource::open(pid) {
            Ok(source) => self.backing = Some(Backing::Process(source)),
            Err(err) => log::debug!("attach to pid {pid} failed: {err}"),
        }
    }

    /// Release the handle (shutdown path).
    pub fn detach(&mut self) {
        self.backing = None;
    }

    pub fn is_attached(&self) -> bool {
        self.backing.is_some()
    }

    /// Read one fixed-size record. Null addresses, missing targets and
    /// OS-level failures all produce the zeroed record.
    pub fn read<T: FromMemory>(&self, address: u64) -> T {
        if address == 0 {
            return T::zeroed();
        }
        let Some(backing) = &self.backing else {
            return T::zeroed();
        };
        let mut value = T::zeroed();
        let buf = unsafe {
            slice::from_raw_parts_mut(&mut value as *mut T as *mut u8, mem::size_of::<T>())
        };
        match backing.source().read_into(address, buf) {
            Ok(()) => value,
            Err(err) => {
                log::debug!("record read failed: {err}");
                T::zeroed()
            }
        }
    }

    /// Read a fixed-capacity UTF-16LE buffer, truncated at the first
    /// embedded NUL. Empty string for a null address or zero capacity.
    pub fn read_wide_string(&self, address: u64, max_chars: usize) -> String {
        if address == 0 || max_chars == 0 {
            return String::new();
        }
        let Some(backing) = &self.backing else {
            return String::new();
        };
        let mut buf = vec![0u8; max_chars * 2];
        if let Err(err) = backing.source().read_into(address, &mut buf) {
            log::debug!("wide string read failed: {err}");
            return String::new();
        }
        let units: Vec<u16> = buf
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0)
            .collect();
        String::from_utf16_lossy(&units)
    }
}

impl std::fmt::Debug for RemoteReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let target = match &self.backing {
            Some(Backing::Process(p)) => format!("process:{}", p.pid()),
            Some(Backing::Image(i)) => format!("image:{:#x}+{:#x}", i.base(), i.len()),
            None => "detached".to_string(),
        };
        f.debug_struct("RemoteReader").field("target", &target).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[repr(C, packed)]
    #[derive(Clone, Copy)]
    struct Sample {
        a: u32,
        b: u64,
        c: [u8; 3],
    }
    unsafe impl FromMemory for Sample {}

    fn reader_with(base: u64, bytes: Vec<u8>) -> RemoteReader {
        RemoteReader::from_image(ImageSource::new(base, bytes))
    }

    #[test]
    fn packed_record_round_trips_through_image() {
        let sample = Sample {
            a: 0xdead_beef,
            b: 0x1122_3344_5566_7788,
            c: [7, 8, 9],
        };
        let mut image = ImageSource::new(0x4000, Vec::new());
        image.write(0x4000, &bytes_of(&sample));
        let reader = RemoteReader::from_image(image);

        let got: Sample = reader.read(0x4000);
        assert_eq!({ got.a }, 0xdead_beef);
        assert_eq!({ got.b }, 0x1122_3344_5566_7788);
        assert_eq!({ got.c }, [7, 8, 9]);
    }

    #[test]
    fn null_address_reads_zeroed() {
        let reader = reader_with(0x1000, vec![0xff; 32]);
        assert_eq!(reader.read::<u64>(0), 0);
    }

    #[test]
    fn failed_read_reads_zeroed() {
        let reader = reader_with(0x1000, vec![0xff; 8]);
        // Straddles the end of the image.
        assert_eq!(reader.read::<u64>(0x1004), 0);
        // Entirely outside.
        assert_eq!(reader.read::<u32>(0x9000), 0);
    }

    #[test]
    fn detached_reader_reads_zeroed() {
        let reader = RemoteReader::new();
        assert_eq!(reader.read::<u32>(0x1234), 0);
        assert_eq!(reader.read_wide_string(0x1234, 8), "");
    }

    #[test]
    fn wide_string_truncates_at_nul() {
        let mut bytes = Vec::new();
        for unit in [b'M' as u16, b'e' as u16, b's' as u16, b'a' as u16, 0, b'X' as u16] {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0; 128]);
        let reader = reader_with(0x2000, bytes);
        assert_eq!(reader.read_wide_string(0x2000, 64), "Mesa");
    }

    #[test]
    fn wide_string_without_nul_uses_full_capacity() {
        let mut bytes = Vec::new();
        for _ in 0..4 {
            bytes.extend_from_slice(&(b'a' as u16).to_le_bytes());
        }
        let reader = reader_with(0x2000, bytes);
        assert_eq!(reader.read_wide_string(0x2000, 4), "aaaa");
    }

    #[test]
    fn wide_string_null_or_empty_capacity() {
        let reader = reader_with(0x2000, vec![0; 16]);
        assert_eq!(reader.read_wide_string(0, 64), "");
        assert_eq!(reader.read_wide_string(0x2000, 0), "");
    }
}

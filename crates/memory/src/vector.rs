use crate::reader::{FromMemory, RemoteReader};
use std::mem;

/// Hard cap on decoded element counts. Anything larger is assumed to be a
/// stale or mid-mutation vector and reported as empty.
pub const FOREIGN_VEC_CAP: usize = 10_000;

/// The foreign three-pointer vector ABI: first element, one-past-last,
/// one-past-capacity. The element count is always re-derived from the
/// pointers, never cached, because the foreign process may resize the
/// vector between any two reads.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug)]
pub struct ForeignVec {
    pub first: u64,
    pub last: u64,
    pub end_cap: u64,
}

unsafe impl FromMemory for ForeignVec {}

impl ForeignVec {
    pub fn new(first: u64, last: u64, end_cap: u64) -> Self {
        Self {
            first,
            last,
            end_cap,
        }
    }

    /// Element count for stride `size_of::<T>()`. Returns 0 (not an error)
    /// for null pointers, inverted or empty spans, spans that do not divide
    /// evenly by the stride, and counts above [`FOREIGN_VEC_CAP`].
    pub fn count<T: FromMemory>(&self) -> usize {
        let (first, last) = (self.first, self.last);
        if first == 0 || last == 0 {
            return 0;
        }
        let Some(bytes) = last.checked_sub(first) else {
            return 0;
        };
        if bytes == 0 {
            return 0;
        }
        let stride = mem::size_of::<T>() as u64;
        if stride == 0 || bytes % stride != 0 {
            return 0;
        }
        let count = bytes / stride;
        if count > FOREIGN_VEC_CAP as u64 {
            return 0;
        }
        count as usize
    }

    /// Read element `i`. Callers must have checked `i < self.count::<T>()`
    /// this frame; an out-of-range index reads garbage-adjacent memory and
    /// comes back zeroed at worst, but is still a caller bug.
    pub fn read_at<T: FromMemory>(&self, reader: &RemoteReader, index: usize) -> T {
        let stride = mem::size_of::<T>() as u64;
        let address = self.first.wrapping_add(index as u64 * stride);
        reader.read(address)
    }

    /// Read slot `i` of a pointer vector (stride 8), with its own bounds
    /// check. Null when the slot is out of range or unreadable.
    pub fn pointer_at(&self, reader: &RemoteReader, index: usize) -> u64 {
        if index >= self.count::<u64>() {
            return 0;
        }
        self.read_at::<u64>(reader, index)
    }
}

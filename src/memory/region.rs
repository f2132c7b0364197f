//! Byte regions the reader can copy from.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::lock_api::Mutex;

use crate::sync::{DefaultLock, RawLock};
use crate::{Result, TelemetryError};

/// Read access to a writer-owned byte region.
///
/// Reads are snapshots of bytes that another process may be changing; callers
/// are responsible for detecting inconsistent copies.
pub trait SharedRegion: Send {
    /// Size of the region in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Little-endian `i32` at `offset`, or `None` past the end.
    fn read_i32(&self, offset: usize) -> Option<i32>;

    /// Copy `dst.len()` bytes starting at `offset`. Returns `false`, leaving
    /// `dst` untouched, if the range extends past the end.
    fn read_into(&self, offset: usize, dst: &mut [u8]) -> bool;

    /// Wait up to `timeout` for the writer to signal new data. Regions with no
    /// signal return `true` immediately.
    fn wait_for_data(&self, timeout: Duration) -> bool {
        let _ = timeout;
        true
    }
}

impl<R: SharedRegion + ?Sized> SharedRegion for Box<R> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_i32(&self, offset: usize) -> Option<i32> {
        (**self).read_i32(offset)
    }

    fn read_into(&self, offset: usize, dst: &mut [u8]) -> bool {
        (**self).read_into(offset, dst)
    }

    fn wait_for_data(&self, timeout: Duration) -> bool {
        (**self).wait_for_data(timeout)
    }
}

struct RegionBytes<L: RawLock> {
    len: usize,
    bytes: Mutex<L, Box<[u8]>>,
}

impl<L: RawLock> RegionBytes<L> {
    fn with<T>(&self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        f(&mut self.bytes.lock())
    }
}

/// Heap-backed region shared with a [`RegionWriter`].
///
/// Every individual access is atomic with respect to the writer; a sequence
/// of accesses is not, just like a mapping shared with another process.
pub struct InMemoryRegion<L: RawLock = DefaultLock> {
    shared: Arc<RegionBytes<L>>,
}

/// Write side of an [`InMemoryRegion`].
pub struct RegionWriter<L: RawLock = DefaultLock> {
    shared: Arc<RegionBytes<L>>,
}

impl InMemoryRegion {
    /// Zeroed region of `len` bytes.
    pub fn new(len: usize) -> (Self, RegionWriter) {
        Self::from_bytes(vec![0; len])
    }

    pub fn from_bytes(bytes: Vec<u8>) -> (Self, RegionWriter) {
        Self::with_lock(bytes, DefaultLock::INIT)
    }
}

impl<L: RawLock> InMemoryRegion<L> {
    pub fn with_lock(bytes: Vec<u8>, lock: L) -> (Self, RegionWriter<L>) {
        let len = bytes.len();
        let shared = Arc::new(RegionBytes { len, bytes: Mutex::from_raw(lock, bytes.into_boxed_slice()) });
        (Self { shared: Arc::clone(&shared) }, RegionWriter { shared })
    }
}

impl<L: RawLock + Send + Sync> SharedRegion for InMemoryRegion<L> {
    fn len(&self) -> usize {
        self.shared.len
    }

    fn read_i32(&self, offset: usize) -> Option<i32> {
        let mut bytes = [0u8; 4];
        self.read_into(offset, &mut bytes).then(|| i32::from_le_bytes(bytes))
    }

    fn read_into(&self, offset: usize, dst: &mut [u8]) -> bool {
        self.shared.with(|bytes| {
            match offset.checked_add(dst.len()).and_then(|end| bytes.get(offset..end)) {
                Some(src) => {
                    dst.copy_from_slice(src);
                    true
                }
                None => false,
            }
        })
    }
}

impl<L: RawLock> RegionWriter<L> {
    pub fn len(&self) -> usize {
        self.shared.len
    }

    pub fn is_empty(&self) -> bool {
        self.shared.len == 0
    }

    /// Overwrite bytes at `offset`; fails with [`TelemetryError::Memory`] past the end.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        self.shared.with(|bytes| {
            let dst = offset
                .checked_add(data.len())
                .and_then(|end| bytes.get_mut(offset..end))
                .ok_or(TelemetryError::Memory { offset })?;
            dst.copy_from_slice(data);
            Ok(())
        })
    }

    pub fn write_i32(&self, offset: usize, value: i32) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }
}

impl<L: RawLock> fmt::Debug for InMemoryRegion<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRegion").field("len", &self.shared.len).finish()
    }
}

impl<L: RawLock> fmt::Debug for RegionWriter<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionWriter").field("len", &self.shared.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::tests::CountingLock;

    #[test]
    fn writes_are_visible_to_reader() {
        let (region, writer) = InMemoryRegion::new(16);
        writer.write_i32(4, -7).unwrap();
        assert_eq!(region.read_i32(4), Some(-7));

        let mut dst = [0u8; 4];
        assert!(region.read_into(4, &mut dst));
        assert_eq!(i32::from_le_bytes(dst), -7);
    }

    #[test]
    fn out_of_range_access_is_refused() {
        let (region, writer) = InMemoryRegion::new(8);
        let mut dst = [9u8; 4];
        assert!(!region.read_into(6, &mut dst));
        assert_eq!(dst, [9; 4]);
        assert_eq!(region.read_i32(usize::MAX), None);
        assert!(matches!(writer.write(7, &[1, 2]), Err(TelemetryError::Memory { offset: 7 })));
    }

    #[test]
    fn every_access_takes_and_releases_the_lock() {
        let (lock, counts) = CountingLock::new();
        let (region, writer) = InMemoryRegion::with_lock(vec![0; 8], lock);
        writer.write_i32(0, 1).unwrap();
        region.read_i32(0);
        region.read_i32(100);

        assert_eq!(counts.balanced(), Some(3));
    }
}

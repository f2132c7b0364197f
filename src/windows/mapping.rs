//! Read-only view of the simulator's named shared-memory mapping.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{Ordering, fence};
use std::time::Duration;

use tracing::{debug, trace};
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
use windows::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_BASIC_INFORMATION, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    OpenFileMappingW, UnmapViewOfFile, VirtualQuery,
};
use windows::Win32::System::Threading::{OpenEventW, SYNCHRONIZATION_ACCESS_RIGHTS, WaitForSingleObject};
use windows::core::PCWSTR;

use crate::guard::ScopedGuard;
use crate::memory::SharedRegion;
use crate::schema::header::HEADER_SIZE;
use crate::{Result, TelemetryError};

pub const MEMMAP_NAME: &str = "Local\\IRSDKMemMapFileName";
pub const DATA_VALID_EVENT_NAME: &str = "Local\\IRSDKDataValidEvent";

const SYNCHRONIZE: SYNCHRONIZATION_ACCESS_RIGHTS = SYNCHRONIZATION_ACCESS_RIGHTS(0x0010_0000);

/// The writer's mapping, held open until drop.
pub struct MappedRegion {
    mapping: HANDLE,
    view: MEMORY_MAPPED_VIEW_ADDRESS,
    base: NonNull<u8>,
    len: usize,
    event: Option<HANDLE>,
}

impl MappedRegion {
    /// Map the writer's region read-only.
    ///
    /// Fails with [`TelemetryError::BufferUnavailable`] when the writer is not
    /// running. Handles opened before a later failure are closed on the way out.
    pub fn open() -> Result<Self> {
        trace!(name = MEMMAP_NAME, "opening shared telemetry mapping");
        let map_name = wide_string(MEMMAP_NAME);
        let mapping = unsafe { OpenFileMappingW(FILE_MAP_READ.0, false, PCWSTR::from_raw(map_name.as_ptr())) }
            .map_err(|err| {
                TelemetryError::buffer_unavailable_with_source("shared telemetry mapping not found", Box::new(err))
            })?;
        let close_mapping = ScopedGuard::new(move || unsafe {
            let _ = CloseHandle(mapping);
        });

        let view = unsafe { MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, 0) };
        let base = NonNull::new(view.Value as *mut u8).ok_or_else(|| {
            TelemetryError::buffer_unavailable_with_source(
                "mapping the telemetry view failed",
                Box::new(windows::core::Error::from_thread()),
            )
        })?;
        let unmap_view = ScopedGuard::new(move || unsafe {
            let _ = UnmapViewOfFile(view);
        });

        let mut info = MEMORY_BASIC_INFORMATION::default();
        let written = unsafe {
            VirtualQuery(
                Some(base.as_ptr() as *const c_void),
                &mut info,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };
        if written == 0 || info.RegionSize < HEADER_SIZE {
            return Err(TelemetryError::buffer_unavailable(format!(
                "telemetry view of {} bytes is smaller than the header",
                info.RegionSize
            )));
        }

        let event_name = wide_string(DATA_VALID_EVENT_NAME);
        let event = unsafe { OpenEventW(SYNCHRONIZE, false, PCWSTR::from_raw(event_name.as_ptr())) }.ok();
        if event.is_none() {
            debug!("data-valid event unavailable; waits return immediately");
        }

        close_mapping.dismiss();
        unmap_view.dismiss();
        debug!(len = info.RegionSize, "mapped shared telemetry region");
        Ok(Self { mapping, view, base, len: info.RegionSize, event })
    }
}

impl SharedRegion for MappedRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn read_i32(&self, offset: usize) -> Option<i32> {
        let end = offset.checked_add(4)?;
        if end > self.len {
            return None;
        }
        fence(Ordering::Acquire);
        // SAFETY: bounds checked above; the view stays mapped for the life of self.
        let bytes = unsafe { std::ptr::read_volatile(self.base.as_ptr().add(offset) as *const [u8; 4]) };
        Some(i32::from_le_bytes(bytes))
    }

    fn read_into(&self, offset: usize, dst: &mut [u8]) -> bool {
        if offset.checked_add(dst.len()).is_none_or(|end| end > self.len) {
            return false;
        }
        fence(Ordering::Acquire);
        // SAFETY: bounds checked above; `dst` cannot alias the read-only view.
        unsafe { std::ptr::copy_nonoverlapping(self.base.as_ptr().add(offset), dst.as_mut_ptr(), dst.len()) };
        fence(Ordering::Acquire);
        true
    }

    fn wait_for_data(&self, timeout: Duration) -> bool {
        let Some(event) = self.event else { return true };
        let ms = timeout.as_millis().min(u128::from(u32::MAX)) as u32;
        unsafe { WaitForSingleObject(event, ms) == WAIT_OBJECT_0 }
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        unsafe {
            let _ = UnmapViewOfFile(self.view);
            let _ = CloseHandle(self.mapping);
            if let Some(event) = self.event {
                let _ = CloseHandle(event);
            }
        }
    }
}

// SAFETY: the handles are process-wide kernel objects and the view is only read.
unsafe impl Send for MappedRegion {}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion").field("len", &self.len).field("event", &self.event.is_some()).finish()
    }
}

fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_names_are_nul_terminated() {
        let wide = wide_string(MEMMAP_NAME);
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(wide.len(), MEMMAP_NAME.len() + 1);
    }

    #[test]
    #[ignore = "simulator_required"]
    fn maps_live_region() {
        let region = MappedRegion::open().expect("simulator running");
        assert!(region.len() >= HEADER_SIZE);
        assert_eq!(region.read_i32(0), Some(2));
    }
}

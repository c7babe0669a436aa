use std::ffi::c_void;
use std::path::Path;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{GetLastError, SetLastError, BOOL, LPARAM, WIN32_ERROR, WPARAM};
use windows::Win32::Graphics::Gdi::{AddFontResourceW, RemoveFontResourceW};
use windows::Win32::UI::WindowsAndMessaging::{SendMessageW, HWND_BROADCAST, WM_FONTCHANGE};

use super::wide;
use crate::resource::{FontResources, NativeError, ResourceInfo};

// Undocumented, so not part of the generated bindings.
#[link(name = "gdi32")]
extern "system" {
    fn GetFontResourceInfoW(
        lpszfilename: PCWSTR,
        cbbuffer: *mut u32,
        lpbuffer: *mut c_void,
        dwquerytype: u32,
    ) -> BOOL;
}

/// The GDI session font table.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiFontTable;

fn last_error(code: i32) -> NativeError {
    // SAFETY: reads thread-local state only.
    let native = unsafe { GetLastError() };
    NativeError::new(code, native.0)
}

impl FontResources for GdiFontTable {
    fn add_resource(&self, path: &Path) -> Result<u32, NativeError> {
        let path = wide(path);
        // SAFETY: `path` is NUL terminated and outlives the call.
        let added = unsafe { AddFontResourceW(PCWSTR(path.as_ptr())) };
        if added == 0 {
            return Err(last_error(added));
        }
        Ok(added as u32)
    }

    fn remove_resource(&self, path: &Path) -> Result<u32, NativeError> {
        let path = wide(path);
        // SAFETY: as above.
        let removed = unsafe { RemoveFontResourceW(PCWSTR(path.as_ptr())) };
        if !removed.as_bool() {
            return Err(last_error(removed.0));
        }
        Ok(removed.0 as u32)
    }

    fn resource_info(
        &self,
        path: &Path,
        info: ResourceInfo,
        buf: &mut [u8],
    ) -> Result<u32, NativeError> {
        let path = wide(path);
        let mut size = buf.len() as u32;
        let buffer = if buf.is_empty() {
            std::ptr::null_mut()
        } else {
            buf.as_mut_ptr().cast::<c_void>()
        };
        // SAFETY: `buffer` is null or valid for `size` bytes; GDI never
        // writes past the size it is given.
        let ok = unsafe {
            SetLastError(WIN32_ERROR(0));
            GetFontResourceInfoW(PCWSTR(path.as_ptr()), &mut size, buffer, info as u32)
        };
        if !ok.as_bool() {
            return Err(last_error(ok.0));
        }
        Ok(size)
    }

    fn broadcast_font_change(&self) -> Result<(), NativeError> {
        // SAFETY: plain message without pointers.
        let result = unsafe {
            SetLastError(WIN32_ERROR(0));
            SendMessageW(HWND_BROADCAST, WM_FONTCHANGE, WPARAM(0), LPARAM(0))
        };
        let err = last_error(result.0 as i32);
        if err.native != 0 {
            return Err(err);
        }
        Ok(())
    }
}

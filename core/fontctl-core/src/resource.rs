//! Session font table operations and the font-change broadcast

use std::path::Path;

use crate::diag::{self, SharedDiagnostics};
use crate::error::{FontCtlError, Result, ERROR_INVALID_PARAMETER};

/// Appended to a font's display name when it is an outline font.
pub const OUTLINE_ANNOTATION: &str = " (TrueType)";

/// Failure reported by a native font-table primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeError {
    /// Value the primitive returned.
    pub code: i32,
    /// Thread error code captured right after the call.
    pub native: u32,
}

impl NativeError {
    pub fn new(code: i32, native: u32) -> Self {
        Self { code, native }
    }

    /// GDI answers queries about fonts it does not hold with either no error
    /// code at all or `ERROR_INVALID_PARAMETER`.
    pub fn is_not_loaded(&self) -> bool {
        self.native == 0 || self.native == ERROR_INVALID_PARAMETER
    }
}

/// Metadata selectors for [`FontResources::resource_info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceInfo {
    /// Display name, UTF-16LE, NUL terminated.
    Description = 1,
    /// 4-byte little-endian font type; non-zero means outline font.
    FontType = 3,
}

/// Raw font-table primitives of the host OS.
pub trait FontResources {
    /// Add a font file to the session font table; returns the number of faces added.
    fn add_resource(&self, path: &Path) -> Result<u32, NativeError>;

    /// Remove a previously added font file.
    fn remove_resource(&self, path: &Path) -> Result<u32, NativeError>;

    /// Copy metadata of a loaded font into `buf`.
    ///
    /// With an empty `buf` nothing is copied and the required size in bytes
    /// is returned; otherwise the number of bytes written.
    fn resource_info(&self, path: &Path, info: ResourceInfo, buf: &mut [u8])
        -> Result<u32, NativeError>;

    /// Tell every top-level window that the font table changed.
    fn broadcast_font_change(&self) -> Result<(), NativeError>;
}

impl<T: FontResources + ?Sized> FontResources for &T {
    fn add_resource(&self, path: &Path) -> Result<u32, NativeError> {
        (**self).add_resource(path)
    }

    fn remove_resource(&self, path: &Path) -> Result<u32, NativeError> {
        (**self).remove_resource(path)
    }

    fn resource_info(
        &self,
        path: &Path,
        info: ResourceInfo,
        buf: &mut [u8],
    ) -> Result<u32, NativeError> {
        (**self).resource_info(path, info, buf)
    }

    fn broadcast_font_change(&self) -> Result<(), NativeError> {
        (**self).broadcast_font_change()
    }
}

/// Font table wrapper that turns primitive failures into [`FontCtlError`]s
/// and reports every step to its diagnostics sink.
pub struct FontTable<R> {
    backend: R,
    diag: SharedDiagnostics,
}

impl<R: FontResources> FontTable<R> {
    pub fn new(backend: R, diag: SharedDiagnostics) -> Self {
        Self { backend, diag }
    }

    pub fn with_backend(backend: R) -> Self {
        Self::new(backend, diag::noop())
    }

    pub fn add_font(&self, path: &Path) -> Result<u32> {
        match self.backend.add_resource(path) {
            Ok(count) => {
                self.diag.info(&format!(
                    "AddFont: font loaded: {}, return code={count}",
                    path.display()
                ));
                Ok(count)
            }
            Err(err) => {
                self.diag.error(&format!(
                    "AddFont: AddFontResourceW failed: return code={}, winerrno={}",
                    err.code, err.native
                ));
                Err(os_call("AddFontResourceW", err))
            }
        }
    }

    pub fn remove_font(&self, path: &Path) -> Result<u32> {
        match self.backend.remove_resource(path) {
            Ok(count) => {
                self.diag.info(&format!(
                    "RemoveFont: font unloaded: {}, return code={count}",
                    path.display()
                ));
                Ok(count)
            }
            Err(err) => {
                self.diag.error(&format!(
                    "RemoveFont: RemoveFontResourceW failed: return code={}, winerrno={}",
                    err.code, err.native
                ));
                Err(os_call("RemoveFontResourceW", err))
            }
        }
    }

    pub fn notify_font_change(&self) -> Result<()> {
        match self.backend.broadcast_font_change() {
            Ok(()) => {
                self.diag
                    .info("NotifyFontChange: WM_FONTCHANGE broadcast sent");
                Ok(())
            }
            Err(err) => {
                self.diag.error(&format!(
                    "NotifyFontChange: SendMessageW(WM_FONTCHANGE) failed: return code={}, winerrno={}",
                    err.code, err.native
                ));
                Err(os_call("SendMessageW(WM_FONTCHANGE)", err))
            }
        }
    }

    /// Display name of a loaded font.
    ///
    /// Fails with [`FontCtlError::InvalidOrNotLoaded`] when the font is not
    /// in the table, which callers may fix by adding it and asking again.
    pub fn query_font_name(&self, path: &Path) -> Result<String> {
        let size = self
            .backend
            .resource_info(path, ResourceInfo::Description, &mut [])
            .map_err(|err| {
                self.diag.warn(&format!(
                    "GetFontName: size query failed, font not loaded or other problem: return code={}, winerrno={}",
                    err.code, err.native
                ));
                query_error(path, err)
            })?;

        if size == 0 {
            self.diag
                .error("GetFontName: size query returned 0, no data is available");
            return Err(FontCtlError::NoMetadataAvailable(path.to_path_buf()));
        }

        let mut buf = vec![0u8; size as usize];
        let written = self
            .backend
            .resource_info(path, ResourceInfo::Description, &mut buf)
            .map_err(|err| {
                self.diag.error(&format!(
                    "GetFontName: description query failed: return code={}, winerrno={}",
                    err.code, err.native
                ));
                query_error(path, err)
            })?;

        buf.truncate((written as usize).min(buf.len()));
        let name = decode_utf16z(&buf);
        self.diag
            .info(&format!("GetFontName: description query returned '{name}'"));
        Ok(name)
    }

    /// [`Self::query_font_name`] plus [`OUTLINE_ANNOTATION`] for outline fonts.
    /// A failing type query only drops the annotation.
    pub fn query_font_name_with_type(&self, path: &Path) -> Result<String> {
        let mut name = self.query_font_name(path)?;

        let mut raw = [0u8; 4];
        match self
            .backend
            .resource_info(path, ResourceInfo::FontType, &mut raw)
        {
            Ok(_) => {
                if u32::from_le_bytes(raw) >= 1 {
                    name.push_str(OUTLINE_ANNOTATION);
                }
                self.diag.info("GetFontNameWithType: font type query succeeded");
            }
            Err(err) => {
                self.diag.error(&format!(
                    "GetFontNameWithType: font type query failed: return code={}, winerrno={}",
                    err.code, err.native
                ));
            }
        }

        Ok(name)
    }
}

fn os_call(call: &'static str, err: NativeError) -> FontCtlError {
    FontCtlError::OsCallFailed {
        call,
        code: err.code,
        native: err.native,
    }
}

fn query_error(path: &Path, err: NativeError) -> FontCtlError {
    if err.is_not_loaded() {
        FontCtlError::InvalidOrNotLoaded(path.to_path_buf())
    } else {
        os_call("GetFontResourceInfoW", err)
    }
}

/// Decode UTF-16LE bytes up to the first NUL.
pub(crate) fn decode_utf16z(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Encode as UTF-16LE with a trailing NUL, the layout GDI hands back.
pub(crate) fn encode_utf16z(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// Fill `buf` the way `GetFontResourceInfoW` does: report the size when the
/// buffer is empty, otherwise copy as much as fits.
pub(crate) fn answer_info(data: &[u8], buf: &mut [u8]) -> u32 {
    if buf.is_empty() {
        return data.len() as u32;
    }
    let n = data.len().min(buf.len());
    buf[..n].copy_from_slice(&data[..n]);
    n as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_round_trips_through_nul_terminated_buffer() {
        let raw = encode_utf16z("Ärial Bold");
        assert_eq!(raw.len(), ("Ärial Bold".encode_utf16().count() + 1) * 2);
        assert_eq!(decode_utf16z(&raw), "Ärial Bold");
    }

    #[test]
    fn decode_stops_at_first_nul_and_ignores_odd_byte() {
        let mut raw = encode_utf16z("Mono");
        raw.extend_from_slice(&encode_utf16z("junk"));
        raw.push(0x41);
        assert_eq!(decode_utf16z(&raw), "Mono");
    }

    #[test]
    fn answer_info_reports_size_then_copies() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(answer_info(&data, &mut []), 4);

        let mut small = [0u8; 2];
        assert_eq!(answer_info(&data, &mut small), 2);
        assert_eq!(small, [1, 2]);
    }

    #[test]
    fn not_loaded_covers_zero_and_invalid_parameter() {
        assert!(NativeError::new(0, 0).is_not_loaded());
        assert!(NativeError::new(0, ERROR_INVALID_PARAMETER).is_not_loaded());
        assert!(!NativeError::new(0, 5).is_not_loaded());
    }
}

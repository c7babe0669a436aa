//! Windows implementations of the font table and registry seams

mod gdi;
mod registry;

pub use gdi::GdiFontTable;
pub use registry::WindowsRegistry;

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

/// NUL-terminated UTF-16 copy of `text` for wide-string APIs.
pub(crate) fn wide(text: impl AsRef<OsStr>) -> Vec<u16> {
    text.as_ref()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

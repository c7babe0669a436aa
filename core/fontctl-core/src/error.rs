//! Error kinds shared by every fontctl component

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// `GetLastError` value GDI reports when a font query targets a font that
/// is not in the session font table.
pub const ERROR_INVALID_PARAMETER: u32 = 87;
pub const ERROR_FILE_NOT_FOUND: u32 = 2;
pub const ERROR_INVALID_DATA: u32 = 13;
pub const ERROR_ACCESS_DENIED: u32 = 5;

#[derive(Debug, Error)]
pub enum FontCtlError {
    #[error("can't find or open file '{}'", .0.display())]
    FileNotFound(PathBuf),

    #[error("destination file '{}' exists and is different", .0.display())]
    DestinationConflict(PathBuf),

    #[error("{call} failed: return code={code}, winerrno={native}")]
    OsCallFailed {
        call: &'static str,
        code: i32,
        native: u32,
    },

    #[error("font '{}' is either invalid or not loaded", .0.display())]
    InvalidOrNotLoaded(PathBuf),

    #[error("no font description available for '{}' (buffer size 0)", .0.display())]
    NoMetadataAvailable(PathBuf),

    #[error("failed to open registry key '{key}' (winerrno={native})")]
    RegistryAccessDenied { key: String, native: u32 },

    #[error("failed to {op} registry value '{name}' (winerrno={native})")]
    Registry {
        op: &'static str,
        name: String,
        native: u32,
    },

    #[error("font dir '{}' does not exist", .0.display())]
    FontDirMissing(PathBuf),

    #[error("font dir path '{}' exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("path '{}' is not valid Unicode and can't be stored in the registry", .0.display())]
    NonUnicodePath(PathBuf),

    #[error("can't determine the {0} font dir")]
    FontDirUnknown(&'static str),

    #[error("failed to remove file '{}' ({source}), uninstall incomplete", path.display())]
    UninstallIncomplete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{context} '{}' ({source})", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FontCtlError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = FontCtlError> = std::result::Result<T, E>;

//! Content-aware file copy into a font directory

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::diag::{self, SharedDiagnostics};
use crate::error::{FontCtlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAction {
    /// Destination already held the same bytes.
    Identical,
    Copied { bytes: u64 },
    Overwritten { bytes: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub path: PathBuf,
    pub action: CopyAction,
}

/// Copies files into a directory under their own file name, skipping the
/// write when an identical file is already there.
#[derive(Clone)]
pub struct FileCopier {
    diag: SharedDiagnostics,
}

impl Default for FileCopier {
    fn default() -> Self {
        Self::new(diag::noop())
    }
}

impl FileCopier {
    pub fn new(diag: SharedDiagnostics) -> Self {
        Self { diag }
    }

    /// Copy `src` into `dest_dir`.
    ///
    /// An existing destination with different content is only replaced when
    /// `overwrite` is set; otherwise the call fails with
    /// [`FontCtlError::DestinationConflict`] and the destination is left alone.
    pub fn copy(&self, src: &Path, dest_dir: &Path, overwrite: bool) -> Result<CopyOutcome> {
        let mut src_file = File::open(src)
            .map_err(|e| FontCtlError::io("failed to open source file", src, e))?;
        let file_name = src
            .file_name()
            .ok_or_else(|| FontCtlError::FileNotFound(src.to_path_buf()))?;
        let dest = dest_dir.join(file_name);

        let mut replacing = false;
        if fs::metadata(&dest).is_ok() {
            // Unreadable files on either side count as different.
            let identical = match (file_digest(src), file_digest(&dest)) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            };
            if identical {
                self.diag.info(&format!(
                    "CopyFile: destination file is identical, skipping copy, source={}, dest={}",
                    src.display(),
                    dest.display()
                ));
                return Ok(CopyOutcome {
                    path: dest,
                    action: CopyAction::Identical,
                });
            }
            if !overwrite {
                self.diag.error(&format!(
                    "CopyFile: destination file exists, differs from source and overwriting is disabled, source={}, dest={}",
                    src.display(),
                    dest.display()
                ));
                return Err(FontCtlError::DestinationConflict(dest));
            }
            self.diag.warn(&format!(
                "CopyFile: destination file exists and differs from source, overwriting it, source={}, dest={}",
                src.display(),
                dest.display()
            ));
            replacing = true;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let mut dest_file = options
            .open(&dest)
            .map_err(|e| FontCtlError::io("failed to create destination file", &dest, e))?;
        let bytes = io::copy(&mut src_file, &mut dest_file)
            .map_err(|e| FontCtlError::io("failed to copy file to", &dest, e))?;
        dest_file
            .sync_all()
            .map_err(|e| FontCtlError::io("failed to flush destination file", &dest, e))?;

        self.diag.info(&format!(
            "CopyFile: file copied, bytes written={bytes}, source={}, dest={}",
            src.display(),
            dest.display()
        ));

        let action = if replacing {
            CopyAction::Overwritten { bytes }
        } else {
            CopyAction::Copied { bytes }
        };
        Ok(CopyOutcome { path: dest, action })
    }
}

/// SHA-256 over the whole file.
pub fn file_digest(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_vec())
}

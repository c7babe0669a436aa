//! User-facing font operations
//!
//! Each operation is a fixed sequence of steps that stops at the first
//! failure. Nothing is rolled back, with two exceptions: uninstall keeps
//! going past unload/registry/broadcast failures, and a name query undoes
//! the load it had to do itself.

use std::fs;
use std::path::{Path, PathBuf};

use crate::copy::{file_digest, CopyAction, FileCopier};
use crate::diag::{self, SharedDiagnostics};
use crate::error::{FontCtlError, Result};
use crate::location::FontDirs;
use crate::registry::{FontRegistry, RegisterOutcome, RegistryBackend, Scope};
use crate::resource::{FontResources, FontTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub font_name: String,
    pub installed_path: PathBuf,
    pub copy: CopyAction,
    pub registry: RegisterOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub removed_path: PathBuf,
    /// Registry values deleted; empty if none matched or removal failed.
    pub registry_values: Vec<String>,
    /// Best-effort steps that failed.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UninstallOptions {
    /// Refuse to delete an installed file whose content differs from the
    /// given one.
    pub verify_content: bool,
}

pub struct FontManager<R, B> {
    table: FontTable<R>,
    registry: FontRegistry<B>,
    copier: FileCopier,
    dirs: FontDirs,
    diag: SharedDiagnostics,
}

impl<R: FontResources, B: RegistryBackend> FontManager<R, B> {
    pub fn new(resources: R, registry: B, dirs: FontDirs, diag: SharedDiagnostics) -> Self {
        Self {
            table: FontTable::new(resources, diag.clone()),
            registry: FontRegistry::new(registry, diag.clone()),
            copier: FileCopier::new(diag.clone()),
            dirs,
            diag,
        }
    }

    pub fn quiet(resources: R, registry: B, dirs: FontDirs) -> Self {
        Self::new(resources, registry, dirs, diag::noop())
    }

    /// Copy the font into the scope's font dir, load it, register it under
    /// its display name and tell running applications.
    pub fn install(&self, font: &Path, scope: Scope) -> Result<InstallReport> {
        self.diag
            .info(&format!("Using font file: '{}'", font.display()));
        ensure_font_file(font, &self.diag)?;

        let dest_dir = self.font_dir(scope, true)?;
        let copied = self.copier.copy(font, dest_dir, false)?;
        let dest = copied.path;

        match fs::metadata(&dest) {
            Ok(meta) if !meta.is_dir() => {}
            _ => {
                self.diag.error(&format!(
                    "Install: can't find destination font file after copy '{}'",
                    dest.display()
                ));
                return Err(FontCtlError::FileNotFound(dest));
            }
        }

        self.table.add_font(&dest)?;
        let font_name = self.table.query_font_name_with_type(&dest)?;
        let registry = self.registry.register_font(&font_name, &dest, scope)?;
        self.table.notify_font_change()?;

        Ok(InstallReport {
            font_name,
            installed_path: dest,
            copy: copied.action,
            registry,
        })
    }

    /// Remove an installed font, located by the file name of `font`.
    ///
    /// Only deleting the installed file is fatal; unloading, registry cleanup
    /// and the broadcast are attempted and merely reported when they fail.
    pub fn uninstall(
        &self,
        font: &Path,
        scope: Scope,
        options: UninstallOptions,
    ) -> Result<UninstallReport> {
        self.diag
            .info(&format!("Using font file: '{}'", font.display()));
        ensure_font_file(font, &self.diag)?;

        let dest_dir = self.font_dir(scope, false)?;
        let file_name = font
            .file_name()
            .ok_or_else(|| FontCtlError::FileNotFound(font.to_path_buf()))?;
        let dest = dest_dir.join(file_name);

        if options.verify_content {
            self.verify_same_content(font, &dest)?;
        }

        let mut warnings = Vec::new();

        if let Err(err) = self.table.remove_font(&dest) {
            warnings.push(self.best_effort("unload font from file", &dest, &err));
        }

        let registry_values = match self.registry.unregister_font(&dest, scope) {
            Ok(deleted) => deleted,
            Err(err) => {
                warnings.push(self.best_effort("find and remove font registry values", &dest, &err));
                Vec::new()
            }
        };

        fs::remove_file(&dest).map_err(|source| FontCtlError::UninstallIncomplete {
            path: dest.clone(),
            source,
        })?;

        if let Err(err) = self.table.notify_font_change() {
            warnings.push(self.best_effort("send WM_FONTCHANGE broadcast", &dest, &err));
        }

        Ok(UninstallReport {
            removed_path: dest,
            registry_values,
            warnings,
        })
    }

    /// Add the font to the session font table until unload or logoff.
    pub fn load(&self, font: &Path) -> Result<u32> {
        self.diag
            .info(&format!("Using font file: '{}'", font.display()));
        ensure_font_file(font, &self.diag)?;
        let count = self.table.add_font(font)?;
        self.table.notify_font_change()?;
        Ok(count)
    }

    pub fn unload(&self, font: &Path) -> Result<u32> {
        self.diag
            .info(&format!("Using font file: '{}'", font.display()));
        ensure_font_file(font, &self.diag)?;
        let count = self.table.remove_font(font)?;
        self.table.notify_font_change()?;
        Ok(count)
    }

    pub fn refresh(&self) -> Result<()> {
        self.table.notify_font_change()
    }

    /// Display name of a font file, loading it for the duration of the
    /// query if it is not loaded already.
    pub fn font_name(&self, font: &Path) -> Result<String> {
        self.diag
            .info(&format!("Using font file: '{}'", font.display()));
        ensure_font_file(font, &self.diag)?;

        match self.table.query_font_name_with_type(font) {
            Ok(name) => {
                self.diag.info("font loaded before: true");
                Ok(name)
            }
            Err(FontCtlError::InvalidOrNotLoaded(_)) => {
                self.diag.info("font loaded before: false");
                self.table.add_font(font)?;
                let name = self.table.query_font_name_with_type(font);
                let removed = self.table.remove_font(font);
                let name = name?;
                removed?;
                Ok(name)
            }
            Err(err) => Err(err),
        }
    }

    /// Resolve the scope's font dir. With `create`, a missing per-user dir
    /// is created; the machine dir must always exist already.
    fn font_dir(&self, scope: Scope, create: bool) -> Result<&Path> {
        let dir = self.dirs.for_scope(scope)?;
        self.diag
            .info(&format!("Using destination font dir '{}'", dir.display()));

        match fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(FontCtlError::NotADirectory(dir.to_path_buf())),
            Err(_) if create && scope == Scope::User => {
                fs::create_dir_all(dir)
                    .map_err(|e| FontCtlError::io("failed to create user font dir", dir, e))?;
                self.diag
                    .info(&format!("Created user font dir '{}'", dir.display()));
            }
            Err(_) => return Err(FontCtlError::FontDirMissing(dir.to_path_buf())),
        }

        Ok(dir)
    }

    fn verify_same_content(&self, font: &Path, installed: &Path) -> Result<()> {
        let theirs = file_digest(font)
            .map_err(|e| FontCtlError::io("could not hash source file", font, e))?;
        let ours = file_digest(installed)
            .map_err(|e| FontCtlError::io("could not hash installed file", installed, e))?;
        if theirs != ours {
            self.diag.error(&format!(
                "Uninstall: '{}' is not identical to '{}', uninstall aborted",
                font.display(),
                installed.display()
            ));
            return Err(FontCtlError::DestinationConflict(installed.to_path_buf()));
        }
        Ok(())
    }

    fn best_effort(&self, step: &str, dest: &Path, err: &FontCtlError) -> String {
        let message = format!(
            "failed to {step} during uninstall, this can be okay. fontfile={}, error={err}",
            dest.display()
        );
        self.diag.warn(&message);
        message
    }
}

/// The path must name an existing file, not a directory.
pub fn ensure_font_file(path: &Path, diag: &SharedDiagnostics) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => Ok(()),
        Ok(_) => {
            diag.error(&format!("'{}' is a directory", path.display()));
            Err(FontCtlError::FileNotFound(path.to_path_buf()))
        }
        Err(err) => {
            diag.error(&format!(
                "can't find or open file '{}', error={err}",
                path.display()
            ));
            Err(FontCtlError::FileNotFound(path.to_path_buf()))
        }
    }
}

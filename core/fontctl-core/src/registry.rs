//! Font registry reconciliation
//!
//! Windows keeps persistent fonts in a `name -> file` value list under a
//! well-known key, once per hive. Machine-wide entries hold a bare file name
//! (resolved against the system font dir), per-user entries hold a full path.

use std::fmt;
use std::path::Path;

use crate::diag::{self, SharedDiagnostics};
use crate::error::{FontCtlError, Result};

pub const FONTS_KEY_PATH: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Fonts";

/// Who a font is installed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Current user only, no elevation needed.
    User,
    /// Every user; needs elevated privileges.
    Machine,
}

impl Scope {
    pub fn from_systemwide(systemwide: bool) -> Self {
        if systemwide {
            Scope::Machine
        } else {
            Scope::User
        }
    }

    pub fn hive(&self) -> &'static str {
        match self {
            Scope::User => "HKEY_CURRENT_USER",
            Scope::Machine => "HKEY_LOCAL_MACHINE",
        }
    }

    /// Registry data stored for `font_file` in this scope.
    ///
    /// Paths that are not valid Unicode have no exact string form, so they
    /// are rejected rather than stored in a lossy form that would never match
    /// again on unregister.
    pub fn registry_value(&self, font_file: &Path) -> Result<String> {
        let value = match self {
            Scope::Machine => font_file.file_name().unwrap_or(font_file.as_os_str()),
            Scope::User => font_file.as_os_str(),
        };
        value
            .to_str()
            .map(str::to_string)
            .ok_or_else(|| FontCtlError::NonUnicodePath(font_file.to_path_buf()))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::User => f.write_str("user"),
            Scope::Machine => f.write_str("system"),
        }
    }
}

/// An open fonts key with read/write access.
pub trait FontsKey {
    fn value_names(&self) -> Result<Vec<String>>;
    /// String data of `name`; errors for missing or non-string values.
    fn string_value(&self, name: &str) -> Result<String>;
    fn set_string_value(&mut self, name: &str, value: &str) -> Result<()>;
    fn delete_value(&mut self, name: &str) -> Result<()>;
}

/// Opens the fonts key of a hive.
pub trait RegistryBackend {
    /// Fails with [`crate::FontCtlError::RegistryAccessDenied`] when the key
    /// cannot be opened for writing.
    fn open_fonts_key(&self, scope: Scope) -> Result<Box<dyn FontsKey + '_>>;
}

impl<T: RegistryBackend + ?Sized> RegistryBackend for &T {
    fn open_fonts_key(&self, scope: Scope) -> Result<Box<dyn FontsKey + '_>> {
        (**self).open_fonts_key(scope)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The file was already registered under `name`; nothing written.
    AlreadyRegistered { name: String },
    /// A new value `name` was written.
    Created { name: String },
}

pub struct FontRegistry<B> {
    backend: B,
    diag: SharedDiagnostics,
}

impl<B: RegistryBackend> FontRegistry<B> {
    pub fn new(backend: B, diag: SharedDiagnostics) -> Self {
        Self { backend, diag }
    }

    pub fn with_backend(backend: B) -> Self {
        Self::new(backend, diag::noop())
    }

    /// Make `font_file` persist under `font_name`.
    ///
    /// A file that is already registered under any name is left alone. When
    /// `font_name` is taken by another file, the first free `"{font_name} (N)"`
    /// is used instead and the existing value is kept.
    pub fn register_font(
        &self,
        font_name: &str,
        font_file: &Path,
        scope: Scope,
    ) -> Result<RegisterOutcome> {
        let target = scope.registry_value(font_file)?;
        let mut key = self.backend.open_fonts_key(scope)?;
        let names = key.value_names()?;

        for name in &names {
            if let Ok(value) = key.string_value(name) {
                if eq_fold(&value, &target) {
                    self.diag.warn(&format!(
                        "CreateFontRegistryKey: font file '{target}' is already registered under key '{name}'"
                    ));
                    return Ok(RegisterOutcome::AlreadyRegistered { name: name.clone() });
                }
            }
        }

        let mut new_name = font_name.to_string();
        for name in names.iter().filter(|n| eq_fold(n, font_name)) {
            let Ok(existing) = key.string_value(name) else {
                continue;
            };
            if eq_fold(&existing, &target) {
                return Ok(RegisterOutcome::AlreadyRegistered { name: name.clone() });
            }
            new_name = disambiguate(font_name, &names);
            self.diag.warn(&format!(
                "CreateFontRegistryKey: font name '{font_name}' already exists with a different file, using key name '{new_name}'"
            ));
            break;
        }

        key.set_string_value(&new_name, &target)?;
        self.diag.info(&format!(
            "CreateFontRegistryKey: registered '{new_name}' -> '{target}' in {}",
            scope.hive()
        ));
        Ok(RegisterOutcome::Created { name: new_name })
    }

    /// Delete every value pointing at `font_file`; returns the deleted names.
    /// Finding nothing is not an error.
    pub fn unregister_font(&self, font_file: &Path, scope: Scope) -> Result<Vec<String>> {
        let target = scope.registry_value(font_file)?;
        let mut key = self.backend.open_fonts_key(scope)?;
        let names = key.value_names()?;

        let mut deleted = Vec::new();
        for name in names {
            let matches = key
                .string_value(&name)
                .map(|value| eq_fold(&value, &target))
                .unwrap_or(false);
            if matches {
                key.delete_value(&name)?;
                self.diag.warn(&format!(
                    "Deleted registry value '{name}' that pointed to '{target}'"
                ));
                deleted.push(name);
            }
        }

        if deleted.is_empty() {
            self.diag.warn(&format!(
                "RemoveFontRegistryKeys: no registry values found for font file '{target}'"
            ));
        }

        Ok(deleted)
    }
}

/// Case-insensitive comparison the way the registry sees names.
pub fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// First `"{base} (N)"`, N >= 1, not present in `taken`.
pub fn disambiguate(base: &str, taken: &[String]) -> String {
    let mut index = 1u32;
    loop {
        let candidate = format!("{base} ({index})");
        if !taken.iter().any(|n| eq_fold(n, &candidate)) {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn machine_scope_keeps_only_file_name() {
        let path = PathBuf::from("/fonts/dir/Arial.ttf");
        assert_eq!(Scope::Machine.registry_value(&path).unwrap(), "Arial.ttf");
        assert_eq!(
            Scope::User.registry_value(&path).unwrap(),
            "/fonts/dir/Arial.ttf"
        );
    }

    #[test]
    fn fold_ignores_case_beyond_ascii() {
        assert!(eq_fold("ÉCOLE.TTF", "école.ttf"));
        assert!(eq_fold("Arial", "ARIAL"));
        assert!(!eq_fold("Arial", "Arial "));
    }

    #[test]
    fn disambiguate_skips_taken_suffixes() {
        let taken = vec![
            "Arial".to_string(),
            "arial (1)".to_string(),
            "ARIAL (2)".to_string(),
            "Arial (4)".to_string(),
        ];
        assert_eq!(disambiguate("Arial", &taken), "Arial (3)");
        assert_eq!(disambiguate("Mono", &taken), "Mono (1)");
    }

    #[test]
    fn scope_from_flag() {
        assert_eq!(Scope::from_systemwide(true), Scope::Machine);
        assert_eq!(Scope::from_systemwide(false), Scope::User);
        assert_eq!(Scope::Machine.to_string(), "system");
    }
}

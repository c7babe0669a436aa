//! Where installed font files live

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{FontCtlError, Result};
use crate::registry::Scope;

pub const SYSTEM_FONT_DIR_ENV: &str = "FONTCTL_SYSTEM_FONT_DIR";
pub const USER_FONT_DIR_ENV: &str = "FONTCTL_USER_FONT_DIR";

/// Machine-wide and per-user font directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontDirs {
    pub system: Option<PathBuf>,
    pub user: Option<PathBuf>,
}

impl FontDirs {
    pub fn new(system: impl Into<PathBuf>, user: impl Into<PathBuf>) -> Self {
        Self {
            system: Some(system.into()),
            user: Some(user.into()),
        }
    }

    /// `%SYSTEMROOT%\Fonts` and `%LOCALAPPDATA%\Microsoft\Windows\Fonts`,
    /// unless overridden by `FONTCTL_SYSTEM_FONT_DIR` / `FONTCTL_USER_FONT_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var_os(key), dirs::data_local_dir())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<OsString>,
        local_app_data: Option<PathBuf>,
    ) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let system = non_empty(SYSTEM_FONT_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                non_empty("SYSTEMROOT")
                    .or_else(|| non_empty("WINDIR"))
                    .map(|root| PathBuf::from(root).join("Fonts"))
            });

        let user = non_empty(USER_FONT_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                non_empty("LOCALAPPDATA")
                    .map(PathBuf::from)
                    .or(local_app_data)
                    .map(|base| base.join("Microsoft").join("Windows").join("Fonts"))
            });

        Self { system, user }
    }

    pub fn for_scope(&self, scope: Scope) -> Result<&Path> {
        let dir = match scope {
            Scope::Machine => self.system.as_deref(),
            Scope::User => self.user.as_deref(),
        };
        dir.ok_or(FontCtlError::FontDirUnknown(match scope {
            Scope::Machine => "system",
            Scope::User => "user",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn windows_layout_from_environment() {
        let dirs = FontDirs::from_lookup(
            lookup(&[("SYSTEMROOT", "C:/Windows"), ("LOCALAPPDATA", "C:/Users/me/AppData/Local")]),
            None,
        );
        assert_eq!(dirs.system, Some(PathBuf::from("C:/Windows").join("Fonts")));
        assert_eq!(
            dirs.user,
            Some(
                PathBuf::from("C:/Users/me/AppData/Local")
                    .join("Microsoft")
                    .join("Windows")
                    .join("Fonts")
            )
        );
    }

    #[test]
    fn overrides_win_and_windir_is_a_fallback() {
        let dirs = FontDirs::from_lookup(
            lookup(&[
                ("WINDIR", "D:/Win"),
                (USER_FONT_DIR_ENV, "/tmp/user-fonts"),
                ("LOCALAPPDATA", "ignored"),
            ]),
            None,
        );
        assert_eq!(dirs.system, Some(PathBuf::from("D:/Win").join("Fonts")));
        assert_eq!(dirs.user, Some(PathBuf::from("/tmp/user-fonts")));
    }

    #[test]
    fn local_app_data_falls_back_to_known_folder() {
        let dirs = FontDirs::from_lookup(lookup(&[]), Some(PathBuf::from("/home/me/.local/share")));
        assert!(dirs.system.is_none());
        assert!(dirs
            .user
            .as_deref()
            .is_some_and(|p| p.ends_with("Microsoft/Windows/Fonts")));
        assert!(matches!(
            dirs.for_scope(Scope::Machine),
            Err(FontCtlError::FontDirUnknown("system"))
        ));
    }
}

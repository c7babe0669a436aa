//! In-memory font table and registry
//!
//! Behave like their native counterparts closely enough to drive the whole
//! install/uninstall pipeline without touching the OS.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{
    FontCtlError, Result, ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_INVALID_DATA,
};
use crate::registry::{eq_fold, FontsKey, RegistryBackend, Scope, FONTS_KEY_PATH};
use crate::resource::{answer_info, encode_utf16z, FontResources, NativeError, ResourceInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFace {
    pub description: String,
    pub outline: bool,
}

/// Session font table keyed by path, with faces looked up by file name.
///
/// Faces are declared up front with [`MemoryFontTable::with_face`]; adding a
/// file whose name was never declared fails like a malformed font would.
#[derive(Debug, Default)]
pub struct MemoryFontTable {
    faces: HashMap<String, MemoryFace>,
    loaded: RefCell<BTreeMap<PathBuf, u32>>,
    broadcasts: Cell<usize>,
    fail_broadcast: Cell<bool>,
    fail_type_query: Cell<bool>,
}

impl MemoryFontTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_face(mut self, file_name: &str, description: &str, outline: bool) -> Self {
        self.faces.insert(
            file_name.to_ascii_lowercase(),
            MemoryFace {
                description: description.to_string(),
                outline,
            },
        );
        self
    }

    /// Paths currently in the table with their reference counts.
    pub fn loaded(&self) -> BTreeMap<PathBuf, u32> {
        self.loaded.borrow().clone()
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.borrow().contains_key(path)
    }

    pub fn broadcasts(&self) -> usize {
        self.broadcasts.get()
    }

    pub fn fail_broadcasts(&self, fail: bool) {
        self.fail_broadcast.set(fail);
    }

    pub fn fail_type_queries(&self, fail: bool) {
        self.fail_type_query.set(fail);
    }

    fn face(&self, path: &Path) -> Option<&MemoryFace> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        self.faces.get(&name)
    }
}

impl FontResources for MemoryFontTable {
    fn add_resource(&self, path: &Path) -> Result<u32, NativeError> {
        if !path.is_file() {
            return Err(NativeError::new(0, ERROR_FILE_NOT_FOUND));
        }
        if self.face(path).is_none() {
            return Err(NativeError::new(0, ERROR_INVALID_DATA));
        }
        *self
            .loaded
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_insert(0) += 1;
        Ok(1)
    }

    fn remove_resource(&self, path: &Path) -> Result<u32, NativeError> {
        let mut loaded = self.loaded.borrow_mut();
        match loaded.get_mut(path) {
            Some(count) if *count > 1 => {
                *count -= 1;
                Ok(1)
            }
            Some(_) => {
                loaded.remove(path);
                Ok(1)
            }
            None => Err(NativeError::new(0, ERROR_FILE_NOT_FOUND)),
        }
    }

    fn resource_info(
        &self,
        path: &Path,
        info: ResourceInfo,
        buf: &mut [u8],
    ) -> Result<u32, NativeError> {
        if !self.is_loaded(path) {
            return Err(NativeError::new(0, 0));
        }
        let face = self
            .face(path)
            .ok_or(NativeError::new(0, ERROR_INVALID_DATA))?;
        match info {
            ResourceInfo::Description => Ok(answer_info(&encode_utf16z(&face.description), buf)),
            ResourceInfo::FontType => {
                if self.fail_type_query.get() {
                    return Err(NativeError::new(0, ERROR_INVALID_DATA));
                }
                Ok(answer_info(&u32::from(face.outline).to_le_bytes(), buf))
            }
        }
    }

    fn broadcast_font_change(&self) -> Result<(), NativeError> {
        if self.fail_broadcast.get() {
            return Err(NativeError::new(0, ERROR_ACCESS_DENIED));
        }
        self.broadcasts.set(self.broadcasts.get() + 1);
        Ok(())
    }
}

/// Both font hives as ordered value lists.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    hives: RefCell<HashMap<Scope, Vec<(String, String)>>>,
    denied: RefCell<HashSet<Scope>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to open `scope`, as a non-elevated process sees HKLM.
    pub fn deny(&self, scope: Scope) {
        self.denied.borrow_mut().insert(scope);
    }

    pub fn insert(&self, scope: Scope, name: &str, value: &str) {
        set_value(
            self.hives.borrow_mut().entry(scope).or_default(),
            name,
            value,
        );
    }

    pub fn values(&self, scope: Scope) -> Vec<(String, String)> {
        self.hives
            .borrow()
            .get(&scope)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, scope: Scope, name: &str) -> Option<String> {
        self.hives.borrow().get(&scope).and_then(|values| {
            values
                .iter()
                .find(|(n, _)| eq_fold(n, name))
                .map(|(_, v)| v.clone())
        })
    }
}

fn set_value(values: &mut Vec<(String, String)>, name: &str, value: &str) {
    match values.iter_mut().find(|(n, _)| eq_fold(n, name)) {
        Some(entry) => entry.1 = value.to_string(),
        None => values.push((name.to_string(), value.to_string())),
    }
}

impl RegistryBackend for MemoryRegistry {
    fn open_fonts_key(&self, scope: Scope) -> Result<Box<dyn FontsKey + '_>> {
        if self.denied.borrow().contains(&scope) {
            return Err(FontCtlError::RegistryAccessDenied {
                key: format!(r"{}\{FONTS_KEY_PATH}", scope.hive()),
                native: ERROR_ACCESS_DENIED,
            });
        }
        Ok(Box::new(MemoryFontsKey {
            registry: self,
            scope,
        }))
    }
}

struct MemoryFontsKey<'a> {
    registry: &'a MemoryRegistry,
    scope: Scope,
}

impl FontsKey for MemoryFontsKey<'_> {
    fn value_names(&self) -> Result<Vec<String>> {
        Ok(self
            .registry
            .values(self.scope)
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn string_value(&self, name: &str) -> Result<String> {
        self.registry
            .get(self.scope, name)
            .ok_or_else(|| FontCtlError::Registry {
                op: "read",
                name: name.to_string(),
                native: ERROR_FILE_NOT_FOUND,
            })
    }

    fn set_string_value(&mut self, name: &str, value: &str) -> Result<()> {
        self.registry.insert(self.scope, name, value);
        Ok(())
    }

    fn delete_value(&mut self, name: &str) -> Result<()> {
        let mut hives = self.registry.hives.borrow_mut();
        let values = hives.entry(self.scope).or_default();
        let before = values.len();
        values.retain(|(n, _)| !eq_fold(n, name));
        if values.len() == before {
            return Err(FontCtlError::Registry {
                op: "delete",
                name: name.to_string(),
                native: ERROR_FILE_NOT_FOUND,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn font_table_counts_references() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("Sans.ttf");
        fs::write(&path, b"\0\x01\0\0").expect("write");
        let table = MemoryFontTable::new().with_face("sans.ttf", "Sans", true);

        table.add_resource(&path).expect("first add");
        table.add_resource(&path).expect("second add");
        table.remove_resource(&path).expect("first remove");
        assert!(table.is_loaded(&path));
        table.remove_resource(&path).expect("second remove");
        assert!(!table.is_loaded(&path));
        assert!(table.remove_resource(&path).is_err());
    }

    #[test]
    fn unknown_faces_are_rejected() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("Junk.ttf");
        fs::write(&path, b"junk").expect("write");

        let err = MemoryFontTable::new().add_resource(&path).unwrap_err();
        assert_eq!(err.native, ERROR_INVALID_DATA);
    }

    #[test]
    fn registry_names_are_case_insensitive() {
        let registry = MemoryRegistry::new();
        registry.insert(Scope::User, "Arial", "a.ttf");
        registry.insert(Scope::User, "ARIAL", "b.ttf");

        assert_eq!(registry.values(Scope::User).len(), 1);
        assert_eq!(registry.get(Scope::User, "arial").as_deref(), Some("b.ttf"));
        assert!(registry.values(Scope::Machine).is_empty());
    }

    #[test]
    fn denied_scope_cannot_be_opened() {
        let registry = MemoryRegistry::new();
        registry.deny(Scope::Machine);

        assert!(matches!(
            registry.open_fonts_key(Scope::Machine),
            Err(FontCtlError::RegistryAccessDenied { .. })
        ));
        assert!(registry.open_fonts_key(Scope::User).is_ok());
    }
}

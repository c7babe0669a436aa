//! Portable font table backed by the font files themselves
//!
//! Keeps a process-local list of added files and answers description and
//! type queries by parsing the `name` table with read-fonts, the same
//! strings GDI reports. Used where no native font table is available.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use read_fonts::tables::name::NameId;
use read_fonts::types::Tag;
use read_fonts::{FontRef, TableProvider};

use crate::error::{ERROR_FILE_NOT_FOUND, ERROR_INVALID_DATA};
use crate::resource::{answer_info, encode_utf16z, FontResources, NativeError, ResourceInfo};

/// English (United States), the language GDI prefers for descriptions.
const LANG_EN_US: u16 = 0x0409;
const PLATFORM_WINDOWS: u16 = 3;

#[derive(Debug, Default)]
pub struct FileFontTable {
    loaded: RefCell<HashMap<PathBuf, u32>>,
}

impl FileFontTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.borrow().contains_key(path)
    }
}

impl FontResources for FileFontTable {
    fn add_resource(&self, path: &Path) -> Result<u32, NativeError> {
        let data = read(path)?;
        let faces = FontRef::fonts(&data).filter(Result::is_ok).count();
        if faces == 0 {
            return Err(NativeError::new(0, ERROR_INVALID_DATA));
        }
        *self
            .loaded
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_insert(0) += 1;
        Ok(faces as u32)
    }

    fn remove_resource(&self, path: &Path) -> Result<u32, NativeError> {
        let mut loaded = self.loaded.borrow_mut();
        match loaded.get(path).copied() {
            Some(count) if count > 1 => {
                loaded.insert(path.to_path_buf(), count - 1);
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
        if !self.loaded.borrow().contains_key(path) {
            return Err(NativeError::new(0, 0));
        }
        let data = read(path)?;
        match info {
            ResourceInfo::Description => {
                let description = describe(&data).unwrap_or_default();
                if description.is_empty() {
                    return Ok(0);
                }
                Ok(answer_info(&encode_utf16z(&description), buf))
            }
            ResourceInfo::FontType => {
                let outline = u32::from(is_outline(&data));
                Ok(answer_info(&outline.to_le_bytes(), buf))
            }
        }
    }

    fn broadcast_font_change(&self) -> Result<(), NativeError> {
        // Nobody else can see a process-local table.
        Ok(())
    }
}

fn read(path: &Path) -> Result<Vec<u8>, NativeError> {
    fs::read(path).map_err(|_| NativeError::new(0, ERROR_FILE_NOT_FOUND))
}

/// Full names of every face in the file, joined with `" & "` for collections.
pub fn describe(data: &[u8]) -> Option<String> {
    let names: Vec<String> = FontRef::fonts(data)
        .filter_map(Result::ok)
        .filter_map(|font| full_name(&font))
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(" & "))
    }
}

fn full_name(font: &FontRef) -> Option<String> {
    let name_table = font.name().ok()?;
    let data = name_table.string_data();

    let mut best: Option<(u8, String)> = None;
    for record in name_table.name_record() {
        if record.name_id() != NameId::FULL_NAME || !record.is_unicode() {
            continue;
        }
        let Ok(entry) = record.string(data) else {
            continue;
        };
        let rendered = entry.to_string().trim().to_string();
        if rendered.is_empty() {
            continue;
        }
        let rank = match (record.platform_id(), record.language_id()) {
            (PLATFORM_WINDOWS, LANG_EN_US) => 0,
            (PLATFORM_WINDOWS, _) => 1,
            _ => 2,
        };
        if best.as_ref().map_or(true, |(r, _)| rank < *r) {
            best = Some((rank, rendered));
        }
    }

    best.map(|(_, name)| name)
}

/// True when any face carries TrueType or CFF outlines.
pub fn is_outline(data: &[u8]) -> bool {
    let outline_tags = [Tag::new(b"glyf"), Tag::new(b"CFF "), Tag::new(b"CFF2")];
    FontRef::fonts(data).filter_map(Result::ok).any(|font| {
        font.table_directory
            .table_records()
            .iter()
            .any(|rec| outline_tags.contains(&rec.tag()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_not_a_font() {
        assert_eq!(describe(b"definitely not a font"), None);
        assert!(!is_outline(b"definitely not a font"));
    }

    #[test]
    fn unknown_files_are_not_loaded() {
        let table = FileFontTable::new();
        let err = table
            .resource_info(Path::new("/nope.ttf"), ResourceInfo::Description, &mut [])
            .unwrap_err();
        assert!(err.is_not_loaded());
        assert!(table.remove_resource(Path::new("/nope.ttf")).is_err());
    }
}

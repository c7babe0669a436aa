#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Smallest sfnt read-fonts accepts: a `name` table with one Windows
/// English full-name record, plus an empty `glyf` table for outline fonts.
pub fn minimal_font(full_name: &str, outline: bool) -> Vec<u8> {
    let string: Vec<u8> = full_name
        .encode_utf16()
        .flat_map(u16::to_be_bytes)
        .collect();

    let mut name = Vec::new();
    // version, count, storage offset
    for v in [0u16, 1, 6 + 12] {
        name.extend(v.to_be_bytes());
    }
    // platform, encoding, language, name id, length, offset
    for v in [3u16, 1, 0x0409, 4, string.len() as u16, 0] {
        name.extend(v.to_be_bytes());
    }
    name.extend(&string);

    let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![(*b"name", name)];
    if outline {
        tables.push((*b"glyf", vec![0; 4]));
    }
    tables.sort_by_key(|(tag, _)| *tag);

    let count = tables.len() as u16;
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = 16u16 << entry_selector;

    let mut out = Vec::new();
    out.extend(0x0001_0000u32.to_be_bytes());
    out.extend(count.to_be_bytes());
    out.extend(search_range.to_be_bytes());
    out.extend(entry_selector.to_be_bytes());
    out.extend((count * 16 - search_range).to_be_bytes());

    let mut offset = 12 + 16 * tables.len() as u32;
    let mut body = Vec::new();
    for (tag, data) in &tables {
        out.extend(tag);
        out.extend(0u32.to_be_bytes());
        out.extend(offset.to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());

        let mut padded = data.clone();
        padded.resize(data.len().div_ceil(4) * 4, 0);
        offset += padded.len() as u32;
        body.extend(padded);
    }
    out.extend(body);
    out
}

/// Scratch area with a source dir and both font dirs.
pub struct Sandbox {
    pub tmp: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(tmp.path().join("src")).expect("mkdir src");
        Self { tmp }
    }

    pub fn src(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.tmp.path().join("src").join(name);
        fs::write(&path, content).expect("write source font");
        path
    }

    pub fn system_dir(&self) -> PathBuf {
        self.tmp.path().join("Windows").join("Fonts")
    }

    pub fn user_dir(&self) -> PathBuf {
        self.tmp.path().join("LocalAppData").join("Fonts")
    }

    pub fn dirs(&self) -> fontctl_core::FontDirs {
        fontctl_core::FontDirs::new(self.system_dir(), self.user_dir())
    }

    pub fn with_system_dir(self) -> Self {
        fs::create_dir_all(self.system_dir()).expect("mkdir system fonts");
        self
    }

    pub fn with_user_dir(self) -> Self {
        fs::create_dir_all(self.user_dir()).expect("mkdir user fonts");
        self
    }
}

pub fn read(path: &Path) -> Vec<u8> {
    fs::read(path).expect("read file")
}

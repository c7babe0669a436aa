//! Font previews

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;

/// Preview window size in pixels.
pub const WINDOW_SIZE: (i32, i32) = (750, 400);
/// Sample text point size.
pub const SAMPLE_POINTS: i32 = 18;

pub const SAMPLE_LINES: [&str; 3] = [
    "The quick brown fox jumps over the lazy dog. 1234567890",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    pub fn weight(self) -> i32 {
        if self.is_bold() {
            700
        } else {
            400
        }
    }
}

/// Top-left corner that centers a window of `size` on a screen of `screen`,
/// clamped so the title bar stays visible on small screens.
pub fn centered_origin(screen: (i32, i32), size: (i32, i32)) -> (i32, i32) {
    (
        ((screen.0 - size.0) / 2).max(0),
        ((screen.1 - size.1) / 2).max(0),
    )
}

/// Sample text with the line breaks an edit control expects.
pub fn sample_text() -> String {
    SAMPLE_LINES.join("\r\n")
}

/// `%SYSTEMROOT%\System32\fontview.exe`
pub fn fontview_exe() -> Option<PathBuf> {
    env::var_os("SYSTEMROOT")
        .or_else(|| env::var_os("WINDIR"))
        .filter(|root| !root.is_empty())
        .map(|root| PathBuf::from(root).join("System32").join("fontview.exe"))
}

/// Open the file in Windows Font Viewer without waiting for it to close.
pub fn preview_file(font: &Path) -> Result<()> {
    match std::fs::metadata(font) {
        Ok(meta) if !meta.is_dir() => {}
        _ => return Err(anyhow!("can't find or open file '{}'", font.display())),
    }

    let viewer = fontview_exe().ok_or_else(|| anyhow!("can't locate fontview.exe"))?;
    if !cfg!(windows) {
        return Err(anyhow!("previewing font files needs Windows Font Viewer"));
    }

    log::info!(target: "fontctl", "launching {} {}", viewer.display(), font.display());
    std::process::Command::new(&viewer)
        .arg(font)
        .spawn()
        .with_context(|| format!("failed to start {}", viewer.display()))?;
    Ok(())
}

/// Show sample text in an installed font until the window is closed.
///
/// Windows substitutes a default face for names it does not know, so the
/// window may not show the requested font.
#[cfg(windows)]
pub fn preview_font(face: &str, style: FontStyle) -> Result<()> {
    crate::window::show(face, style).context("preview window failed")
}

#[cfg(not(windows))]
pub fn preview_font(_face: &str, _style: FontStyle) -> Result<()> {
    Err(anyhow!("previewing installed fonts needs a Windows desktop"))
}

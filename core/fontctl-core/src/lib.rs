//! fontctl-core: install fonts the way Windows expects them
//!
//! A font counts as installed when three things agree: the file sits in a
//! font directory, the session font table has it loaded, and the fonts
//! registry key maps its display name to the file so it comes back after a
//! reboot. This crate keeps those three in step.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use fontctl_core::{FontDirs, FontManager, Scope};
//! use fontctl_core::memory::{MemoryFontTable, MemoryRegistry};
//!
//! let table = MemoryFontTable::new().with_face("demo.ttf", "Demo Regular", true);
//! let registry = MemoryRegistry::new();
//! let manager = FontManager::quiet(&table, &registry, FontDirs::from_env());
//!
//! let report = manager.install(Path::new("demo.ttf"), Scope::User)?;
//! println!("installed {} as {}", report.installed_path.display(), report.font_name);
//! # Ok::<(), fontctl_core::FontCtlError>(())
//! ```
//!
//! The pieces, leaves first:
//!
//! - [`copy`]: content-aware copy into a font directory
//! - [`resource`]: session font table and the font-change broadcast
//! - [`registry`]: the persistent `name -> file` registry values
//! - [`manager`]: install, uninstall, load, unload and name queries
//!
//! Native Windows backends live in `native`; [`memory`] and `metadata`
//! provide portable stand-ins.

pub mod copy;
pub mod diag;
pub mod error;
pub mod location;
pub mod manager;
pub mod memory;
#[cfg(feature = "fontations")]
pub mod metadata;
#[cfg(windows)]
pub mod native;
pub mod registry;
pub mod resource;

pub use diag::{Diagnostics, LogDiagnostics, NoopDiagnostics, SharedDiagnostics};
pub use error::{FontCtlError, Result};
pub use location::FontDirs;
pub use manager::{FontManager, InstallReport, UninstallOptions, UninstallReport};
pub use registry::{RegisterOutcome, Scope};

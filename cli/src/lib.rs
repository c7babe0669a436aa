//! fontctl CLI: install, uninstall and inspect fonts on MS Windows

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueHint};

use fontctl_core::diag::{self, LogDiagnostics, SharedDiagnostics};
use fontctl_core::{FontDirs, FontManager, RegisterOutcome, Scope, UninstallOptions};

mod preview;
#[cfg(windows)]
mod window;

pub use preview::FontStyle;

#[cfg(windows)]
type PlatformManager =
    FontManager<fontctl_core::native::GdiFontTable, fontctl_core::native::WindowsRegistry>;

#[cfg(not(windows))]
type PlatformManager =
    FontManager<fontctl_core::metadata::FileFontTable, fontctl_core::memory::MemoryRegistry>;

/// CLI entrypoint for fontctl.
#[derive(Debug, Parser)]
#[command(
    name = "fontctl",
    version,
    about = "Install or uninstall a font on MS Windows"
)]
pub struct Cli {
    /// Print diagnostics while running
    #[arg(short = 'd', long = "debug", global = true, action = ArgAction::SetTrue)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Copy a font into the font dir, register it and notify applications
    Install(ScopedFileArgs),
    /// Unload, unregister and delete an installed font
    Uninstall(UninstallArgs),
    /// Print the display name Windows uses for a font file
    Getname(FileArgs),
    /// Load a font for the current session only
    Load(FileArgs),
    /// Remove a font from the current session
    Unload(FileArgs),
    /// Tell running applications that the set of fonts changed
    Refresh,
    /// Preview a font file or an installed font
    #[command(subcommand)]
    Preview(PreviewCommand),
    /// Print the command reference as Markdown
    #[command(hide = true)]
    Mddocs,
}

#[derive(Debug, Args)]
struct FileArgs {
    /// Font file (.ttf, .otf, .ttc, .fon)
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,
}

#[derive(Debug, Args)]
struct ScopedFileArgs {
    #[command(flatten)]
    font: FileArgs,

    /// Use the machine-wide font dir and registry (needs admin rights)
    #[arg(short = 's', long = "systemwide", action = ArgAction::SetTrue)]
    systemwide: bool,
}

#[derive(Debug, Args)]
struct UninstallArgs {
    #[command(flatten)]
    target: ScopedFileArgs,

    /// Refuse to delete an installed file whose content differs from FILE
    #[arg(long = "verify", action = ArgAction::SetTrue)]
    verify: bool,
}

#[derive(Debug, Subcommand)]
enum PreviewCommand {
    /// Open a font file in Windows Font Viewer
    File(FileArgs),
    /// Show sample text in an installed font
    Font(FontPreviewArgs),
}

#[derive(Debug, Args)]
struct FontPreviewArgs {
    /// Font face name, e.g. "Segoe UI"
    name: String,

    /// Style to render
    #[arg(value_enum, ignore_case = true)]
    style: FontStyle,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(usage_exit_code(&err));
        }
    };
    let diag = init_diagnostics(cli.debug);

    match cli.command {
        Command::Install(args) => run_install(args, diag),
        Command::Uninstall(args) => run_uninstall(args, diag, cli.debug),
        Command::Getname(args) => run_getname(&args.file, diag),
        Command::Load(args) => run_load(&args.file, diag),
        Command::Unload(args) => run_unload(&args.file, diag),
        Command::Refresh => run_refresh(diag),
        Command::Preview(PreviewCommand::File(args)) => preview::preview_file(&args.file),
        Command::Preview(PreviewCommand::Font(args)) => {
            preview::preview_font(&args.name, args.style)
        }
        Command::Mddocs => {
            print!("{}", markdown_docs()?);
            Ok(())
        }
    }
}

/// Help and version requests succeed; every other parse failure exits 1.
fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn init_diagnostics(debug: bool) -> SharedDiagnostics {
    if !debug {
        return diag::noop();
    }
    let env = env_logger::Env::default().default_filter_or("fontctl=info");
    // A logger may already be installed when embedded; keep using it.
    let _ = env_logger::Builder::from_env(env).try_init();
    Arc::new(LogDiagnostics)
}

#[cfg(windows)]
fn platform_manager(diag: SharedDiagnostics) -> PlatformManager {
    use fontctl_core::native::{GdiFontTable, WindowsRegistry};

    FontManager::new(GdiFontTable, WindowsRegistry, FontDirs::from_env(), diag)
}

#[cfg(not(windows))]
fn platform_manager(diag: SharedDiagnostics) -> PlatformManager {
    use fontctl_core::memory::MemoryRegistry;
    use fontctl_core::metadata::FileFontTable;

    FontManager::new(
        FileFontTable::new(),
        MemoryRegistry::new(),
        FontDirs::from_env(),
        diag,
    )
}

/// Everything but `getname` changes system state that only exists on Windows.
fn require_windows(command: &str) -> Result<()> {
    if cfg!(windows) {
        Ok(())
    } else {
        bail!("'{command}' only works on MS Windows")
    }
}

fn run_install(args: ScopedFileArgs, diag: SharedDiagnostics) -> Result<()> {
    require_windows("install")?;
    let scope = Scope::from_systemwide(args.systemwide);
    let report = platform_manager(diag)
        .install(&args.font.file, scope)
        .with_context(|| format!("install of '{}' failed", args.font.file.display()))?;

    let name = match &report.registry {
        RegisterOutcome::AlreadyRegistered { name } | RegisterOutcome::Created { name } => name,
    };
    println!(
        "Installed '{}' ({scope}) as '{name}'",
        report.installed_path.display()
    );
    Ok(())
}

fn run_uninstall(args: UninstallArgs, diag: SharedDiagnostics, debug: bool) -> Result<()> {
    require_windows("uninstall")?;
    let file = &args.target.font.file;
    let scope = Scope::from_systemwide(args.target.systemwide);
    let options = UninstallOptions {
        verify_content: args.verify,
    };
    let report = platform_manager(diag)
        .uninstall(file, scope, options)
        .with_context(|| format!("uninstall of '{}' failed", file.display()))?;

    // With --debug the warnings were already logged.
    if !debug {
        for warning in &report.warnings {
            eprintln!("Warning - {warning}");
        }
    }
    println!("Uninstalled '{}' ({scope})", report.removed_path.display());
    Ok(())
}

fn run_getname(file: &Path, diag: SharedDiagnostics) -> Result<()> {
    let name = platform_manager(diag).font_name(file)?;
    println!("{name}");
    Ok(())
}

fn run_load(file: &Path, diag: SharedDiagnostics) -> Result<()> {
    require_windows("load")?;
    let count = platform_manager(diag).load(file)?;
    println!("Loaded {count} font(s) from '{}'", file.display());
    Ok(())
}

fn run_unload(file: &Path, diag: SharedDiagnostics) -> Result<()> {
    require_windows("unload")?;
    platform_manager(diag).unload(file)?;
    println!("Unloaded '{}'", file.display());
    Ok(())
}

fn run_refresh(diag: SharedDiagnostics) -> Result<()> {
    require_windows("refresh")?;
    platform_manager(diag).refresh()?;
    println!("Font change broadcast sent");
    Ok(())
}

/// Markdown reference for every visible command.
fn markdown_docs() -> Result<String> {
    let cli = Cli::command();
    let mut out = String::new();
    write_command_docs(&mut out, &cli, &[], 1).context("failed to render docs")?;
    Ok(out)
}

fn write_command_docs<'a>(
    out: &mut String,
    cmd: &'a clap::Command,
    parents: &[&'a str],
    depth: usize,
) -> fmt::Result {
    if cmd.is_hide_set() {
        return Ok(());
    }

    let mut path = parents.to_vec();
    path.push(cmd.get_name());
    writeln!(out, "{} {}\n", "#".repeat(depth.min(6)), path.join(" "))?;

    if let Some(about) = cmd.get_about() {
        writeln!(out, "{about}\n")?;
    }

    let args: Vec<_> = cmd
        .get_arguments()
        .filter(|arg| !arg.is_hide_set())
        .collect();
    if !args.is_empty() {
        writeln!(out, "| Argument | Description |\n|---|---|")?;
        for arg in args {
            let mut names = Vec::new();
            if let Some(short) = arg.get_short() {
                names.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                names.push(format!("--{long}"));
            }
            if names.is_empty() {
                names.push(format!("<{}>", arg.get_id().as_str().to_uppercase()));
            }

            let mut help = arg.get_help().map(ToString::to_string).unwrap_or_default();
            if arg.get_action().takes_values() {
                let values: Vec<_> = arg
                    .get_possible_values()
                    .iter()
                    .filter(|value| !value.is_hide_set())
                    .map(|value| value.get_name().to_string())
                    .collect();
                if !values.is_empty() {
                    write!(help, " (one of: {})", values.join(", "))?;
                }
            }
            writeln!(out, "| `{}` | {} |", names.join(", "), help.trim())?;
        }
        writeln!(out)?;
    }

    for sub in cmd.get_subcommands() {
        write_command_docs(out, sub, &path, depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;

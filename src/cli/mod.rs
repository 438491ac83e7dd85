//! The sutra-fmt Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser;
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::args::{Command, FmtArgs, LayoutOptions};
use crate::config::FormatConfig;
use crate::rules::default_registry;
use crate::{err_msg, format_named, logging, syntax, FormatError};

pub mod args;
pub mod output;

/// File extensions picked up when walking a directory.
pub const SOURCE_EXTENSIONS: &[&str] = &["rkt", "scm", "ss", "sexp", "sutra"];

const STDIN_NAME: &str = "<stdin>";

/// The main entry point for the CLI.
pub fn run() {
    let args = FmtArgs::parse();
    logging::init(args.verbose);

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Format {
            paths,
            layout,
            write,
        } => handle_format(&paths, &layout, write),
        Command::Check { paths, layout } => handle_check(&paths, &layout),
        Command::Tree { file } => handle_tree(&file),
        Command::ListRules => {
            output::print_rules(default_registry());
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            output::print_error(e);
            process::exit(1);
        }
    }
}

// ============================================================================
// SUBCOMMAND HANDLERS
// ============================================================================

/// Formats stdin or every source file under `paths`. Returns false if any
/// file failed; the failures have already been reported.
fn handle_format(paths: &[PathBuf], layout: &LayoutOptions, write: bool) -> Result<bool, FormatError> {
    if paths.is_empty() {
        let source = read_stdin()?;
        let config = resolve_config(layout, Path::new("."))?;
        print!("{}", format_named(STDIN_NAME, &source, default_registry(), &config)?);
        return Ok(true);
    }

    let mut ok = true;
    for file in collect_files(paths)? {
        match format_file(&file, layout) {
            Ok((source, formatted)) if write => {
                if source != formatted {
                    fs::write(&file, &formatted).map_err(|e| FormatError::io(file.display(), e))?;
                    debug!(file = %file.display(), "rewrote");
                }
            }
            Ok((_, formatted)) => print!("{}", formatted),
            Err(e) => {
                output::print_error(e);
                ok = false;
            }
        }
    }
    Ok(ok)
}

/// Prints a diff for every file that is not formatted. Returns false if any
/// file would change or could not be formatted.
fn handle_check(paths: &[PathBuf], layout: &LayoutOptions) -> Result<bool, FormatError> {
    if paths.is_empty() {
        let source = read_stdin()?;
        let config = resolve_config(layout, Path::new("."))?;
        let formatted = format_named(STDIN_NAME, &source, default_registry(), &config)?;
        if source == formatted {
            return Ok(true);
        }
        output::print_diff(Path::new(STDIN_NAME), &source, &formatted);
        return Ok(false);
    }

    let mut clean = true;
    for file in collect_files(paths)? {
        match format_file(&file, layout) {
            Ok((source, formatted)) if source != formatted => {
                output::print_diff(&file, &source, &formatted);
                clean = false;
            }
            Ok(_) => debug!(file = %file.display(), "already formatted"),
            Err(e) => {
                output::print_error(e);
                clean = false;
            }
        }
    }
    Ok(clean)
}

fn handle_tree(file: &Path) -> Result<bool, FormatError> {
    let source = read_source(file)?;
    let nodes = syntax::parse_named(&file.display().to_string(), &source)?;
    output::print_tree(&nodes);
    Ok(true)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Reads and formats one file, returning the original and formatted text.
fn format_file(file: &Path, layout: &LayoutOptions) -> Result<(String, String), FormatError> {
    debug!(file = %file.display(), "formatting");
    let source = read_source(file)?;
    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    let config = resolve_config(layout, dir)?;
    let formatted = format_named(&file.display().to_string(), &source, default_registry(), &config)?;
    Ok((source, formatted))
}

/// The configuration for files in `dir`: an explicit `--config` file or the
/// nearest discovered one, with `--width` applied on top.
pub fn resolve_config(layout: &LayoutOptions, dir: &Path) -> Result<FormatConfig, FormatError> {
    let mut config = match &layout.config {
        Some(path) => FormatConfig::load(path)?,
        None => FormatConfig::discover(dir)?,
    };
    if let Some(width) = layout.width {
        if width == 0 {
            return Err(err_msg!(Config, "--width must be at least 1"));
        }
        config.width = width;
    }
    Ok(config)
}

/// Expands directories into the source files below them, in sorted order.
/// Paths naming files are kept whatever their extension.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, FormatError> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry.map_err(|e| err_msg!(Io, "failed to walk {}: {}", path.display(), e))?;
            if entry.file_type().is_file() && is_source_file(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn read_source(file: &Path) -> Result<String, FormatError> {
    fs::read_to_string(file).map_err(|e| FormatError::io(file.display(), e))
}

fn read_stdin() -> Result<String, FormatError> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| FormatError::io(STDIN_NAME, e))?;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_extensions_are_collected() {
        assert!(is_source_file(Path::new("a/b.scm")));
        assert!(is_source_file(Path::new("b.sutra")));
        assert!(!is_source_file(Path::new("b.rs")));
        assert!(!is_source_file(Path::new("Makefile")));
    }

    #[test]
    fn width_flag_overrides_defaults() {
        let layout = LayoutOptions {
            width: Some(40),
            config: None,
        };
        let dir = std::env::temp_dir();
        let config = resolve_config(&layout, &dir).unwrap();
        assert_eq!(config.width, 40);

        let zero = LayoutOptions {
            width: Some(0),
            config: None,
        };
        assert!(resolve_config(&zero, &dir).is_err());
    }
}

//! # Golden File Loader
//!
//! A golden case is a source file `name.sexp` next to `name.expected`, the
//! exact output `format_str` must produce for it. A first line of the form
//! `; width: N` sets the page width for that case; it is a comment, so the
//! formatter itself drops it.

use std::path::{Path, PathBuf};

use sutra_fmt::config::FormatConfig;
use walkdir::WalkDir;

/// One input/expected-output pair.
#[derive(Debug, Clone)]
pub struct GoldenCase {
    pub path: PathBuf,
    pub source: String,
    pub expected: String,
    pub config: FormatConfig,
}

/// Loads every golden case under `dir`, sorted by path.
pub fn load_golden_cases(dir: &Path) -> Vec<GoldenCase> {
    let mut cases: Vec<GoldenCase> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.path().extension().map_or(false, |ext| ext == "sexp"))
        .map(|e| load_case(e.path()))
        .collect();
    cases.sort_by(|a, b| a.path.cmp(&b.path));
    cases
}

fn load_case(path: &Path) -> GoldenCase {
    let source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read golden input '{}': {e}", path.display()));
    let expected_path = path.with_extension("expected");
    let expected = std::fs::read_to_string(&expected_path)
        .unwrap_or_else(|e| panic!("missing golden output '{}': {e}", expected_path.display()));
    let config = width_directive(&source)
        .map(FormatConfig::with_width)
        .unwrap_or_default();
    GoldenCase {
        path: path.to_path_buf(),
        source,
        expected,
        config,
    }
}

fn width_directive(source: &str) -> Option<usize> {
    source
        .lines()
        .next()?
        .strip_prefix("; width:")?
        .trim()
        .parse()
        .ok()
}

// Golden files: every `tests/golden/*.sexp` must format to its `.expected`.

mod common;

use std::path::Path;

use pretty_assertions::assert_eq;
use sutra_fmt::format_str;

#[test]
fn golden_files_format_as_expected() {
    let cases = common::load_golden_cases(Path::new("tests/golden"));
    assert!(!cases.is_empty(), "no golden cases found");

    for case in cases {
        let actual = format_str(&case.source, &case.config)
            .unwrap_or_else(|e| panic!("{}: {e}", case.path.display()));
        assert_eq!(actual, case.expected, "{}", case.path.display());
    }
}

#[test]
fn golden_outputs_are_fixed_points() {
    for case in common::load_golden_cases(Path::new("tests/golden")) {
        let again = format_str(&case.expected, &case.config).unwrap();
        assert_eq!(again, case.expected, "{}", case.path.display());
    }
}

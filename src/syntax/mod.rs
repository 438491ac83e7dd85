//! Reader: source text to [`Node`](crate::ast::Node) trees.

pub mod parser;

pub use parser::{abbreviation_form, parse, parse_named};

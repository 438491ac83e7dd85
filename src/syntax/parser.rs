//! sutra-fmt reader
//!
//! Converts source text into `Node` trees with byte spans. The reader is purely
//! syntactic: comments are discarded, all three bracket styles produce plain
//! lists, and reader abbreviations (`'x`, `` `x ``, `,x`, `,@x`) become the
//! two-element forms they stand for.

use pest::{error::InputLocation, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::ast::{make_list, make_node, make_symbol, Expr, Node, Span};
use crate::diagnostics::{to_error_source, SourceArc};
use crate::{err_ctx, FormatError};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct SexpParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse source text into top-level nodes.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::syntax::parse;
/// let nodes = parse("(+ 1 2) x").unwrap();
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[0].len(), 3);
/// ```
pub fn parse(source_text: &str) -> Result<Vec<Node>, FormatError> {
    parse_named("input", source_text)
}

/// Parse source text, naming it `name` in diagnostics.
pub fn parse_named(name: &str, source_text: &str) -> Result<Vec<Node>, FormatError> {
    let source = to_error_source(name, source_text);

    let mut pairs = SexpParser::parse(Rule::program, source_text)
        .map_err(|e| convert_parse_error(e, &source))?;

    let program = pairs.next().ok_or_else(|| {
        err_ctx!(Parse, "empty parse tree", &source, Span::default())
    })?;

    program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| build_node(p, &source))
        .collect()
}

/// The list an abbreviation prefix expands to, e.g. `'` to `quote`.
pub fn abbreviation_form(prefix: &str) -> Option<&'static str> {
    match prefix {
        "'" => Some("quote"),
        "`" => Some("quasiquote"),
        "," => Some("unquote"),
        ",@" => Some("unquote-splicing"),
        _ => None,
    }
}

// ============================================================================
// AST BUILDERS
// ============================================================================

fn build_node(pair: Pair<Rule>, source: &SourceArc) -> Result<Node, FormatError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::list => {
            let children = pair
                .into_inner()
                .map(|p| build_node(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(make_list(children, span))
        }

        Rule::abbrev => {
            let mut inner = pair.into_inner();
            let (prefix, operand) = match (inner.next(), inner.next()) {
                (Some(prefix), Some(operand)) => (prefix, operand),
                _ => {
                    return Err(err_ctx!(
                        Parse,
                        "expected an expression after the quote prefix",
                        source,
                        span
                    ))
                }
            };
            let prefix_span = get_span(&prefix);
            let head = abbreviation_form(prefix.as_str()).ok_or_else(|| {
                err_ctx!(Parse, format!("unknown reader prefix '{}'", prefix.as_str()), source, prefix_span)
            })?;
            let operand = build_node(operand, source)?;
            Ok(make_list(vec![make_symbol(head, prefix_span), operand], span))
        }

        Rule::string => {
            let raw = pair
                .into_inner()
                .next()
                .map(|inner| inner.as_str())
                .unwrap_or_default();
            let content = unescape_string(raw, span, source)?;
            Ok(make_node(Expr::String(content), span))
        }

        Rule::boolean => {
            let value = match pair.as_str() {
                "#t" | "#true" => true,
                "#f" | "#false" => false,
                text => {
                    return Err(err_ctx!(
                        Parse,
                        format!("invalid boolean literal '{}'", text),
                        source,
                        span
                    ))
                }
            };
            Ok(make_node(Expr::Bool(value), span))
        }

        Rule::keyword => {
            let name = pair.as_str().trim_start_matches("#:");
            Ok(make_node(Expr::Keyword(name.to_string()), span))
        }

        Rule::number => Ok(make_node(Expr::Number(pair.as_str().to_string()), span)),

        Rule::symbol => Ok(make_symbol(pair.as_str(), span)),

        rule => Err(err_ctx!(
            Parse,
            format!("unexpected grammar rule {:?}", rule),
            source,
            span
        )),
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

fn unescape_string(raw: &str, span: Span, source: &SourceArc) -> Result<String, FormatError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                return Err(err_ctx!(
                    Parse,
                    format!("unknown escape sequence '\\{}'", other),
                    source,
                    span,
                    "supported escapes are \\n, \\t, \\r, \\\\ and \\\""
                ))
            }
            None => {
                return Err(err_ctx!(Parse, "string ends with a lone backslash", source, span))
            }
        }
    }
    Ok(out)
}

fn convert_parse_error(error: pest::error::Error<Rule>, source: &SourceArc) -> FormatError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    let message = error.variant.message().to_string();
    err_ctx!(Parse, message, source, span, "check for unbalanced brackets or quotes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(src: &str) -> Node {
        let mut nodes = parse(src).expect("parse should succeed");
        assert_eq!(nodes.len(), 1, "expected one node from {:?}", src);
        nodes.remove(0)
    }

    #[test]
    fn parses_atoms() {
        assert_eq!(*parse_one("hello").value, Expr::Symbol("hello".into()));
        assert_eq!(*parse_one("42").value, Expr::Number("42".into()));
        assert_eq!(*parse_one("-3.5e2").value, Expr::Number("-3.5e2".into()));
        assert_eq!(*parse_one("\"hi\"").value, Expr::String("hi".into()));
        assert_eq!(*parse_one("#t").value, Expr::Bool(true));
        assert_eq!(*parse_one("#false").value, Expr::Bool(false));
        assert_eq!(*parse_one("#:hello").value, Expr::Keyword("hello".into()));
    }

    #[test]
    fn symbols_that_look_numeric() {
        assert_eq!(*parse_one("+").value, Expr::Symbol("+".into()));
        assert_eq!(*parse_one("1/2").value, Expr::Symbol("1/2".into()));
        assert_eq!(*parse_one("list->vector").value, Expr::Symbol("list->vector".into()));
    }

    #[test]
    fn bracket_styles_are_equivalent() {
        let round = parse_one("(a b)");
        let square = parse_one("[a b]");
        let curly = parse_one("{a b}");
        assert_eq!(round.value, square.value);
        assert_eq!(round.value, curly.value);
    }

    #[test]
    fn abbreviations_desugar() {
        assert_eq!(parse_one("'x").value.pretty(), "(quote x)");
        assert_eq!(parse_one("`(a ,b ,@c)").value.pretty(), "(quasiquote (a (unquote b) (unquote-splicing c)))");
    }

    #[test]
    fn comments_are_skipped() {
        let nodes = parse("; leading\n(a #| inner #| nested |# |# b) ; trailing").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].value.pretty(), "(a b)");
    }

    #[test]
    fn string_escapes_round_trip_through_atom_text() {
        let node = parse_one(r#""say \"hi\"\n""#);
        assert_eq!(*node.value, Expr::String("say \"hi\"\n".into()));
        assert_eq!(node.value.atom_text().unwrap(), r#""say \"hi\"\n""#);
    }

    #[test]
    fn spans_cover_source_text() {
        let node = parse_one("  (f x)");
        assert_eq!(node.span, Span::new(2, 7));
        assert_eq!(node.child(1).map(|c| c.span), Some(Span::new(5, 6)));
    }

    #[test]
    fn unbalanced_input_is_a_parse_error() {
        for src in ["(+ 1", "(a]", ")", "\"open"] {
            let err = parse(src).unwrap_err();
            assert_eq!(err.error_type(), crate::diagnostics::ErrorType::Parse, "{}", src);
        }
    }

    #[test]
    fn unknown_escape_is_rejected() {
        let err = parse(r#""\q""#).unwrap_err();
        assert!(err.message().contains("unknown escape"));
    }

    #[test]
    fn empty_input_has_no_nodes() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  ; only a comment\n").unwrap().is_empty());
    }
}

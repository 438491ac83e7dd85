//! Width-constrained rendering of documents.
//!
//! The renderer walks a work-list of pending documents. At every alternation
//! it lays out each branch in turn on a scratch layout and keeps the first one
//! whose lines all fit the page width, where the line a branch ends on must
//! also leave room for the text that follows it up to the next forced break.
//! If no branch fits, the last one is used.
//!
//! Indentation is written lazily, when the first text of a line arrives, so
//! rendered lines never end in whitespace.

use std::collections::HashMap;

use unicode_width::UnicodeWidthStr;

use super::{Alternatives, Doc, DocKind};

/// Renders `doc` for a page `width` columns wide.
///
/// # Examples
///
/// ```rust
/// use sutra_fmt::doc::{render, Doc};
/// let doc = Doc::concat(vec![Doc::text("(let "), Doc::align(Doc::literal("a\nb")), Doc::text(")")]);
/// assert_eq!(render(&doc, 80), "(let a\n     b)");
/// ```
pub fn render(doc: &Doc, width: usize) -> String {
    let mut measure = Measure::new(width);
    let mut layout = Layout::new(width, 0, None, false);
    // Unchecked layouts never report overflow.
    let _ = layout.run(vec![Step::Doc { indent: 0, doc }], 0, &mut measure);
    layout.finish()
}

#[derive(Clone, Copy)]
enum Step<'d> {
    Doc { indent: usize, doc: &'d Doc },
    Break { indent: usize },
}

/// A checked layout ran past the page width.
struct Overflow;

struct Layout {
    width: usize,
    lines: Vec<String>,
    current: String,
    col: usize,
    pending: Option<usize>,
    checked: bool,
}

impl Layout {
    fn new(width: usize, col: usize, pending: Option<usize>, checked: bool) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: String::new(),
            col,
            pending,
            checked,
        }
    }

    /// Lays out the work-list; `trailing` is the width of the text that follows
    /// everything in `stack` on its last line.
    fn run<'d>(
        &mut self,
        mut stack: Vec<Step<'d>>,
        trailing: usize,
        measure: &mut Measure,
    ) -> Result<(), Overflow> {
        while let Some(step) = stack.pop() {
            let (indent, doc) = match step {
                Step::Break { indent } => {
                    self.newline(indent);
                    continue;
                }
                Step::Doc { indent, doc } => (indent, doc),
            };
            match doc.kind() {
                DocKind::Text(s) => {
                    self.write(s);
                    if self.checked && self.col > self.width {
                        return Err(Overflow);
                    }
                }
                DocKind::Concat(docs) => {
                    stack.extend(docs.iter().rev().map(|doc| Step::Doc { indent, doc }));
                }
                DocKind::VConcat(docs) => {
                    for (i, doc) in docs.iter().enumerate().rev() {
                        stack.push(Step::Doc { indent, doc });
                        if i > 0 {
                            stack.push(Step::Break { indent });
                        }
                    }
                }
                DocKind::Align(inner) => stack.push(Step::Doc {
                    indent: self.col,
                    doc: inner,
                }),
                DocKind::Nest(columns, inner) => stack.push(Step::Doc {
                    indent: indent + columns,
                    doc: inner,
                }),
                DocKind::Alt(choices) => {
                    let after = measure.trailing(&stack, trailing);
                    self.choose(choices, indent, after, measure)?;
                }
            }
        }
        Ok(())
    }

    fn choose(
        &mut self,
        choices: &Alternatives<Doc>,
        indent: usize,
        after: usize,
        measure: &mut Measure,
    ) -> Result<(), Overflow> {
        let Some((last, preferred)) = choices.as_slice().split_last() else {
            return Ok(());
        };
        for choice in preferred {
            let mut trial = Layout::new(self.width, self.col, self.pending, true);
            let fits = trial
                .run(vec![Step::Doc { indent, doc: choice }], after, measure)
                .is_ok()
                && trial.col + after <= self.width;
            if fits {
                self.absorb(trial);
                return Ok(());
            }
        }
        self.run(vec![Step::Doc { indent, doc: last }], after, measure)
    }

    /// Splices a finished trial layout onto the current line.
    fn absorb(&mut self, trial: Layout) {
        let Layout {
            lines,
            current,
            col,
            pending,
            ..
        } = trial;
        let mut fragments = lines.into_iter().chain(std::iter::once(current));
        if let Some(first) = fragments.next() {
            self.current.push_str(&first);
        }
        for line in fragments {
            let done = std::mem::replace(&mut self.current, line);
            self.lines.push(done);
        }
        self.col = col;
        self.pending = pending;
    }

    fn newline(&mut self, indent: usize) {
        let done = std::mem::take(&mut self.current);
        self.lines.push(done);
        self.pending = Some(indent);
        self.col = indent;
    }

    fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if let Some(indent) = self.pending.take() {
            self.current.extend(std::iter::repeat(' ').take(indent));
        }
        self.current.push_str(s);
        self.col += UnicodeWidthStr::width(s);
    }

    fn finish(mut self) -> String {
        self.lines.push(self.current);
        self.lines.join("\n")
    }
}

/// First-line widths, memoised per document for one render.
///
/// Widths saturate at one column past the page, which fails every fit test
/// just as the exact width would.
struct Measure {
    limit: usize,
    first_lines: HashMap<*const DocKind, (usize, bool)>,
}

impl Measure {
    fn new(width: usize) -> Self {
        Self {
            limit: width.saturating_add(1),
            first_lines: HashMap::new(),
        }
    }

    /// Width of the text that follows on the current line, up to the next
    /// forced break. Alternations count their narrowest first line.
    fn trailing(&mut self, stack: &[Step<'_>], outer: usize) -> usize {
        let mut total = 0;
        for step in stack.iter().rev() {
            if total >= self.limit {
                return self.limit;
            }
            match step {
                Step::Break { .. } => return total,
                Step::Doc { doc, .. } => {
                    let (width, breaks) = self.first_line(doc);
                    total = (total + width).min(self.limit);
                    if breaks {
                        return total;
                    }
                }
            }
        }
        (total + outer).min(self.limit)
    }

    /// Width of the first line of `doc` and whether a forced break ends it.
    fn first_line(&mut self, doc: &Doc) -> (usize, bool) {
        let key: *const DocKind = doc.kind();
        if let Some(&measured) = self.first_lines.get(&key) {
            return measured;
        }
        let measured = match doc.kind() {
            DocKind::Text(s) => (UnicodeWidthStr::width(s.as_str()).min(self.limit), false),
            DocKind::Concat(docs) => {
                let mut total = 0;
                let mut breaks = false;
                for d in docs {
                    let (width, ends) = self.first_line(d);
                    total = (total + width).min(self.limit);
                    if ends {
                        breaks = true;
                        break;
                    }
                    if total >= self.limit {
                        break;
                    }
                }
                (total, breaks)
            }
            DocKind::VConcat(docs) => match docs.first() {
                None => (0, false),
                Some(first) => {
                    let (width, breaks) = self.first_line(first);
                    (width, breaks || docs.len() > 1)
                }
            },
            DocKind::Align(inner) | DocKind::Nest(_, inner) => self.first_line(inner),
            DocKind::Alt(choices) => {
                let mut narrowest: Option<(usize, bool)> = None;
                for choice in choices {
                    let measured = self.first_line(choice);
                    if narrowest.map_or(true, |(width, _)| measured.0 < width) {
                        narrowest = Some(measured);
                    }
                    if measured.0 == 0 {
                        break;
                    }
                }
                narrowest.unwrap_or((0, false))
            }
        };
        self.first_lines.insert(key, measured);
        measured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(choices: Vec<Doc>) -> Doc {
        Doc::alt(Alternatives::from(choices))
    }

    #[test]
    fn renders_text_and_breaks() {
        let doc = Doc::vconcat(vec![Doc::text("a"), Doc::text("b")]);
        assert_eq!(render(&doc, 80), "a\nb");
    }

    #[test]
    fn nest_indents_relative_to_enclosing_level() {
        let doc = Doc::concat(vec![
            Doc::text("(define (f x)"),
            Doc::nest(2, Doc::concat(vec![Doc::literal("\n"), Doc::text("x")])),
            Doc::text(")"),
        ]);
        assert_eq!(render(&doc, 80), "(define (f x)\n  x)");
    }

    #[test]
    fn align_indents_to_current_column() {
        let doc = Doc::concat(vec![Doc::text("(+ "), Doc::align(Doc::literal("1\n2")), Doc::text(")")]);
        assert_eq!(render(&doc, 80), "(+ 1\n   2)");
    }

    #[test]
    fn first_fitting_alternative_wins() {
        let doc = alt(vec![Doc::text("aaaa"), Doc::text("bb"), Doc::text("c")]);
        assert_eq!(render(&doc, 10), "aaaa");
        assert_eq!(render(&doc, 3), "bb");
        assert_eq!(render(&doc, 1), "c");
    }

    #[test]
    fn falls_back_to_last_alternative() {
        let doc = alt(vec![Doc::text("aaaa"), Doc::text("bbbb")]);
        assert_eq!(render(&doc, 2), "bbbb");
    }

    #[test]
    fn every_line_of_an_alternative_must_fit() {
        let tall_but_wide = Doc::literal("a\nbbbbbbbb");
        let doc = alt(vec![tall_but_wide, Doc::literal("a\nbb\nbb")]);
        assert_eq!(render(&doc, 4), "a\nbb\nbb");
    }

    #[test]
    fn text_after_an_alternation_counts() {
        let doc = Doc::concat(vec![alt(vec![Doc::text("xxxx"), Doc::literal("x\nx")]), Doc::text(")))")]);
        assert_eq!(render(&doc, 6), "x\nx)))");
        assert_eq!(render(&doc, 7), "xxxx)))");
    }

    #[test]
    fn no_trailing_whitespace_on_blank_lines() {
        let doc = Doc::nest(4, Doc::literal("a\n\nb"));
        assert_eq!(render(&doc, 80), "a\n\n    b");
    }

    #[test]
    fn wide_characters_take_two_columns() {
        let doc = alt(vec![Doc::text("日本語"), Doc::text("x")]);
        assert_eq!(render(&doc, 5), "x");
        assert_eq!(render(&doc, 6), "日本語");
    }

    #[test]
    fn first_line_widths_saturate_past_the_page() {
        let long = Doc::concat(vec![Doc::text("abc"), Doc::text("defgh"), Doc::literal("\nz")]);
        let tall = Doc::literal("ab\ncdefgh");
        let choice = alt(vec![Doc::text("abcdef"), Doc::literal("a\nbcdef")]);
        let mut measure = Measure::new(4);
        assert_eq!(measure.first_line(&long), (5, false));
        assert_eq!(measure.first_line(&tall), (2, true));
        assert_eq!(measure.first_line(&choice), (1, true));
    }

    #[test]
    fn long_chains_of_alternations_render() {
        // Every alternation sees the whole remaining chain as trailing text.
        let mut doc = Doc::text("end");
        for _ in 0..2000 {
            doc = Doc::concat(vec![alt(vec![Doc::text("aa"), Doc::text("b")]), doc]);
        }
        let out = render(&doc, 10);
        assert!(out.ends_with("end"));
        assert_eq!(out.len(), 2000 + 3);
    }

    #[test]
    fn empty_alternation_renders_nothing() {
        let doc = Doc::concat(vec![Doc::text("a"), Doc::alt(Alternatives::new()), Doc::text("b")]);
        assert_eq!(render(&doc, 80), "ab");
    }
}

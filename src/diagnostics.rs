//! Unified, `miette`-based diagnostics for sutra-fmt.
//!
//! Every failure the reader, the formatting pipeline, the configuration layer
//! or the CLI can produce is a [`FormatError`]. Errors are built with the
//! `err_msg!`, `err_at!` and `err_ctx!` macros:
//!
//! - `err_msg!(Registry, "rule '{}' is already registered", name)` for
//!   message-only errors.
//! - `err_at!(NoApplicableRule, span, "no rule matches {}", what)` when only a
//!   span is known (the formatter never sees source text).
//! - `err_ctx!(Parse, message, src, span)` / `err_ctx!(Parse, message, src, span, help)`
//!   when both the source and a span are at hand.
//!
//! Source text can be attached after the fact with [`FormatError::with_source`],
//! which is how the CLI turns a resolver failure into a caret diagnostic.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::ast::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification, one per [`FormatError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed source text: unbalanced delimiters, bad escapes.
    Parse,
    /// Neither normal nor fallback rules match a node.
    NoApplicableRule,
    /// Every layout of a subform that must stay on one line breaks.
    FlattenUnsatisfiable,
    /// A rule tried to build an invalid partial format.
    MalformedRuleOutput,
    /// Registry misuse such as duplicate rule names.
    Registry,
    /// Tree nesting deeper than the resolver accepts.
    RecursionLimit,
    /// Invalid or unreadable configuration.
    Config,
    /// Filesystem or stream failures.
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "parse",
            ErrorType::NoApplicableRule => "no_applicable_rule",
            ErrorType::FlattenUnsatisfiable => "flatten_unsatisfiable",
            ErrorType::MalformedRuleOutput => "malformed_rule_output",
            ErrorType::Registry => "registry",
            ErrorType::RecursionLimit => "recursion_limit",
            ErrorType::Config => "config",
            ErrorType::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The source the span points into (if known).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_span(span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::default()
        }
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

/// Unified error type for every sutra-fmt failure mode.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("No applicable rule: {message}")]
    NoApplicableRule {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Cannot flatten: {message}")]
    FlattenUnsatisfiable {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Malformed rule output: {message}")]
    MalformedRuleOutput {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Registry error: {message}")]
    Registry {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Recursion limit: {message}")]
    RecursionLimit {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl FormatError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            FormatError::Parse { ctx, .. }
            | FormatError::NoApplicableRule { ctx, .. }
            | FormatError::FlattenUnsatisfiable { ctx, .. }
            | FormatError::MalformedRuleOutput { ctx, .. }
            | FormatError::Registry { ctx, .. }
            | FormatError::RecursionLimit { ctx, .. }
            | FormatError::Config { ctx, .. }
            | FormatError::Io { ctx, .. } => ctx,
        }
    }

    fn get_ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            FormatError::Parse { ctx, .. }
            | FormatError::NoApplicableRule { ctx, .. }
            | FormatError::FlattenUnsatisfiable { ctx, .. }
            | FormatError::MalformedRuleOutput { ctx, .. }
            | FormatError::Registry { ctx, .. }
            | FormatError::RecursionLimit { ctx, .. }
            | FormatError::Config { ctx, .. }
            | FormatError::Io { ctx, .. } => ctx,
        }
    }

    /// The bare message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            FormatError::Parse { message, .. }
            | FormatError::NoApplicableRule { message, .. }
            | FormatError::FlattenUnsatisfiable { message, .. }
            | FormatError::MalformedRuleOutput { message, .. }
            | FormatError::Registry { message, .. }
            | FormatError::RecursionLimit { message, .. }
            | FormatError::Config { message, .. }
            | FormatError::Io { message, .. } => message,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            FormatError::Parse { .. } => ErrorType::Parse,
            FormatError::NoApplicableRule { .. } => ErrorType::NoApplicableRule,
            FormatError::FlattenUnsatisfiable { .. } => ErrorType::FlattenUnsatisfiable,
            FormatError::MalformedRuleOutput { .. } => ErrorType::MalformedRuleOutput,
            FormatError::Registry { .. } => ErrorType::Registry,
            FormatError::RecursionLimit { .. } => ErrorType::RecursionLimit,
            FormatError::Config { .. } => ErrorType::Config,
            FormatError::Io { .. } => ErrorType::Io,
        }
    }

    /// The primary span, if the error points at a node.
    pub fn span(&self) -> Option<Span> {
        self.get_ctx().span
    }

    /// Attaches source text unless the error already carries some.
    pub fn with_source(mut self, source: SourceArc) -> Self {
        let ctx = self.get_ctx_mut();
        if ctx.source.is_none() {
            ctx.source = Some(source);
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.get_ctx_mut().help = Some(help.into());
        self
    }

    /// A copy of this error for reporting it a second time. The underlying
    /// cause, if any, stays with the original.
    pub fn replay(&self) -> Self {
        let old = self.get_ctx();
        let ctx = ErrorContext {
            source: old.source.clone(),
            span: old.span,
            help: old.help.clone(),
        };
        let message = self.message().to_string();
        let source = None;
        match self.error_type() {
            ErrorType::Parse => FormatError::Parse { message, ctx, source },
            ErrorType::NoApplicableRule => FormatError::NoApplicableRule { message, ctx, source },
            ErrorType::FlattenUnsatisfiable => FormatError::FlattenUnsatisfiable { message, ctx, source },
            ErrorType::MalformedRuleOutput => FormatError::MalformedRuleOutput { message, ctx, source },
            ErrorType::Registry => FormatError::Registry { message, ctx, source },
            ErrorType::RecursionLimit => FormatError::RecursionLimit { message, ctx, source },
            ErrorType::Config => FormatError::Config { message, ctx, source },
            ErrorType::Io => FormatError::Io { message, ctx, source },
        }
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(path: impl std::fmt::Display, err: std::io::Error) -> Self {
        FormatError::Io {
            message: format!("{}: {}", path, err),
            ctx: ErrorContext::none(),
            source: Some(Box::new(err)),
        }
    }
}

impl Diagnostic for FormatError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("sutra_fmt::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        // A label without source text cannot be rendered.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let len = span.len().max(1);
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a source string into a named source for error contexts.
pub fn to_error_source(name: impl AsRef<str>, source: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(
        name.as_ref(),
        source.as_ref().to_string(),
    ))
}

/// Constructs a `FormatError` variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($fmt:tt)+) => {
        $crate::FormatError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a `FormatError` variant pointing at a span, without source text.
#[macro_export]
macro_rules! err_at {
    ($variant:ident, $span:expr, $($fmt:tt)+) => {
        $crate::FormatError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::with_span($span),
            source: None,
        }
    };
}

/// Constructs a `FormatError` variant with source, span and optional help.
#[macro_export]
macro_rules! err_ctx {
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::FormatError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
            source: None,
        }
    };
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::FormatError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::SourceArc::clone($src),
                $span,
            ),
            source: None,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_msg_builds_variant_without_context() {
        let err = crate::err_msg!(Registry, "rule '{}' is already registered", "atom");
        assert_eq!(err.error_type(), ErrorType::Registry);
        assert_eq!(err.message(), "rule 'atom' is already registered");
        assert!(err.span().is_none());
        assert!(err.labels().is_none());
    }

    #[test]
    fn labels_need_source_text() {
        let err = crate::err_at!(NoApplicableRule, Span::new(1, 4), "no rule for {}", "x");
        assert!(err.labels().is_none());

        let err = err.with_source(to_error_source("input", "(abc)"));
        let labels: Vec<_> = err.labels().map(|l| l.collect()).unwrap_or_default();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 1);
        assert_eq!(labels[0].len(), 3);
    }

    #[test]
    fn replay_keeps_kind_span_and_help() {
        let err = crate::err_at!(NoApplicableRule, Span::new(2, 3), "no rule for {}", "y")
            .with_help("register one");
        let again = err.replay();
        assert_eq!(again.error_type(), ErrorType::NoApplicableRule);
        assert_eq!(again.span(), Some(Span::new(2, 3)));
        assert_eq!(again.message(), "no rule for y");
        assert_eq!(again.help().map(|h| h.to_string()).as_deref(), Some("register one"));
    }

    #[test]
    fn diagnostic_code_names_the_kind() {
        let src = to_error_source("input", "(");
        let err = crate::err_ctx!(Parse, "unclosed list", &src, Span::new(0, 1), "add a ')'");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("sutra_fmt::parse"));
        assert_eq!(err.help().map(|h| h.to_string()).as_deref(), Some("add a ')'"));
    }
}

use std::cmp::max;
use std::fmt;

use crate::types::span::Span;

/// A convenient type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while analysing, translating or rendering a
/// document.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A value that is not a node was found where a node was expected.
    StructuralType,
    /// A non-empty body was supplied to a void tag.
    VoidBody,
    /// A node's indentation does not extend its parent's, or a node was
    /// rendered before its indentation was made relative.
    MalformedIndent,
    /// A name could not be resolved in scope or in the environment.
    UndefinedSymbol,
    /// A pop or reset below the bottom of a stack, or a write into the
    /// read-only trunk of a stack branch.
    StackUnderflow,
    /// An expression evaluated to a value of the wrong type, or a hypertag
    /// was called with arguments that do not fit its parameters.
    Type,
    /// A module path is unknown to the environment.
    Import,
    /// A value formatter failed.
    Format,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: None,
        }
    }

    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::StructuralType, msg)
    }

    pub(crate) fn void_body(name: &str) -> Self {
        Self::new(
            ErrorKind::VoidBody,
            format!("void tag `{name}` must not have a body"),
        )
    }

    pub(crate) fn malformed_indent(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedIndent, msg)
    }

    pub(crate) fn undefined(symbol: &str) -> Self {
        Self::new(
            ErrorKind::UndefinedSymbol,
            format!("undefined symbol `{symbol}`"),
        )
    }

    pub(crate) fn underflow(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::StackUnderflow, msg)
    }

    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, msg)
    }

    pub(crate) fn import(path: &str) -> Self {
        Self::new(ErrorKind::Import, format!("unknown module path `{path}`"))
    }

    pub(crate) fn format(err: crate::fmt::Error) -> Self {
        Self::new(ErrorKind::Format, err.to_string())
    }

    /// Attaches a location in the template source to the error.
    ///
    /// Errors that already carry a location keep it, so the innermost
    /// location wins. Nothing is attached when the source is empty, which is
    /// the case for templates built by hand.
    pub(crate) fn with_span(mut self, source: &str, span: Span) -> Self {
        if self.span.is_none() && !source.is_empty() {
            self.span = Some((source.to_owned(), span));
        }
        self
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without any location information.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::type_error(format!("failed to convert context: {err}"))
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, source, *span, f),
            None => f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("msg", &self.msg)
                .finish(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)
                }
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, str_width(source.get(span.m..span.n).unwrap_or("")));
    let code = lines
        .get(line)
        .or_else(|| lines.last())
        .copied()
        .unwrap_or_default();

    let num = (line + 1).to_string();
    let pad = str_width(&num);
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            let col = line.get(..offset - n).map(str_width).unwrap_or(offset - n);
            return (i, col);
        }
        n += len;
    }
    (
        lines.len(),
        lines.last().map(|l| str_width(l)).unwrap_or(0),
    )
}

#[cfg(feature = "unicode")]
fn str_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn str_width(s: &str) -> usize {
    s.chars().count()
}

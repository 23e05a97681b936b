use std::fmt::Display;

use ariadne::{Color, Label, Report, ReportKind, Source};
use logos::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    // Lexer and parser errors share one surface: the offending token text,
    // a premature end of input, or a name with no binder in scope.
    UnexpectedToken(String),
    ReachedEnd,
    UnboundVariable(String),
}

#[derive(Clone, Debug)]
pub struct Location {
    pub source_name: String,
    pub span: Span,
}

impl Location {
    pub fn new(source_name: &str, span: Span) -> Location {
        Location {
            source_name: source_name.to_owned(),
            span,
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    location: Location,
}

impl Error {
    pub fn new(kind: ErrorKind, location: Location) -> Error {
        Error { kind, location }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    // Render a labeled report to stderr. The caller passes the source text it
    // already read for parsing, so nothing is read back from disk here.
    pub fn report(&self, source: &str) {
        let name = self.location.source_name.as_str();

        Report::build(ReportKind::Error, name, self.location.span.start)
            .with_message(self.kind.to_string())
            .with_label(Label::new((name, self.location.span.clone())).with_color(Color::Red))
            .finish()
            .eprint((name, Source::from(source)))
            .unwrap();
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnexpectedToken(token) => write!(f, "Unexpected token: {}.", token),
            ErrorKind::ReachedEnd => write!(f, "Unexpected end of input."),
            ErrorKind::UnboundVariable(name) => write!(f, "Unbound variable: {}.", name),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

//! Parser error type

use itertools::Itertools;
use thiserror::Error;
use winnow::error::{ContextError, ErrMode, StrContext};

/// An error while parsing a Fluent resource. Parsing is all-or-nothing: the
/// first fatal error aborts the whole resource.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    /// Short description of what the parser was expecting
    pub message: String,
    /// 1-based line of the failure
    pub line: usize,
    /// 1-based column of the failure
    pub column: usize,
}

impl SyntaxError {
    /// Convert a winnow error into a positioned syntax error. The position is
    /// derived from how much input the failing parser left unconsumed.
    pub(crate) fn new(
        source: &str,
        remaining: &str,
        error: ErrMode<ContextError>,
    ) -> Self {
        let offset = source.len() - remaining.len();
        let consumed = &source[..offset];
        let line = consumed.matches('\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(newline) => consumed[newline + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        Self {
            message: render(&error),
            line,
            column,
        }
    }
}

/// Flatten winnow's context stack into a one-line message naming the
/// construct the parser was expecting
fn render(error: &ErrMode<ContextError>) -> String {
    let context = match error {
        ErrMode::Backtrack(error) | ErrMode::Cut(error) => Some(error),
        ErrMode::Incomplete(_) => None,
    };
    let mut label = None;
    let mut expected = Vec::new();
    for entry in context.into_iter().flat_map(|error| error.context()) {
        match entry {
            StrContext::Label(l) => label = label.or(Some(*l)),
            StrContext::Expected(e) => expected.push(e.to_string()),
            _ => {}
        }
    }
    match (label, expected.is_empty()) {
        (Some(label), false) => {
            format!("invalid {label}: expected {}", expected.iter().join(" or "))
        }
        (Some(label), true) => format!("invalid {label}"),
        (None, false) => format!("expected {}", expected.iter().join(" or ")),
        (None, true) => "invalid syntax".to_owned(),
    }
}

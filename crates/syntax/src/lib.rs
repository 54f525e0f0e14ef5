//! Fluent (FTL) syntax for lilt: the entry AST and the resource parser.
//! This crate is purely about turning source text into immutable syntax
//! trees; formatting them against a bundle lives in `lilt_bundle`.

mod ast;
mod error;
mod parse;
#[cfg(test)]
mod test_util;

pub use ast::{
    Argument, Entry, Expression, Identifier, Literal, NumberLiteral, Pattern,
    PatternElement, Variant,
};
pub use error::SyntaxError;

/// A parsed localization resource: an ordered list of message and term
/// entries. Construct by parsing source text:
///
/// ```
/// use lilt_syntax::Resource;
///
/// let resource: Resource = "hello = Hello, world!".parse().unwrap();
/// assert_eq!(resource.entries().len(), 1);
/// ```
///
/// Parsing is all-or-nothing: a malformed entry fails the whole resource.
/// Text between entries that never opens one (comments, stray lines) is
/// junk and skipped silently.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resource {
    pub(crate) entries: Vec<Entry>,
}

impl Resource {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

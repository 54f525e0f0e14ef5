//! AST definitions for parsed Fluent resources

use derive_more::{Deref, Display};
use indexmap::IndexMap;
use std::borrow::Borrow;

/// A single message or term in a resource. Terms are private entries whose
/// ids keep their leading `-`; they can only be referenced from other
/// patterns, never formatted directly by name.
///
/// Every entry has a value, at least one attribute, or both; the parser
/// rejects anything else.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub(crate) id: Identifier,
    pub(crate) value: Option<Pattern>,
    pub(crate) attributes: IndexMap<Identifier, Pattern>,
}

impl Entry {
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Is this a term, i.e. does the id start with `-`?
    pub fn is_term(&self) -> bool {
        self.id.starts_with('-')
    }

    pub fn value(&self) -> Option<&Pattern> {
        self.value.as_ref()
    }

    /// Get an attribute's pattern by name
    pub fn attribute(&self, name: &str) -> Option<&Pattern> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&Identifier, &Pattern)> {
        self.attributes.iter()
    }
}

/// The body of a message, term, attribute or variant
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// A single line of literal text with no placeables. The common case, so
    /// it skips the resolver entirely when formatted.
    Simple(String),
    /// An ordered mix of text runs and placeables. Multi-line values land
    /// here too: the parser lowers their indentation into plain text runs
    /// before emitting the AST.
    Complex(Vec<PatternElement>),
}

/// One piece of a complex pattern
#[derive(Clone, Debug, PartialEq)]
pub enum PatternElement {
    /// Literal text, passed through the bundle's transform when formatted
    Text(String),
    /// An expression wrapped in `{ ... }`, interpolated at format time
    Placeable(Expression),
}

/// An expression inside a placeable
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// `{"text"}`
    StringLiteral { value: String },
    /// `{3.14}`
    NumberLiteral(NumberLiteral),
    /// `{$count}`: looked up in the caller's arguments, or in the enclosing
    /// term's parameters inside a parameterized term
    VariableReference { name: Identifier },
    /// `{menu}` or `{menu.title}`
    MessageReference {
        name: Identifier,
        attribute: Option<Identifier>,
    },
    /// `{-brand}` or `{-brand(case: "genitive")}`. The name is stored without
    /// its sigil; positional arguments are accepted by the grammar but
    /// ignored by terms at format time.
    TermReference {
        name: Identifier,
        attribute: Option<Identifier>,
        arguments: Vec<Argument>,
    },
    /// `{NUMBER($n, minimumFractionDigits: 2)}`
    FunctionCall {
        name: Identifier,
        arguments: Vec<Argument>,
    },
    /// `{$n -> [one] ... *[other] ...}`. `default` is a valid index into
    /// `variants`; the parser guarantees exactly one `*`-marked variant.
    Select {
        selector: Box<Expression>,
        variants: Vec<Variant>,
        default: usize,
    },
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::String(value) => Self::StringLiteral { value },
            Literal::Number(literal) => Self::NumberLiteral(literal),
        }
    }
}

/// A call argument in a term reference or function call
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Positional(Expression),
    /// `name: literal`. The grammar restricts named argument values to
    /// string and number literals.
    Named { name: Identifier, value: Literal },
}

/// A string or number literal. Doubles as a variant key, where a bare
/// identifier key is stored as its string form.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    String(String),
    Number(NumberLiteral),
}

/// A number literal with the fraction width it was written with. `1.50` keeps
/// precision 2, which drives the minimum fraction digits when rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberLiteral {
    pub value: f64,
    pub precision: usize,
}

/// One arm of a select expression
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub key: Literal,
    pub value: Pattern,
}

/// A message, term, attribute, variable or function name. Message and
/// attribute identifiers are `[a-zA-Z][a-zA-Z0-9_-]*`; term identifiers keep
/// a leading `-` in front of that shape.
#[derive(Clone, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Identifier(pub(crate) String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is the character allowed in an identifier?
    pub(crate) fn is_char_allowed(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
    }

    /// Is the character allowed as the first character in an identifier?
    pub(crate) fn is_char_allowed_first(c: char) -> bool {
        c.is_ascii_alphabetic()
    }

    /// Callable names are all upper-case: `[A-Z][A-Z0-9_-]*`
    pub fn is_callable(&self) -> bool {
        let mut chars = self.0.chars();
        chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.all(|c| {
                c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '_' | '-')
            })
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Allow map lookups keyed by `Identifier` to use plain string slices
impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

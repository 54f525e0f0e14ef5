//! A runtime localization engine for the Fluent (FTL) format: parse
//! translation resources, collect them in a [`Bundle`], and format message
//! patterns with variable interpolation, message/term references,
//! parameterized terms, select expressions with plural rules, and callable
//! functions.
//!
//! ```
//! use lilt::{Args, Bundle, Resource};
//!
//! let source = "
//! msgs = {$n ->
//!     [one] You have one message
//!    *[other] You have {$n} messages
//! }
//! ";
//! let mut bundle = Bundle::new(vec!["en-US".parse().unwrap()]);
//! bundle.set_use_isolating(false);
//! bundle.add_resource(source.parse::<Resource>().unwrap()).unwrap();
//!
//! let message = bundle.get_message("msgs").unwrap();
//! let args = Args::from_iter([("n", 1)]);
//! let formatted = bundle
//!     .format_pattern(message.value().unwrap(), Some(&args), None)
//!     .unwrap();
//! assert_eq!(formatted, "You have one message");
//! ```

pub use lilt_bundle::{
    Args, Bundle, BundleFunction, DateTime, DateTimeOptions, DateTimeStyle,
    FunctionError, NamedArgs, Number, NumberOptions, RenderError,
    ResourceConflict, TextTransform, Value,
};
pub use lilt_syntax::{
    Argument, Entry, Expression, Identifier, Literal, NumberLiteral, Pattern,
    PatternElement, Resource, SyntaxError, Variant,
};

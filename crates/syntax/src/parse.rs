//! Resource parsing
//!
//! The grammar is line-oriented: entries start at column 0, continuation
//! lines are indented, and placeables may span lines. Tokens inside
//! placeables are parsed with winnow; the indentation bookkeeping around them
//! is plain Rust. Anything between entries that never opens one is junk and
//! skipped a line at a time.

use crate::{
    Resource,
    ast::{
        Argument, Entry, Expression, Identifier, Literal, NumberLiteral,
        Pattern, PatternElement, Variant,
    },
    error::SyntaxError,
};
use indexmap::IndexMap;
use std::str::FromStr;
use winnow::{
    ModalResult, Parser,
    ascii::digit1,
    combinator::{alt, cut_err, fail, opt, preceded, terminated},
    error::{StrContext, StrContextValue},
    stream::AsChar,
    token::{one_of, take_while},
};

/// Hard cap on placeables parsed in a single pattern, so a hostile resource
/// cannot stage a quadratic-blowup expansion
const MAX_PLACEABLES: usize = 100;

impl FromStr for Resource {
    type Err = SyntaxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut input = source;
        let mut entries = Vec::new();
        while !input.is_empty() {
            // Entry headers only count at the start of a line; a stray
            // `id =` in the middle of a junk line must not open an entry
            let offset = source.len() - input.len();
            let at_line_start =
                offset == 0 || source.as_bytes()[offset - 1] == b'\n';
            let header = if at_line_start {
                match opt(entry_header).parse_next(&mut input) {
                    Ok(header) => header,
                    Err(error) => {
                        return Err(SyntaxError::new(source, input, error));
                    }
                }
            } else {
                None
            };
            match header {
                // Once a header matched we are committed: any failure in the
                // entry body is fatal to the whole resource
                Some(id) => match entry_body(&mut input, id) {
                    Ok(entry) => entries.push(entry),
                    Err(error) => {
                        return Err(SyntaxError::new(source, input, error));
                    }
                },
                // Junk: drop the rest of the line
                None => match input.find('\n') {
                    Some(end) => input = &input[end + 1..],
                    None => input = "",
                },
            }
        }
        Ok(Resource { entries })
    }
}

/// Start of a message or term: `-?identifier *= *`. Term ids keep their
/// leading `-`.
fn entry_header(input: &mut &str) -> ModalResult<Identifier> {
    terminated((opt('-'), identifier_text).take(), (spaces, '=', spaces))
        .map(Identifier::from)
        .parse_next(input)
}

/// Everything after an entry's `=`: an optional pattern followed by zero or
/// more attributes. At least one of the two must be present.
fn entry_body(input: &mut &str, id: Identifier) -> ModalResult<Entry> {
    let value = pattern(input)?;
    let attributes = attributes(input)?;
    if value.is_none() && attributes.is_empty() {
        return syntax_error(input, "message value or attributes");
    }
    Ok(Entry {
        id,
        value,
        attributes,
    })
}

/// Zero or more `.name *= *pattern` attributes
fn attributes(input: &mut &str) -> ModalResult<IndexMap<Identifier, Pattern>> {
    let mut attributes = IndexMap::new();
    while let Some(name) = opt(attribute_header).parse_next(input)? {
        match pattern(input)? {
            Some(value) => {
                attributes.insert(name, value);
            }
            None => return syntax_error(input, "attribute value"),
        }
    }
    Ok(attributes)
}

fn attribute_header(input: &mut &str) -> ModalResult<Identifier> {
    preceded('.', terminated(identifier, (spaces, '=', spaces)))
        .parse_next(input)
}

/// Parse a pattern, or `None` if there is no pattern here. The blank run
/// after the pattern is consumed either way, leaving the cursor on the next
/// construct (attribute, variant, closing brace or next entry).
fn pattern(input: &mut &str) -> ModalResult<Option<Pattern>> {
    let first = opt(text_run).parse_next(input)?;

    // `{` opens a placeable. A stray `}` also routes to the complex path,
    // where it is rejected as unbalanced.
    if input.starts_with('{') || input.starts_with('}') {
        let seed = first.map(RawElement::Text).into_iter().collect();
        return pattern_elements(input, seed, usize::MAX).map(Some);
    }

    if let Some(indent) = parse_indent(input) {
        return match first {
            Some(first) => {
                let length = indent.length;
                pattern_elements(
                    input,
                    vec![RawElement::Text(first), RawElement::Indent(indent)],
                    length,
                )
            }
            None => {
                // Block pattern: the value starts on its own line
                let indent = indent.trim_leading_newlines();
                let length = indent.length;
                pattern_elements(input, vec![RawElement::Indent(indent)], length)
            }
        }
        .map(Some);
    }

    // Single line of plain text
    Ok(first.map(|text| Pattern::Simple(text.trim_end_matches(' ').to_owned())))
}

/// A run of literal text within one line
fn text_run<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., |c: char| !matches!(c, '{' | '}' | '\n' | '\r'))
        .parse_next(input)
}

/// A pattern element as collected during the scan. Indents are ephemeral:
/// they are lowered into plain text (or dropped) once the pattern's common
/// indentation is known.
enum RawElement<'s> {
    Text(&'s str),
    Indent(Indent),
    Placeable(Expression),
}

/// Collect text runs, placeables and indents until the pattern ends, then
/// bake the indents into text with the common indentation stripped
fn pattern_elements<'s>(
    input: &mut &'s str,
    mut elements: Vec<RawElement<'s>>,
    mut common_indent: usize,
) -> ModalResult<Pattern> {
    let mut placeables = 0usize;
    loop {
        if let Some(text) = opt(text_run).parse_next(input)? {
            elements.push(RawElement::Text(text));
            continue;
        }
        if input.starts_with('{') {
            placeables += 1;
            if placeables > MAX_PLACEABLES {
                return syntax_error(
                    input,
                    "at most 100 placeables in one pattern",
                );
            }
            elements.push(RawElement::Placeable(placeable(input)?));
            continue;
        }
        if input.starts_with('}') {
            return syntax_error(input, "balanced braces");
        }
        if let Some(indent) = parse_indent(input) {
            common_indent = common_indent.min(indent.length);
            elements.push(RawElement::Indent(indent));
            continue;
        }
        break;
    }

    // A trailing text run loses its trailing spaces
    if let Some(RawElement::Text(text)) = elements.last_mut() {
        *text = text.trim_end_matches(' ');
    }

    let mut baked = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            RawElement::Text(text) if text.is_empty() => {}
            RawElement::Text(text) => {
                baked.push(PatternElement::Text(text.to_owned()));
            }
            RawElement::Indent(indent) => {
                let value = indent.dedent(common_indent);
                if !value.is_empty() {
                    baked.push(PatternElement::Text(value));
                }
            }
            RawElement::Placeable(expression) => {
                baked.push(PatternElement::Placeable(expression));
            }
        }
    }
    Ok(Pattern::Complex(baked))
}

/// Blank block between pattern lines, with each `spaces CR? LF` collapsed to
/// a bare newline. `length` is the width of the trailing space run, i.e. the
/// indentation depth of the upcoming line.
#[derive(Debug)]
struct Indent {
    value: String,
    length: usize,
}

impl Indent {
    fn trim_leading_newlines(mut self) -> Self {
        let newlines =
            self.value.len() - self.value.trim_start_matches('\n').len();
        self.value.drain(..newlines);
        self
    }

    /// Strip the pattern-wide common indentation off the trailing space run
    fn dedent(self, common_indent: usize) -> String {
        let mut value = self.value;
        value.truncate(value.len() - common_indent.min(self.length));
        value
    }
}

/// Consume the blank run after a pattern line and decide whether the pattern
/// continues. `None` means the pattern ends here; the blank stays consumed
/// either way.
fn parse_indent(input: &mut &str) -> Option<Indent> {
    let blank_len = input.len() - input.trim_start().len();
    let (blank, rest) = input.split_at(blank_len);
    *input = rest;
    match rest.chars().next() {
        // The pattern ends before an attribute, variant, default marker,
        // closing brace or end of input
        Some('.' | '[' | '*' | '}') | None => None,
        // A block placeable continues the pattern regardless of indentation
        Some('{') => Some(make_indent(blank)),
        // Any other continuation line needs at least one space of indent
        Some(_) if blank.ends_with(' ') => Some(make_indent(blank)),
        Some(_) => None,
    }
}

fn make_indent(blank: &str) -> Indent {
    let mut value = String::with_capacity(blank.len());
    let mut pending_spaces = 0usize;
    let mut chars = blank.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' => pending_spaces += 1,
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                pending_spaces = 0;
                value.push('\n');
            }
            '\n' => {
                pending_spaces = 0;
                value.push('\n');
            }
            other => {
                value.extend(std::iter::repeat_n(' ', pending_spaces));
                pending_spaces = 0;
                value.push(other);
            }
        }
    }
    value.extend(std::iter::repeat_n(' ', pending_spaces));
    let length = blank.len() - blank.trim_end_matches(' ').len();
    Indent { value, length }
}

/// `{ expression }` or `{ selector -> variants }`
fn placeable(input: &mut &str) -> ModalResult<Expression> {
    ('{', blank).void().parse_next(input)?;
    let selector = inline_expression(input)?;
    if opt((blank, '}')).parse_next(input)?.is_some() {
        return Ok(selector);
    }
    if opt((blank, "->", blank)).parse_next(input)?.is_some() {
        let (variants, default) = variant_list(input)?;
        cut_err((blank, '}'))
            .context(expected("closing brace"))
            .void()
            .parse_next(input)?;
        return Ok(Expression::Select {
            selector: Box::new(selector),
            variants,
            default,
        });
    }
    syntax_error(input, "closing brace")
}

fn inline_expression(input: &mut &str) -> ModalResult<Expression> {
    // Nested placeable
    if input.starts_with('{') {
        return placeable(input);
    }

    if let Some((sigil, name, attribute)) = opt(reference).parse_next(input)? {
        if sigil == Some('$') {
            return Ok(Expression::VariableReference { name });
        }
        if opt((blank, '(', blank)).parse_next(input)?.is_some() {
            let arguments = argument_list(input)?;
            if sigil == Some('-') {
                return Ok(Expression::TermReference {
                    name,
                    attribute,
                    arguments,
                });
            }
            if !name.is_callable() {
                return syntax_error(input, "an upper-case function name");
            }
            return Ok(Expression::FunctionCall { name, arguments });
        }
        if sigil == Some('-') {
            return Ok(Expression::TermReference {
                name,
                attribute,
                arguments: Vec::new(),
            });
        }
        return Ok(Expression::MessageReference { name, attribute });
    }

    literal(input).map(Expression::from)
}

/// `([$-])?identifier(.identifier)?`, the shared shape of variable, message,
/// term and function references
fn reference(
    input: &mut &str,
) -> ModalResult<(Option<char>, Identifier, Option<Identifier>)> {
    (
        opt(one_of(['$', '-'])),
        identifier,
        opt(preceded('.', identifier)),
    )
        .parse_next(input)
}

/// Call arguments after the opening parenthesis. Commas are optional.
fn argument_list(input: &mut &str) -> ModalResult<Vec<Argument>> {
    let mut arguments = Vec::new();
    loop {
        if input.is_empty() {
            return syntax_error(input, "closing parenthesis");
        }
        if opt(')').parse_next(input)?.is_some() {
            return Ok(arguments);
        }
        arguments.push(argument(input)?);
        (blank, opt(','), blank).void().parse_next(input)?;
    }
}

fn argument(input: &mut &str) -> ModalResult<Argument> {
    let expression = inline_expression(input)?;
    // A bare message reference followed by `:` is actually a named argument;
    // its value must be a literal
    if let Expression::MessageReference {
        name,
        attribute: None,
    } = &expression
    {
        if opt((blank, ':', blank)).parse_next(input)?.is_some() {
            let value = cut_err(literal).parse_next(input)?;
            return Ok(Argument::Named {
                name: name.clone(),
                value,
            });
        }
    }
    Ok(Argument::Positional(expression))
}

/// The arms of a select expression. At least one variant, exactly one of
/// them marked `*` as the default.
fn variant_list(input: &mut &str) -> ModalResult<(Vec<Variant>, usize)> {
    let mut variants = Vec::new();
    let mut default = None;
    loop {
        let Some(marker) = opt(alt(("*[", "["))).parse_next(input)? else {
            break;
        };
        if marker == "*[" {
            if default.is_some() {
                return syntax_error(input, "only one default variant");
            }
            default = Some(variants.len());
        }
        blank.parse_next(input)?;
        let key = variant_key(input)?;
        cut_err((blank, ']', spaces))
            .context(expected("closing bracket"))
            .void()
            .parse_next(input)?;
        match pattern(input)? {
            Some(value) => variants.push(Variant { key, value }),
            None => return syntax_error(input, "variant value"),
        }
    }
    if variants.is_empty() {
        return syntax_error(input, "variant list");
    }
    let Some(default) = default else {
        return syntax_error(input, "default variant");
    };
    Ok((variants, default))
}

/// A number literal or a bare identifier, which becomes a string key
fn variant_key(input: &mut &str) -> ModalResult<Literal> {
    alt((
        number_literal.map(Literal::Number),
        identifier_text.map(|id| Literal::String(id.to_owned())),
        fail.context(expected("variant key")),
    ))
    .parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Literal> {
    alt((
        number_literal.map(Literal::Number),
        string_literal.map(Literal::String),
        fail.context(StrContext::Label("expression")),
    ))
    .parse_next(input)
}

/// `-?[0-9]+(.[0-9]+)?`, keeping the written fraction width as the precision
fn number_literal(input: &mut &str) -> ModalResult<NumberLiteral> {
    let text = (opt('-'), digit1, opt(preceded('.', digit1)))
        .take()
        .parse_next(input)?;
    let precision =
        text.split_once('.').map_or(0, |(_, fraction)| fraction.len());
    // The matched shape is always a valid float
    let value = text.parse().unwrap();
    Ok(NumberLiteral { value, precision })
}

/// Double-quoted string. Escapes are `\\`, `\"`, `\uXXXX` and `\UXXXXXX`;
/// literal newlines are not allowed.
fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.void().parse_next(input)?;
    let mut value = String::new();
    loop {
        let run = take_while(0.., |c: char| {
            !matches!(c, '\\' | '"' | '\n' | '\r')
        })
        .parse_next(input)?;
        value.push_str(run);
        if opt('\\').parse_next(input)?.is_some() {
            value.push(escape_sequence(input)?);
            continue;
        }
        if opt('"').parse_next(input)?.is_some() {
            return Ok(value);
        }
        // Literal newline or end of input before the closing quote
        return syntax_error(input, "closing quote");
    }
}

/// The character after a backslash inside a string literal
fn escape_sequence(input: &mut &str) -> ModalResult<char> {
    alt((
        '\\'.value('\\'),
        '"'.value('"'),
        preceded('u', take_while(4, AsChar::is_hex_digit))
            .map(unicode_escape),
        preceded('U', take_while(6, AsChar::is_hex_digit))
            .map(unicode_escape),
        cut_err(fail.context(expected("escape sequence"))),
    ))
    .parse_next(input)
}

/// Decode `\uXXXX`/`\UXXXXXX`. Lone surrogates are not scalar values and are
/// replaced with U+FFFD.
fn unicode_escape(digits: &str) -> char {
    // At most six hex digits, so the conversion cannot overflow
    let codepoint = u32::from_str_radix(digits, 16).unwrap();
    char::from_u32(codepoint).unwrap_or('\u{FFFD}')
}

fn identifier(input: &mut &str) -> ModalResult<Identifier> {
    identifier_text.map(Identifier::from).parse_next(input)
}

fn identifier_text<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        one_of(Identifier::is_char_allowed_first),
        take_while(0.., Identifier::is_char_allowed),
    )
        .take()
        .parse_next(input)
}

/// Zero or more literal spaces. The grammar is strict about U+0020 around
/// `=` and after variant keys.
fn spaces(input: &mut &str) -> ModalResult<()> {
    take_while(0.., ' ').void().parse_next(input)
}

/// Whitespace allowed inside placeables, including newlines
fn blank(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace).void().parse_next(input)
}

/// Fail the parse with a fatal "expected ..." error at the current position
fn syntax_error<T>(
    input: &mut &str,
    description: &'static str,
) -> ModalResult<T> {
    cut_err(fail.context(expected(description))).parse_next(input)
}

fn expected(description: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(description))
}

//! Pattern and expression resolution

use crate::{
    Args, builtins,
    error::RenderError,
    scope::Scope,
    value::{NamedArgs, Number, Value},
};
use lilt_syntax::{
    Argument, Expression, Identifier, Literal, NumberLiteral, Pattern,
    PatternElement, Variant,
};

/// FIRST STRONG ISOLATE, wrapped around every interpolated value so
/// bidirectional text cannot bleed into the surrounding translation
const FSI: char = '\u{2068}';
/// POP DIRECTIONAL ISOLATE, closing an FSI
const PDI: char = '\u{2069}';

pub(crate) fn resolve_pattern(
    scope: &mut Scope,
    pattern: &Pattern,
) -> Result<Value, RenderError> {
    match pattern {
        Pattern::Simple(text) => {
            Ok(Value::String(scope.bundle.transform(text).into_owned()))
        }
        Pattern::Complex(elements) => {
            resolve_complex_pattern(scope, pattern, elements)
        }
    }
}

/// Resolve a pattern's elements into one string, guarding against reference
/// cycles
fn resolve_complex_pattern(
    scope: &mut Scope,
    pattern: &Pattern,
    elements: &[PatternElement],
) -> Result<Value, RenderError> {
    if !scope.begin(pattern) {
        scope.report(RenderError::CyclicReference)?;
        return Ok(Value::none());
    }
    let result = resolve_elements(scope, elements);
    // The guard entry must go away on every exit, fatal overflows included,
    // or a later reference to this pattern would report a phantom cycle
    scope.finish(pattern);
    result
}

fn resolve_elements(
    scope: &mut Scope,
    elements: &[PatternElement],
) -> Result<Value, RenderError> {
    let use_isolating = scope.bundle.use_isolating() && elements.len() > 1;
    let mut output = String::new();
    for element in elements {
        match element {
            PatternElement::Text(text) => {
                output.push_str(&scope.bundle.transform(text));
            }
            PatternElement::Placeable(expression) => {
                scope.count_placeable()?;
                if use_isolating {
                    output.push(FSI);
                }
                let value = resolve_expression(scope, expression)?;
                output.push_str(&value.as_string(scope.bundle));
                if use_isolating {
                    output.push(PDI);
                }
            }
        }
    }
    Ok(Value::String(output))
}

pub(crate) fn resolve_expression(
    scope: &mut Scope,
    expression: &Expression,
) -> Result<Value, RenderError> {
    match expression {
        Expression::StringLiteral { value } => Ok(Value::String(value.clone())),
        Expression::NumberLiteral(literal) => {
            Ok(Value::Number(number_from_literal(literal)))
        }
        Expression::VariableReference { name } => resolve_variable(scope, name),
        Expression::MessageReference { name, attribute } => {
            resolve_message(scope, name, attribute.as_ref())
        }
        Expression::TermReference {
            name,
            attribute,
            arguments,
        } => resolve_term(scope, name, attribute.as_ref(), arguments),
        Expression::FunctionCall { name, arguments } => {
            resolve_function(scope, name, arguments)
        }
        Expression::Select {
            selector,
            variants,
            default,
        } => resolve_select(scope, selector, variants, *default),
    }
}

/// A number literal keeps the fraction width it was written with
fn number_from_literal(literal: &NumberLiteral) -> Number {
    let mut number = Number::new(literal.value);
    number.options.minimum_fraction_digits = Some(literal.precision);
    number
}

fn resolve_variable(
    scope: &mut Scope,
    name: &Identifier,
) -> Result<Value, RenderError> {
    // Inside a term, variables resolve against the term's own parameters.
    // A missing parameter is the term author's business, not the caller's,
    // so it degrades to a placeholder without reporting anything.
    if let Some(params) = &scope.params {
        return Ok(params
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::None(name.to_string())));
    }
    match scope.args.and_then(|args| args.get(name)) {
        Some(value) => Ok(value.clone()),
        None => {
            scope.report(RenderError::UnknownVariable { name: name.clone() })?;
            Ok(Value::None(name.to_string()))
        }
    }
}

fn resolve_message(
    scope: &mut Scope,
    name: &Identifier,
    attribute: Option<&Identifier>,
) -> Result<Value, RenderError> {
    let Some(message) = scope.bundle.get_message(name) else {
        scope.report(RenderError::UnknownMessage { id: name.clone() })?;
        return Ok(Value::None(name.to_string()));
    };
    match attribute {
        Some(attribute) => match message.attribute(attribute) {
            Some(pattern) => resolve_pattern(scope, pattern),
            None => {
                scope.report(RenderError::UnknownAttribute {
                    id: name.clone(),
                    attribute: attribute.clone(),
                })?;
                Ok(Value::None(format!("{name}.{attribute}")))
            }
        },
        None => match message.value() {
            Some(pattern) => resolve_pattern(scope, pattern),
            None => {
                scope.report(RenderError::NoValue { id: name.clone() })?;
                Ok(Value::None(name.to_string()))
            }
        },
    }
}

fn resolve_term(
    scope: &mut Scope,
    name: &Identifier,
    attribute: Option<&Identifier>,
    arguments: &[Argument],
) -> Result<Value, RenderError> {
    let id = format!("-{name}");
    let Some(term) = scope.bundle.term(&id) else {
        scope.report(RenderError::UnknownTerm {
            id: id.clone().into(),
        })?;
        return Ok(Value::None(id));
    };
    let pattern = match attribute {
        Some(attribute) => match term.attribute(attribute) {
            Some(pattern) => pattern,
            None => {
                scope.report(RenderError::UnknownAttribute {
                    id: id.clone().into(),
                    attribute: attribute.clone(),
                })?;
                return Ok(Value::None(format!("{id}.{attribute}")));
            }
        },
        None => match term.value() {
            Some(pattern) => pattern,
            None => {
                scope.report(RenderError::NoValue {
                    id: id.clone().into(),
                })?;
                return Ok(Value::None(id));
            }
        },
    };
    // Arguments are evaluated in the caller's frame. Only named ones
    // parameterize the term; positional ones are ignored.
    let (_, named) = resolve_arguments(scope, arguments)?;
    let previous = scope.enter_term(Args::from(named));
    let result = resolve_pattern(scope, pattern);
    scope.exit_term(previous);
    result
}

fn resolve_function(
    scope: &mut Scope,
    name: &Identifier,
    arguments: &[Argument],
) -> Result<Value, RenderError> {
    let (positional, named) = resolve_arguments(scope, arguments)?;
    // Registered functions shadow the built-ins
    let result = match scope.bundle.function(name) {
        Some(function) => function(&positional, &named),
        None => match name.as_str() {
            "NUMBER" => builtins::number(&positional, &named),
            "DATETIME" => builtins::date_time(&positional, &named),
            _ => {
                scope.report(RenderError::UnknownFunction {
                    name: name.clone(),
                })?;
                return Ok(Value::None(format!("{name}()")));
            }
        },
    };
    match result {
        Ok(value) => Ok(value),
        Err(source) => {
            scope.report(RenderError::Function {
                name: name.clone(),
                source,
            })?;
            Ok(Value::None(format!("{name}()")))
        }
    }
}

/// Evaluate call arguments into positional values and named values
fn resolve_arguments(
    scope: &mut Scope,
    arguments: &[Argument],
) -> Result<(Vec<Value>, NamedArgs), RenderError> {
    let mut positional = Vec::new();
    let mut named = NamedArgs::default();
    for argument in arguments {
        match argument {
            Argument::Positional(expression) => {
                positional.push(resolve_expression(scope, expression)?);
            }
            Argument::Named { name, value } => {
                named.insert(name.to_string(), literal_value(value));
            }
        }
    }
    Ok((positional, named))
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(value) => Value::String(value.clone()),
        Literal::Number(literal) => Value::Number(number_from_literal(literal)),
    }
}

fn resolve_select(
    scope: &mut Scope,
    selector: &Expression,
    variants: &[Variant],
    default: usize,
) -> Result<Value, RenderError> {
    let selector = resolve_expression(scope, selector)?;
    // A failed selector goes straight to the default variant
    if !matches!(selector, Value::None(_)) {
        for variant in variants {
            if matches_key(scope, &selector, &variant.key) {
                return resolve_pattern(scope, &variant.value);
            }
        }
    }
    match variants.get(default) {
        Some(variant) => resolve_pattern(scope, &variant.value),
        None => {
            scope.report(RenderError::NoDefault)?;
            Ok(Value::none())
        }
    }
}

/// Does a variant key match the resolved selector? Strings match by
/// equality, numbers by value (their options are deliberately not compared),
/// and a string key can match a number selector's plural category.
fn matches_key(scope: &Scope, selector: &Value, key: &Literal) -> bool {
    match (selector, key) {
        (Value::String(selector), Literal::String(key)) => selector == key,
        (Value::Number(selector), Literal::Number(key)) => {
            selector.value == key.value
        }
        (Value::Number(selector), Literal::String(key)) => {
            scope
                .bundle
                .plural_rules(&selector.options)
                .select(selector.value)
                == Some(key.as_str())
        }
        _ => false,
    }
}

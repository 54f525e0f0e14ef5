//! End-to-end formatting scenarios across the parser, bundle and resolver

use crate::{
    Args, Bundle, RenderError, Value,
    test_util::{assert_err, assert_matches},
};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Bidi isolate characters wrapped around interpolated values
const FSI: char = '\u{2068}';
const PDI: char = '\u{2069}';

fn en_bundle() -> Bundle {
    Bundle::new(vec!["en-US".parse().unwrap()])
}

fn bundle(source: &str) -> Bundle {
    let mut bundle = en_bundle();
    bundle.add_resource(source.parse().unwrap()).unwrap();
    bundle
}

/// Format a message's value with an error sink, returning both the output
/// and the collected errors
fn format_message(
    bundle: &Bundle,
    id: &str,
    args: Option<&Args>,
) -> (String, Vec<RenderError>) {
    let mut errors = Vec::new();
    let message = bundle.get_message(id).expect("unknown message");
    let formatted = bundle
        .format_pattern(
            message.value().expect("message has no value"),
            args,
            Some(&mut errors),
        )
        .expect("formatting with a sink is infallible");
    (formatted, errors)
}

#[test]
fn test_variable_interpolation() {
    let bundle = bundle("welcome = Hello, {$name}!");
    let args = Args::from_iter([("name", "Anna")]);
    let (formatted, errors) = format_message(&bundle, "welcome", Some(&args));
    assert_eq!(formatted, format!("Hello, {FSI}Anna{PDI}!"));
    assert!(errors.is_empty());
}

#[test]
fn test_isolation_disabled() {
    let mut bundle = en_bundle();
    bundle.set_use_isolating(false);
    bundle
        .add_resource("welcome = Hello, {$name}!".parse().unwrap())
        .unwrap();
    let args = Args::from_iter([("name", "Anna")]);
    let (formatted, _) = format_message(&bundle, "welcome", Some(&args));
    assert_eq!(formatted, "Hello, Anna!");
}

/// A pattern that is just one placeable gets no isolation even when
/// isolation is on
#[test]
fn test_single_placeable_not_isolated() {
    let bundle = bundle("solo = {$name}");
    let args = Args::from_iter([("name", "Anna")]);
    let (formatted, _) = format_message(&bundle, "solo", Some(&args));
    assert_eq!(formatted, "Anna");
}

#[test]
fn test_term_reference() {
    let bundle = bundle("-brand = Foo 3000\nhi = Welcome to {-brand}!");
    let (formatted, errors) = format_message(&bundle, "hi", None);
    assert_eq!(formatted, format!("Welcome to {FSI}Foo 3000{PDI}!"));
    assert!(errors.is_empty());
}

#[rstest]
#[case::category_one(1, "You have one message")]
#[case::category_other(5, "You have \u{2068}5\u{2069} messages")]
fn test_plural_select(#[case] n: i64, #[case] expected: &str) {
    let bundle = bundle(
        "msgs = {$n ->\n    \
             [one] You have one message\n   \
            *[other] You have {$n} messages\n\
         }",
    );
    let args = Args::from_iter([("n", n)]);
    let (formatted, errors) = format_message(&bundle, "msgs", Some(&args));
    assert_eq!(formatted, expected);
    assert!(errors.is_empty());
}

/// An exact numeric key wins before the plural category is consulted
#[test]
fn test_select_exact_number_beats_category() {
    let bundle = bundle(
        "sel = {$n ->\n    \
             [1] exactly one\n    \
             [one] category one\n   \
            *[other] other\n\
         }",
    );
    let args = Args::from_iter([("n", 1)]);
    let (formatted, _) = format_message(&bundle, "sel", Some(&args));
    assert_eq!(formatted, "exactly one");
}

/// String selectors match variant keys by plain equality
#[test]
fn test_select_string_selector() {
    let bundle = bundle(
        "-platform = windows\n\
         shortcut = {-platform ->\n    \
             [windows] Ctrl\n   \
            *[other] Cmd\n\
         }",
    );
    let (formatted, _) = format_message(&bundle, "shortcut", None);
    assert_eq!(formatted, "Ctrl");
}

/// A selector that fails to resolve reports its error and falls back to the
/// default variant
#[test]
fn test_select_failed_selector_uses_default() {
    let bundle = bundle("sel = {$missing ->\n    [a] A\n   *[b] B\n}");
    let (formatted, errors) = format_message(&bundle, "sel", None);
    assert_eq!(formatted, "B");
    let name = assert_matches!(
        errors.as_slice(),
        [RenderError::UnknownVariable { name }] => name
    );
    assert_eq!(name.as_str(), "missing");
}

#[test]
fn test_unknown_variable() {
    let bundle = bundle("hi = Hello, {$name}!");
    let (formatted, errors) = format_message(&bundle, "hi", None);
    assert_eq!(formatted, format!("Hello, {FSI}{{name}}{PDI}!"));
    let name = assert_matches!(
        errors.as_slice(),
        [RenderError::UnknownVariable { name }] => name
    );
    assert_eq!(name.as_str(), "name");
}

/// Errors land in the sink in discovery order
#[test]
fn test_error_order() {
    let bundle = bundle("two = {$a}{$b}");
    let (_, errors) = format_message(&bundle, "two", None);
    let (first, second) = assert_matches!(
        errors.as_slice(),
        [
            RenderError::UnknownVariable { name: first },
            RenderError::UnknownVariable { name: second },
        ] => (first, second)
    );
    assert_eq!(first.as_str(), "a");
    assert_eq!(second.as_str(), "b");
}

/// Without a sink the first error aborts the call
#[test]
fn test_strict_mode() {
    let bundle = bundle("hi = Hello, {$name}!");
    let message = bundle.get_message("hi").unwrap();
    assert_err!(
        bundle.format_pattern(message.value().unwrap(), None, None),
        "unknown variable `$name`"
    );
}

#[test]
fn test_cyclic_reference() {
    let bundle = bundle("a = {b}\nb = {a}");
    let (formatted, errors) = format_message(&bundle, "a", None);
    assert_eq!(formatted, "{???}");
    assert_matches!(errors.as_slice(), [RenderError::CyclicReference]);
}

/// Referencing the same message twice in sequence is not a cycle
#[test]
fn test_repeated_reference_is_not_a_cycle() {
    let mut bundle = en_bundle();
    bundle.set_use_isolating(false);
    bundle
        .add_resource("x = {$v}!\ny = {x}{x}".parse().unwrap())
        .unwrap();
    let args = Args::from_iter([("v", "X")]);
    let (formatted, errors) = format_message(&bundle, "y", Some(&args));
    assert_eq!(formatted, "X!X!");
    assert!(errors.is_empty());
}

#[test]
fn test_parameterized_term() {
    let bundle = bundle(
        "-thing = {$kind ->\n   \
            *[default] thing\n    \
             [cat] cat\n\
         }\n\
         own = I have a {-thing(kind: \"cat\")}.",
    );
    let (formatted, errors) = format_message(&bundle, "own", None);
    assert_eq!(formatted, format!("I have a {FSI}cat{PDI}."));
    assert!(errors.is_empty());
}

/// A variable missing from a term's parameters degrades silently; the same
/// variable missing at the top level is a reported error
#[test]
fn test_term_parameters_are_silent() {
    let bundle = bundle("-t = {$missing}\nuse-term = {-t}\ntop = {$missing}");
    let (formatted, errors) = format_message(&bundle, "use-term", None);
    assert_eq!(formatted, "{missing}");
    assert!(errors.is_empty());

    let (formatted, errors) = format_message(&bundle, "top", None);
    assert_eq!(formatted, "{missing}");
    assert_matches!(errors.as_slice(), [RenderError::UnknownVariable { .. }]);
}

/// Terms take named arguments only; positional ones are ignored
#[test]
fn test_term_ignores_positional_arguments() {
    let bundle = bundle("-t = {$x}\nu = {-t(\"pos\", x: \"X\")}");
    let (formatted, errors) = format_message(&bundle, "u", None);
    assert_eq!(formatted, "X");
    assert!(errors.is_empty());
}

/// Caller variables are not visible inside a referenced term
#[test]
fn test_term_does_not_see_caller_arguments() {
    let bundle = bundle("-t = {$v}\nu = {-t}");
    let args = Args::from_iter([("v", "leaked")]);
    let (formatted, errors) = format_message(&bundle, "u", Some(&args));
    assert_eq!(formatted, "{v}");
    assert!(errors.is_empty());
}

#[test]
fn test_message_and_attribute_references() {
    let bundle = bundle(
        "menu = File\n    .title = File menu\n\
         use-value = {menu}\n\
         use-attribute = {menu.title}",
    );
    let (formatted, _) = format_message(&bundle, "use-value", None);
    assert_eq!(formatted, "File");
    let (formatted, _) = format_message(&bundle, "use-attribute", None);
    assert_eq!(formatted, "File menu");
}

/// Attribute patterns can be formatted directly
#[test]
fn test_format_attribute() {
    let bundle = bundle("login = Log in\n    .title = Sign in to continue");
    let message = bundle.get_message("login").unwrap();
    let formatted = bundle
        .format_pattern(message.attribute("title").unwrap(), None, None)
        .unwrap();
    assert_eq!(formatted, "Sign in to continue");
}

#[rstest]
#[case::unknown_message(
    "u = {missing}",
    "{missing}",
)]
#[case::unknown_term(
    "u = {-missing}",
    "{-missing}",
)]
#[case::unknown_attribute(
    "a = A\nu = {a.missing}",
    "{a.missing}",
)]
#[case::no_value(
    "a =\n    .t = T\nu = {a}",
    "{a}",
)]
fn test_reference_failures(#[case] source: &str, #[case] expected: &str) {
    let bundle = bundle(source);
    let (formatted, errors) = format_message(&bundle, "u", None);
    assert_eq!(formatted, expected);
    assert_eq!(errors.len(), 1);
}

/// Number literals keep their written fraction width
#[test]
fn test_number_literal_precision() {
    let bundle = bundle("price = {2.50}");
    let (formatted, _) = format_message(&bundle, "price", None);
    assert_eq!(formatted, "2.50");
}

#[test]
fn test_number_function_options() {
    let bundle = bundle("fmt = {NUMBER($x, minimumFractionDigits: 2)}");
    let args = Args::from_iter([("x", 4)]);
    let (formatted, errors) = format_message(&bundle, "fmt", Some(&args));
    assert_eq!(formatted, "4.00");
    assert!(errors.is_empty());
}

#[test]
fn test_number_grouping() {
    let bundle = bundle("big = {$n}\nplain = {NUMBER($n, useGrouping: 0)}");
    let args = Args::from_iter([("n", 1_234_567)]);
    let (formatted, _) = format_message(&bundle, "big", Some(&args));
    assert_eq!(formatted, "1,234,567");
    let (formatted, _) = format_message(&bundle, "plain", Some(&args));
    assert_eq!(formatted, "1234567");
}

#[test]
fn test_datetime_function() {
    let mut bundle = en_bundle();
    bundle.set_use_isolating(false);
    bundle
        .add_resource(
            "today = Today is {DATETIME($date, dateStyle: \"long\")}."
                .parse()
                .unwrap(),
        )
        .unwrap();
    let date = chrono::DateTime::parse_from_rfc3339("2024-07-13T12:30:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let mut args = Args::new();
    args.set("date", date);
    let (formatted, errors) = format_message(&bundle, "today", Some(&args));
    assert_eq!(formatted, "Today is July 13, 2024.");
    assert!(errors.is_empty());
}

#[test]
fn test_custom_function() {
    let mut bundle = en_bundle();
    bundle.set_use_isolating(false);
    bundle.add_function("STRLEN", |positional, _| {
        let [Value::String(text)] = positional else {
            return Err("STRLEN() takes one string".into());
        };
        Ok(Value::from(text.chars().count()))
    });
    bundle
        .add_resource("len = {STRLEN(\"hello\")} chars".parse().unwrap())
        .unwrap();
    let (formatted, errors) = format_message(&bundle, "len", None);
    assert_eq!(formatted, "5 chars");
    assert!(errors.is_empty());
}

/// Registered functions shadow the built-ins of the same name
#[test]
fn test_custom_function_shadows_builtin() {
    let mut bundle = en_bundle();
    bundle.add_function("NUMBER", |_, _| Ok(Value::from("shadowed")));
    bundle
        .add_resource("n = {NUMBER(5)}".parse().unwrap())
        .unwrap();
    let (formatted, _) = format_message(&bundle, "n", None);
    assert_eq!(formatted, "shadowed");
}

#[test]
fn test_function_failure() {
    let mut bundle = en_bundle();
    bundle.add_function("FAIL", |_, _| Err("nope".into()));
    bundle
        .add_resource("boom = {FAIL()}\nmissing = {NOPE()}".parse().unwrap())
        .unwrap();

    let (formatted, errors) = format_message(&bundle, "boom", None);
    assert_eq!(formatted, "{FAIL()}");
    assert_matches!(errors.as_slice(), [RenderError::Function { .. }]);

    let (formatted, errors) = format_message(&bundle, "missing", None);
    assert_eq!(formatted, "{NOPE()}");
    assert_matches!(errors.as_slice(), [RenderError::UnknownFunction { .. }]);
}

/// The transform touches literal text only, never placeable output
#[test]
fn test_transform() {
    let mut bundle = en_bundle();
    bundle.set_use_isolating(false);
    bundle.set_transform(str::to_uppercase);
    bundle
        .add_resource("shout = hello, {\"world\"}!".parse().unwrap())
        .unwrap();
    let (formatted, _) = format_message(&bundle, "shout", None);
    assert_eq!(formatted, "HELLO, world!");
}

/// Simple patterns also pass through the transform
#[test]
fn test_transform_simple_pattern() {
    let mut bundle = en_bundle();
    bundle.set_transform(str::to_uppercase);
    bundle.add_resource("plain = hello".parse().unwrap()).unwrap();
    let (formatted, _) = format_message(&bundle, "plain", None);
    assert_eq!(formatted, "HELLO");
}

/// Expansion through references is bounded: each pattern here is small, but
/// the expansion doubles per level and must trip the budget
#[test]
fn test_placeable_expansion_bounded() {
    let bundle = bundle(
        "a = {b}{b}\n\
         b = {c}{c}\n\
         c = {d}{d}\n\
         d = {e}{e}\n\
         e = {f}{f}\n\
         f = {g}{g}\n\
         g = {h}{h}\n\
         h = X",
    );
    // With a sink, the fatal error is collected and the output degrades
    let (formatted, errors) = format_message(&bundle, "a", None);
    assert_eq!(formatted, "{???}");
    assert!(
        errors
            .iter()
            .any(|error| matches!(error, RenderError::TooManyPlaceables))
    );

    // Without a sink it propagates
    let message = bundle.get_message("a").unwrap();
    assert_err!(
        bundle.format_pattern(message.value().unwrap(), None, None),
        "too many placeables"
    );
}

#[test]
fn test_add_resource_conflicts() {
    let mut bundle = en_bundle();
    bundle.add_resource("a = first".parse().unwrap()).unwrap();
    let errors = bundle
        .add_resource("a = second\nb = B".parse().unwrap())
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "message `a` is already defined");

    // The original entry survives; the non-conflicting one was added
    let (formatted, _) = format_message(&bundle, "a", None);
    assert_eq!(formatted, "first");
    assert!(bundle.has_message("b"));

    // Overriding replaces silently
    bundle.add_resource_overriding("a = third".parse().unwrap());
    let (formatted, _) = format_message(&bundle, "a", None);
    assert_eq!(formatted, "third");
}

/// Terms live in their own namespace, invisible to message lookup
#[test]
fn test_terms_are_private() {
    let bundle = bundle("-t = T\nm = M");
    assert!(bundle.has_message("m"));
    assert!(!bundle.has_message("-t"));
    assert!(bundle.get_message("-t").is_none());
}

/// Coerces both a concrete `std::error::Error` and a boxed trait object error
/// (e.g. `FunctionError`, which cannot itself implement `Error`) to `&dyn Error`.
pub(crate) trait AsDynError {
    fn as_dyn_error(&self) -> &(dyn std::error::Error + 'static);
}

impl AsDynError for crate::error::RenderError {
    fn as_dyn_error(&self) -> &(dyn std::error::Error + 'static) {
        self
    }
}

impl AsDynError for Box<dyn std::error::Error + Send + Sync> {
    fn as_dyn_error(&self) -> &(dyn std::error::Error + 'static) {
        &**self
    }
}

/// Assert a result is the `Err` variant, and the stringified error contains
/// the given message
macro_rules! assert_err {
    ($e:expr, $msg:expr) => {{
        use itertools::Itertools as _;

        use $crate::test_util::AsDynError as _;

        let msg = $msg;
        // Include all source errors so wrappers don't hide the important stuff
        let error = $e.unwrap_err();
        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error.as_dyn_error());
        let actual = std::iter::from_fn(|| {
            let current = source?;
            source = current.source();
            Some(current.to_string())
        })
        .join(": ");
        assert!(
            actual.contains(msg),
            "Expected error message to contain {msg:?}, but was: {actual:?}"
        )
    }};
}

/// Assert the given expression matches a pattern, with an optional value
/// extracted from the bound pattern
macro_rules! assert_matches {
    ($expr:expr, $pattern:pat $(,)?) => {
        $crate::test_util::assert_matches!($expr, $pattern => ());
    };
    ($expr:expr, $pattern:pat => $output:expr $(,)?) => {
        match $expr {
            $pattern => $output,
            value => panic!(
                "Unexpected value {value:?} does not match pattern {expected}",
                expected = stringify!($pattern),
            ),
        }
    };
}

pub(crate) use assert_err;
pub(crate) use assert_matches;

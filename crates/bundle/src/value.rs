//! Runtime values produced while formatting patterns

use crate::Bundle;
use chrono::Utc;
use derive_more::From;
use indexmap::IndexMap;
use std::borrow::Cow;

/// Named arguments passed to a function call or a parameterized term. The
/// grammar restricts their values to string and number literals.
pub type NamedArgs = IndexMap<String, Value>;

/// A runtime value: the result of resolving one expression
#[derive(Clone, Debug, From, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    DateTime(DateTime),
    /// Sentinel for a failed resolution, carrying a description of what was
    /// missing. Renders as `{placeholder}` so the failure stays visible in
    /// the output.
    #[from(skip)]
    None(String),
}

impl Value {
    /// The fallback sentinel with no better description, rendering `{???}`
    pub fn none() -> Self {
        Self::None("???".to_owned())
    }

    /// Render to text. Numbers and dates go through the bundle's memoized
    /// formatters.
    pub fn as_string(&self, bundle: &Bundle) -> Cow<'_, str> {
        match self {
            Self::String(value) => Cow::Borrowed(value),
            Self::Number(number) => bundle
                .number_format(&number.options)
                .format(number.value)
                .into(),
            Self::DateTime(date_time) => bundle
                .date_time_format(&date_time.options)
                .format(&date_time.value)
                .into(),
            Self::None(placeholder) => format!("{{{placeholder}}}").into(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(Number::new(value))
    }
}

impl From<chrono::DateTime<Utc>> for Value {
    fn from(value: chrono::DateTime<Utc>) -> Self {
        Self::DateTime(DateTime::new(value))
    }
}

/// Naive timestamps are taken to be UTC wall-clock time
impl From<chrono::NaiveDateTime> for Value {
    fn from(value: chrono::NaiveDateTime) -> Self {
        Self::DateTime(DateTime::new(value.and_utc()))
    }
}

/// Numeric primitives all funnel into [`Number`]
macro_rules! impl_from_number {
    ($($type:ty),* $(,)?) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Self {
                    Self::Number(Number::new(value as f64))
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32);

/// A number together with its formatting options
#[derive(Clone, Debug, PartialEq)]
pub struct Number {
    pub value: f64,
    pub options: NumberOptions,
}

impl Number {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            options: NumberOptions::default(),
        }
    }

    pub fn with_options(value: f64, options: NumberOptions) -> Self {
        Self { value, options }
    }
}

/// Formatting options understood by the number formatter. Also the formatter
/// cache key, hence `Eq + Hash`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NumberOptions {
    pub use_grouping: bool,
    pub minimum_integer_digits: Option<usize>,
    pub minimum_fraction_digits: Option<usize>,
    pub maximum_fraction_digits: Option<usize>,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            use_grouping: true,
            minimum_integer_digits: None,
            minimum_fraction_digits: None,
            maximum_fraction_digits: None,
        }
    }
}

impl NumberOptions {
    /// Overlay caller-supplied named options onto these. Unknown keys and
    /// malformed values are ignored.
    pub fn merge(&mut self, named: &NamedArgs) {
        for (name, value) in named {
            match name.as_str() {
                "useGrouping" => {
                    if let Some(flag) = option_bool(value) {
                        self.use_grouping = flag;
                    }
                }
                "minimumIntegerDigits" => {
                    if let Some(digits) = option_digits(value) {
                        self.minimum_integer_digits = Some(digits);
                    }
                }
                "minimumFractionDigits" => {
                    if let Some(digits) = option_digits(value) {
                        self.minimum_fraction_digits = Some(digits);
                    }
                }
                "maximumFractionDigits" => {
                    if let Some(digits) = option_digits(value) {
                        self.maximum_fraction_digits = Some(digits);
                    }
                }
                _ => {}
            }
        }
    }
}

/// A point in time together with its formatting options
#[derive(Clone, Debug, PartialEq)]
pub struct DateTime {
    pub value: chrono::DateTime<Utc>,
    pub options: DateTimeOptions,
}

impl DateTime {
    pub fn new(value: chrono::DateTime<Utc>) -> Self {
        Self {
            value,
            options: DateTimeOptions::default(),
        }
    }

    pub fn with_options(
        value: chrono::DateTime<Utc>,
        options: DateTimeOptions,
    ) -> Self {
        Self { value, options }
    }
}

/// Formatting options understood by the date-time formatter. Also the
/// formatter cache key.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DateTimeOptions {
    pub date_style: Option<DateTimeStyle>,
    pub time_style: Option<DateTimeStyle>,
}

impl DateTimeOptions {
    /// Overlay caller-supplied named options onto these. Unknown keys and
    /// malformed values are ignored.
    pub fn merge(&mut self, named: &NamedArgs) {
        for (name, value) in named {
            match name.as_str() {
                "dateStyle" => {
                    if let Some(style) = option_style(value) {
                        self.date_style = Some(style);
                    }
                }
                "timeStyle" => {
                    if let Some(style) = option_style(value) {
                        self.time_style = Some(style);
                    }
                }
                _ => {}
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DateTimeStyle {
    Full,
    Long,
    Medium,
    Short,
}

/// Read a boolean option: `"true"`/`"false"` or a number's zeroness
fn option_bool(value: &Value) -> Option<bool> {
    match value {
        Value::String(text) => match text.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(number) => Some(number.value != 0.0),
        _ => None,
    }
}

/// Read a digit-count option: a non-negative number or its string form
fn option_digits(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) if number.value >= 0.0 => {
            Some(number.value as usize)
        }
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

fn option_style(value: &Value) -> Option<DateTimeStyle> {
    let Value::String(text) = value else {
        return None;
    };
    match text.as_str() {
        "full" => Some(DateTimeStyle::Full),
        "long" => Some(DateTimeStyle::Long),
        "medium" => Some(DateTimeStyle::Medium),
        "short" => Some(DateTimeStyle::Short),
        _ => None,
    }
}

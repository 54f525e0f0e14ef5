//! Built-in formatting functions, available unless shadowed by a registered
//! function of the same name

use crate::{
    error::FunctionError,
    value::{DateTime, DateTimeOptions, NamedArgs, Number, NumberOptions, Value},
};
use chrono::Utc;

/// `NUMBER(value, ...)`: coerce the positional argument to a number, merging
/// any options it already carries with the named options (named win)
pub(crate) fn number(
    positional: &[Value],
    named: &NamedArgs,
) -> Result<Value, FunctionError> {
    let argument = positional
        .first()
        .ok_or("NUMBER() takes one positional argument")?;
    match argument {
        // Failures flow through, keeping their provenance visible
        Value::None(placeholder) => {
            Ok(Value::None(format!("NUMBER({placeholder})")))
        }
        Value::Number(number) => {
            let mut number = number.clone();
            number.options.merge(named);
            Ok(Value::Number(number))
        }
        Value::String(text) => {
            let value: f64 = text
                .trim()
                .parse()
                .map_err(|_| format!("not a number: {text:?}"))?;
            let mut options = NumberOptions::default();
            options.merge(named);
            Ok(Value::Number(Number::with_options(value, options)))
        }
        Value::DateTime(date_time) => {
            // Dates interchange as epoch milliseconds
            let mut options = NumberOptions::default();
            options.merge(named);
            Ok(Value::Number(Number::with_options(
                date_time.value.timestamp_millis() as f64,
                options,
            )))
        }
    }
}

/// `DATETIME(value, ...)`: coerce the positional argument to a date-time,
/// merging any options it already carries with the named options (named win)
pub(crate) fn date_time(
    positional: &[Value],
    named: &NamedArgs,
) -> Result<Value, FunctionError> {
    let argument = positional
        .first()
        .ok_or("DATETIME() takes one positional argument")?;
    match argument {
        Value::None(placeholder) => {
            Ok(Value::None(format!("DATETIME({placeholder})")))
        }
        Value::DateTime(date_time) => {
            let mut date_time = date_time.clone();
            date_time.options.merge(named);
            Ok(Value::DateTime(date_time))
        }
        // Numbers are epoch milliseconds
        Value::Number(number) => {
            let value = chrono::DateTime::from_timestamp_millis(
                number.value as i64,
            )
            .ok_or_else(|| {
                format!("timestamp out of range: {}", number.value)
            })?;
            let mut options = DateTimeOptions::default();
            options.merge(named);
            Ok(Value::DateTime(DateTime::with_options(value, options)))
        }
        // Strings are RFC 3339 wall-clock values
        Value::String(text) => {
            let value = chrono::DateTime::parse_from_rfc3339(text)
                .map_err(|error| format!("invalid date-time: {error}"))?
                .with_timezone(&Utc);
            let mut options = DateTimeOptions::default();
            options.merge(named);
            Ok(Value::DateTime(DateTime::with_options(value, options)))
        }
    }
}

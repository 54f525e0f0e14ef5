//! Locale-facing formatters and their bundle-lifetime cache.
//!
//! Plural categorization delegates to CLDR data via `intl_pluralrules`.
//! Number and date rendering is deliberately locale-independent: it honors
//! the digit-width, grouping and style options but makes no claim of
//! matching any national formatting library bit for bit.

use crate::value::{DateTimeOptions, DateTimeStyle, NumberOptions};
use chrono::Utc;
use intl_pluralrules::{PluralCategory, PluralRuleType, operands::PluralOperands};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use unic_langid::LanguageIdentifier;

/// Memoized formatters, keyed by their options. The option types are
/// `Eq + Hash`, which doubles as the canonical fingerprint; the formatter
/// kind is the map it lives in. Entries live as long as the bundle. The
/// mutexes keep a fully-built bundle shareable for read-only formatting.
#[derive(Default)]
pub(crate) struct IntlCache {
    numbers: Mutex<HashMap<NumberOptions, Arc<NumberFormat>>>,
    date_times: Mutex<HashMap<DateTimeOptions, Arc<DateTimeFormat>>>,
    plurals: Mutex<HashMap<NumberOptions, Arc<PluralRules>>>,
}

impl IntlCache {
    pub fn number_format(&self, options: &NumberOptions) -> Arc<NumberFormat> {
        let mut cache = self.numbers.lock().unwrap();
        Arc::clone(
            cache
                .entry(options.clone())
                .or_insert_with(|| Arc::new(NumberFormat::new(options.clone()))),
        )
    }

    pub fn date_time_format(
        &self,
        options: &DateTimeOptions,
    ) -> Arc<DateTimeFormat> {
        let mut cache = self.date_times.lock().unwrap();
        Arc::clone(cache.entry(options.clone()).or_insert_with(|| {
            Arc::new(DateTimeFormat::new(options.clone()))
        }))
    }

    pub fn plural_rules(
        &self,
        locales: &[LanguageIdentifier],
        options: &NumberOptions,
    ) -> Arc<PluralRules> {
        let mut cache = self.plurals.lock().unwrap();
        Arc::clone(cache.entry(options.clone()).or_insert_with(|| {
            Arc::new(PluralRules::new(locales, options.clone()))
        }))
    }
}

/// Number renderer honoring grouping and digit-width options
#[derive(Debug)]
pub(crate) struct NumberFormat {
    options: NumberOptions,
}

impl NumberFormat {
    fn new(options: NumberOptions) -> Self {
        Self { options }
    }

    pub fn format(&self, value: f64) -> String {
        let mut string = format_fraction(value, &self.options);
        if let Some(minimum) = self.options.minimum_integer_digits {
            pad_integer(&mut string, minimum);
        }
        if self.options.use_grouping {
            group_integer(&mut string);
        }
        string
    }
}

/// Apply the fraction-digit rules: render at least the minimum digits and at
/// most the maximum, which defaults to `max(minimum, 3)`
pub(crate) fn format_fraction(value: f64, options: &NumberOptions) -> String {
    let minimum = options.minimum_fraction_digits.unwrap_or(0);
    let maximum = options
        .maximum_fraction_digits
        .unwrap_or(minimum.max(3))
        .max(minimum);
    let mut string = format!("{value:.maximum$}");
    if maximum > minimum {
        // Trailing zeros beyond the minimum width are dropped
        let excess = string
            .bytes()
            .rev()
            .take_while(|byte| *byte == b'0')
            .count()
            .min(maximum - minimum);
        string.truncate(string.len() - excess);
        if string.ends_with('.') {
            string.pop();
        }
    }
    string
}

/// Zero-pad the integer part, after any sign, to the requested width
fn pad_integer(string: &mut String, minimum: usize) {
    let start = usize::from(string.starts_with('-'));
    let end = string.find('.').unwrap_or(string.len());
    let digits = end - start;
    if digits < minimum {
        string.insert_str(start, &"0".repeat(minimum - digits));
    }
}

/// Insert `,` separators into the integer part, every three digits from the
/// right
fn group_integer(string: &mut String) {
    let start = usize::from(string.starts_with('-'));
    let end = string.find('.').unwrap_or(string.len());
    let mut index = end;
    while index > start + 3 {
        index -= 3;
        string.insert(index, ',');
    }
}

/// Date-time renderer mapping `dateStyle`/`timeStyle` onto chrono format
/// strings
#[derive(Debug)]
pub(crate) struct DateTimeFormat {
    options: DateTimeOptions,
}

impl DateTimeFormat {
    fn new(options: DateTimeOptions) -> Self {
        Self { options }
    }

    pub fn format(&self, value: &chrono::DateTime<Utc>) -> String {
        let date = self
            .options
            .date_style
            .map(|style| value.format(date_format(style)).to_string());
        let time = self
            .options
            .time_style
            .map(|style| value.format(time_format(style)).to_string());
        match (date, time) {
            (Some(date), Some(time)) => format!("{date}, {time}"),
            (Some(date), None) => date,
            (None, Some(time)) => time,
            // With no styles requested, present a compact date
            (None, None) => value.format("%-m/%-d/%Y").to_string(),
        }
    }
}

fn date_format(style: DateTimeStyle) -> &'static str {
    match style {
        DateTimeStyle::Full => "%A, %B %-d, %Y",
        DateTimeStyle::Long => "%B %-d, %Y",
        DateTimeStyle::Medium => "%b %-d, %Y",
        DateTimeStyle::Short => "%-m/%-d/%y",
    }
}

fn time_format(style: DateTimeStyle) -> &'static str {
    match style {
        DateTimeStyle::Short => "%-I:%M %p",
        _ => "%-I:%M:%S %p",
    }
}

/// CLDR plural categorization for a bundle's locale chain. The options come
/// from the select expression's resolved selector, so a `minimumFractionDigits`
/// carried on the number influences the category the way the rendered string
/// would.
pub(crate) struct PluralRules {
    rules: Option<intl_pluralrules::PluralRules>,
    options: NumberOptions,
}

impl PluralRules {
    fn new(locales: &[LanguageIdentifier], options: NumberOptions) -> Self {
        // The first locale with plural data wins. Region-qualified locales
        // without their own entry fall back to the bare language.
        let rules = locales.iter().find_map(|locale| {
            intl_pluralrules::PluralRules::create(
                locale.clone(),
                PluralRuleType::CARDINAL,
            )
            .or_else(|_| {
                intl_pluralrules::PluralRules::create(
                    LanguageIdentifier::from_parts(
                        locale.language,
                        None,
                        None,
                        &[],
                    ),
                    PluralRuleType::CARDINAL,
                )
            })
            .ok()
        });
        Self { rules, options }
    }

    /// Categorize a number, or `None` if no locale in the chain has plural
    /// data. Operands are derived from the fraction-digit rendering so that
    /// `1.0` can select differently from `1`.
    pub fn select(&self, value: f64) -> Option<&'static str> {
        let rules = self.rules.as_ref()?;
        let rendered = format_fraction(value, &self.options);
        let operands = PluralOperands::try_from(rendered.as_str()).ok()?;
        match rules.select(operands).ok()? {
            PluralCategory::ZERO => Some("zero"),
            PluralCategory::ONE => Some("one"),
            PluralCategory::TWO => Some("two"),
            PluralCategory::FEW => Some("few"),
            PluralCategory::MANY => Some("many"),
            PluralCategory::OTHER => Some("other"),
        }
    }
}

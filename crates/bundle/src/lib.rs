//! Message formatting for lilt: store parsed resources in a [`Bundle`] and
//! format their patterns against caller-supplied arguments.
//!
//! ```
//! use lilt_bundle::{Args, Bundle};
//! use lilt_syntax::Resource;
//!
//! let resource: Resource = "hello = Hello, {$name}!".parse().unwrap();
//! let mut bundle = Bundle::new(vec!["en-US".parse().unwrap()]);
//! bundle.set_use_isolating(false);
//! bundle.add_resource(resource).unwrap();
//!
//! let message = bundle.get_message("hello").unwrap();
//! let args = Args::from_iter([("name", "Anna")]);
//! let mut errors = Vec::new();
//! let formatted = bundle
//!     .format_pattern(message.value().unwrap(), Some(&args), Some(&mut errors))
//!     .unwrap();
//! assert_eq!(formatted, "Hello, Anna!");
//! assert!(errors.is_empty());
//! ```

mod builtins;
mod error;
mod intl;
mod resolver;
mod scope;
#[cfg(test)]
mod test_util;
#[cfg(test)]
mod tests;
mod value;

pub use error::{FunctionError, RenderError, ResourceConflict};
pub use value::{
    DateTime, DateTimeOptions, DateTimeStyle, NamedArgs, Number,
    NumberOptions, Value,
};

use crate::{
    intl::{DateTimeFormat, IntlCache, NumberFormat, PluralRules},
    scope::Scope,
};
use indexmap::IndexMap;
use lilt_syntax::{Entry, Identifier, Pattern, Resource};
use std::{borrow::Cow, sync::Arc};
use unic_langid::LanguageIdentifier;

/// A formatting function registered on a bundle: positional values in, named
/// options in, value out. Referenced from patterns as `{NAME(...)}`.
pub type BundleFunction =
    Box<dyn Fn(&[Value], &NamedArgs) -> Result<Value, FunctionError> + Send + Sync>;

/// A transform applied to every piece of literal text as it is formatted,
/// e.g. for pseudolocalization. Placeable output is not transformed.
pub type TextTransform = Box<dyn Fn(&str) -> String + Send + Sync>;

/// A store of messages and terms for one locale chain, plus the runtime
/// machinery to format them.
///
/// Messages and terms accumulate across [`add_resource`](Self::add_resource)
/// calls and live in separate namespaces; terms (ids starting with `-`) are
/// not addressable through [`get_message`](Self::get_message). Once all
/// resources are added, a bundle can be shared freely for read-only
/// formatting.
pub struct Bundle {
    locales: Vec<LanguageIdentifier>,
    messages: IndexMap<Identifier, Entry>,
    terms: IndexMap<Identifier, Entry>,
    functions: IndexMap<String, BundleFunction>,
    use_isolating: bool,
    transform: Option<TextTransform>,
    intls: IntlCache,
}

impl Bundle {
    /// Create an empty bundle for a locale fallback chain, most preferred
    /// first
    pub fn new(locales: Vec<LanguageIdentifier>) -> Self {
        Self {
            locales,
            messages: IndexMap::new(),
            terms: IndexMap::new(),
            functions: IndexMap::new(),
            use_isolating: true,
            transform: None,
            intls: IntlCache::default(),
        }
    }

    pub fn locales(&self) -> &[LanguageIdentifier] {
        &self.locales
    }

    /// Control whether placeable output is wrapped in Unicode directional
    /// isolates (FSI/PDI). On by default; turn it off if the surrounding
    /// surface cannot render the isolate characters.
    pub fn set_use_isolating(&mut self, use_isolating: bool) {
        self.use_isolating = use_isolating;
    }

    /// Install a transform applied to all literal text during formatting
    pub fn set_transform<F>(&mut self, transform: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(transform));
    }

    /// Register a formatting function, shadowing any built-in of the same
    /// name. Function names in patterns are all upper-case.
    pub fn add_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value], &NamedArgs) -> Result<Value, FunctionError>
            + Send
            + Sync
            + 'static,
    {
        self.functions.insert(name.into(), Box::new(function));
    }

    /// Add every entry of a resource to the bundle. Entries whose id is
    /// already taken are rejected, one error each; the rest are added.
    pub fn add_resource(
        &mut self,
        resource: Resource,
    ) -> Result<(), Vec<ResourceConflict>> {
        let mut errors = Vec::new();
        for entry in resource.into_entries() {
            let is_term = entry.is_term();
            let store = if is_term { &mut self.terms } else { &mut self.messages };
            if store.contains_key(entry.id().as_str()) {
                let id = entry.id().clone();
                let conflict = if is_term {
                    ResourceConflict::Term { id }
                } else {
                    ResourceConflict::Message { id }
                };
                tracing::warn!(%conflict, "skipping conflicting entry");
                errors.push(conflict);
                continue;
            }
            store.insert(entry.id().clone(), entry);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Add every entry of a resource, silently replacing entries whose id is
    /// already taken
    pub fn add_resource_overriding(&mut self, resource: Resource) {
        for entry in resource.into_entries() {
            let store = if entry.is_term() {
                &mut self.terms
            } else {
                &mut self.messages
            };
            store.insert(entry.id().clone(), entry);
        }
    }

    pub fn has_message(&self, id: &str) -> bool {
        self.messages.contains_key(id)
    }

    pub fn get_message(&self, id: &str) -> Option<&Entry> {
        self.messages.get(id)
    }

    /// Format a pattern of one of this bundle's entries.
    ///
    /// With an error sink supplied the call always produces output: non-fatal
    /// resolution failures are collected in the sink and substituted with
    /// visible `{placeholder}` text, and even a fatal error (a runaway
    /// placeable expansion) is appended there while the output degrades to
    /// `{???}`. Without a sink the first error is returned instead.
    pub fn format_pattern(
        &self,
        pattern: &Pattern,
        args: Option<&Args>,
        mut errors: Option<&mut Vec<RenderError>>,
    ) -> Result<String, RenderError> {
        // Simple patterns are just text
        if let Pattern::Simple(text) = pattern {
            return Ok(self.transform(text).into_owned());
        }
        let result = {
            let mut scope = Scope::new(self, args, errors.as_deref_mut());
            resolver::resolve_pattern(&mut scope, pattern)
        };
        match result {
            Ok(value) => Ok(value.as_string(self).into_owned()),
            Err(fatal) => match errors {
                Some(errors) => {
                    errors.push(fatal);
                    Ok(Value::none().as_string(self).into_owned())
                }
                None => Err(fatal),
            },
        }
    }

    pub(crate) fn term(&self, id: &str) -> Option<&Entry> {
        self.terms.get(id)
    }

    pub(crate) fn function(&self, name: &str) -> Option<&BundleFunction> {
        self.functions.get(name)
    }

    pub(crate) fn use_isolating(&self) -> bool {
        self.use_isolating
    }

    /// Run literal text through the configured transform, if any
    pub(crate) fn transform<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.transform {
            Some(transform) => Cow::Owned(transform(text)),
            None => Cow::Borrowed(text),
        }
    }

    pub(crate) fn number_format(
        &self,
        options: &NumberOptions,
    ) -> Arc<NumberFormat> {
        self.intls.number_format(options)
    }

    pub(crate) fn date_time_format(
        &self,
        options: &DateTimeOptions,
    ) -> Arc<DateTimeFormat> {
        self.intls.date_time_format(options)
    }

    pub(crate) fn plural_rules(
        &self,
        options: &NumberOptions,
    ) -> Arc<PluralRules> {
        self.intls.plural_rules(&self.locales, options)
    }
}

/// Arguments supplied to [`Bundle::format_pattern`], mapping variable names
/// to values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args(NamedArgs);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Args {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl From<NamedArgs> for Args {
    fn from(named: NamedArgs) -> Self {
        Self(named)
    }
}

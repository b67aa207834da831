use std::fmt::{Display, Write};
use std::sync::Arc;

use super::{Catalog, DEFAULT_LANGUAGE, plural_form};

/// Performs translation lookups for a single language.
///
/// A printer is cheap to create and is meant to be created for each render
/// call; it is never shared between requests.
#[derive(Debug, Clone)]
pub struct Printer {
    language: String,
    catalog: Arc<Catalog>,
}

impl Printer {
    pub fn new<L: Into<String>>(language: L, catalog: Arc<Catalog>) -> Printer {
        Printer { language: language.into(), catalog }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Translates `key` and substitutes `args` into the translation.
    ///
    /// The translation is looked up in the printer's language, then in
    /// [`DEFAULT_LANGUAGE`]. When neither has it, `key` itself is formatted.
    pub fn printf(&self, key: &str, args: &[&dyn Display]) -> String {
        let format = self.catalog.singular(&self.language, key)
            .or_else(|| self.catalog.singular(DEFAULT_LANGUAGE, key))
            .unwrap_or(key);

        sprintf(format, args)
    }

    /// Translates the plural form of `key` for the count `n` and substitutes
    /// `args` into it. Returns `key` verbatim if no usable form exists.
    pub fn plural(&self, key: &str, n: i64, args: &[&dyn Display]) -> String {
        let (language, forms) = match self.catalog.plural(&self.language, key) {
            Some(forms) => (self.language.as_str(), forms),
            None => match self.catalog.plural(DEFAULT_LANGUAGE, key) {
                Some(forms) => (DEFAULT_LANGUAGE, forms),
                None => return key.to_owned(),
            },
        };

        match forms.get(plural_form(language, n)) {
            Some(format) => sprintf(format, args),
            None => key.to_owned(),
        }
    }
}

/// Substitutes `args`, in order, for the verbs in `format`.
///
/// The verbs `%s`, `%d`, `%v` and `%q` each consume one argument; `%q` wraps
/// it in double quotes and `%%` is a literal `%`. A verb without a matching
/// argument is written as `%!<verb>(MISSING)`; unknown verbs are copied
/// through unchanged.
///
/// ```rust
/// use reader_templates::locale::sprintf;
///
/// assert_eq!(sprintf("%d new entries in %s", &[&3, &"Tech"]), "3 new entries in Tech");
/// assert_eq!(sprintf("100%%", &[]), "100%");
/// ```
pub fn sprintf(format: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'd' | 'v' | 'q')) => match args.next() {
                Some(arg) if verb == 'q' => { let _ = write!(out, "\"{}\"", arg); }
                Some(arg) => { let _ = write!(out, "{}", arg); }
                None => { let _ = write!(out, "%!{}(MISSING)", verb); }
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    out
}

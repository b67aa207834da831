use std::collections::HashMap;
use std::path::Path;

use rocket::serde::Deserialize;

use crate::error::{Error, CatalogError};

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", untagged)]
enum Entry {
    Singular(String),
    Plural(Vec<String>),
}

#[derive(Debug, Default)]
struct Translations {
    singulars: HashMap<String, String>,
    plurals: HashMap<String, Vec<String>>,
}

impl Translations {
    fn from_json(json: &str) -> Result<Translations, serde_json::Error> {
        let entries: HashMap<String, Entry> = serde_json::from_str(json)?;

        let mut translations = Translations::default();
        for (key, entry) in entries {
            match entry {
                Entry::Singular(text) => { translations.singulars.insert(key, text); }
                Entry::Plural(forms) => { translations.plurals.insert(key, forms); }
            }
        }

        Ok(translations)
    }
}

/// The translations of every known language.
///
/// Each language is a JSON object mapping a message key either to a string
/// or, for pluralized messages, to the list of plural forms in the order
/// given by [`plural_form()`](super::plural_form()).
///
/// ```json
/// {
///     "page.about.title": "About",
///     "page.unread_entry_count": ["%d unread entry", "%d unread entries"]
/// }
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    languages: HashMap<String, Translations>,
}

impl Catalog {
    /// Returns an empty catalog. Every lookup in it yields the key.
    pub fn new() -> Catalog {
        Catalog::default()
    }

    /// Loads every `<language>.json` file directly inside `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Catalog, Error> {
        let dir = dir.as_ref();
        let walker = walkdir::WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();

        let mut catalog = Catalog::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::Catalog(dir.into(), CatalogError::Io(e.into())))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "json") {
                continue;
            }

            let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let json = std::fs::read_to_string(path)
                .map_err(|e| Error::Catalog(path.into(), e.into()))?;

            let translations = Translations::from_json(&json)
                .map_err(|e| Error::Catalog(path.into(), e.into()))?;

            debug_!("Loaded {} translations for '{}'.",
                translations.singulars.len() + translations.plurals.len(), language);

            catalog.languages.insert(language.to_owned(), translations);
        }

        Ok(catalog)
    }

    /// Adds (or replaces) the translations of `language` from a JSON object.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reader_templates::locale::{Catalog, Printer};
    ///
    /// let catalog = Catalog::new()
    ///     .with_json("fr_FR", r#"{ "menu.feeds": "Abonnements" }"#)
    ///     .unwrap();
    ///
    /// let printer = Printer::new("fr_FR", catalog.into());
    /// assert_eq!(printer.printf("menu.feeds", &[]), "Abonnements");
    /// ```
    pub fn with_json(mut self, language: &str, json: &str) -> Result<Catalog, serde_json::Error> {
        let translations = Translations::from_json(json)?;
        self.languages.insert(language.to_owned(), translations);
        Ok(self)
    }

    /// Returns `true` if translations for `language` were loaded.
    pub fn contains_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// The loaded languages, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<_> = self.languages.keys().map(|s| s.as_str()).collect();
        languages.sort_unstable();
        languages
    }

    pub(crate) fn singular(&self, language: &str, key: &str) -> Option<&str> {
        self.languages.get(language)
            .and_then(|t| t.singulars.get(key))
            .map(|s| s.as_str())
    }

    pub(crate) fn plural(&self, language: &str, key: &str) -> Option<&[String]> {
        self.languages.get(language)
            .and_then(|t| t.plurals.get(key))
            .map(|forms| forms.as_slice())
    }
}

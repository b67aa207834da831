//! Translation lookups for a single target language.
//!
//! A [`Catalog`] holds the translations of every language; a [`Printer`]
//! performs lookups for one language, falling back to [`DEFAULT_LANGUAGE`]
//! and finally to the key itself.

mod catalog;
mod plural;
mod printer;

pub use catalog::Catalog;
pub use plural::plural_form;
pub use printer::{Printer, sprintf};

/// The language whose translations back every other language.
pub const DEFAULT_LANGUAGE: &str = "en_US";

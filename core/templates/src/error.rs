//! Errors raised while loading or rendering templates.

use std::{io, fmt};
use std::path::PathBuf;

use crate::Group;

/// An error that occurs while loading templates or translations, or while
/// rendering a template.
///
/// Errors returned by [`Engine::parse_templates()`](crate::Engine::parse_templates())
/// are startup errors and should abort the application. The remaining
/// variants describe a broken contract between a handler and a template.
#[derive(Debug)]
pub enum Error {
    /// A template source group or file could not be read.
    Io(Group, Option<String>, io::Error),
    /// A template failed to compile.
    Compile(String, minijinja::Error),
    /// A translation catalog could not be read or decoded.
    Catalog(PathBuf, CatalogError),
    /// No template with this name was loaded.
    UnknownTemplate(String),
    /// The render data for this template lacks a string `language` field.
    MissingLanguage(String),
    /// Executing this template failed.
    Render(String, minijinja::Error),
}

/// The cause of an [`Error::Catalog`].
#[derive(Debug)]
pub enum CatalogError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(group, Some(name), e) => {
                write!(f, "failed to read template '{}' in group '{}': {}", name, group, e)
            }
            Error::Io(group, None, e) => write!(f, "failed to list template group '{}': {}", group, e),
            Error::Compile(name, e) => write!(f, "template '{}' failed to compile: {}", name, e),
            Error::Catalog(path, e) => write!(f, "invalid translation catalog {:?}: {}", path, e),
            Error::UnknownTemplate(name) => write!(f, "template '{}' does not exist", name),
            Error::MissingLanguage(name) => {
                write!(f, "render data for '{}' has no string `language` field", name)
            }
            Error::Render(name, e) => write!(f, "template '{}' failed to render: {}", name, e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(_, _, e) => Some(e),
            Error::Compile(_, e) | Error::Render(_, e) => Some(e),
            Error::Catalog(_, CatalogError::Io(e)) => Some(e),
            Error::Catalog(_, CatalogError::Json(e)) => Some(e),
            Error::UnknownTemplate(_) | Error::MissingLanguage(_) => None,
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => e.fmt(f),
            CatalogError::Json(e) => e.fmt(f),
        }
    }
}

impl From<io::Error> for CatalogError {
    fn from(e: io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

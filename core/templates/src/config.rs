use std::path::PathBuf;

use rocket::figment::{self, Figment};
use rocket::figment::value::magic::RelativePathBuf;

use crate::Helpers;

pub(crate) const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub(crate) const DEFAULT_LOCALE_DIR: &str = "locales";
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost";

/// Templating configuration, read from Rocket's figment.
///
///   * `template_dir` (**default: `templates/`**): the directory holding the
///     `common/`, `views/` and `standalone/` groups.
///   * `locale_dir` (**default: `locales/`**): the directory holding one
///     `<language>.json` catalog per language.
///   * `base_url` (**default: `http://localhost`**): returned by the
///     `base_url()` helper.
///   * `root_url` (**default: empty**): the path prefix returned by the
///     `root_url()` helper.
///
/// Relative paths are relative to the configuration file or, if there is no
/// file, to the current working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub template_dir: PathBuf,
    pub locale_dir: PathBuf,
    pub base_url: String,
    pub root_url: String,
}

impl Config {
    pub fn from_figment(figment: &Figment) -> Result<Config, figment::Error> {
        fn path(figment: &Figment, key: &str, default: &str) -> Result<PathBuf, figment::Error> {
            match figment.extract_inner::<RelativePathBuf>(key) {
                Ok(path) => Ok(path.relative()),
                Err(e) if e.missing() => Ok(default.into()),
                Err(e) => Err(e),
            }
        }

        fn string(figment: &Figment, key: &str, default: &str) -> Result<String, figment::Error> {
            match figment.extract_inner::<String>(key) {
                Ok(value) => Ok(value),
                Err(e) if e.missing() => Ok(default.into()),
                Err(e) => Err(e),
            }
        }

        Ok(Config {
            template_dir: path(figment, "template_dir", DEFAULT_TEMPLATE_DIR)?,
            locale_dir: path(figment, "locale_dir", DEFAULT_LOCALE_DIR)?,
            base_url: string(figment, "base_url", DEFAULT_BASE_URL)?,
            root_url: string(figment, "root_url", "")?.trim_end_matches('/').to_owned(),
        })
    }

    pub fn helpers(&self) -> Helpers {
        Helpers { base_url: self.base_url.clone(), root_url: self.root_url.clone() }
    }
}

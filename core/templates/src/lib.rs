//! HTML view rendering for the feed reader.
//!
//! This crate compiles the reader's templates once at startup and renders
//! them by name with caller-supplied data. Templates come in three groups,
//! read from a [`TemplateSource`]:
//!
//! | group         | compiled as                                              |
//! |---------------|----------------------------------------------------------|
//! | `common/`     | all files concatenated, by name, into the base [`COMMON`] |
//! | `views/`      | an extension of [`COMMON`], overriding its blocks         |
//! | `standalone/` | a template of its own, without the common layout          |
//!
//! Views and standalone templates are rendered by file name, extension
//! included: `views/about.html` is rendered as `"about.html"`.
//!
//! # Usage
//!
//!   1. Lay out `${template_dir}/{common,views,standalone}/` and one
//!      `${locale_dir}/<language>.json` catalog per language.
//!
//!   2. Attach [`View::fairing()`] and return a [`View`] from your routes.
//!      The render data must carry the caller's `language`:
//!
//!      ```rust
//!      # #[macro_use] extern crate rocket;
//!      use reader_request::RequestContext;
//!      use reader_templates::{View, context};
//!
//!      #[get("/about")]
//!      fn about(ctxt: &RequestContext) -> View {
//!          View::render("about.html", context! {
//!              language: ctxt.user_language(),
//!              timezone: ctxt.user_timezone(),
//!              version: env!("CARGO_PKG_VERSION"),
//!          })
//!      }
//!
//!      #[launch]
//!      fn rocket() -> _ {
//!          rocket::build()
//!              .mount("/", routes![about])
//!              .attach(View::fairing())
//!      }
//!      ```
//!
//! Outside of Rocket, build an [`Engine`] directly and call
//! [`Engine::render()`].
//!
//! ## Configuration
//!
//! See [`Config`] for the keys read from Rocket's figment: `template_dir`,
//! `locale_dir`, `base_url` and `root_url`.
//!
//! ## Helpers
//!
//! Every template can call the static functions listed on [`Helpers`]. In
//! addition, each render call binds three functions for the caller's
//! language:
//!
//!   * `t(key, args...)`: the translation of `key`, formatted with `args`. An
//!     error placed in the render data with [`ErrorMessage::value()`] renders
//!     as its message.
//!   * `plural(key, n, args...)`: the plural form of `key` for `n`.
//!   * `elapsed(timezone, instant)`: a localized "3 days ago", for an RFC 3339
//!     string or Unix seconds.
//!
//! Lookups fall back to [`locale::DEFAULT_LANGUAGE`], then to the key itself.

#[macro_use] extern crate rocket;

#[doc(inline)]
/// The minijinja templating engine library, reexported.
pub use minijinja;

#[doc(hidden)]
pub use rocket::serde;

pub mod locale;

mod error;
mod source;
mod elapsed;
mod helpers;
mod engine;
mod config;
mod fairing;
mod view;

pub use error::{Error, CatalogError};
pub use source::{Group, TemplateSource, DirSource, MemorySource};
pub use helpers::{Helpers, ErrorMessage};
pub use engine::{Engine, COMMON, BASE};
pub use config::Config;
pub use view::View;

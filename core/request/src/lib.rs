//! Per-request context for the feed reader's web views.
//!
//! Upstream middleware (authentication, session loading, CSRF issuance, and so
//! on) resolves everything a handler needs to know about the caller and stores
//! it in a [`RequestContext`] before the handler runs. Handlers then read those
//! values back through typed accessors, each of which has a documented
//! fallback: an absent or mistyped value never produces an error.
//!
//! # Usage
//!
//! Middleware attaches a context to the request-local cache, typically from a
//! request fairing:
//!
//! ```rust
//! use rocket::fairing::AdHoc;
//! use reader_request::{ContextKey, RequestContext};
//!
//! let fairing = AdHoc::on_request("Session", |req, _| Box::pin(async move {
//!     let ctxt = RequestContext::new()
//!         .with(ContextKey::IsAuthenticated, true)
//!         .with(ContextKey::UserLanguage, "fr_FR");
//!
//!     RequestContext::attach(req, ctxt);
//! }));
//! ```
//!
//! Handlers receive it as a request guard. The guard never fails: when no
//! middleware ran, an empty context is returned and every accessor yields its
//! default.
//!
//! ```rust
//! # #[macro_use] extern crate rocket;
//! use reader_request::RequestContext;
//!
//! #[get("/")]
//! fn index(ctxt: &RequestContext) -> String {
//!     format!("{} ({})", ctxt.user_name(), ctxt.user_language())
//! }
//! ```

mod key;
mod value;
mod context;
mod session;

pub use key::ContextKey;
pub use value::ContextValue;
pub use context::RequestContext;
pub use session::WebAuthnSession;

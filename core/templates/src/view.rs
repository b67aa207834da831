use std::borrow::Cow;

use minijinja::Value;
use rocket::{Rocket, Orbit, Ignite, Sentinel};
use rocket::fairing::Fairing;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::http::{ContentType, Status};
use rocket::serde::Serialize;
use rocket::yansi::Paint;

use crate::Engine;
use crate::fairing::TemplateFairing;

/// Responder that renders a view or standalone template as HTML.
///
/// The render data is serialized when the `View` is created; the template
/// itself is rendered at response time by the managed [`Engine`]. Unlike
/// [`Engine::render()`], a failed render does not panic: it is logged and
/// answered with `500 Internal Server Error`.
///
/// See the [crate root](crate) for usage details.
#[derive(Debug)]
pub struct View {
    name: Cow<'static, str>,
    data: Value,
}

impl View {
    /// Returns the fairing that initializes the template [`Engine`].
    ///
    /// This fairing _must_ be attached to any `Rocket` instance that returns
    /// `View`s; launching without it fails.
    ///
    /// ```rust
    /// use reader_templates::View;
    ///
    /// let rocket = rocket::build().attach(View::fairing());
    /// ```
    pub fn fairing() -> impl Fairing {
        TemplateFairing
    }

    /// Renders the template `name` with `data`, which must serialize to a map
    /// holding a string `language` field.
    ///
    /// ```rust
    /// use reader_templates::{View, context};
    ///
    /// let view = View::render("unread.html", context! {
    ///     language: "en_US",
    ///     entries: Vec::<String>::new(),
    /// });
    /// ```
    #[inline]
    pub fn render<S, C>(name: S, data: C) -> View
        where S: Into<Cow<'static, str>>, C: Serialize
    {
        View { name: name.into(), data: Value::from_serialize(&data) }
    }

    /// Renders the template `name` with `data` to a `String`, using the
    /// engine managed by `rocket`. Returns `None`, after logging the cause, if
    /// the fairing is missing or rendering fails. Meant for tests.
    pub fn show<S, C>(rocket: &Rocket<Orbit>, name: S, data: C) -> Option<String>
        where S: Into<Cow<'static, str>>, C: Serialize
    {
        let engine = rocket.state::<Engine>().or_else(|| {
            warn!("Uninitialized template engine: missing fairing.");
            info!("To use templates, you must attach `View::fairing()`.");
            None
        })?;

        let view = View::render(name, data);
        let bytes = view.finalize(engine).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn finalize(self, engine: &Engine) -> Result<Vec<u8>, Status> {
        engine.try_render(&self.name, self.data).map_err(|e| {
            error_!("{}", e);
            Status::InternalServerError
        })
    }
}

impl<'r> Responder<'r, 'static> for View {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let engine = req.rocket().state::<Engine>().ok_or_else(|| {
            error_!("Uninitialized template engine: missing fairing.");
            info_!("To use templates, you must attach `View::fairing()`.");
            Status::InternalServerError
        })?;

        (ContentType::HTML, self.finalize(engine)?).respond_to(req)
    }
}

impl Sentinel for View {
    fn abort(rocket: &Rocket<Ignite>) -> bool {
        if rocket.state::<Engine>().is_none() {
            let view = "View".primary().bold();
            let fairing = "View::fairing()".primary().bold();
            error!("returning `{}` responder without attaching `{}`.", view, fairing);
            info_!("To render templates, you must attach `{}`.", fairing);
            return true;
        }

        false
    }
}

/// Creates inline render data.
///
/// Invocations expand to a value of an anonymous type implementing
/// [`Serialize`] as a map. Fields can be literal expressions or variables
/// captured from the surrounding scope, as long as they implement
/// `Serialize`; shorthand field syntax is supported.
///
/// Data passed to [`View::render()`] or [`Engine::render()`] must include a
/// string `language` field: it selects the translations used by the `t`,
/// `plural` and `elapsed` helpers. Nested invocations need no `language`.
///
/// ```rust
/// use reader_templates::context;
///
/// let language = "en_US";
/// let data = context! {
///     language,
///     unread: 3,
///     feed: context! { title: "Release notes", site_url: "https://example.org" },
/// };
/// ```
#[macro_export]
macro_rules! context {
    ($($key:ident $(: $value:expr)?),*$(,)?) => {{
        use $crate::serde::ser::{Serialize, Serializer, SerializeMap};
        use ::std::fmt::{Debug, Formatter};
        use ::std::result::Result;

        #[allow(non_camel_case_types)]
        struct RenderData<$($key: Serialize),*> {
            $($key: $key),*
        }

        #[allow(non_camel_case_types)]
        impl<$($key: Serialize),*> Serialize for RenderData<$($key),*> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where S: Serializer,
            {
                let mut map = serializer.serialize_map(None)?;
                $(map.serialize_entry(stringify!($key), &self.$key)?;)*
                map.end()
            }
        }

        #[allow(non_camel_case_types)]
        impl<$($key: Debug + Serialize),*> Debug for RenderData<$($key),*> {
            fn fmt(&self, f: &mut Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct("context!")
                    $(.field(stringify!($key), &self.$key))*
                    .finish()
            }
        }

        RenderData {
            $($key $(: $value)?),*
        }
    }};
}

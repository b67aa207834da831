//! Template helper functions.
//!
//! [`Helpers`] is the static table bound to every template when templates are
//! parsed. The locale-aware helpers (`elapsed`, `t` and `plural`) close over a
//! per-call [`Printer`] and are produced by [`call_scoped()`] for a single
//! render call only.

use std::sync::Arc;

use minijinja::{Environment, Error, ErrorKind, Value};
use minijinja::value::{Object, Rest};
use rocket::http::RawStr;
use rocket::http::uri::Absolute;
use time::OffsetDateTime;

use crate::elapsed;
use crate::locale::Printer;

/// Helpers that do not depend on the caller's language.
///
/// | function                        | output                                      |
/// |---------------------------------|---------------------------------------------|
/// | `base_url()`                    | the configured absolute base URL, unescaped |
/// | `root_url()`                    | the configured path prefix, unescaped       |
/// | `truncate(text, max)`           | `text` cut to `max` characters, plus `…`    |
/// | `has_prefix(text, prefix)`      | whether `text` starts with `prefix`         |
/// | `domain(url)`                   | the host (and port) of `url`                |
/// | `icon(name)`                    | SVG markup referencing the icon sprite      |
/// | `format_file_size(bytes)`       | `512 B`, `1.5 KiB`, `3.0 MiB`, ...          |
/// | `theme_color(theme, scheme)`    | the browser theme color for a UI theme      |
/// | `url_encode(text)`              | `text`, percent-encoded                     |
#[derive(Debug, Clone, Default)]
pub struct Helpers {
    pub base_url: String,
    pub root_url: String,
}

impl Helpers {
    pub(crate) fn register(&self, env: &mut Environment<'static>) {
        let base_url = self.base_url.clone();
        env.add_function("base_url", move || Value::from_safe_string(base_url.clone()));

        let root_url = self.root_url.clone();
        env.add_function("root_url", move || Value::from_safe_string(root_url.clone()));

        let root_url = self.root_url.clone();
        env.add_function("icon", move |name: String| {
            Value::from_safe_string(icon(&root_url, &name))
        });

        env.add_function("truncate", truncate);
        env.add_function("has_prefix", has_prefix);
        env.add_function("domain", domain);
        env.add_function("format_file_size", format_file_size);
        env.add_function("theme_color", theme_color);
        env.add_function("url_encode", url_encode);
    }
}

fn icon(root_url: &str, name: &str) -> String {
    format!(r#"<svg class="icon" aria-hidden="true"><use xlink:href="{}/icon/sprite.svg#icon-{}"/></svg>"#,
        root_url, name)
}

fn truncate(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((i, _)) => format!("{}…", &text[..i]),
        None => text,
    }
}

fn has_prefix(text: String, prefix: String) -> bool {
    text.starts_with(&prefix)
}

fn domain(url: String) -> String {
    let Ok(uri) = Absolute::parse(&url) else {
        return url;
    };

    match uri.authority() {
        Some(auth) => match auth.port() {
            Some(port) => format!("{}:{}", auth.host(), port),
            None => auth.host().to_owned(),
        },
        None => String::new(),
    }
}

fn format_file_size(bytes: i64) -> String {
    const UNIT: i64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let (mut div, mut exp) = (UNIT, 0);
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    let prefix = b"KMGTPE"[exp] as char;
    format!("{:.1} {}iB", bytes as f64 / div as f64, prefix)
}

fn theme_color(theme: String, color_scheme: String) -> &'static str {
    match theme.as_str() {
        "dark_serif" | "dark_sans_serif" => "#222",
        "system_serif" | "system_sans_serif" if color_scheme == "dark" => "#222",
        _ => "#fff",
    }
}

fn url_encode(text: String) -> String {
    RawStr::new(&text).percent_encode().to_string()
}

/// A displayable error carried in render data.
///
/// Handlers that want to show an error through the `t` helper put the value
/// returned by [`ErrorMessage::value()`] in the render data; `t` then renders
/// the error's message verbatim instead of looking up a translation.
#[derive(Debug)]
pub struct ErrorMessage(String);

impl ErrorMessage {
    pub fn value<E: std::fmt::Display>(error: E) -> Value {
        Value::from_object(ErrorMessage(error.to_string()))
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl Object for ErrorMessage {
    fn render(self: &Arc<Self>, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The helpers bound for one render call with `printer`'s language.
pub(crate) fn call_scoped(printer: Arc<Printer>) -> [(&'static str, Value); 3] {
    let p = printer.clone();
    let elapsed = Value::from_function(move |timezone: String, instant: Value| {
        elapsed_of(&p, &timezone, &instant, OffsetDateTime::now_utc())
    });

    let p = printer.clone();
    let translate = Value::from_function(move |key: Value, args: Rest<Value>| -> String {
        if let Some(key) = key.as_str() {
            return p.printf(key, &display_args(&args));
        }

        match key.downcast_object_ref::<ErrorMessage>() {
            Some(error) => error.message().to_owned(),
            None => String::new(),
        }
    });

    let p = printer;
    let plural = Value::from_function(move |key: String, n: i64, args: Rest<Value>| -> String {
        p.plural(&key, n, &display_args(&args))
    });

    [("elapsed", elapsed), ("t", translate), ("plural", plural)]
}

fn display_args(args: &[Value]) -> Vec<&dyn std::fmt::Display> {
    args.iter().map(|v| v as &dyn std::fmt::Display).collect()
}

fn elapsed_of(
    printer: &Printer,
    timezone: &str,
    instant: &Value,
    now: OffsetDateTime,
) -> Result<String, Error> {
    let instant = if instant.is_undefined() || instant.is_none() {
        None
    } else if let Some(s) = instant.as_str() {
        elapsed::parse_instant(s).map_err(|e| {
            Error::new(ErrorKind::InvalidOperation, "elapsed() expects an RFC 3339 instant")
                .with_source(e)
        })?
    } else {
        let seconds = i64::try_from(instant.clone()).map_err(|_| {
            Error::new(ErrorKind::InvalidOperation,
                "elapsed() expects an RFC 3339 string or Unix seconds")
        })?;

        elapsed::unix_instant(seconds)
    };

    Ok(elapsed::elapsed_time(printer, timezone, instant, now))
}

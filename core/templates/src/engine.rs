use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use rocket::serde::Serialize;

use crate::{Error, Group, TemplateSource};
use crate::helpers::{self, Helpers};
use crate::locale::{Catalog, Printer, DEFAULT_LANGUAGE};

/// The name of the base template compiled from the `common` group.
pub const COMMON: &str = "common";

/// The block of [`COMMON`] that views are rendered from.
pub const BASE: &str = "base";

/// Compiles the template groups and renders templates by name.
///
/// An engine starts out empty; [`parse_templates()`](Engine::parse_templates())
/// loads every group from the engine's [`TemplateSource`]. Parsing happens
/// once, before the engine is shared, after which the engine is read-only:
/// [`render()`](Engine::render()) takes `&self` and may be called from any
/// number of threads at once.
///
/// Every template is rendered with HTML auto-escaping and semi-strict
/// undefined handling: a template that prints a field missing from its render
/// data, or reads an attribute of one, fails instead of rendering an empty
/// string. Testing a missing field, as in `{% if flash_message %}`, is
/// allowed and is false.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use reader_templates::{Engine, Group, Helpers, MemorySource, context};
/// use reader_templates::locale::Catalog;
///
/// let source = MemorySource::new()
///     .with(Group::Common, "layout.html",
///         "{% block base %}<main>{% block content %}{% endblock %}</main>{% endblock %}")
///     .with(Group::Views, "home.html", "{% block content %}{{ t(greeting) }}{% endblock %}");
///
/// let mut engine = Engine::new(source, Arc::new(Catalog::new()), Helpers::default());
/// engine.parse_templates().expect("templates compile");
///
/// let html = engine.render("home.html", context! { language: "en_US", greeting: "hi" });
/// assert_eq!(html, b"<main>hi</main>");
/// ```
pub struct Engine {
    source: Box<dyn TemplateSource>,
    catalog: Arc<Catalog>,
    helpers: Helpers,
    env: Environment<'static>,
    templates: BTreeMap<String, Group>,
}

impl Engine {
    /// Returns an engine that will read its templates from `source` and its
    /// translations from `catalog`. No template is loaded until
    /// [`parse_templates()`](Engine::parse_templates()) is called.
    pub fn new<S: TemplateSource>(source: S, catalog: Arc<Catalog>, helpers: Helpers) -> Engine {
        Engine {
            source: Box::new(source),
            catalog,
            helpers,
            env: Environment::new(),
            templates: BTreeMap::new(),
        }
    }

    /// Loads and compiles every template group.
    ///
    ///   1. The files of the `common` group are concatenated in listing order
    ///      and compiled as the base template [`COMMON`].
    ///   2. Each `views` file is compiled as an extension of [`COMMON`]: it
    ///      only overrides blocks of the common layout. A view is rendered
    ///      from the common layout's [`BASE`] block; anything outside that
    ///      block is not output. Views must not declare `extends` themselves.
    ///   3. Each `standalone` file is compiled on its own.
    ///
    /// Views and standalone templates are keyed by their file name, including
    /// the extension. The static [`Helpers`] are bound to every template.
    ///
    /// Any read or compile error aborts the parse and leaves the engine as it
    /// was. Templates are required by every response, so callers are expected
    /// to treat an error as fatal.
    pub fn parse_templates(&mut self) -> Result<(), Error> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::SemiStrict);
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        self.helpers.register(&mut env);

        let mut common = String::new();
        for name in self.list(Group::Common)? {
            common.push_str(&self.read(Group::Common, &name)?);
        }

        env.add_template_owned(COMMON, common)
            .map_err(|e| Error::Compile(COMMON.into(), e))?;

        let mut templates = BTreeMap::new();
        for name in self.list(Group::Views)? {
            debug_!("Parsing template '{}'.", name);
            let view = self.read(Group::Views, &name)?;
            let linked = format!("{{% extends {:?} %}}{}", COMMON, view);
            env.add_template_owned(name.clone(), linked)
                .map_err(|e| Error::Compile(name.clone(), e))?;

            templates.insert(name, Group::Views);
        }

        for name in self.list(Group::Standalone)? {
            if let Some(group) = templates.get(&name) {
                warn_!("Template name '{}' does not have a unique source.", name);
                warn_!("Keeping the existing template from group '{}'.", group);
                continue;
            }

            debug_!("Parsing template '{}'.", name);
            let standalone = self.read(Group::Standalone, &name)?;
            env.add_template_owned(name.clone(), standalone)
                .map_err(|e| Error::Compile(name.clone(), e))?;

            templates.insert(name, Group::Standalone);
        }

        self.env = env;
        self.templates = templates;
        Ok(())
    }

    fn list(&self, group: Group) -> Result<Vec<String>, Error> {
        self.source.list(group).map_err(|e| Error::Io(group, None, e))
    }

    fn read(&self, group: Group, name: &str) -> Result<String, Error> {
        self.source.read(group, name).map_err(|e| Error::Io(group, Some(name.into()), e))
    }

    /// Returns `true` if a view or standalone template named `name` exists.
    pub fn contains_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// The names of all renderable templates, sorted, with their group.
    pub fn templates(&self) -> impl Iterator<Item = (&str, Group)> + '_ {
        self.templates.iter().map(|(name, group)| (name.as_str(), *group))
    }

    /// The names of all renderable templates, sorted.
    pub fn template_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates.keys().map(|name| name.as_str())
    }

    /// The catalog backing the `t` and `plural` helpers.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Renders the template `name` with `data`.
    ///
    /// `data` must serialize to a map with a string `language` field. The
    /// `elapsed`, `t` and `plural` helpers are bound for this call only, to a
    /// [`Printer`] for that language.
    ///
    /// # Panics
    ///
    /// Panics if no template named `name` exists, if `data` has no
    /// `language`, or if the template fails to execute. Each of these is a
    /// defect in the calling code, not a runtime condition; use
    /// [`try_render()`](Engine::try_render()) to handle them instead.
    pub fn render<C: Serialize>(&self, name: &str, data: C) -> Vec<u8> {
        match self.try_render(name, data) {
            Ok(bytes) => bytes,
            Err(e) => {
                error_!("{}", e);
                panic!("{}", e);
            }
        }
    }

    /// Like [`render()`](Engine::render()), but returns an error instead of
    /// panicking.
    pub fn try_render<C: Serialize>(&self, name: &str, data: C) -> Result<Vec<u8>, Error> {
        let Some(group) = self.templates.get(name) else {
            let known: Vec<_> = self.template_names().collect();
            info_!("Known templates: {}.", known.join(", "));
            return Err(Error::UnknownTemplate(name.into()));
        };

        let template = self.env.get_template(name)
            .map_err(|e| Error::Render(name.into(), e))?;

        let data = Value::from_serialize(&data);
        let language = data.get_attr("language").ok()
            .and_then(|v| v.as_str().map(String::from))
            .ok_or_else(|| Error::MissingLanguage(name.into()))?;

        if !self.catalog.contains_language(&language) {
            debug_!("No translations for '{}'; using '{}'.", language, DEFAULT_LANGUAGE);
        }

        let printer = Arc::new(Printer::new(language, self.catalog.clone()));
        let context = bind(&data, printer).map_err(|e| Error::Render(name.into(), e))?;
        let html = match group {
            Group::Views => template.eval_to_state(context)
                .and_then(|mut state| state.render_block(BASE)),
            _ => template.render(context),
        };

        html.map(String::into_bytes).map_err(|e| Error::Render(name.into(), e))
    }
}

/// Returns the render context for one call: the fields of `data` plus the
/// call-scoped helpers. The helpers live in this context only, never in the
/// shared environment, so concurrent calls cannot observe each other's.
fn bind(data: &Value, printer: Arc<Printer>) -> Result<Value, minijinja::Error> {
    let mut context = BTreeMap::new();
    for key in data.try_iter()? {
        if let Some(field) = key.as_str() {
            context.insert(field.to_owned(), data.get_item(&key)?);
        }
    }

    for (name, helper) in helpers::call_scoped(printer) {
        context.insert(name.to_owned(), helper);
    }

    Ok(Value::from_serialize(&context))
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("templates", &self.templates)
            .field("languages", &self.catalog.languages())
            .field("helpers", &self.helpers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MemorySource, context};

    fn engine(source: MemorySource) -> Engine {
        let catalog = Catalog::new()
            .with_json("en_US", r#"{ "greeting": "Hello %s", "items": ["%d item", "%d items"] }"#)
            .and_then(|c| c.with_json("fr_FR", r#"{ "greeting": "Bonjour %s" }"#))
            .unwrap();

        let helpers = Helpers { base_url: "https://reader.test".into(), root_url: "/r".into() };
        Engine::new(source, Arc::new(catalog), helpers)
    }

    fn layout() -> MemorySource {
        MemorySource::new()
            .with(Group::Common, "1.html", "{% block base %}[")
            .with(Group::Common, "2.html", "{% block content %}{% endblock %}]{% endblock %}")
    }

    fn render(engine: &Engine, name: &str, language: &str) -> String {
        String::from_utf8(engine.render(name, context! { language, who: "Ann" })).unwrap()
    }

    #[test]
    fn common_group_is_concatenated_in_order() {
        let source = layout().with(Group::Views, "v.html", "{% block content %}x{% endblock %}");
        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        assert_eq!(render(&engine, "v.html", "en_US"), "[x]");
    }

    #[test]
    fn views_render_from_the_base_block() {
        let source = layout()
            .with(Group::Common, "3.html", "\n{% block pagination %}PAGER{% endblock %}\n")
            .with(Group::Views, "v.html", "{% block content %}x{% endblock %}")
            .with(Group::Standalone, "s.html", "top{% block inner %}!{% endblock %}");

        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        assert_eq!(render(&engine, "v.html", "en_US"), "[x]");
        assert_eq!(render(&engine, "s.html", "en_US"), "top!");
    }

    #[test]
    fn missing_fields_may_be_tested() {
        let source = layout()
            .with(Group::Standalone, "f.html", "{% if flash %}{{ flash }}{% else %}-{% endif %}")
            .with(Group::Standalone, "p.html", "{{ flash }}");

        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        assert_eq!(render(&engine, "f.html", "en_US"), "-");
        let html = engine.render("f.html", context! { language: "en_US", flash: "saved" });
        assert_eq!(html, b"saved");

        let printed = engine.try_render("p.html", context! { language: "en_US" });
        assert!(matches!(printed, Err(Error::Render(_, _))));
    }

    #[test]
    fn common_group_in_wrong_order_fails_to_compile() {
        let source = MemorySource::new()
            .with(Group::Common, "1.html", "{% block content %}{% endblock %}]{% endblock %}")
            .with(Group::Common, "2.html", "{% block base %}[");

        let error = engine(source).parse_templates().unwrap_err();
        assert!(matches!(error, Error::Compile(ref name, _) if name == COMMON));
    }

    #[test]
    fn view_compile_errors_name_the_view() {
        let source = layout().with(Group::Views, "broken.html", "{% block content %}{% if %}");
        let error = engine(source).parse_templates().unwrap_err();
        assert!(matches!(error, Error::Compile(ref name, _) if name == "broken.html"));
    }

    #[test]
    fn standalone_templates_do_not_use_the_layout() {
        let source = layout().with(Group::Standalone, "s.html", "{{ t('greeting', who) }}");
        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        assert_eq!(render(&engine, "s.html", "fr_FR"), "Bonjour Ann");
        assert!(!engine.contains_template(COMMON));
    }

    #[test]
    fn names_include_extensions_and_groups() {
        let source = layout()
            .with(Group::Views, "a.html", "")
            .with(Group::Standalone, "b.html", "")
            .with(Group::Standalone, "a.html", "shadowed");

        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        let templates: Vec<_> = engine.templates().collect();
        assert_eq!(templates, [("a.html", Group::Views), ("b.html", Group::Standalone)]);
        assert_eq!(engine.template_names().collect::<Vec<_>>(), ["a.html", "b.html"]);
        assert!(engine.contains_template("a.html"));
        assert!(!engine.contains_template("a"));
    }

    #[test]
    fn failed_parse_leaves_engine_untouched() {
        let mut engine = engine(layout().with(Group::Views, "v.html", "{% block content %}v{% endblock %}"));
        engine.parse_templates().unwrap();

        engine.source = Box::new(MemorySource::new().with(Group::Common, "x.html", "{% block base %}"));
        engine.parse_templates().unwrap_err();
        assert_eq!(render(&engine, "v.html", "en_US"), "[v]");
    }

    #[test]
    fn helpers_are_bound() {
        let source = layout().with(Group::Standalone, "h.html",
            "{{ base_url() }} {{ root_url() }} {{ plural('items', 3, 3) }} {{ t(42) }}|{{ t(err) }}");

        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        let html = engine.render("h.html", context! {
            language: "en_US",
            err: crate::ErrorMessage::value("feed <unreachable>"),
        });

        assert_eq!(String::from_utf8(html).unwrap(),
            "https://reader.test /r 3 items |feed &lt;unreachable&gt;");
    }

    #[test]
    fn data_is_escaped() {
        let source = layout().with(Group::Standalone, "e.html", "{{ who }}");
        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        let html = engine.render("e.html", context! { language: "en_US", who: "<b>" });
        assert_eq!(html, b"&lt;b&gt;");
    }

    #[test]
    fn try_render_reports_contract_violations() {
        let source = layout().with(Group::Standalone, "s.html", "{{ missing.field }}");
        let mut engine = engine(source);
        engine.parse_templates().unwrap();

        let unknown = engine.try_render("nope.html", context! { language: "en_US" });
        assert!(matches!(unknown, Err(Error::UnknownTemplate(_))));

        let no_language = engine.try_render("s.html", context! { who: "Ann" });
        assert!(matches!(no_language, Err(Error::MissingLanguage(_))));

        let bad_language = engine.try_render("s.html", context! { language: 7 });
        assert!(matches!(bad_language, Err(Error::MissingLanguage(_))));

        let missing = engine.try_render("s.html", context! { language: "en_US" });
        assert!(matches!(missing, Err(Error::Render(_, _))));
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn render_unknown_template_panics() {
        let mut engine = engine(layout());
        engine.parse_templates().unwrap();
        engine.render("nope.html", context! { language: "en_US" });
    }

    #[test]
    #[should_panic(expected = "no string `language` field")]
    fn render_without_language_panics() {
        let mut engine = engine(layout().with(Group::Standalone, "s.html", "ok"));
        engine.parse_templates().unwrap();
        engine.render("s.html", context! { who: "Ann" });
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn render_before_parse_panics() {
        let engine = engine(layout().with(Group::Standalone, "s.html", "ok"));
        engine.render("s.html", context! { language: "en_US" });
    }
}

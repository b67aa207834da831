use std::path::Path;
use std::sync::Arc;

use rocket::{Rocket, Build};
use rocket::fairing::{self, Fairing, Info, Kind};
use rocket::yansi::Paint;

use crate::{Config, DirSource, Engine, Error};
use crate::locale::Catalog;

/// Loads the translation catalog and parses every template group on ignite,
/// then places the resulting [`Engine`] in managed state. Any configuration,
/// catalog or template error aborts ignition.
pub struct TemplateFairing;

#[rocket::async_trait]
impl Fairing for TemplateFairing {
    fn info(&self) -> Info {
        Info { kind: Kind::Ignite, name: "Templates" }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        let config = match Config::from_figment(rocket.figment()) {
            Ok(config) => config,
            Err(e) => {
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let catalog = match load_catalog(&config.locale_dir) {
            Ok(catalog) => Arc::new(catalog),
            Err(e) => {
                error_!("{}", e);
                return Err(rocket);
            }
        };

        let source = DirSource::new(&config.template_dir);
        let mut engine = Engine::new(source, catalog, config.helpers());
        if let Err(e) = engine.parse_templates() {
            error_!("Failed to parse templates in {:?}.", config.template_dir);
            error_!("{}", e);
            return Err(rocket);
        }

        info!("{}", "Templating:".magenta());
        info_!("directory: {}", config.template_dir.display().primary());
        info_!("templates: {}", engine.templates().count().primary());
        info_!("languages: {:?}", engine.catalog().languages().primary());
        Ok(rocket.manage(engine))
    }
}

fn load_catalog(dir: &Path) -> Result<Catalog, Error> {
    if !dir.exists() {
        warn_!("Locale directory {:?} does not exist.", dir);
        warn_!("Translations are unavailable; message keys will be shown.");
        return Ok(Catalog::new());
    }

    Catalog::load(dir)
}

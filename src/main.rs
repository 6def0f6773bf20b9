#[macro_use]
extern crate rocket;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

mod analytics;
mod boot;
mod config;
mod email;
mod i18n;
mod models;
mod prefs;
mod rate_limit;
mod routes;
mod security;
mod seo;
mod store;
mod uploads;

mod tests;

use config::{MailSettings, SiteEnv};
use rate_limit::RateLimiter;
use security::auth::AdminCredentials;
use store::{JsonStore, Store};

/// Holds the admin URL slug, read from `ADMIN_SECRET_URL` at startup.
/// Shared via Rocket managed state so routes, fairings, and templates can access it.
pub struct AdminSlug(pub String);

impl AdminSlug {
    pub fn get(&self) -> &str {
        &self.0
    }

    /// Mount point, e.g. `/admin`.
    pub fn base(&self) -> String {
        format!("/{}", self.0)
    }

    /// Absolute path of an admin page: `url("/services")` → `/admin/services`.
    pub fn url(&self, path: &str) -> String {
        format!("/{}{}", self.0, path)
    }
}

/// Flat directory holding every uploaded file.
pub struct UploadDir(pub PathBuf);

/// Absolute public base URL, used for sitemap, robots and canonical links.
pub struct SiteUrl(pub String);

/// SMTP settings for new-message notifications, when configured.
pub struct Mailer(pub Option<MailSettings>);

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        let prefix = req.rocket().state::<AdminSlug>()
            .map(|s| s.base())
            .unwrap_or_else(|| "/admin".to_string());
        let path = req.uri().path().as_str();
        if path == prefix || path.starts_with(&format!("{}/", prefix)) {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page introuvable / Page not found.</p><a href='/'>← Accueil / Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Erreur interne / Internal server error.</p><a href='/'>← Accueil / Home</a></body></html>".to_string())
}

/// Install env_logger. `RUST_LOG` wins; otherwise `info`, or `debug` with `DEBUG`.
/// With `LOG_FILE_PATH` set, lines are appended to that file instead of stderr.
fn init_logging(env: &SiteEnv) {
    let default_level = if env.debug { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(ref path) = env.log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let _ = std::fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {}: {}", path.display(), e),
        }
    }

    let _ = builder.try_init();
}

/// Assemble the application from a loaded configuration.
pub fn build_rocket(env: SiteEnv) -> Result<Rocket<Build>, String> {
    let store: Arc<dyn Store> =
        Arc::new(JsonStore::open(env.store_paths.clone(), env.traffic_max_entries)?);

    let admin_mount = format!("/{}", env.admin_slug);
    log::info!("Admin panel mounted at: {}", admin_mount);

    let limits = Limits::default()
        .limit("data-form", 64.mebibytes())
        .limit("file", 64.mebibytes())
        .limit("form", 64.kibibytes());

    let figment = rocket::Config::figment()
        .merge(("port", env.port))
        .merge(("address", "0.0.0.0"))
        .merge(("secret_key", env.rocket_secret_key()))
        .merge(("template_dir", boot::TEMPLATE_DIR))
        .merge(("limits", limits));

    let mut app = rocket::custom(figment)
        .manage(store)
        .manage(AdminSlug(env.admin_slug.clone()))
        .manage(AdminCredentials {
            user: env.admin_user.clone(),
            pass: env.admin_pass.clone(),
            pass_hash: env.admin_pass_hash.clone(),
        })
        .manage(RateLimiter::new())
        .manage(UploadDir(env.upload_dir.clone()))
        .manage(SiteUrl(env.site_url.clone()))
        .manage(Mailer(env.mail.clone()))
        .attach(Template::fairing())
        .attach(analytics::TrafficFairing)
        .attach(NoCacheAdmin);

    if std::path::Path::new(boot::STATIC_DIR).is_dir() {
        app = app.mount("/static", FileServer::from(boot::STATIC_DIR));
    }

    Ok(app
        .mount("/", routes::public::routes())
        .mount(&admin_mount, routes::admin::routes())
        .mount(&admin_mount, routes::security::routes())
        .register("/", catchers![not_found, server_error]))
}

#[launch]
fn rocket() -> _ {
    let env = SiteEnv::from_env();
    init_logging(&env);
    env.warn_insecure_defaults();

    // Boot check: create directories, validate critical files
    boot::run(&env);

    match build_rocket(env) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to open the data store: {}", e);
            std::process::exit(1);
        }
    }
}

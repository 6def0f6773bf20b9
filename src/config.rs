use std::env;
use std::path::PathBuf;

use base64::Engine;
use log::warn;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::store::StorePaths;

/// SMTP settings for new-message notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    /// Falls back to the site's contact e-mail when unset.
    pub recipient: Option<String>,
}

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct SiteEnv {
    pub upload_dir: PathBuf,
    pub store_paths: StorePaths,
    pub admin_user: String,
    pub admin_pass: String,
    pub admin_pass_hash: Option<String>,
    pub admin_slug: String,
    pub secret_key: String,
    pub log_file: Option<PathBuf>,
    pub port: u16,
    pub debug: bool,
    pub site_url: String,
    pub traffic_max_entries: usize,
    pub mail: Option<MailSettings>,
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

fn flag(key: &str) -> bool {
    matches!(
        var(key).map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

impl SiteEnv {
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(var_or("DATA_DIR", "website/data"));
        let defaults = StorePaths::in_dir(&data_dir);
        let path_or = |key: &str, default: PathBuf| var(key).map(PathBuf::from).unwrap_or(default);
        let store_paths = StorePaths {
            messages: path_or("MESSAGES_FILE_PATH", defaults.messages),
            traffic: path_or("TRAFFIC_FILE_PATH", defaults.traffic),
            rotator: path_or("ROTATOR_FILE_PATH", defaults.rotator),
            config: path_or("CONFIG_FILE_PATH", defaults.config),
            gallery: path_or("GALLERY_FILE_PATH", defaults.gallery),
            services: path_or("SERVICES_FILE_PATH", defaults.services),
            portfolio: path_or("PORTFOLIO_FILE_PATH", defaults.portfolio),
            atouts: path_or("ATOUTS_FILE_PATH", defaults.atouts),
        };

        let port = var("PORT").and_then(|p| p.parse().ok()).unwrap_or(5000);

        let mail = var("MAIL_SERVER").map(|server| {
            let username = var_or("MAIL_USERNAME", "");
            MailSettings {
                server,
                port: var("MAIL_PORT").and_then(|p| p.parse().ok()).unwrap_or(587),
                password: var_or("MAIL_PASSWORD", ""),
                sender: var("MAIL_DEFAULT_SENDER").unwrap_or_else(|| username.clone()),
                username,
                recipient: var("MAIL_RECIPIENT"),
            }
        });

        SiteEnv {
            upload_dir: PathBuf::from(var_or("UPLOAD_FOLDER", "website/uploads")),
            store_paths,
            admin_user: var_or("ADMIN_USER", "admin"),
            admin_pass: var_or("ADMIN_PASS", "admin"),
            admin_pass_hash: var("ADMIN_PASS_HASH"),
            admin_slug: normalize_slug(&var_or("ADMIN_SECRET_URL", "admin")),
            secret_key: var("SECRET_KEY").unwrap_or_default(),
            log_file: var("LOG_FILE_PATH").map(PathBuf::from),
            port,
            debug: flag("DEBUG"),
            site_url: var("SITE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            traffic_max_entries: var("TRAFFIC_MAX_ENTRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            mail,
        }
    }

    /// Warn about settings that are only acceptable on a development machine.
    pub fn warn_insecure_defaults(&self) {
        if self.admin_pass_hash.is_none() && self.admin_pass == "admin" {
            warn!("ADMIN_PASS is not set; the back-office accepts the default password");
        }
        if self.secret_key.is_empty() {
            warn!("SECRET_KEY is not set; admin sessions will not survive a restart");
        }
        if self.admin_slug == "admin" {
            warn!("ADMIN_SECRET_URL is not set; the back-office lives at /admin");
        }
    }

    /// Key material for Rocket's private cookies. Any `SECRET_KEY` string is
    /// stretched to 256 bits with SHA-256; without one a random key is used.
    pub fn rocket_secret_key(&self) -> String {
        let bytes: Vec<u8> = if self.secret_key.is_empty() {
            let mut buf = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut buf);
            buf.to_vec()
        } else {
            Sha256::digest(self.secret_key.as_bytes()).to_vec()
        };
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }
}

/// Trim slashes so the slug can be mounted as `/<slug>`.
pub fn normalize_slug(raw: &str) -> String {
    let slug = raw.trim().trim_matches('/');
    if slug.is_empty() {
        "admin".to_string()
    } else {
        slug.to_string()
    }
}

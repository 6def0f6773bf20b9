use std::sync::Arc;

use chrono::Utc;
use log::warn;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request};

use crate::models::analytics::TrafficEntry;
use crate::security::auth::client_ip;
use crate::store::Store;
use crate::AdminSlug;

const MAX_UA_LEN: usize = 200;

/// Middleware that appends a traffic entry for every public request.
/// Admin pages, static assets and uploaded files are not logged.
pub struct TrafficFairing;

#[rocket::async_trait]
impl Fairing for TrafficFairing {
    fn info(&self) -> Info {
        Info {
            name: "Traffic Logger",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut Data<'_>) {
        let path = request.uri().path().to_string();
        let admin_prefix = request
            .rocket()
            .state::<AdminSlug>()
            .map(|s| s.base())
            .unwrap_or_else(|| "/admin".to_string());

        if !should_log(&path, &admin_prefix) {
            return;
        }

        let store = match request.rocket().state::<Arc<dyn Store>>() {
            Some(s) => s,
            None => return,
        };

        let entry = TrafficEntry {
            timestamp: Utc::now(),
            path,
            method: request.method().as_str().to_string(),
            remote_addr: client_ip(request),
            referrer: request.headers().get_one("Referer").map(extract_domain),
            user_agent: request
                .headers()
                .get_one("User-Agent")
                .map(|ua| ua.chars().take(MAX_UA_LEN).collect()),
        };

        if let Err(e) = store.traffic_record(entry) {
            warn!("Could not record traffic: {}", e);
        }
    }
}

/// Whether a request path belongs in the traffic log.
pub fn should_log(path: &str, admin_prefix: &str) -> bool {
    let under = |prefix: &str| path == prefix || path.starts_with(&format!("{}/", prefix));
    !(under(admin_prefix) || under("/static") || under("/uploads") || path == "/favicon.ico")
}

fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string())
}

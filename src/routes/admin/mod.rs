use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use serde_json::{json, Value};

use crate::routes::flash_context;
use crate::AdminSlug;

pub mod analytics;
pub mod atouts;
pub mod carousel;
pub mod dashboard;
pub mod gallery;
pub mod messages;
pub mod portfolio;
pub mod services;
pub mod settings;

/// Helper: get the admin base path from managed state
pub(crate) fn admin_base(slug: &AdminSlug) -> String {
    slug.base()
}

/// Fields every back-office template expects.
pub(crate) fn admin_context(
    slug: &AdminSlug,
    page_title: &str,
    section: &str,
    flash: Option<FlashMessage<'_>>,
) -> Value {
    json!({
        "page_title": page_title,
        "section": section,
        "admin_slug": slug.get(),
        "flash": flash_context(flash),
    })
}

pub(crate) fn with(mut base: Value, extra: Value) -> Value {
    if let (Some(b), Value::Object(e)) = (base.as_object_mut(), extra) {
        b.extend(e);
    }
    base
}

/// Redirect to an admin page with a success or error flash.
pub(crate) fn done(slug: &AdminSlug, path: &str, outcome: Result<String, String>) -> Flash<Redirect> {
    let to = Redirect::to(format!("{}{}", admin_base(slug), path));
    match outcome {
        Ok(msg) => Flash::success(to, msg),
        Err(e) => Flash::error(to, e),
    }
}

/// Trimmed, non-empty form value.
pub(crate) fn filled(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard::dashboard,
        services::services_list,
        services::service_create,
        services::service_update,
        services::service_delete,
        portfolio::portfolio_list,
        portfolio::portfolio_create,
        portfolio::portfolio_update,
        portfolio::portfolio_delete,
        atouts::atouts_list,
        atouts::atout_create,
        atouts::atout_update,
        atouts::atout_delete,
        messages::messages_list,
        messages::message_view,
        messages::message_status,
        messages::message_delete,
        messages::message_download,
        messages::messages_export,
        carousel::carousel_list,
        carousel::carousel_upload,
        carousel::carousel_move,
        carousel::carousel_delete,
        gallery::gallery_list,
        gallery::gallery_create,
        gallery::gallery_delete,
        analytics::analytics_overview,
        analytics::traffic_log,
        analytics::traffic_clear,
        settings::settings_page,
        settings::settings_save,
        settings::download_uploads,
    ]
}

use rocket::request::FlashMessage;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::sync::Arc;

use super::messages::TIME_FORMAT;
use super::{admin_context, with};
use crate::models::analytics::overview;
use crate::models::message::MessageStatus;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

// ── Dashboard ──────────────────────────────────────────

#[get("/")]
pub fn dashboard(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let traffic = s.traffic_list();
    let stats = overview(&traffic, chrono::Utc::now().date_naive(), 1, 0);

    let recent: Vec<_> = s
        .message_list()
        .into_iter()
        .enumerate()
        .rev()
        .take(5)
        .map(|(idx, m)| {
            let when = m.timestamp.format(TIME_FORMAT).to_string();
            json!({ "idx": idx, "message": m, "when": when })
        })
        .collect();

    let context = with(
        admin_context(slug, "Dashboard", "dashboard", flash),
        json!({
            "services_count": s.service_list().len(),
            "portfolio_count": s.portfolio_list().len(),
            "atouts_count": s.atout_list().len(),
            "gallery_count": s.gallery_list().len(),
            "carousel_count": s.carousel_list().len(),
            "messages_count": s.message_count(None),
            "messages_unread": s.message_count(Some(MessageStatus::New)),
            "recent_messages": recent,
            "visits_total": traffic.len(),
            "visits_today": stats.views_today,
        }),
    );

    Template::render("admin/dashboard", &context)
}

use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::sync::Arc;

use super::{admin_context, done, with};
use crate::models::analytics::overview;
use crate::routes::paginate;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

pub const OVERVIEW_DAYS: i64 = 14;
pub const TOP_N: usize = 10;
pub const TRAFFIC_PER_PAGE: usize = 50;

// ── Analytics ──────────────────────────────────────────

#[get("/analytics")]
pub fn analytics_overview(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let traffic = store.traffic_list();
    let stats = overview(&traffic, chrono::Utc::now().date_naive(), OVERVIEW_DAYS, TOP_N);
    let max_daily = stats.daily.iter().map(|d| d.count).max().unwrap_or(0).max(1);

    let context = with(
        admin_context(slug, "Analytics", "analytics", flash),
        json!({
            "stats": stats,
            "max_daily": max_daily,
            "days": OVERVIEW_DAYS,
        }),
    );
    Template::render("admin/analytics", &context)
}

/// Raw log, newest first.
#[get("/traffic?<page>")]
pub fn traffic_log(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    page: Option<usize>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let mut entries = store.traffic_list();
    entries.reverse();
    let p = paginate(entries.len(), page, TRAFFIC_PER_PAGE);
    let rows: Vec<_> = entries[p.start..p.end]
        .iter()
        .map(|e| json!({ "entry": e, "when": e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string() }))
        .collect();

    let context = with(
        admin_context(slug, "Traffic", "traffic", flash),
        json!({
            "entries": rows,
            "total": entries.len(),
            "pagination": p.context(),
        }),
    );
    Template::render("admin/traffic", &context)
}

#[post("/traffic/clear")]
pub fn traffic_clear(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
) -> Flash<Redirect> {
    let outcome = store.traffic_clear().map(|_| "Traffic log cleared".to_string());
    if outcome.is_ok() {
        log::info!("Traffic log cleared");
    }
    done(slug, "/traffic", outcome)
}

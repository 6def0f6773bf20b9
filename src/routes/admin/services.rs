use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::sync::Arc;

use super::{admin_context, done, with};
use crate::models::service::{Service, DEFAULT_ICON};
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

// ── Services ───────────────────────────────────────────

#[get("/services")]
pub fn services_list(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = with(
        admin_context(slug, "Services", "services", flash),
        json!({
            "services": store.service_list(),
            "default_icon": DEFAULT_ICON,
        }),
    );
    Template::render("admin/services", &context)
}

#[derive(FromForm)]
pub struct ServiceForm {
    pub titre_fr: Option<String>,
    pub titre_en: Option<String>,
    pub desc_fr: Option<String>,
    pub desc_en: Option<String>,
    pub icon: Option<String>,
}

impl ServiceForm {
    fn to_service(&self) -> Result<Service, String> {
        Service::from_form(
            self.titre_fr.as_deref(),
            self.titre_en.as_deref(),
            self.desc_fr.as_deref(),
            self.desc_en.as_deref(),
            self.icon.as_deref(),
        )
        .ok_or_else(|| "Title and description are required in both languages".to_string())
    }
}

#[post("/services", data = "<form>")]
pub fn service_create(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    form: Form<ServiceForm>,
) -> Flash<Redirect> {
    let outcome = form
        .to_service()
        .and_then(|svc| store.service_add(svc))
        .map(|_| "Service added".to_string());
    done(slug, "/services", outcome)
}

#[post("/services/<idx>/edit", data = "<form>")]
pub fn service_update(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    idx: usize,
    form: Form<ServiceForm>,
) -> Flash<Redirect> {
    let outcome = form
        .to_service()
        .and_then(|svc| store.service_update(idx, svc))
        .map(|_| "Service updated".to_string());
    done(slug, "/services", outcome)
}

#[post("/services/<idx>/delete")]
pub fn service_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    idx: usize,
) -> Flash<Redirect> {
    let outcome = store
        .service_delete(idx)
        .map(|svc| format!("Service \"{}\" deleted", svc.titre.fr));
    done(slug, "/services", outcome)
}

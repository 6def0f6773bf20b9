use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::sync::Arc;

use super::{admin_context, done, with};
use crate::models::Bilingual;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

#[get("/atouts")]
pub fn atouts_list(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = with(
        admin_context(slug, "Why me", "atouts", flash),
        json!({ "atouts": store.atout_list() }),
    );
    Template::render("admin/atouts", &context)
}

#[derive(FromForm)]
pub struct AtoutForm {
    pub fr: Option<String>,
    pub en: Option<String>,
}

impl AtoutForm {
    fn to_atout(&self) -> Result<Bilingual, String> {
        Bilingual::from_form(self.fr.as_deref(), self.en.as_deref())
            .ok_or_else(|| "Both the French and English text are required".to_string())
    }
}

#[post("/atouts", data = "<form>")]
pub fn atout_create(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    form: Form<AtoutForm>,
) -> Flash<Redirect> {
    let outcome = form
        .to_atout()
        .and_then(|a| store.atout_add(a))
        .map(|_| "Argument added".to_string());
    done(slug, "/atouts", outcome)
}

#[post("/atouts/<idx>/edit", data = "<form>")]
pub fn atout_update(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    idx: usize,
    form: Form<AtoutForm>,
) -> Flash<Redirect> {
    let outcome = form
        .to_atout()
        .and_then(|a| store.atout_update(idx, a))
        .map(|_| "Argument updated".to_string());
    done(slug, "/atouts", outcome)
}

#[post("/atouts/<idx>/delete")]
pub fn atout_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    idx: usize,
) -> Flash<Redirect> {
    let outcome = store.atout_delete(idx).map(|_| "Argument deleted".to_string());
    done(slug, "/atouts", outcome)
}

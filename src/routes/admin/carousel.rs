use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::sync::Arc;

use super::{admin_context, done, with};
use crate::models::carousel::{CarouselItem, CarouselKind, Direction, MAX_CAROUSEL_ITEMS};
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::uploads::{self, UploadPurpose};
use crate::{AdminSlug, UploadDir};

// ── Homepage carousel ──────────────────────────────────

#[get("/carousel")]
pub fn carousel_list(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let items = store.carousel_list();
    let context = with(
        admin_context(slug, "Carousel", "carousel", flash),
        json!({
            "full": items.len() >= MAX_CAROUSEL_ITEMS,
            "items": items,
            "max_items": MAX_CAROUSEL_ITEMS,
            "accept": UploadPurpose::Carousel.accept_attr(),
        }),
    );
    Template::render("admin/carousel", &context)
}

#[derive(FromForm)]
pub struct CarouselUpload<'f> {
    pub file: TempFile<'f>,
}

#[post("/carousel", data = "<form>")]
pub async fn carousel_upload(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    mut form: Form<CarouselUpload<'_>>,
) -> Flash<Redirect> {
    if store.carousel_list().len() >= MAX_CAROUSEL_ITEMS {
        return done(
            slug,
            "/carousel",
            Err(format!("The carousel is limited to {} items", MAX_CAROUSEL_ITEMS)),
        );
    }

    let name = match uploads::save_upload(&mut form.file, &upload_dir.0, UploadPurpose::Carousel).await {
        Ok(n) => n,
        Err(e) => {
            log::warn!("Carousel upload rejected: {}", e);
            return done(slug, "/carousel", Err(format!("Upload refused: {}", e)));
        }
    };

    let kind = match CarouselKind::from_filename(&name) {
        Some(k) => k,
        None => {
            uploads::remove_upload(&upload_dir.0, &name);
            return done(slug, "/carousel", Err("Only images and PDF files are accepted".to_string()));
        }
    };

    let outcome = match store.carousel_add(CarouselItem { filename: name.clone(), kind }) {
        Ok(_) => Ok("Slide added".to_string()),
        Err(e) => {
            uploads::remove_upload(&upload_dir.0, &name);
            Err(e)
        }
    };
    done(slug, "/carousel", outcome)
}

#[post("/carousel/<idx>/move/<direction>")]
pub fn carousel_move(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    idx: usize,
    direction: &str,
) -> Flash<Redirect> {
    let outcome = Direction::parse(direction)
        .ok_or_else(|| format!("Unknown direction \"{}\"", direction))
        .and_then(|dir| store.carousel_move(idx, dir))
        .map(|_| "Order updated".to_string());
    done(slug, "/carousel", outcome)
}

#[post("/carousel/<idx>/delete")]
pub fn carousel_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    idx: usize,
) -> Flash<Redirect> {
    let outcome = store.carousel_delete(idx).map(|item| {
        uploads::remove_upload(&upload_dir.0, &item.filename);
        "Slide removed".to_string()
    });
    done(slug, "/carousel", outcome)
}

use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::sync::Arc;

use super::{admin_context, done, filled, with};
use crate::models::gallery::{classify, GalleryItem};
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::uploads::{self, UploadPurpose};
use crate::{AdminSlug, UploadDir};

// ── Gallery ────────────────────────────────────────────

#[get("/gallery")]
pub fn gallery_list(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = with(
        admin_context(slug, "Gallery", "gallery", flash),
        json!({
            "items": store.gallery_list(),
            "accept": UploadPurpose::Gallery.accept_attr(),
        }),
    );
    Template::render("admin/gallery", &context)
}

#[derive(FromForm)]
pub struct GalleryFormData<'f> {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Comma-separated image or video URLs.
    pub urls: Option<String>,
    pub files: Vec<TempFile<'f>>,
}

/// Files are saved first, then the whole submission is classified.
/// A rejected submission removes the files it just saved.
#[post("/gallery", data = "<form>")]
pub async fn gallery_create(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    mut form: Form<GalleryFormData<'_>>,
) -> Flash<Redirect> {
    let mut saved = Vec::new();
    let mut refused = Vec::new();
    for file in form.files.iter_mut() {
        if uploads::raw_name(file).is_none() && file.len() == 0 {
            continue;
        }
        match uploads::save_upload(file, &upload_dir.0, UploadPurpose::Gallery).await {
            Ok(name) => saved.push(name),
            Err(e) => {
                log::warn!("Gallery upload rejected: {}", e);
                refused.push(uploads::raw_name(file).unwrap_or_else(|| "?".to_string()));
            }
        }
    }
    let saved_sources: Vec<String> = saved.iter().map(|n| format!("/uploads/{}", n)).collect();

    // Only files saved by this request are ever removed here.
    let discard = |sources: &[String]| {
        for name in &saved {
            if sources.contains(&format!("/uploads/{}", name)) {
                uploads::remove_upload(&upload_dir.0, name);
            }
        }
    };

    let classified = match classify(&saved_sources, form.urls.as_deref().unwrap_or_default()) {
        Ok(c) => c,
        Err(e) => {
            discard(&saved_sources);
            return done(slug, "/gallery", Err(e.to_string()));
        }
    };
    // Uploads the classifier set aside (videos next to a rotation) are not kept.
    discard(&classified.dropped);
    refused.extend(classified.dropped.iter().cloned());

    let item = GalleryItem::new(classified.media, filled(&form.title), filled(&form.description))
        .with_uploads(&saved);
    let kind = item.media.kind();
    let owned = item.owned_uploads();
    let outcome = match store.gallery_add(item) {
        Ok(_) if refused.is_empty() => Ok(format!("Gallery {} added", kind)),
        Ok(_) => Ok(format!("Gallery {} added (ignored: {})", kind, refused.join(", "))),
        Err(e) => {
            for name in &owned {
                uploads::remove_upload(&upload_dir.0, name);
            }
            Err(e)
        }
    };
    done(slug, "/gallery", outcome)
}

#[post("/gallery/<idx>/delete")]
pub fn gallery_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    idx: usize,
) -> Flash<Redirect> {
    let outcome = store.gallery_delete(idx).map(|item| {
        for name in item.owned_uploads() {
            uploads::remove_upload(&upload_dir.0, &name);
        }
        format!("Gallery {} removed", item.media.kind())
    });
    done(slug, "/gallery", outcome)
}

use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use super::{admin_context, done, filled, with};
use crate::models::portfolio::{parse_image_urls, PortfolioItem};
use crate::models::Bilingual;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::uploads::{self, UploadPurpose};
use crate::{AdminSlug, UploadDir};

// ── Portfolio ──────────────────────────────────────────

#[get("/portfolio")]
pub fn portfolio_list(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let items: Vec<_> = store
        .portfolio_list()
        .into_iter()
        .map(|item| {
            let imgs_raw = item.imgs.join(", ");
            json!({ "item": item, "imgs_raw": imgs_raw })
        })
        .collect();

    let context = with(
        admin_context(slug, "Portfolio", "portfolio", flash),
        json!({
            "items": items,
            "accept_images": UploadPurpose::Photo.accept_attr(),
            "accept_files": UploadPurpose::Attachment.accept_attr(),
        }),
    );
    Template::render("admin/portfolio", &context)
}

// ── POST: Create/Update Portfolio ──────────────────────

#[derive(FromForm)]
pub struct PortfolioFormData<'f> {
    pub titre_fr: Option<String>,
    pub titre_en: Option<String>,
    pub desc_fr: Option<String>,
    pub desc_en: Option<String>,
    /// Comma-separated image URLs.
    pub imgs: Option<String>,
    pub img_files: Vec<TempFile<'f>>,
    pub fichiers: Vec<TempFile<'f>>,
}

/// Saved upload names and the client names of refused files.
struct Saved {
    names: Vec<String>,
    rejected: Vec<String>,
}

async fn save_all(files: &mut [TempFile<'_>], dir: &Path, purpose: UploadPurpose) -> Saved {
    let mut saved = Saved { names: Vec::new(), rejected: Vec::new() };
    for file in files.iter_mut() {
        if uploads::raw_name(file).is_none() && file.len() == 0 {
            continue;
        }
        match uploads::save_upload(file, dir, purpose).await {
            Ok(name) => saved.names.push(name),
            Err(e) => {
                log::warn!("Portfolio upload rejected: {}", e);
                saved.rejected.push(uploads::raw_name(file).unwrap_or_else(|| "?".to_string()));
            }
        }
    }
    saved
}

fn rejected_note(rejected: &[String]) -> String {
    if rejected.is_empty() {
        String::new()
    } else {
        format!(" (rejected: {})", rejected.join(", "))
    }
}

#[post("/portfolio", data = "<form>")]
pub async fn portfolio_create(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    mut form: Form<PortfolioFormData<'_>>,
) -> Flash<Redirect> {
    let (titre, desc) = match (
        Bilingual::from_form(filled(&form.titre_fr), filled(&form.titre_en)),
        Bilingual::from_form(filled(&form.desc_fr), filled(&form.desc_en)),
    ) {
        (Some(t), Some(d)) => (t, d),
        _ => {
            return done(
                slug,
                "/portfolio",
                Err("Title and description are required in both languages".to_string()),
            )
        }
    };

    let images = save_all(&mut form.img_files, &upload_dir.0, UploadPurpose::Photo).await;
    let files = save_all(&mut form.fichiers, &upload_dir.0, UploadPurpose::Attachment).await;

    let mut imgs = parse_image_urls(form.imgs.as_deref().unwrap_or_default());
    imgs.extend(images.names.iter().map(|n| format!("/uploads/{}", n)));

    let item = PortfolioItem {
        titre,
        desc,
        imgs,
        fichiers: files.names,
        img_uploads: images.names,
    };
    let mut rejected = images.rejected;
    rejected.extend(files.rejected);

    let outcome = match store.portfolio_add(item.clone()) {
        Ok(_) => Ok(format!("Project added{}", rejected_note(&rejected))),
        Err(e) => {
            for name in item.owned_uploads() {
                uploads::remove_upload(&upload_dir.0, &name);
            }
            Err(e)
        }
    };
    done(slug, "/portfolio", outcome)
}

#[post("/portfolio/<idx>/edit", data = "<form>")]
pub async fn portfolio_update(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    idx: usize,
    mut form: Form<PortfolioFormData<'_>>,
) -> Flash<Redirect> {
    let current = match store.portfolio_get(idx) {
        Some(item) => item,
        None => return done(slug, "/portfolio", Err(format!("No project at position {}", idx))),
    };

    let mut item = current;
    if let Some(t) = Bilingual::from_form(filled(&form.titre_fr), filled(&form.titre_en)) {
        item.titre = t;
    }
    if let Some(d) = Bilingual::from_form(filled(&form.desc_fr), filled(&form.desc_en)) {
        item.desc = d;
    }
    if let Some(ref raw) = form.imgs {
        item.imgs = parse_image_urls(raw);
    }

    let images = save_all(&mut form.img_files, &upload_dir.0, UploadPurpose::Photo).await;
    let files = save_all(&mut form.fichiers, &upload_dir.0, UploadPurpose::Attachment).await;
    item.imgs.extend(images.names.iter().map(|n| format!("/uploads/{}", n)));
    item.img_uploads.extend(images.names.iter().cloned());
    item.fichiers.extend(files.names.iter().cloned());
    // Uploaded images dropped from the list are no longer referenced.
    let released = item.release_unlisted_images();
    let mut rejected = images.rejected;
    rejected.extend(files.rejected);

    let outcome = match store.portfolio_update(idx, item) {
        Ok(()) => {
            for name in &released {
                uploads::remove_upload(&upload_dir.0, name);
            }
            Ok(format!("Project updated{}", rejected_note(&rejected)))
        }
        Err(e) => {
            for name in images.names.iter().chain(&files.names) {
                uploads::remove_upload(&upload_dir.0, name);
            }
            Err(e)
        }
    };
    done(slug, "/portfolio", outcome)
}

#[post("/portfolio/<idx>/delete")]
pub fn portfolio_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    idx: usize,
) -> Flash<Redirect> {
    let outcome = store.portfolio_delete(idx).map(|item| {
        for name in item.owned_uploads() {
            uploads::remove_upload(&upload_dir.0, &name);
        }
        format!("Project \"{}\" deleted", item.titre.fr)
    });
    done(slug, "/portfolio", outcome)
}

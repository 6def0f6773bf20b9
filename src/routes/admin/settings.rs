use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use super::{admin_context, done, with};
use crate::models::settings::{PLAIN_KEYS, TRANSLATED_KEYS};
use crate::routes::Attachment;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::uploads::{self, UploadPurpose};
use crate::{AdminSlug, UploadDir};

// ── Settings ───────────────────────────────────────────

#[get("/settings")]
pub fn settings_page(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = with(
        admin_context(slug, "Settings", "settings", flash),
        json!({
            "site": store.site_get(),
            "plain_keys": PLAIN_KEYS,
            "translated_keys": TRANSLATED_KEYS,
            "accept_photo": UploadPurpose::Photo.accept_attr(),
        }),
    );
    Template::render("admin/settings", &context)
}

#[derive(FromForm)]
pub struct SettingsForm<'f> {
    /// Every text field, keyed by its name (`nom`, `titre_fr`, …).
    pub fields: HashMap<String, String>,
    pub photo_file: Option<TempFile<'f>>,
}

#[post("/settings", data = "<form>")]
pub async fn settings_save(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    mut form: Form<SettingsForm<'_>>,
) -> Flash<Redirect> {
    let mut site = store.site_get();
    let previous_photo = site.photo.clone();
    let mut changed = site.apply_form(&form.fields);

    let mut notes = Vec::new();
    if let Some(file) = form.photo_file.as_mut().filter(|f| f.len() > 0) {
        match uploads::save_upload(file, &upload_dir.0, UploadPurpose::Photo).await {
            Ok(name) => {
                site.photo = format!("/uploads/{}", name);
                changed += 1;
            }
            Err(e) => {
                log::warn!("Profile photo rejected: {}", e);
                notes.push(format!("photo refused: {}", e));
            }
        }
    }

    if changed == 0 {
        let msg = if notes.is_empty() {
            Ok("Nothing to update".to_string())
        } else {
            Err(notes.join("; "))
        };
        return done(slug, "/settings", msg);
    }

    let outcome = match store.site_update(&site) {
        Ok(()) => {
            if previous_photo != site.photo {
                if let Some(old) = previous_photo.strip_prefix("/uploads/") {
                    uploads::remove_upload(&upload_dir.0, old);
                }
            }
            log::info!("Site settings updated ({} field(s))", changed);
            let mut msg = format!("Settings saved ({} field(s) changed)", changed);
            if !notes.is_empty() {
                msg.push_str(&format!(" but {}", notes.join("; ")));
            }
            Ok(msg)
        }
        Err(e) => Err(e),
    };
    done(slug, "/settings", outcome)
}

/// Whole upload folder as one archive.
#[get("/download_uploads")]
pub fn download_uploads(
    _admin: AdminUser,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
) -> Result<Attachment, Flash<Redirect>> {
    match uploads::zip_directory(&upload_dir.0) {
        Ok(bytes) => Ok(Attachment::zip(
            format!("uploads_{}.zip", chrono::Utc::now().format("%Y%m%d_%H%M%S")),
            bytes,
        )),
        Err(e) => {
            log::error!("Could not archive uploads: {}", e);
            Err(done(slug, "/settings", Err(format!("Could not archive uploads: {}", e))))
        }
    }
}

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::sync::Arc;

use super::{admin_context, admin_base, done, with};
use crate::models::message::MessageStatus;
use crate::routes::{paginate, Attachment};
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::uploads;
use crate::{AdminSlug, UploadDir};

pub const MESSAGES_PER_PAGE: usize = 20;
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ── Messages ───────────────────────────────────────────

/// Newest first. Each row carries its storage index for the action URLs.
#[get("/messages?<page>")]
pub fn messages_list(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    page: Option<usize>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let all = store.message_list();
    let total = all.len();
    let p = paginate(total, page, MESSAGES_PER_PAGE);

    let rows: Vec<_> = all
        .into_iter()
        .enumerate()
        .rev()
        .skip(p.start)
        .take(p.end - p.start)
        .map(|(idx, m)| {
            let when = m.timestamp.format(TIME_FORMAT).to_string();
            json!({ "idx": idx, "message": m, "when": when })
        })
        .collect();

    let context = with(
        admin_context(slug, "Messages", "messages", flash),
        json!({
            "messages": rows,
            "total": total,
            "unread": store.message_count(Some(MessageStatus::New)),
            "pagination": p.context(),
        }),
    );
    Template::render("admin/messages", &context)
}

/// Opening a message marks it as read.
#[get("/messages/view/<idx>")]
pub fn message_view(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    idx: usize,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    let mut message = match store.message_get(idx) {
        Some(m) => m,
        None => return Err(done(slug, "/messages", Err(format!("No message at position {}", idx)))),
    };
    if message.status == MessageStatus::New {
        match store.message_set_status(idx, MessageStatus::Read) {
            Ok(()) => message.status = MessageStatus::Read,
            Err(e) => log::warn!("Could not mark message {} as read: {}", idx, e),
        }
    }

    let context = with(
        admin_context(slug, "Message", "messages", flash),
        json!({
            "idx": idx,
            "when": message.timestamp.format(TIME_FORMAT).to_string(),
            "message": message,
        }),
    );
    Ok(Template::render("admin/message_view", &context))
}

#[derive(FromForm)]
pub struct StatusForm {
    pub status: String,
}

#[post("/messages/<idx>/status", data = "<form>")]
pub fn message_status(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    idx: usize,
    form: Form<StatusForm>,
) -> Flash<Redirect> {
    let outcome = MessageStatus::parse(form.status.trim())
        .ok_or_else(|| format!("Unknown status \"{}\"", form.status))
        .and_then(|status| {
            store
                .message_set_status(idx, status)
                .map(|_| format!("Message marked as {}", status.as_str()))
        });
    done(slug, "/messages", outcome)
}

#[post("/messages/<idx>/delete")]
pub fn message_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    idx: usize,
) -> Flash<Redirect> {
    let outcome = store.message_delete(idx).map(|m| {
        for name in &m.fichiers {
            uploads::remove_upload(&upload_dir.0, name);
        }
        format!("Message from {} deleted", m.nom)
    });
    done(slug, "/messages", outcome)
}

/// Zip with `message.txt` and every attachment still on disk.
#[get("/messages/download/<idx>")]
pub fn message_download(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    upload_dir: &State<UploadDir>,
    idx: usize,
) -> Result<Attachment, Flash<Redirect>> {
    let message = store
        .message_get(idx)
        .ok_or_else(|| done(slug, "/messages", Err(format!("No message at position {}", idx))))?;

    let text = message.to_text();
    let bytes = uploads::zip_bundle(
        &upload_dir.0,
        &message.fichiers,
        &[("message.txt", text.as_bytes())],
    )
    .map_err(|e| {
        log::error!("Could not build archive for message {}: {}", idx, e);
        done(slug, &format!("/messages/view/{}", idx), Err(e))
    })?;

    let filename = format!(
        "message_{}_{}.zip",
        message.timestamp.format("%Y%m%d_%H%M%S"),
        ::slug::slugify(&message.nom)
    );
    Ok(Attachment::zip(filename, bytes))
}

#[get("/messages/export")]
pub fn messages_export(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
) -> Result<Attachment, Redirect> {
    match serde_json::to_vec_pretty(&store.message_list()) {
        Ok(bytes) => Ok(Attachment::json(
            format!("messages_{}.json", chrono::Utc::now().format("%Y%m%d")),
            bytes,
        )),
        Err(e) => {
            log::error!("Could not export messages: {}", e);
            Err(Redirect::to(format!("{}/messages", admin_base(slug))))
        }
    }
}

use rocket::form::Form;
use rocket::fs::{NamedFile, TempFile};
use rocket::http::CookieJar;
use rocket::request::{FlashMessage, FromRequest, Outcome, Request};
use rocket::response::content::{RawText, RawXml};
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::email;
use crate::i18n::{self, Lang};
use crate::models::message::ContactMessage;
use crate::prefs::{self, Prefs};
use crate::routes::flash_context;
use crate::seo;
use crate::store::Store;
use crate::uploads::{self, UploadPurpose};
use crate::{Mailer, SiteUrl, UploadDir};

/// Context shared by every public page: site identity, theme, language
/// and the interface labels.
fn page_context(
    store: &dyn Store,
    prefs: Prefs,
    site_url: &SiteUrl,
    path: &str,
    title: Option<&str>,
    flash: Option<FlashMessage<'_>>,
) -> Value {
    let site = store.site_get();
    json!({
        "site": site,
        "lang": prefs.lang.code(),
        "dark": prefs.dark,
        "langs": i18n::langs_context(),
        "t": i18n::ui_strings(prefs.lang),
        "path": path,
        "seo": seo::build_meta(&site, &site_url.0, prefs.lang, title, path),
        "font_query": site.font_query(),
        "whatsapp_digits": site.whatsapp_digits(),
        "year": chrono::Utc::now().format("%Y").to_string(),
        "flash": flash_context(flash),
    })
}

fn merge(mut base: Value, extra: Value) -> Value {
    if let (Some(b), Value::Object(e)) = (base.as_object_mut(), extra) {
        b.extend(e);
    }
    base
}

// ── Pages ──────────────────────────────────────────────

#[get("/")]
pub fn homepage(
    store: &State<Arc<dyn Store>>,
    site_url: &State<SiteUrl>,
    prefs: Prefs,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let context = merge(
        page_context(s, prefs, site_url, "/", None, flash),
        json!({
            "page_type": "home",
            "carousel": s.carousel_list(),
            "services": s.service_list().into_iter().take(3).collect::<Vec<_>>(),
            "atouts": s.atout_list().into_iter().take(3).collect::<Vec<_>>(),
        }),
    );
    Template::render("public/index", &context)
}

#[get("/services")]
pub fn services(
    store: &State<Arc<dyn Store>>,
    site_url: &State<SiteUrl>,
    prefs: Prefs,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let title = prefs.lang.pick("Services", "Services");
    let context = merge(
        page_context(s, prefs, site_url, "/services", Some(title), None),
        json!({ "page_type": "services", "services": s.service_list() }),
    );
    Template::render("public/services", &context)
}

#[get("/portfolio")]
pub fn portfolio(
    store: &State<Arc<dyn Store>>,
    site_url: &State<SiteUrl>,
    prefs: Prefs,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let title = prefs.lang.pick("Réalisations", "Portfolio");
    let context = merge(
        page_context(s, prefs, site_url, "/portfolio", Some(title), None),
        json!({ "page_type": "portfolio", "items": s.portfolio_list() }),
    );
    Template::render("public/portfolio", &context)
}

#[get("/galerie")]
pub fn gallery(
    store: &State<Arc<dyn Store>>,
    site_url: &State<SiteUrl>,
    prefs: Prefs,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let title = prefs.lang.pick("Galerie", "Gallery");
    let context = merge(
        page_context(s, prefs, site_url, "/galerie", Some(title), None),
        json!({ "page_type": "gallery", "items": s.gallery_list() }),
    );
    Template::render("public/galerie", &context)
}

#[get("/pourquoi")]
pub fn why_me(
    store: &State<Arc<dyn Store>>,
    site_url: &State<SiteUrl>,
    prefs: Prefs,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let title = prefs.lang.pick("Pourquoi moi ?", "Why me?");
    let context = merge(
        page_context(s, prefs, site_url, "/pourquoi", Some(title), None),
        json!({ "page_type": "why", "atouts": s.atout_list() }),
    );
    Template::render("public/pourquoi", &context)
}

// ── Contact ────────────────────────────────────────────

#[get("/contact")]
pub fn contact_page(
    store: &State<Arc<dyn Store>>,
    site_url: &State<SiteUrl>,
    prefs: Prefs,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let title = prefs.lang.pick("Contact", "Contact");
    let context = merge(
        page_context(s, prefs, site_url, "/contact", Some(title), flash),
        json!({
            "page_type": "contact",
            "accept": UploadPurpose::Attachment.accept_attr(),
        }),
    );
    Template::render("public/contact", &context)
}

#[derive(FromForm)]
pub struct ContactForm<'f> {
    pub nom: Option<String>,
    pub email: Option<String>,
    pub sujet: Option<String>,
    pub message: Option<String>,
    #[field(name = "fichier")]
    pub fichiers: Vec<TempFile<'f>>,
    /// Honeypot, hidden from humans.
    pub website: Option<String>,
}

fn filled(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[post("/contact", data = "<form>")]
pub async fn contact_submit(
    store: &State<Arc<dyn Store>>,
    upload_dir: &State<UploadDir>,
    mailer: &State<Mailer>,
    prefs: Prefs,
    mut form: Form<ContactForm<'_>>,
) -> Flash<Redirect> {
    let lang = prefs.lang;
    let back = || Redirect::to("/contact");
    let thanks = lang.pick(
        "Merci, votre message a bien été envoyé. Je vous réponds rapidement.",
        "Thank you, your message has been sent. I will get back to you shortly.",
    );

    if filled(&form.website).is_some() {
        log::info!("Contact form honeypot triggered, message discarded");
        return Flash::success(back(), thanks);
    }

    let (nom, email, message) = match (filled(&form.nom), filled(&form.email), filled(&form.message)) {
        (Some(n), Some(e), Some(m)) if e.contains('@') => (n.to_string(), e.to_string(), m.to_string()),
        _ => {
            return Flash::error(
                back(),
                lang.pick(
                    "Merci de renseigner votre nom, un e-mail valide et votre message.",
                    "Please fill in your name, a valid e-mail and your message.",
                ),
            )
        }
    };
    let sujet = filled(&form.sujet).map(str::to_string);

    let mut saved = Vec::new();
    let mut rejected = Vec::new();
    for file in form.fichiers.iter_mut() {
        if uploads::raw_name(file).is_none() && file.len() == 0 {
            continue;
        }
        match uploads::save_upload(file, &upload_dir.0, UploadPurpose::Attachment).await {
            Ok(name) => saved.push(name),
            Err(e) => {
                log::warn!("Contact attachment rejected: {}", e);
                rejected.push(uploads::raw_name(file).unwrap_or_else(|| "?".to_string()));
            }
        }
    }

    let msg = ContactMessage::new(&nom, &email, sujet.as_deref(), &message, saved);
    let s: &dyn Store = &**store.inner();
    if let Err(e) = s.message_add(msg.clone()) {
        log::error!("Could not store contact message: {}", e);
        for name in &msg.fichiers {
            uploads::remove_upload(&upload_dir.0, name);
        }
        return Flash::error(
            back(),
            lang.pick(
                "Votre message n'a pas pu être enregistré, merci de réessayer.",
                "Your message could not be saved, please try again.",
            ),
        );
    }
    log::info!("New contact message from {} ({} attachment(s))", msg.email, msg.fichiers.len());

    if let Some(ref mail) = mailer.0 {
        let site = s.site_get();
        email::notify_new_message(mail, &site.email, &site.nom, &msg);
    }

    if rejected.is_empty() {
        Flash::success(back(), thanks)
    } else {
        Flash::warning(
            back(),
            format!(
                "{} {} {}",
                thanks,
                lang.pick("Fichiers refusés (type non autorisé) :", "Rejected files (type not allowed):"),
                rejected.join(", ")
            ),
        )
    }
}

// ── Preferences ────────────────────────────────────────

/// Same-site path of the page the visitor came from, `/` otherwise.
pub struct BackTo(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BackTo {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(BackTo(back_path(request.headers().get_one("Referer"))))
    }
}

/// Reduce a referrer to its path and query so redirects never leave the site.
pub fn back_path(referer: Option<&str>) -> String {
    referer
        .and_then(|r| url::Url::parse(r).ok())
        .map(|u| match u.query() {
            Some(q) => format!("{}?{}", u.path(), q),
            None => u.path().to_string(),
        })
        .filter(|p| p.starts_with('/') && !p.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}

#[derive(FromForm)]
pub struct LangForm {
    pub lang: String,
}

#[post("/set_lang", data = "<form>")]
pub fn set_lang(form: Form<LangForm>, cookies: &CookieJar<'_>, back: BackTo) -> Redirect {
    match Lang::from_code(&form.lang) {
        Some(lang) => prefs::set_lang(cookies, lang),
        None => log::debug!("Ignoring unknown language {:?}", form.lang),
    }
    Redirect::to(back.0)
}

#[get("/toggle_dark")]
pub fn toggle_dark(cookies: &CookieJar<'_>, back: BackTo) -> Redirect {
    prefs::toggle_dark(cookies);
    Redirect::to(back.0)
}

// ── Files & SEO ────────────────────────────────────────

#[get("/uploads/<filename>")]
pub async fn uploaded_file(upload_dir: &State<UploadDir>, filename: &str) -> Option<NamedFile> {
    let path = uploads::resolve(&upload_dir.0, filename)?;
    NamedFile::open(path).await.ok()
}

#[get("/sitemap.xml")]
pub fn sitemap(site_url: &State<SiteUrl>) -> RawXml<String> {
    RawXml(seo::generate_sitemap(&site_url.0))
}

#[get("/robots.txt")]
pub fn robots(site_url: &State<SiteUrl>) -> RawText<String> {
    RawText(seo::generate_robots(&site_url.0))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        homepage,
        services,
        portfolio,
        gallery,
        why_me,
        contact_page,
        contact_submit,
        set_lang,
        toggle_dark,
        uploaded_file,
        sitemap,
        robots,
    ]
}

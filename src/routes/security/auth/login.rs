use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::rate_limit::{RateLimiter, LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW};
use crate::routes::flash_context;
use crate::security::auth::{self, AdminCredentials};
use crate::AdminSlug;

#[derive(Debug, FromForm)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn render_login(slug: &AdminSlug, error: Option<&str>, flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "admin/login",
        json!({
            "admin_slug": slug.get(),
            "error": error,
            "flash": flash_context(flash),
        }),
    )
}

#[get("/login")]
pub fn login_page(
    admin_slug: &State<AdminSlug>,
    cookies: &CookieJar<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    if auth::is_logged_in(cookies) {
        return Err(Redirect::to(admin_slug.base()));
    }
    Ok(render_login(admin_slug, None, flash))
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    credentials: &State<AdminCredentials>,
    admin_slug: &State<AdminSlug>,
    limiter: &State<RateLimiter>,
    cookies: &CookieJar<'_>,
    client_ip: auth::ClientIp,
) -> Result<Redirect, Template> {
    let ip = &client_ip.0;
    let rate_key = format!("login:{}", ip);

    // Check rate limit before processing
    if !limiter.check_and_record(&rate_key, LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW) {
        log::warn!("Login rate limit hit for {}", ip);
        return Err(render_login(
            admin_slug,
            Some("Too many login attempts. Please try again in 15 minutes."),
            None,
        ));
    }

    if !credentials.verify(&form.username, &form.password) {
        log::warn!("Failed admin login for user {:?} from {}", form.username.trim(), ip);
        return Err(render_login(admin_slug, Some("Invalid credentials"), None));
    }

    limiter.reset(&rate_key);
    auth::set_session_cookie(cookies);
    log::info!("Admin logged in from {}", ip);
    Ok(Redirect::to(admin_slug.base()))
}

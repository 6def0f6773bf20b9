use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::State;
use std::path::PathBuf;

use crate::security::auth;
use crate::AdminSlug;

#[get("/logout")]
pub fn logout(admin_slug: &State<AdminSlug>, cookies: &CookieJar<'_>) -> Redirect {
    auth::clear_session_cookie(cookies);
    Redirect::to(admin_slug.url("/login"))
}

/// Catch-all for any /<admin_slug>/* route that failed the AdminUser guard.
/// This fires when the guard returns Forward(Unauthorized).
#[get("/<_path..>", rank = 99)]
pub fn admin_redirect_to_login(_path: PathBuf, admin_slug: &State<AdminSlug>) -> Redirect {
    Redirect::to(admin_slug.url("/login"))
}

/// Same for form submissions, which must never reach a handler unauthenticated.
#[post("/<_path..>", rank = 99)]
pub fn admin_post_redirect_to_login(_path: PathBuf, admin_slug: &State<AdminSlug>) -> Redirect {
    Redirect::to(admin_slug.url("/login"))
}

use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::time::Duration;

use crate::i18n::Lang;

const LANG_COOKIE: &str = "lang";
const DARK_COOKIE: &str = "dark";

/// Visitor display preferences, read on every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefs {
    pub lang: Lang,
    pub dark: bool,
}

impl Prefs {
    pub fn from_cookies(cookies: &CookieJar<'_>) -> Prefs {
        let lang = cookies
            .get(LANG_COOKIE)
            .and_then(|c| Lang::from_code(c.value()))
            .unwrap_or_default();
        let dark = cookies
            .get(DARK_COOKIE)
            .map(|c| c.value() == "1")
            .unwrap_or(false);
        Prefs { lang, dark }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Prefs {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(Prefs::from_cookies(request.cookies()))
    }
}

fn pref_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value.to_string());
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::days(365));
    cookie
}

pub fn set_lang(cookies: &CookieJar<'_>, lang: Lang) {
    cookies.add(pref_cookie(LANG_COOKIE, lang.code()));
}

/// Flip dark mode and return the new state.
pub fn toggle_dark(cookies: &CookieJar<'_>) -> bool {
    let dark = !Prefs::from_cookies(cookies).dark;
    cookies.add(pref_cookie(DARK_COOKIE, if dark { "1" } else { "0" }));
    dark
}

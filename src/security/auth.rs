use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};

const SESSION_COOKIE: &str = "admin_logged_in";

// ── Client IP request guard ──

/// Extracts the real client IP from the request.
/// Checks headers in priority order:
///   1. CF-Connecting-IP (Cloudflare)
///   2. X-Real-IP (nginx proxy_set_header)
///   3. X-Forwarded-For (first IP in the chain = original client)
///   4. Rocket's client_ip() (socket peer address)
pub struct ClientIp(pub String);

pub fn client_ip(request: &Request<'_>) -> String {
    let headers = request.headers();
    for name in ["CF-Connecting-IP", "X-Real-IP"] {
        if let Some(ip) = headers.get_one(name).map(str::trim) {
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    // X-Forwarded-For: client, proxy1, proxy2; the first entry is the client
    if let Some(forwarded) = headers.get_one("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next().map(str::trim) {
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    request
        .client_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(ClientIp(client_ip(request)))
    }
}

// ── Admin guard ──

/// Guard: the request carries the signed-in admin flag.
/// Without it the request is forwarded, and the admin catch-all sends the
/// browser to the login page.
pub struct AdminUser;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        if is_logged_in(request.cookies()) {
            Outcome::Success(AdminUser)
        } else {
            Outcome::Forward(Status::Unauthorized)
        }
    }
}

pub fn is_logged_in(cookies: &CookieJar<'_>) -> bool {
    cookies
        .get_private(SESSION_COOKIE)
        .map(|c| c.value() == "1")
        .unwrap_or(false)
}

// ── Credentials ──

/// The single back-office account.
pub struct AdminCredentials {
    pub user: String,
    pub pass: String,
    /// bcrypt hash; when present it is checked instead of `pass`.
    pub pass_hash: Option<String>,
}

impl AdminCredentials {
    pub fn verify(&self, user: &str, pass: &str) -> bool {
        if user.trim() != self.user {
            return false;
        }
        match self.pass_hash {
            Some(ref hash) => verify_password(pass, hash),
            None => pass == self.pass,
        }
    }
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// ── Session flag ──

pub fn set_session_cookie(cookies: &CookieJar<'_>) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "1");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

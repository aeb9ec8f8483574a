//! Session token storage.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use secrecy::{ExposeSecret, SecretString};

/// Cookie holding the admin bearer token.
pub const SESSION_COOKIE: &str = "adminToken";

/// Holds at most one admin bearer token.
///
/// Nothing here checks whether the token is still valid; the quiz API is the
/// only judge of that.
pub trait SessionStore {
    fn get(&self) -> Option<SecretString>;
    fn set(&mut self, token: SecretString);
    fn clear(&mut self);
}

/// Token kept in the `adminToken` cookie of the current request.
///
/// Changes are written back by returning [`CookieSession::into_jar`] as part
/// of the response.
pub struct CookieSession {
    jar: CookieJar,
    secure: bool,
}

impl CookieSession {
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl SessionStore for CookieSession {
    fn get(&self) -> Option<SecretString> {
        self.jar
            .get(SESSION_COOKIE)
            .map(|c| c.value())
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.to_owned()))
    }

    fn set(&mut self, token: SecretString) {
        let cookie = Cookie::build((SESSION_COOKIE, token.expose_secret().to_owned()))
            .path("/admin")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure);
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    fn clear(&mut self) {
        let cookie = Cookie::build(SESSION_COOKIE).path("/admin");
        self.jar = std::mem::take(&mut self.jar).remove(cookie);
    }
}

/// Process-local token, used by the CLI and in tests.
#[derive(Default)]
pub struct MemorySession {
    token: Option<SecretString>,
}

impl MemorySession {
    pub fn with_token(token: SecretString) -> Self {
        Self { token: Some(token) }
    }
}

impl SessionStore for MemorySession {
    fn get(&self) -> Option<SecretString> {
        self.token
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }

    fn set(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    fn clear(&mut self) {
        self.token = None;
    }
}

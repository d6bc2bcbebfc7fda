// Transport configuration and the session cookie store.
//
// The portal authenticates with a single `JSESSIONID` cookie. reqwest's
// built-in `Jar` cannot be cleared, so the client plugs in `SessionJar`,
// a `cookie_store`-backed store that re-login can wipe before every attempt.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest_cookie_store::{CookieStoreMutex, RawCookie};
use tracing::{trace, warn};
use url::Url;

use crate::error::Error;

/// Default per-request timeout, matching the portal's own web client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` that stores cookies in `jar`.
    pub fn build_client(&self, jar: Arc<SessionJar>) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("erovinieta/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(jar)
            .build()
            .map_err(|e| Error::Client(format!("failed to build HTTP client: {e}")))
    }
}

// ── Cookie store ─────────────────────────────────────────────────────

/// Clearable cookie store.
///
/// Domain, path, and expiry rules (including deletions sent as `Max-Age=0`
/// or a past `Expires`) are handled by `cookie_store`.
#[derive(Debug, Default)]
pub struct SessionJar {
    store: CookieStoreMutex,
}

impl SessionJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an unexpired cookie value by name.
    pub fn get(&self, name: &str) -> Option<String> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_unexpired()
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_owned())
    }

    /// Insert or replace a host-wide cookie for `url`'s host.
    pub fn insert(&self, name: &str, value: &str, url: &Url) {
        let mut cookie = RawCookie::new(name.to_owned(), value.to_owned());
        cookie.set_path("/");
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = store.insert_raw(&cookie, url) {
            warn!(name, error = %e, "cookie rejected by store");
        }
    }

    /// Drop every stored cookie.
    pub fn clear(&self) {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn is_empty(&self) -> bool {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_unexpired()
            .next()
            .is_none()
    }
}

impl CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        trace!(%url, "storing response cookies");
        self.store.set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.store.cookies(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://www.erovinieta.ro/vignettes-portal-web/").unwrap()
    }

    fn feed(jar: &SessionJar, headers: &[&'static str]) {
        let values: Vec<HeaderValue> = headers
            .iter()
            .map(|h| HeaderValue::from_static(h))
            .collect();
        jar.set_cookies(&mut values.iter(), &url());
    }

    fn header(jar: &SessionJar) -> Option<String> {
        jar.cookies(&url())
            .map(|value| value.to_str().unwrap().to_owned())
    }

    #[test]
    fn stores_session_cookie_from_set_cookie_header() {
        let jar = SessionJar::new();
        feed(&jar, &["JSESSIONID=abc123; Path=/; Secure; HttpOnly"]);
        assert_eq!(jar.get("JSESSIONID").as_deref(), Some("abc123"));
        assert_eq!(header(&jar).as_deref(), Some("JSESSIONID=abc123"));
    }

    #[test]
    fn later_cookie_replaces_earlier_one() {
        let jar = SessionJar::new();
        feed(&jar, &["JSESSIONID=first; Path=/", "JSESSIONID=second; Path=/"]);
        assert_eq!(jar.get("JSESSIONID").as_deref(), Some("second"));
    }

    #[test]
    fn max_age_zero_removes_cookie() {
        let jar = SessionJar::new();
        feed(&jar, &["JSESSIONID=abc; Path=/"]);
        feed(&jar, &["JSESSIONID=abc; Max-Age=0; Path=/"]);
        assert!(jar.get("JSESSIONID").is_none());
        assert!(jar.cookies(&url()).is_none());
    }

    #[test]
    fn past_expiry_removes_cookie() {
        let jar = SessionJar::new();
        jar.insert("JSESSIONID", "abc", &url());
        feed(
            &jar,
            &["JSESSIONID=abc; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/"],
        );
        assert!(jar.get("JSESSIONID").is_none());
        assert!(jar.cookies(&url()).is_none());
    }

    #[test]
    fn inserted_cookie_is_sent_under_the_portal_path() {
        let jar = SessionJar::new();
        jar.insert("JSESSIONID", "tok", &url());
        let detail = url().join("rest/client/getUserData").unwrap();
        assert_eq!(
            jar.cookies(&detail).unwrap().to_str().unwrap(),
            "JSESSIONID=tok"
        );
    }

    #[test]
    fn clear_drops_everything() {
        let jar = SessionJar::new();
        feed(&jar, &["JSESSIONID=abc; Path=/", "remember-me=xyz; Path=/"]);
        assert!(!jar.is_empty());
        jar.clear();
        assert!(jar.is_empty());
    }

    #[test]
    fn multiple_cookies_are_all_sent() {
        let jar = SessionJar::new();
        feed(&jar, &["JSESSIONID=abc; Path=/", "remember-me=xyz; Path=/"]);
        let sent = header(&jar).unwrap();
        assert!(sent.contains("JSESSIONID=abc"));
        assert!(sent.contains("remember-me=xyz"));
    }

    #[test]
    fn malformed_headers_are_ignored() {
        let jar = SessionJar::new();
        feed(&jar, &["garbage", "=novalue"]);
        assert!(jar.is_empty());
    }
}

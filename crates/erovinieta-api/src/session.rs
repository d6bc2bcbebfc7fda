// Portal session client
//
// Owns the HTTP client, the cookie store, and the current session token.
// Login is a form-less JSON POST to Spring Security; the server answers
// with a `JSESSIONID` cookie that authorizes every later request for
// roughly an hour. Endpoint methods live in `crate::endpoints` and all
// funnel through `SessionClient::request`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, body_preview};
use crate::transport::{SessionJar, TransportConfig};

/// Name of the session cookie issued by the portal.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Login endpoint, relative to the portal base URL.
const LOGIN_PATH: &str = "j_spring_security_check";

const JSON_ACCEPT: &str = "application/json, text/plain, */*";
const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

// ── Session token ────────────────────────────────────────────────────

/// A session cookie value plus the monotonic instant it was obtained.
#[derive(Clone)]
pub struct SessionToken {
    value: SecretString,
    acquired_at: Instant,
}

impl SessionToken {
    /// How long the portal honours a session.
    pub const LIFETIME: Duration = Duration::from_secs(3600);
    /// Tokens are treated as stale this long before the portal would expire them.
    pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

    pub fn new(value: impl Into<String>, acquired_at: Instant) -> Self {
        Self {
            value: SecretString::from(value.into()),
            acquired_at,
        }
    }

    pub fn value(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// `true` while the token is younger than `LIFETIME - REFRESH_MARGIN` at `now`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.acquired_at) < Self::LIFETIME - Self::REFRESH_MARGIN
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"[REDACTED]")
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Authenticated HTTP session against the portal.
///
/// Every data request goes through [`SessionClient::request`], which logs in
/// when no fresh token is held and re-authenticates at most once per call
/// when the portal rejects the session, answers with something that is
/// not JSON, or cannot be reached.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    jar: Arc<SessionJar>,
    token: RwLock<Option<SessionToken>>,
    login_attempts: AtomicU32,
}

impl SessionClient {
    /// Create a client for the portal rooted at `base_url`.
    ///
    /// The base URL is the portal application root, e.g.
    /// `https://www.erovinieta.ro/vignettes-portal-web/`. A missing trailing
    /// slash is added so relative endpoint paths join underneath it.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        let jar = Arc::new(SessionJar::new());
        let http = transport.build_client(Arc::clone(&jar))?;
        Ok(Self {
            http,
            base_url,
            username: username.into(),
            password,
            jar,
            token: RwLock::new(None),
            login_attempts: AtomicU32::new(0),
        })
    }

    /// The portal base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The cookie store backing this client.
    pub fn jar(&self) -> &SessionJar {
        &self.jar
    }

    /// Number of login round-trips attempted since construction.
    pub fn login_attempts(&self) -> u32 {
        self.login_attempts.load(Ordering::Relaxed)
    }

    /// Resolve `path` against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Token state ──────────────────────────────────────────────────

    fn current_token(&self) -> Option<SessionToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_token(&self, token: Option<SessionToken>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// `true` when a session token is held and still inside its validity window.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Instant::now())
    }

    /// [`is_authenticated`](Self::is_authenticated) evaluated at an explicit instant.
    pub fn is_authenticated_at(&self, now: Instant) -> bool {
        self.current_token()
            .is_some_and(|token| token.is_fresh_at(now))
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in and capture a fresh session token.
    ///
    /// Cookies and any previous token are dropped before the attempt, so a
    /// failed login always leaves the client unauthenticated.
    ///
    /// `POST j_spring_security_check`
    pub async fn authenticate(&self) -> Result<(), Error> {
        self.login_attempts.fetch_add(1, Ordering::Relaxed);
        self.jar.clear();
        self.store_token(None);

        let url = self.endpoint(LOGIN_PATH)?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": self.username,
            "password": self.password.expose_secret(),
            "_spring_security_remember_me": "on",
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "login request did not complete");
                Error::Authentication {
                    message: format!("login request failed: {e}"),
                }
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            let preview = body_preview(&body);
            warn!(%status, "login rejected");
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {preview}"),
            });
        }

        // The cookie store has already absorbed the Set-Cookie headers,
        // including any issued along a redirect chain.
        let Some(value) = self.jar.get(SESSION_COOKIE) else {
            warn!("login succeeded but no session cookie was issued");
            return Err(Error::Authentication {
                message: format!("login response carried no {SESSION_COOKIE} cookie"),
            });
        };

        self.store_token(Some(SessionToken::new(value, Instant::now())));
        info!(username = %self.username, "authenticated with portal");
        Ok(())
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Perform an authenticated request and decode the JSON response.
    ///
    /// Logs in first when no fresh token is held. If the portal answers 401
    /// or 403, returns a body that is not JSON at all, or the request fails
    /// at the transport level, and `allow_reauth` is set, the client logs in
    /// once more and replays the request. Any non-200 or unparseable outcome
    /// after that becomes [`Error::ApiRequest`], as does a 200 body whose
    /// JSON does not fit `T` (without another login).
    ///
    /// Callers that need loosely-typed access can ask for `serde_json::Value`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        payload: Option<&Value>,
        headers: Option<HeaderMap>,
        allow_reauth: bool,
    ) -> Result<T, Error> {
        if !self.is_authenticated() {
            debug!("no fresh session token, logging in");
            self.authenticate().await?;
        }

        let headers = merged_headers(headers, payload.is_some());
        let mut outcome = self.send_once(&method, &url, payload, &headers).await;

        if allow_reauth && outcome.warrants_reauth() {
            info!(%url, reason = outcome.describe(), "re-authenticating and retrying");
            self.authenticate().await?;
            outcome = self.send_once(&method, &url, payload, &headers).await;
        }

        outcome.into_result()
    }

    /// Single attempt: re-assert the session cookie, send, classify.
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        payload: Option<&Value>,
        headers: &HeaderMap,
    ) -> Outcome {
        if let Some(token) = self.current_token() {
            self.jar.insert(SESSION_COOKIE, token.value(), &self.base_url);
        }

        debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers.clone());
        if let Some(body) = payload {
            builder = builder.json(body);
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => return Outcome::Transport(e.to_string()),
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return Outcome::Transport(e.to_string()),
        };

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Outcome::Parsed {
                status,
                body,
                value,
            },
            Err(e) => {
                debug!(%status, error = %e, "response body is not JSON");
                Outcome::Unparseable { status, body }
            }
        }
    }
}

/// Classified result of one request attempt.
enum Outcome {
    Parsed {
        status: StatusCode,
        body: String,
        value: Value,
    },
    Unparseable {
        status: StatusCode,
        body: String,
    },
    Transport(String),
}

impl Outcome {
    fn warrants_reauth(&self) -> bool {
        match self {
            Self::Parsed { status, .. } => {
                matches!(*status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            }
            Self::Unparseable { .. } | Self::Transport(_) => true,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Parsed { .. } => "session rejected",
            Self::Unparseable { .. } => "unexpected response body",
            Self::Transport(_) => "transport failure",
        }
    }

    fn into_result<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self {
            Self::Parsed {
                status,
                body,
                value,
            } if status == StatusCode::OK => serde_json::from_value(value).map_err(|e| {
                debug!(error = %e, "response JSON has an unexpected shape");
                Error::ApiRequest {
                    status: Some(status.as_u16()),
                    body,
                }
            }),
            Self::Parsed { status, body, .. } | Self::Unparseable { status, body } => {
                Err(Error::ApiRequest {
                    status: Some(status.as_u16()),
                    body,
                })
            }
            Self::Transport(message) => Err(Error::ApiRequest {
                status: None,
                body: message,
            }),
        }
    }
}

fn merged_headers(extra: Option<HeaderMap>, has_body: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_ACCEPT));
    if has_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }
    if let Some(extra) = extra {
        headers.extend(extra);
    }
    headers
}

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}

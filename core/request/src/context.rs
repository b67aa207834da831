use std::collections::HashMap;
use std::convert::Infallible;

use rocket::request::{self, FromRequest, Request};
use rocket::outcome::Outcome;

use crate::{ContextKey, ContextValue, WebAuthnSession};

/// Fallback for [`RequestContext::user_name()`].
pub const DEFAULT_USER_NAME: &str = "unknown";

/// Fallback for [`RequestContext::user_timezone()`].
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Fallback for [`RequestContext::user_language()`].
pub const DEFAULT_LANGUAGE: &str = "en_US";

/// Fallback for [`RequestContext::user_theme()`].
pub const DEFAULT_THEME: &str = "system_serif";

/// An immutable key/value association scoped to a single request.
///
/// A context is assembled once, with [`RequestContext::with()`], by the
/// middleware that resolves the caller, and is read-only afterwards. Every
/// accessor falls back to a documented default when its key is absent or
/// holds a value of the wrong type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    values: HashMap<ContextKey, ContextValue>,
}

impl RequestContext {
    /// Returns an empty context.
    pub fn new() -> RequestContext {
        RequestContext::default()
    }

    /// Returns `self` with `value` stored under `key`, replacing any previous
    /// value for that key.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reader_request::{ContextKey, RequestContext};
    ///
    /// let ctxt = RequestContext::new()
    ///     .with(ContextKey::UserId, 42i64)
    ///     .with(ContextKey::UserName, "alice");
    ///
    /// assert_eq!(ctxt.user_id(), 42);
    /// assert_eq!(ctxt.user_name(), "alice");
    /// ```
    pub fn with<V: Into<ContextValue>>(mut self, key: ContextKey, value: V) -> RequestContext {
        self.values.insert(key, value.into());
        self
    }

    /// Returns the raw value stored under `key`, if any.
    pub fn get(&self, key: ContextKey) -> Option<&ContextValue> {
        self.values.get(&key)
    }

    /// Stores `ctxt` in the request-local cache of `req` and returns the
    /// cached context.
    ///
    /// The cache is write-once: if a context was already attached (or read via
    /// [`RequestContext::of()`]) the existing one is kept and returned.
    pub fn attach<'r>(req: &'r Request<'_>, ctxt: RequestContext) -> &'r RequestContext {
        req.local_cache(move || ctxt)
    }

    /// Returns the context attached to `req`, or an empty one if none was.
    pub fn of<'r>(req: &'r Request<'_>) -> &'r RequestContext {
        req.local_cache(RequestContext::default)
    }

    fn string(&self, key: ContextKey) -> &str {
        match self.get(key) {
            Some(ContextValue::Str(value)) => value,
            _ => "",
        }
    }

    fn string_or<'a>(&'a self, key: ContextKey, default: &'a str) -> &'a str {
        match self.string(key) {
            "" => default,
            value => value,
        }
    }

    fn boolean(&self, key: ContextKey) -> bool {
        matches!(self.get(key), Some(ContextValue::Bool(true)))
    }

    fn int64(&self, key: ContextKey) -> i64 {
        match self.get(key) {
            Some(ContextValue::Int(value)) => *value,
            _ => 0,
        }
    }

    /// The id of the logged in user, or `0`.
    pub fn user_id(&self) -> i64 {
        self.int64(ContextKey::UserId)
    }

    /// The username of the logged in user, or [`DEFAULT_USER_NAME`].
    pub fn user_name(&self) -> &str {
        self.string_or(ContextKey::UserName, DEFAULT_USER_NAME)
    }

    /// The timezone of the logged in user, or [`DEFAULT_TIMEZONE`].
    pub fn user_timezone(&self) -> &str {
        self.string_or(ContextKey::UserTimezone, DEFAULT_TIMEZONE)
    }

    /// Whether the logged in user is an administrator.
    pub fn is_admin_user(&self) -> bool {
        self.boolean(ContextKey::IsAdminUser)
    }

    /// Whether the request carries an authenticated user.
    pub fn is_authenticated(&self) -> bool {
        self.boolean(ContextKey::IsAuthenticated)
    }

    pub fn user_session_token(&self) -> &str {
        self.string(ContextKey::UserSessionToken)
    }

    /// The locale of the logged in user, or [`DEFAULT_LANGUAGE`].
    pub fn user_language(&self) -> &str {
        self.string_or(ContextKey::UserLanguage, DEFAULT_LANGUAGE)
    }

    /// The theme of the logged in user, or [`DEFAULT_THEME`].
    pub fn user_theme(&self) -> &str {
        self.string_or(ContextKey::UserTheme, DEFAULT_THEME)
    }

    pub fn session_id(&self) -> &str {
        self.string(ContextKey::SessionId)
    }

    /// The CSRF token issued for this session.
    pub fn csrf(&self) -> &str {
        self.string(ContextKey::Csrf)
    }

    pub fn oauth2_state(&self) -> &str {
        self.string(ContextKey::OAuth2State)
    }

    pub fn oauth2_code_verifier(&self) -> &str {
        self.string(ContextKey::OAuth2CodeVerifier)
    }

    pub fn flash_message(&self) -> &str {
        self.string(ContextKey::FlashMessage)
    }

    pub fn flash_error_message(&self) -> &str {
        self.string(ContextKey::FlashErrorMessage)
    }

    /// The Unix timestamp of the user's last forced refresh.
    ///
    /// The value is stored as a base-10 string; anything that does not parse
    /// as an `i64` yields `0`.
    pub fn last_force_refresh(&self) -> i64 {
        self.string(ContextKey::LastForceRefresh).parse().unwrap_or(0)
    }

    pub fn client_ip(&self) -> &str {
        self.string(ContextKey::ClientIp)
    }

    /// The Google Reader API token, for requests coming through that API.
    pub fn google_reader_token(&self) -> &str {
        self.string(ContextKey::GoogleReaderToken)
    }

    /// A copy of the pending WebAuthn ceremony state, if one is stored.
    pub fn webauthn_session(&self) -> Option<WebAuthnSession> {
        match self.get(ContextKey::WebAuthnData) {
            Some(ContextValue::WebAuthn(session)) => Some(session.clone()),
            _ => None,
        }
    }
}

impl<K: Into<ContextValue>> FromIterator<(ContextKey, K)> for RequestContext {
    fn from_iter<I: IntoIterator<Item = (ContextKey, K)>>(iter: I) -> Self {
        let values = iter.into_iter().map(|(k, v)| (k, v.into())).collect();
        RequestContext { values }
    }
}

/// Retrieves the [`RequestContext`] attached to the request. This guard never
/// fails; without middleware an empty context is returned.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r RequestContext {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Infallible> {
        Outcome::Success(RequestContext::of(req))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn session() -> WebAuthnSession {
        WebAuthnSession {
            challenge: "c2VjcmV0".into(),
            user_id: Some(vec![1, 2, 3]),
            allowed_credentials: vec![vec![9, 9]],
            user_verification: "preferred".into(),
        }
    }

    #[test]
    fn empty_context_yields_defaults() {
        let ctxt = RequestContext::new();

        assert_eq!(ctxt.user_id(), 0);
        assert_eq!(ctxt.user_name(), "unknown");
        assert_eq!(ctxt.user_timezone(), "UTC");
        assert!(!ctxt.is_admin_user());
        assert!(!ctxt.is_authenticated());
        assert_eq!(ctxt.user_session_token(), "");
        assert_eq!(ctxt.user_language(), "en_US");
        assert_eq!(ctxt.user_theme(), "system_serif");
        assert_eq!(ctxt.session_id(), "");
        assert_eq!(ctxt.csrf(), "");
        assert_eq!(ctxt.oauth2_state(), "");
        assert_eq!(ctxt.oauth2_code_verifier(), "");
        assert_eq!(ctxt.flash_message(), "");
        assert_eq!(ctxt.flash_error_message(), "");
        assert_eq!(ctxt.last_force_refresh(), 0);
        assert_eq!(ctxt.client_ip(), "");
        assert_eq!(ctxt.google_reader_token(), "");
        assert_eq!(ctxt.webauthn_session(), None);
    }

    #[test]
    fn present_values_are_returned_verbatim() {
        let ctxt = RequestContext::new()
            .with(ContextKey::UserId, 7i64)
            .with(ContextKey::UserName, "alice")
            .with(ContextKey::UserTimezone, "Europe/Paris")
            .with(ContextKey::IsAdminUser, true)
            .with(ContextKey::IsAuthenticated, true)
            .with(ContextKey::UserSessionToken, "token")
            .with(ContextKey::UserLanguage, "fr_FR")
            .with(ContextKey::UserTheme, "dark_serif")
            .with(ContextKey::SessionId, "sid")
            .with(ContextKey::Csrf, "csrf")
            .with(ContextKey::OAuth2State, "state")
            .with(ContextKey::OAuth2CodeVerifier, "verifier")
            .with(ContextKey::FlashMessage, "saved")
            .with(ContextKey::FlashErrorMessage, "failed")
            .with(ContextKey::LastForceRefresh, "1700000000")
            .with(ContextKey::ClientIp, "10.0.0.1")
            .with(ContextKey::GoogleReaderToken, "greader")
            .with(ContextKey::WebAuthnData, session());

        assert_eq!(ctxt.user_id(), 7);
        assert_eq!(ctxt.user_name(), "alice");
        assert_eq!(ctxt.user_timezone(), "Europe/Paris");
        assert!(ctxt.is_admin_user());
        assert!(ctxt.is_authenticated());
        assert_eq!(ctxt.user_session_token(), "token");
        assert_eq!(ctxt.user_language(), "fr_FR");
        assert_eq!(ctxt.user_theme(), "dark_serif");
        assert_eq!(ctxt.session_id(), "sid");
        assert_eq!(ctxt.csrf(), "csrf");
        assert_eq!(ctxt.oauth2_state(), "state");
        assert_eq!(ctxt.oauth2_code_verifier(), "verifier");
        assert_eq!(ctxt.flash_message(), "saved");
        assert_eq!(ctxt.flash_error_message(), "failed");
        assert_eq!(ctxt.last_force_refresh(), 1700000000);
        assert_eq!(ctxt.client_ip(), "10.0.0.1");
        assert_eq!(ctxt.google_reader_token(), "greader");
        assert_eq!(ctxt.webauthn_session(), Some(session()));
    }

    #[test]
    fn mistyped_values_yield_defaults() {
        let ctxt: RequestContext = ContextKey::ALL.iter()
            .map(|&key| (key, ContextValue::Int(99)))
            .collect();

        assert_eq!(ctxt.user_name(), "unknown");
        assert_eq!(ctxt.user_timezone(), "UTC");
        assert_eq!(ctxt.user_language(), "en_US");
        assert_eq!(ctxt.user_theme(), "system_serif");
        assert_eq!(ctxt.csrf(), "");
        assert!(!ctxt.is_authenticated());
        assert_eq!(ctxt.last_force_refresh(), 0);
        assert_eq!(ctxt.webauthn_session(), None);

        // The integer slot is the only one the accessor accepts as-is.
        assert_eq!(ctxt.user_id(), 99);

        let ctxt = RequestContext::new()
            .with(ContextKey::UserId, "42")
            .with(ContextKey::IsAdminUser, "true");

        assert_eq!(ctxt.user_id(), 0);
        assert!(!ctxt.is_admin_user());
    }

    #[test]
    fn empty_strings_fall_back_to_named_defaults() {
        let ctxt = RequestContext::new()
            .with(ContextKey::UserName, "")
            .with(ContextKey::UserTimezone, "")
            .with(ContextKey::UserLanguage, "")
            .with(ContextKey::UserTheme, "");

        assert_eq!(ctxt.user_name(), DEFAULT_USER_NAME);
        assert_eq!(ctxt.user_timezone(), DEFAULT_TIMEZONE);
        assert_eq!(ctxt.user_language(), DEFAULT_LANGUAGE);
        assert_eq!(ctxt.user_theme(), DEFAULT_THEME);
    }

    #[test]
    fn last_force_refresh_parses_base_ten() {
        let refresh = |v: &str| {
            RequestContext::new().with(ContextKey::LastForceRefresh, v).last_force_refresh()
        };

        assert_eq!(refresh("42"), 42);
        assert_eq!(refresh("-5"), -5);
        assert_eq!(refresh("abc"), 0);
        assert_eq!(refresh(""), 0);
        assert_eq!(refresh("0x10"), 0);
        assert_eq!(refresh("99999999999999999999"), 0);
    }

    #[test]
    fn webauthn_session_is_a_copy() {
        let ctxt = RequestContext::new().with(ContextKey::WebAuthnData, session());

        let mut copy = ctxt.webauthn_session().unwrap();
        copy.challenge.clear();

        assert_eq!(ctxt.webauthn_session(), Some(session()));
    }

    #[test]
    fn later_values_replace_earlier_ones() {
        let ctxt = RequestContext::new()
            .with(ContextKey::UserTheme, "light_serif")
            .with(ContextKey::UserTheme, "dark_sans_serif");

        assert_eq!(ctxt.user_theme(), "dark_sans_serif");
    }
}

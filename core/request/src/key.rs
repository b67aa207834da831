use std::fmt;

/// The closed set of slots a [`RequestContext`](crate::RequestContext) can
/// hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextKey {
    UserId,
    UserName,
    UserTimezone,
    IsAdminUser,
    IsAuthenticated,
    UserSessionToken,
    UserLanguage,
    UserTheme,
    SessionId,
    Csrf,
    OAuth2State,
    OAuth2CodeVerifier,
    FlashMessage,
    FlashErrorMessage,
    LastForceRefresh,
    ClientIp,
    GoogleReaderToken,
    WebAuthnData,
}

impl ContextKey {
    /// Every key, in declaration order.
    pub const ALL: &'static [ContextKey] = &[
        ContextKey::UserId,
        ContextKey::UserName,
        ContextKey::UserTimezone,
        ContextKey::IsAdminUser,
        ContextKey::IsAuthenticated,
        ContextKey::UserSessionToken,
        ContextKey::UserLanguage,
        ContextKey::UserTheme,
        ContextKey::SessionId,
        ContextKey::Csrf,
        ContextKey::OAuth2State,
        ContextKey::OAuth2CodeVerifier,
        ContextKey::FlashMessage,
        ContextKey::FlashErrorMessage,
        ContextKey::LastForceRefresh,
        ContextKey::ClientIp,
        ContextKey::GoogleReaderToken,
        ContextKey::WebAuthnData,
    ];

    /// A stable, human readable name for this key, used in log output.
    pub fn as_str(self) -> &'static str {
        match self {
            ContextKey::UserId => "user_id",
            ContextKey::UserName => "user_name",
            ContextKey::UserTimezone => "user_timezone",
            ContextKey::IsAdminUser => "is_admin_user",
            ContextKey::IsAuthenticated => "is_authenticated",
            ContextKey::UserSessionToken => "user_session_token",
            ContextKey::UserLanguage => "user_language",
            ContextKey::UserTheme => "user_theme",
            ContextKey::SessionId => "session_id",
            ContextKey::Csrf => "csrf",
            ContextKey::OAuth2State => "oauth2_state",
            ContextKey::OAuth2CodeVerifier => "oauth2_code_verifier",
            ContextKey::FlashMessage => "flash_message",
            ContextKey::FlashErrorMessage => "flash_error_message",
            ContextKey::LastForceRefresh => "last_force_refresh",
            ContextKey::ClientIp => "client_ip",
            ContextKey::GoogleReaderToken => "google_reader_token",
            ContextKey::WebAuthnData => "webauthn_data",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use rocket::serde::{Deserialize, Serialize};

/// The in-flight state of a WebAuthn registration or login ceremony.
///
/// The ceremony itself is driven elsewhere; the request context only carries
/// this payload between the middleware that loaded it and the handler that
/// completes the ceremony.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct WebAuthnSession {
    /// The base64url-encoded challenge issued to the authenticator.
    pub challenge: String,
    /// The relying party's handle for the user, if the user is known.
    pub user_id: Option<Vec<u8>>,
    /// Credential ids the authenticator may answer with.
    pub allowed_credentials: Vec<Vec<u8>>,
    pub user_verification: String,
}

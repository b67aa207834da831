use crate::WebAuthnSession;

/// A value stored under a [`ContextKey`](crate::ContextKey).
///
/// Accessors only return a value when it has the variant they expect; any
/// other variant is treated exactly like an absent value.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Str(String),
    Bool(bool),
    Int(i64),
    WebAuthn(WebAuthnSession),
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_owned())
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Int(value)
    }
}

impl From<WebAuthnSession> for ContextValue {
    fn from(value: WebAuthnSession) -> Self {
        ContextValue::WebAuthn(value)
    }
}

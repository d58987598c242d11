use std::sync::RwLock;

/// Admin session passed explicitly into the transport client.
///
/// Holds the bearer token used for every outbound request. The token is
/// dropped when the API answers 401 so later requests go out anonymous and
/// the dashboard can tell the admin to sign in again.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        }
    }

    /// Current bearer token, if any
    pub fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Forget the token after the API rejected it
    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            if guard.take().is_some() {
                tracing::warn!("Session token rejected by API, cleared");
            }
        }
    }
}

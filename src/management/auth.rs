use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::{
    error::{Error, Result},
    types::TokenPayload,
};

/// Seconds before the real expiry at which a token is already treated as expired.
const EXPIRY_BUFFER_SECS: i64 = 240;

/// Bearer credential plus whatever is needed to renew it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub bearer_token: String,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// Unix timestamp (seconds). `None` when the lifetime is unknown.
    pub expires_at: Option<i64>,
}

impl Credential {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            ..Self::default()
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = client_secret;
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// True once we are inside the safety buffer before `expires_at`.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at - EXPIRY_BUFFER_SECS,
            None => false,
        }
    }
}

/// Shared, explicitly owned holder of the client's [`Credential`].
///
/// The fetch primitive never reads this directly: the client takes a snapshot
/// per call and hands it over.
#[derive(Debug, Clone)]
pub struct TokenManager {
    credential: Arc<RwLock<Credential>>,
}

impl TokenManager {
    pub fn new(credential: Credential) -> Result<Self> {
        if credential.bearer_token.trim().is_empty() {
            return Err(Error::MissingParameter("token"));
        }

        Ok(Self {
            credential: Arc::new(RwLock::new(credential)),
        })
    }

    /// Copy of the credential as it is right now.
    pub fn current(&self) -> Credential {
        self.credential.read().clone()
    }

    pub fn bearer_token(&self) -> String {
        self.credential.read().bearer_token.clone()
    }

    pub fn is_expired(&self) -> bool {
        self.credential.read().is_expired()
    }

    /// Replaces the bearer token outright, dropping any known expiry.
    pub fn set_token(&self, bearer_token: impl Into<String>) -> Result<()> {
        let bearer_token = bearer_token.into();
        if bearer_token.trim().is_empty() {
            return Err(Error::MissingParameter("token"));
        }

        let mut credential = self.credential.write();
        credential.bearer_token = bearer_token;
        credential.expires_at = None;
        Ok(())
    }

    /// Takes over a token payload from the accounts service.
    ///
    /// The refresh token is only replaced when the payload carries a new one,
    /// since Spotify does not always rotate it.
    pub fn adopt(&self, payload: &TokenPayload) {
        let mut credential = self.credential.write();
        credential.bearer_token = payload.access_token.clone();
        if let Some(refresh_token) = &payload.refresh_token {
            credential.refresh_token = Some(refresh_token.clone());
        }
        credential.expires_at = payload
            .expires_in
            .map(|secs| Utc::now().timestamp() + secs as i64);
    }
}

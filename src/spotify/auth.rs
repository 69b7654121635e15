use reqwest::{Client, Url, header::AUTHORIZATION};
use tracing::info;

use crate::{
    config::{self, ClientConfig},
    error::{Error, Result, require},
    spotify::fetch::read_json,
    types::TokenPayload,
    utils,
};

/// Inputs of the authorization-code exchange.
///
/// Every field is required; `Option` only exists so a missing value can be
/// reported as [`Error::MissingParameter`] instead of failing to compile.
#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub code: Option<String>,
    /// PKCE verifier, sent when the authorization URL carried a challenge.
    pub code_verifier: Option<String>,
}

impl RefreshOptions {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            redirect_uri: Some(redirect_uri.into()),
            code: Some(code.into()),
            code_verifier: None,
        }
    }

    /// Application credentials from the environment; `code` still has to be set.
    pub fn from_env() -> Self {
        Self {
            client_id: config::spotify_client_id(),
            client_secret: config::spotify_client_secret(),
            redirect_uri: config::spotify_redirect_uri(),
            ..Self::default()
        }
    }
}

/// Inputs of [`AuthManager::build_authorization_url`].
#[derive(Debug, Clone, Default)]
pub struct AuthorizationUrlOptions {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub show_dialog: bool,
    /// `S256` PKCE challenge, see [`utils::generate_code_challenge`].
    pub code_challenge: Option<String>,
}

impl AuthorizationUrlOptions {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            redirect_uri: Some(redirect_uri.into()),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self {
            client_id: config::spotify_client_id(),
            client_secret: config::spotify_client_secret(),
            redirect_uri: config::spotify_redirect_uri(),
            scope: config::spotify_scope(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_code_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.code_challenge = Some(challenge.into());
        self
    }
}

/// OAuth operations against the accounts service.
///
/// Holds no token itself; callers decide whether to adopt what comes back
/// (see [`crate::management::TokenManager::adopt`]).
#[derive(Debug, Clone)]
pub struct AuthManager {
    http: Client,
    token_url: String,
    authorize_url: String,
}

impl AuthManager {
    pub fn new(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            authorize_url: config.authorize_url(),
        }
    }

    /// Client credentials grant: an app-only access token, no user context.
    pub async fn exchange_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String> {
        let client_id = require(Some(client_id), "client_id")?;
        let client_secret = require(Some(client_secret), "client_secret")?;

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let payload: TokenPayload = serde_json::from_value(read_json(response).await?)?;
        info!("obtained client credentials token");
        Ok(payload.access_token)
    }

    /// Authorization code grant: trades a user-approved `code` for a token pair.
    ///
    /// Authenticates with HTTP Basic built from `client_id:client_secret` and
    /// returns the provider's payload untouched.
    pub async fn refresh(&self, options: &RefreshOptions) -> Result<TokenPayload> {
        let client_id = require(options.client_id.as_deref(), "client_id")?;
        let client_secret = require(options.client_secret.as_deref(), "client_secret")?;
        let redirect_uri = require(options.redirect_uri.as_deref(), "redirect_uri")?;
        let code = require(options.code.as_deref(), "code")?;

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        if let Some(verifier) = options.code_verifier.as_deref() {
            form.push(("code_verifier", verifier));
        }

        let response = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, utils::basic_auth_header(client_id, client_secret))
            .form(&form)
            .send()
            .await?;

        let payload: TokenPayload = serde_json::from_value(read_json(response).await?)?;
        info!(
            has_refresh_token = payload.refresh_token.is_some(),
            "exchanged authorization code"
        );
        Ok(payload)
    }

    /// Refresh token grant.
    ///
    /// Confidential clients authenticate with Basic auth; public (PKCE) clients
    /// pass no secret and send `client_id` in the form instead.
    pub async fn refresh_access_token(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
        refresh_token: &str,
    ) -> Result<TokenPayload> {
        let client_id = require(Some(client_id), "client_id")?;
        let refresh_token = require(Some(refresh_token), "refresh_token")?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let mut request = self.http.post(&self.token_url);
        match client_secret.filter(|s| !s.trim().is_empty()) {
            Some(secret) => {
                request = request.header(AUTHORIZATION, utils::basic_auth_header(client_id, secret));
            }
            None => form.push(("client_id", client_id)),
        }

        let response = request.form(&form).send().await?;
        let payload: TokenPayload = serde_json::from_value(read_json(response).await?)?;
        info!("refreshed access token");
        Ok(payload)
    }

    /// URL the user visits to approve the app. Pure: no network, same input
    /// gives byte-identical output.
    pub fn build_authorization_url(&self, options: &AuthorizationUrlOptions) -> Result<String> {
        let client_id = require(options.client_id.as_deref(), "client_id")?;
        require(options.client_secret.as_deref(), "client_secret")?;
        let redirect_uri = require(options.redirect_uri.as_deref(), "redirect_uri")?;

        let mut params = vec![
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
        ];
        if let Some(scope) = options.scope.as_deref() {
            params.push(("scope", scope));
        }
        if let Some(state) = options.state.as_deref() {
            params.push(("state", state));
        }
        if options.show_dialog {
            params.push(("show_dialog", "true"));
        }
        if let Some(challenge) = options.code_challenge.as_deref() {
            params.push(("code_challenge_method", "S256"));
            params.push(("code_challenge", challenge));
        }

        let url = Url::parse_with_params(&self.authorize_url, &params)
            .map_err(|e| Error::unexpected(format!("invalid authorize endpoint: {e}")))?;
        Ok(url.into())
    }
}

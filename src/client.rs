use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::{
    config::{ClientConfig, EnrichmentPolicy},
    error::{Error, Result},
    management::{
        AlbumManager, ArtistManager, CacheRegistry, Credential, EpisodeManager, PlaylistManager,
        ShowManager, TokenManager, TrackManager, UserManager,
    },
    spotify::{
        auth::AuthManager,
        code_image::CodeImageClient,
        fetch::{FetchRequest, Fetcher},
    },
    types::{CodeImage, Scannable},
};

/// Entry point of the library. Cheap to clone; clones share credential and caches.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: ClientConfig,
    tokens: TokenManager,
    fetcher: Fetcher,
    auth: AuthManager,
    code_images: CodeImageClient,
    cache: CacheRegistry,
}

impl Client {
    /// Builds a client around a bearer token.
    ///
    /// # Errors
    ///
    /// `MissingParameter("token")` for an empty token, `UnexpectedFailure` if the
    /// HTTP client cannot be initialised.
    pub fn new(token: impl Into<String>, config: ClientConfig) -> Result<Self> {
        Self::with_credential(Credential::new(token), config)
    }

    pub fn with_credential(credential: Credential, config: ClientConfig) -> Result<Self> {
        let tokens = TokenManager::new(credential)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                fetcher: Fetcher::new(http.clone(), config.api_base_url.clone()),
                auth: AuthManager::new(http.clone(), &config),
                code_images: CodeImageClient::new(http, config.scannables_base_url.clone()),
                cache: CacheRegistry::new(&config.cache),
                tokens,
                config,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.inner.tokens
    }

    pub fn auth(&self) -> &AuthManager {
        &self.inner.auth
    }

    pub fn cache(&self) -> &CacheRegistry {
        &self.inner.cache
    }

    /// Authenticated request with the credential as it is at call time.
    pub async fn fetch(&self, request: FetchRequest) -> Result<Value> {
        let credential = self.inner.tokens.current();
        self.inner.fetcher.fetch(&credential, request).await
    }

    /// Renews the bearer token with the stored refresh token and adopts it.
    ///
    /// Never called implicitly; run it when a call failed with
    /// `InvalidCredential` or when [`TokenManager::is_expired`] says so.
    pub async fn renew_token(&self) -> Result<()> {
        let credential = self.inner.tokens.current();
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or(Error::MissingParameter("refresh_token"))?;
        let client_id = credential
            .client_id
            .as_deref()
            .ok_or(Error::MissingParameter("client_id"))?;

        let payload = self
            .inner
            .auth
            .refresh_access_token(client_id, credential.client_secret.as_deref(), refresh_token)
            .await?;
        self.inner.tokens.adopt(&payload);
        Ok(())
    }

    pub async fn get_code_image(&self, uri: &str) -> Result<CodeImage> {
        self.inner.code_images.get_code_image(uri).await
    }

    /// Attaches the code image and dominant colour to `entity`, honouring the
    /// configured [`EnrichmentPolicy`].
    pub async fn enrich<T: Scannable>(&self, entity: &mut T) -> Result<()> {
        match self.get_code_image(entity.uri()).await {
            Ok(code) => {
                entity.set_code_image(code);
                Ok(())
            }
            Err(e) => match self.inner.config.enrichment {
                EnrichmentPolicy::Propagate => Err(e),
                EnrichmentPolicy::Ignore => {
                    warn!(uri = entity.uri(), error = %e, "code image unavailable, skipping");
                    Ok(())
                }
            },
        }
    }

    /// Enriches each entity in order, one request at a time.
    pub async fn enrich_all<T: Scannable>(&self, entities: &mut [T]) -> Result<()> {
        for entity in entities.iter_mut() {
            self.enrich(entity).await?;
        }
        Ok(())
    }

    pub fn users(&self) -> UserManager<'_> {
        UserManager::new(self)
    }

    pub fn artists(&self) -> ArtistManager<'_> {
        ArtistManager::new(self)
    }

    pub fn albums(&self) -> AlbumManager<'_> {
        AlbumManager::new(self)
    }

    pub fn tracks(&self) -> TrackManager<'_> {
        TrackManager::new(self)
    }

    pub fn playlists(&self) -> PlaylistManager<'_> {
        PlaylistManager::new(self)
    }

    pub fn shows(&self) -> ShowManager<'_> {
        ShowManager::new(self)
    }

    pub fn episodes(&self) -> EpisodeManager<'_> {
        EpisodeManager::new(self)
    }
}

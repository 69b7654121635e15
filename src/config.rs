//! Configuration for the Spotify client.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files, and defines the immutable [`ClientConfig`] a client is built
//! with. It provides a centralized way to manage Spotify endpoints, OAuth
//! application credentials, cache participation and enrichment behaviour.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Values passed explicitly to [`ClientConfig`] (highest priority)
//! 2. Environment variables, optionally loaded from a `.env` file
//! 3. Defaults pointing at the public Spotify endpoints

use std::{env, path::PathBuf, time::Duration};

use dotenv;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SCANNABLES_URL: &str = "https://scannables.scdn.co/uri/plain/jpeg";
pub const DEFAULT_MARKET: &str = "US";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist and loads variables from
/// `sporlapi/.env` under the platform-specific local data directory. A missing
/// `.env` file is not an error: variables already present in the process
/// environment are used as they are.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/sporlapi/.env`
/// - macOS: `~/Library/Application Support/sporlapi/.env`
/// - Windows: `%LOCALAPPDATA%/sporlapi/.env`
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or if an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlapi/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::unexpected(format!("failed to load {}: {}", path.display(), e)))?;
    }
    Ok(())
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> Option<String> {
    var("SERVER_ADDRESS")
}

/// Spotify application client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Option<String> {
    var("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Spotify application client secret (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// The client secret should be kept confidential and never exposed in logs.
pub fn spotify_client_secret() -> Option<String> {
    var("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Registered OAuth redirect URI (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> Option<String> {
    var("SPOTIFY_API_REDIRECT_URI")
}

/// Space separated OAuth scopes (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> Option<String> {
    var("SPOTIFY_API_AUTH_SCOPE")
}

pub fn spotify_apiurl() -> String {
    var("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

pub fn spotify_accounts_url() -> String {
    var("SPOTIFY_ACCOUNTS_URL").unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string())
}

pub fn spotify_scannables_url() -> String {
    var("SPOTIFY_SCANNABLES_URL").unwrap_or_else(|| DEFAULT_SCANNABLES_URL.to_string())
}

pub fn spotify_market() -> String {
    var("SPOTIFY_MARKET").unwrap_or_else(|| DEFAULT_MARKET.to_string())
}

/// Per entity type cache participation. Fixed once the client is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    pub cache_users: bool,
    pub cache_tracks: bool,
    pub cache_albums: bool,
    pub cache_artists: bool,
    pub cache_playlists: bool,
    pub cache_shows: bool,
    pub cache_episodes: bool,
}

impl CacheOptions {
    /// Caching enabled for every entity type.
    pub fn all() -> Self {
        Self {
            cache_users: true,
            cache_tracks: true,
            cache_albums: true,
            cache_artists: true,
            cache_playlists: true,
            cache_shows: true,
            cache_episodes: true,
        }
    }
}

/// What happens when the code image call fails after a successful primary fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnrichmentPolicy {
    /// Fail the whole accessor call with the enrichment error.
    #[default]
    Propagate,
    /// Log the failure and return the entity without code image fields.
    Ignore,
}

/// Immutable settings a [`crate::Client`] is constructed with.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base of every resource endpoint, e.g. `https://api.spotify.com/v1`.
    pub api_base_url: String,
    /// Host serving `/api/token` and `/authorize`.
    pub accounts_base_url: String,
    /// Base of the Spotify Code image service.
    pub scannables_base_url: String,
    /// Market sent with market-dependent lookups.
    pub market: String,
    /// Transport level timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    pub cache: CacheOptions,
    pub enrichment: EnrichmentPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            accounts_base_url: DEFAULT_ACCOUNTS_URL.to_string(),
            scannables_base_url: DEFAULT_SCANNABLES_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            timeout: None,
            cache: CacheOptions::default(),
            enrichment: EnrichmentPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Reads endpoints and market from the environment, everything else defaulted.
    pub fn from_env() -> Self {
        Self {
            api_base_url: spotify_apiurl(),
            accounts_base_url: spotify_accounts_url(),
            scannables_base_url: spotify_scannables_url(),
            market: spotify_market(),
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, cache: CacheOptions) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_enrichment(mut self, policy: EnrichmentPolicy) -> Self {
        self.enrichment = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base_url.trim_end_matches('/'))
    }

    pub(crate) fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_base_url.trim_end_matches('/'))
    }
}

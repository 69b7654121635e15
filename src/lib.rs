//! Spotify Web API Client Core
//!
//! This library is the authenticated request pipeline of a Spotify Web API
//! client. It covers OAuth token acquisition, the authenticated fetch primitive
//! every accessor goes through, per entity type in-memory caching, Spotify Code
//! enrichment and a small typed error taxonomy.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local OAuth callback server
//! - `client` - The [`Client`] tying credential, fetcher, caches and enrichment together
//! - `config` - Configuration, environment variables and cache/enrichment options
//! - `error` - The error taxonomy ([`Error`], [`Failure`])
//! - `management` - Credential holder, cache registry and entity accessors
//! - `server` - Local HTTP server receiving the authorization code redirect
//! - `spotify` - OAuth, fetch primitive and code image clients
//! - `types` - Entities, token payloads and code image types
//! - `utils` - PKCE and header helpers
//!
//! # Example
//!
//! ```
//! use sporlapi::{Client, ClientConfig, config::CacheOptions, management::GetOptions};
//!
//! #[tokio::main]
//! async fn main() -> sporlapi::Result<()> {
//!     let config = ClientConfig::default().with_cache(CacheOptions::all());
//!     let client = Client::new("BQC...", config)?;
//!
//!     let show = client.shows().get("38bS44xjbVVZ3No3ByF1dJ", GetOptions::default()).await?;
//!     println!("{}", show.name);
//!     Ok(())
//! }
//! ```

mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Failure, Result};

//! # Spotify Integration Module
//!
//! The request pipeline every accessor funnels through:
//!
//! ```text
//! Accessors (management)
//!          ↓
//! Fetcher ── bearer token snapshot from TokenManager
//!          ↓
//! Spotify Web API  ──→  JSON  ──→  Entity::from_raw  ──→  Cache  ──→  CodeImageClient
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - OAuth against the accounts service: client credentials grant,
//!   authorization code exchange, refresh token grant and authorization URL
//!   construction.
//! - [`fetch`] - the authenticated fetch primitive. Injects the bearer token,
//!   serializes query parameters, maps non-2xx responses onto the error
//!   taxonomy and returns the decoded JSON body.
//! - [`code_image`] - Spotify Code enrichment: the scannable image for a URI and
//!   the dominant colour extracted from it.
//!
//! ## Error Types
//!
//! Every function returns [`crate::Result`]. Nothing here retries, sleeps or
//! refreshes tokens behind the caller's back: a 401 surfaces as
//! `InvalidCredential`, a 429 as `UnexpectedFailure` with `retry_after` set.

pub mod auth;
pub mod code_image;
pub mod fetch;

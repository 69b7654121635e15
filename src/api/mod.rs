//! HTTP handlers of the local OAuth callback server.
//!
//! - `GET /callback` - receives Spotify's redirect after the user approved (or
//!   denied) the app and records the outcome for [`crate::server::CallbackServer`].
//! - `GET /health` - liveness probe with the crate version.

mod callback;
mod health;

pub(crate) use callback::{CallbackOutcome, SharedOutcome, callback};
pub(crate) use health::health;

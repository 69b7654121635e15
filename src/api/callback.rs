use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;
use tracing::warn;

/// What Spotify sent to the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallbackOutcome {
    Code { code: String, state: Option<String> },
    Denied(String),
}

pub(crate) type SharedOutcome = Arc<Mutex<Option<CallbackOutcome>>>;

pub(crate) async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<SharedOutcome>,
) -> Html<&'static str> {
    let mut outcome = shared_state.lock().await;
    if outcome.is_some() {
        return Html("<h4>Authorization already received.</h4>");
    }

    if let Some(code) = params.get("code") {
        *outcome = Some(CallbackOutcome::Code {
            code: code.clone(),
            state: params.get("state").cloned(),
        });
        Html("<h2>Authorization received.</h2><p>You can close this window.</p>")
    } else if let Some(error) = params.get("error") {
        warn!(error = %error, "authorization was not granted");
        *outcome = Some(CallbackOutcome::Denied(error.clone()));
        Html("<h4>Authorization failed.</h4>")
    } else {
        Html("<h4>Missing authorization code.</h4>")
    }
}

#![allow(dead_code)]

use std::{collections::HashMap, io::Cursor, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;
use serde_json::{Value, json};
use sporlapi::{ClientConfig, config::CacheOptions, utils::basic_auth_header};

pub const CLIENT_ID: &str = "my-id";
pub const CLIENT_SECRET: &str = "my-secret";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

pub const CODE_BACKGROUND: [u8; 3] = [232, 230, 230];
pub const RED: [u8; 3] = [220, 20, 20];

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// Stand-in for api.spotify.com, accounts.spotify.com and the scannables host,
/// served from one local port.
pub struct MockApi {
    pub base: String,
    state: MockState,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            state,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: format!("{}/v1", self.base),
            accounts_base_url: self.base.clone(),
            scannables_base_url: format!("{}/scannables", self.base),
            ..ClientConfig::default()
        }
    }

    pub fn config_with_cache(&self, cache: CacheOptions) -> ClientConfig {
        self.config().with_cache(cache)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    /// Number of requests made to exactly `path`.
    pub fn count(&self, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }

    pub fn last(&self, path: &str) -> Option<Recorded> {
        self.state
            .requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.path == path)
            .cloned()
    }
}

pub fn png(color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(64, 64, Rgb(color));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn spotify_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "status": status.as_u16(), "message": message } })),
    )
        .into_response()
}

fn oauth_error(status: StatusCode, code: &str, description: &str) -> Response {
    (
        status,
        Json(json!({ "error": code, "error_description": description })),
    )
        .into_response()
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(|q| q.to_string()),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body: body.clone(),
    };
    state.requests.lock().push(recorded.clone());

    let segments: Vec<&str> = uri.path().trim_start_matches('/').split('/').collect();
    match segments.as_slice() {
        ["api", "token"] if method == Method::POST => token(&recorded),
        ["scannables", _, _, _, entity_uri] => scannable(entity_uri),
        ["v1", rest @ ..] => resource(&method, rest, &recorded),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn form(body: &str) -> HashMap<String, String> {
    reqwest::Url::parse(&format!("http://form.local/?{body}"))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

fn token(request: &Recorded) -> Response {
    let form = form(&request.body);
    let grant_type = form.get("grant_type").map(String::as_str).unwrap_or_default();

    match grant_type {
        "client_credentials" => {
            if form.get("client_secret").map(String::as_str) != Some(CLIENT_SECRET) {
                return oauth_error(StatusCode::BAD_REQUEST, "invalid_client", "Invalid client secret");
            }
            Json(json!({
                "access_token": "app-token",
                "token_type": "Bearer",
                "expires_in": 3600
            }))
            .into_response()
        }
        "authorization_code" => {
            if request.authorization.as_deref()
                != Some(basic_auth_header(CLIENT_ID, CLIENT_SECRET).as_str())
            {
                return oauth_error(StatusCode::BAD_REQUEST, "invalid_client", "Invalid client");
            }
            match form.get("code").map(String::as_str) {
                Some("good") => Json(json!({
                    "access_token": "user-token",
                    "token_type": "Bearer",
                    "scope": "user-read-private",
                    "expires_in": 3600,
                    "refresh_token": "user-refresh"
                }))
                .into_response(),
                Some("expired") => oauth_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_grant",
                    "Invalid authorization code",
                ),
                Some("boom") => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "server_error" })),
                )
                    .into_response(),
                _ => oauth_error(StatusCode::BAD_REQUEST, "invalid_request", "Unsupported code"),
            }
        }
        "refresh_token" => match form.get("refresh_token").map(String::as_str) {
            Some("user-refresh") => Json(json!({
                "access_token": "renewed-token",
                "token_type": "Bearer",
                "expires_in": 3600
            }))
            .into_response(),
            _ => oauth_error(StatusCode::BAD_REQUEST, "invalid_grant", "Invalid refresh token"),
        },
        _ => oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            "grant_type must be client_credentials, authorization_code or refresh_token",
        ),
    }
}

fn scannable(entity_uri: &str) -> Response {
    if entity_uri.contains("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "scannables unavailable").into_response();
    }
    let color = if entity_uri.contains("red") {
        RED
    } else {
        CODE_BACKGROUND
    };
    ([(header::CONTENT_TYPE, "image/png")], png(color)).into_response()
}

fn named(kind: &str, id: &str, extra: Value) -> Value {
    let mut object = json!({
        "id": id,
        "name": format!("{kind} {id}"),
        "uri": format!("spotify:{kind}:{id}"),
    });
    if let (Some(target), Some(extra)) = (object.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    object
}

fn resource(method: &Method, segments: &[&str], request: &Recorded) -> Response {
    if request.authorization.as_deref() == Some("Bearer expired") {
        return spotify_error(StatusCode::UNAUTHORIZED, "The access token expired");
    }

    match segments {
        ["echo"] => Json(json!({
            "method": method.as_str(),
            "query": request.query,
            "authorization": request.authorization,
            "content_type": request.content_type,
            "body": serde_json::from_str::<Value>(&request.body).ok(),
        }))
        .into_response(),
        ["empty"] => StatusCode::NO_CONTENT.into_response(),
        ["garbage"] => (StatusCode::OK, "<html>not json</html>").into_response(),
        ["status", code] => {
            let status = code
                .parse::<u16>()
                .ok()
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut response = spotify_error(status, "simulated failure");
            if status == StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, header::HeaderValue::from_static("3"));
            }
            response
        }
        ["shows", "missing"] => spotify_error(StatusCode::NOT_FOUND, "non existing id"),
        ["shows", "abc"] => Json(json!({
            "id": "abc",
            "name": "Test Show",
            "uri": "spotify:show:abc",
            "publisher": "Mock Radio",
            "total_episodes": 2,
            "languages": ["en"]
        }))
        .into_response(),
        ["shows", "broken", "episodes"] => {
            spotify_error(StatusCode::INTERNAL_SERVER_ERROR, "episodes unavailable")
        }
        ["shows", show, "episodes"] => Json(json!({
            "href": format!("/v1/shows/{show}/episodes"),
            "items": [
                named("episode", &format!("{show}-1"), json!({ "duration_ms": 1000 })),
                named("episode", &format!("{show}-2"), json!({ "duration_ms": 2000 })),
            ],
            "total": 2
        }))
        .into_response(),
        ["albums", album, "tracks"] => Json(json!({
            "items": [
                named("track", &format!("{album}-t1"), json!({ "track_number": 1 })),
                named("track", &format!("{album}-t2"), json!({ "track_number": 2 })),
            ],
            "total": 2
        }))
        .into_response(),
        ["albums", "nameless"] => Json(json!({ "name": "No id here" })).into_response(),
        ["albums", album] => Json(named(
            "album",
            album,
            json!({ "album_type": "album", "total_tracks": 2,
                    "artists": [{ "id": "ar1", "name": "Artist One" }] }),
        ))
        .into_response(),
        ["users", id] => Json(named("user", id, json!({ "display_name": "Mock User",
                                                         "followers": { "total": 7 } })))
        .into_response(),
        ["artists", id] => Json(named("artist", id, json!({ "genres": ["ambient"] }))).into_response(),
        ["tracks", id] => Json(named("track", id, json!({ "album": { "id": "al1" } }))).into_response(),
        ["playlists", id] => Json(named("playlist", id, json!({ "owner": { "id": "owner1" } })))
            .into_response(),
        ["episodes", id] => Json(named("episode", id, json!({}))).into_response(),
        ["shows", id] => Json(named("show", id, json!({}))).into_response(),
        _ => spotify_error(StatusCode::NOT_FOUND, "Service not found"),
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    management::{Cache, CacheRegistry},
};

/// Token response of the accounts service, kept verbatim.
///
/// Fields Spotify may add later end up in `extra` so nothing is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominantColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DominantColor {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Spotify Code for an entity: the scannable image and its dominant colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeImage {
    pub image: String,
    pub dominant_color: DominantColor,
}

/// An entity that can carry a Spotify Code.
pub trait Scannable {
    fn uri(&self) -> &str;
    fn code_image(&self) -> Option<&str>;
    fn set_code_image(&mut self, code: CodeImage);
}

/// A typed object built from a decoded API response and cached by id.
pub trait Entity: Clone + Scannable + Send + Sync + Sized + 'static {
    /// Maps the loosely typed wire object into the entity.
    fn from_raw(raw: &Value) -> Result<Self>;

    fn id(&self) -> &str;

    /// This type's cache inside the registry.
    fn cache(registry: &CacheRegistry) -> &Cache<Self>;
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn u64_field(raw: &Value, key: &str) -> Option<u64> {
    raw.get(key).and_then(|v| v.as_u64())
}

fn bool_field(raw: &Value, key: &str) -> bool {
    raw.get(key).and_then(|v| v.as_bool()).unwrap_or_default()
}

fn required(raw: &Value, key: &str, kind: &str) -> Result<String> {
    str_field(raw, key).ok_or_else(|| {
        Error::unexpected(format!("malformed {kind} object: missing `{key}`"))
    })
}

fn images(raw: &Value) -> Vec<Image> {
    raw.get("images")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

fn string_list(raw: &Value, key: &str) -> Vec<String> {
    raw.get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

fn artist_refs(raw: &Value) -> Vec<ArtistRef> {
    raw.get("artists")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|a| {
                    Some(ArtistRef {
                        id: str_field(a, "id")?,
                        name: str_field(a, "name").unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

macro_rules! scannable {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl Scannable for $entity {
                fn uri(&self) -> &str {
                    &self.uri
                }

                fn code_image(&self) -> Option<&str> {
                    self.code_image.as_deref()
                }

                fn set_code_image(&mut self, code: CodeImage) {
                    self.code_image = Some(code.image);
                    self.dominant_color = Some(code.dominant_color);
                }
            }
        )+
    };
}

scannable!(User, Artist, Album, Track, Playlist, Show, Episode);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub uri: String,
    pub followers: Option<u64>,
    pub images: Vec<Image>,
    pub code_image: Option<String>,
    pub dominant_color: Option<DominantColor>,
}

impl Entity for User {
    fn from_raw(raw: &Value) -> Result<Self> {
        Ok(Self {
            id: required(raw, "id", "user")?,
            display_name: str_field(raw, "display_name"),
            uri: str_field(raw, "uri").unwrap_or_default(),
            followers: raw.pointer("/followers/total").and_then(|v| v.as_u64()),
            images: images(raw),
            code_image: None,
            dominant_color: None,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn cache(registry: &CacheRegistry) -> &Cache<Self> {
        &registry.users
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub genres: Vec<String>,
    pub popularity: Option<u64>,
    pub images: Vec<Image>,
    pub code_image: Option<String>,
    pub dominant_color: Option<DominantColor>,
}

impl Entity for Artist {
    fn from_raw(raw: &Value) -> Result<Self> {
        Ok(Self {
            id: required(raw, "id", "artist")?,
            name: str_field(raw, "name").unwrap_or_default(),
            uri: str_field(raw, "uri").unwrap_or_default(),
            genres: string_list(raw, "genres"),
            popularity: u64_field(raw, "popularity"),
            images: images(raw),
            code_image: None,
            dominant_color: None,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn cache(registry: &CacheRegistry) -> &Cache<Self> {
        &registry.artists
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub album_type: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<u64>,
    pub artists: Vec<ArtistRef>,
    pub images: Vec<Image>,
    pub code_image: Option<String>,
    pub dominant_color: Option<DominantColor>,
}

impl Entity for Album {
    fn from_raw(raw: &Value) -> Result<Self> {
        Ok(Self {
            id: required(raw, "id", "album")?,
            name: str_field(raw, "name").unwrap_or_default(),
            uri: str_field(raw, "uri").unwrap_or_default(),
            album_type: str_field(raw, "album_type"),
            release_date: str_field(raw, "release_date"),
            total_tracks: u64_field(raw, "total_tracks"),
            artists: artist_refs(raw),
            images: images(raw),
            code_image: None,
            dominant_color: None,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn cache(registry: &CacheRegistry) -> &Cache<Self> {
        &registry.albums
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub duration_ms: Option<u64>,
    pub explicit: bool,
    pub track_number: Option<u64>,
    pub artists: Vec<ArtistRef>,
    /// Absent on the simplified tracks returned inside an album.
    pub album_id: Option<String>,
    pub code_image: Option<String>,
    pub dominant_color: Option<DominantColor>,
}

impl Entity for Track {
    fn from_raw(raw: &Value) -> Result<Self> {
        Ok(Self {
            id: required(raw, "id", "track")?,
            name: str_field(raw, "name").unwrap_or_default(),
            uri: str_field(raw, "uri").unwrap_or_default(),
            duration_ms: u64_field(raw, "duration_ms"),
            explicit: bool_field(raw, "explicit"),
            track_number: u64_field(raw, "track_number"),
            artists: artist_refs(raw),
            album_id: raw
                .pointer("/album/id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            code_image: None,
            dominant_color: None,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn cache(registry: &CacheRegistry) -> &Cache<Self> {
        &registry.tracks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub collaborative: bool,
    pub public: Option<bool>,
    pub snapshot_id: Option<String>,
    pub images: Vec<Image>,
    pub code_image: Option<String>,
    pub dominant_color: Option<DominantColor>,
}

impl Entity for Playlist {
    fn from_raw(raw: &Value) -> Result<Self> {
        Ok(Self {
            id: required(raw, "id", "playlist")?,
            name: str_field(raw, "name").unwrap_or_default(),
            uri: str_field(raw, "uri").unwrap_or_default(),
            description: str_field(raw, "description"),
            owner_id: raw
                .pointer("/owner/id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            collaborative: bool_field(raw, "collaborative"),
            public: raw.get("public").and_then(|v| v.as_bool()),
            snapshot_id: str_field(raw, "snapshot_id"),
            images: images(raw),
            code_image: None,
            dominant_color: None,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn cache(registry: &CacheRegistry) -> &Cache<Self> {
        &registry.playlists
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub total_episodes: Option<u64>,
    pub languages: Vec<String>,
    pub explicit: bool,
    pub images: Vec<Image>,
    pub code_image: Option<String>,
    pub dominant_color: Option<DominantColor>,
}

impl Entity for Show {
    fn from_raw(raw: &Value) -> Result<Self> {
        Ok(Self {
            id: required(raw, "id", "show")?,
            name: str_field(raw, "name").unwrap_or_default(),
            uri: str_field(raw, "uri").unwrap_or_default(),
            description: str_field(raw, "description"),
            publisher: str_field(raw, "publisher"),
            total_episodes: u64_field(raw, "total_episodes"),
            languages: string_list(raw, "languages"),
            explicit: bool_field(raw, "explicit"),
            images: images(raw),
            code_image: None,
            dominant_color: None,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn cache(registry: &CacheRegistry) -> &Cache<Self> {
        &registry.shows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub description: Option<String>,
    pub duration_ms: Option<u64>,
    pub release_date: Option<String>,
    pub explicit: bool,
    pub languages: Vec<String>,
    pub images: Vec<Image>,
    pub code_image: Option<String>,
    pub dominant_color: Option<DominantColor>,
}

impl Entity for Episode {
    fn from_raw(raw: &Value) -> Result<Self> {
        Ok(Self {
            id: required(raw, "id", "episode")?,
            name: str_field(raw, "name").unwrap_or_default(),
            uri: str_field(raw, "uri").unwrap_or_default(),
            description: str_field(raw, "description"),
            duration_ms: u64_field(raw, "duration_ms"),
            release_date: str_field(raw, "release_date"),
            explicit: bool_field(raw, "explicit"),
            languages: string_list(raw, "languages"),
            images: images(raw),
            code_image: None,
            dominant_color: None,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn cache(registry: &CacheRegistry) -> &Cache<Self> {
        &registry.episodes
    }
}

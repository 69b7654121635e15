use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{
    config::CacheOptions,
    types::{Album, Artist, Episode, Playlist, Show, Track, User},
};

/// In-memory store of one entity type, keyed by Spotify id.
///
/// Entries never expire. Values are handed out as `Arc<T>` so a repeated hit
/// returns the very same snapshot. Concurrent `set` calls for one id are allowed
/// to race; the last writer wins. Partial objects from list pages go through
/// [`Cache::set_if_absent`] and never replace a full entry.
#[derive(Debug)]
pub struct Cache<T> {
    enabled: bool,
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Cache<T> {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Whether accessors should consult and populate this cache.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.entries.read().get(id).cloned()
    }

    /// Stores `value` under `id` and returns the shared handle now cached.
    pub fn set(&self, id: impl Into<String>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.write().insert(id.into(), Arc::clone(&value));
        value
    }

    /// Stores `value` only when `id` has no entry yet. Returns whichever handle
    /// ends up cached. Check and insert happen under one write lock.
    pub fn set_if_absent(&self, id: impl Into<String>, value: T) -> Arc<T> {
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(id.into()).or_insert_with(|| Arc::new(value)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<Arc<T>> {
        self.entries.write().remove(id)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// One cache per entity type, created with the client.
#[derive(Debug)]
pub struct CacheRegistry {
    pub users: Cache<User>,
    pub tracks: Cache<Track>,
    pub albums: Cache<Album>,
    pub artists: Cache<Artist>,
    pub playlists: Cache<Playlist>,
    pub shows: Cache<Show>,
    pub episodes: Cache<Episode>,
}

impl CacheRegistry {
    pub fn new(options: &CacheOptions) -> Self {
        Self {
            users: Cache::new(options.cache_users),
            tracks: Cache::new(options.cache_tracks),
            albums: Cache::new(options.cache_albums),
            artists: Cache::new(options.cache_artists),
            playlists: Cache::new(options.cache_playlists),
            shows: Cache::new(options.cache_shows),
            episodes: Cache::new(options.cache_episodes),
        }
    }

    /// Evicts every entry of every type.
    pub fn clear_all(&self) {
        self.users.clear();
        self.tracks.clear();
        self.albums.clear();
        self.artists.clear();
        self.playlists.clear();
        self.shows.clear();
        self.episodes.clear();
    }
}

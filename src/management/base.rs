use std::sync::Arc;

use serde_json::Value;

use crate::{
    client::Client,
    error::{Error, Result, require},
    spotify::fetch::FetchRequest,
    types::{Entity, Scannable},
};

/// Per call switches of the single-entity accessors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Skip the cache lookup. The result is still written through.
    pub force: bool,
    /// Attach the Spotify Code image and dominant colour.
    pub advanced: bool,
}

impl GetOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn advanced() -> Self {
        Self {
            advanced: true,
            ..Self::default()
        }
    }
}

/// Cache-aware single entity lookup shared by every manager.
///
/// Consults `T`'s cache first unless caching is off for `T` or the caller
/// forces a fetch, then fetches, maps, optionally enriches and writes through.
pub(crate) async fn get_entity<T: Entity>(
    client: &Client,
    id: &str,
    request: FetchRequest,
    options: GetOptions,
) -> Result<Arc<T>> {
    let id = require(Some(id), "id")?;
    let cache = T::cache(client.cache());

    if cache.is_enabled() && !options.force {
        if let Some(hit) = cache.get(id) {
            if !options.advanced || hit.code_image().is_some() {
                return Ok(hit);
            }

            let mut entity = (*hit).clone();
            client.enrich(&mut entity).await?;
            // Ignored enrichment failure: nothing new to store
            if entity.code_image().is_none() {
                return Ok(hit);
            }
            return Ok(cache.set(id, entity));
        }
    }

    let raw = client.fetch(request).await?;
    let mut entity = T::from_raw(&raw)?;
    if options.advanced {
        client.enrich(&mut entity).await?;
    }

    if cache.is_enabled() {
        Ok(cache.set(id, entity))
    } else {
        Ok(Arc::new(entity))
    }
}

/// Maps the `items` array of a paging object (or of `key` inside it) into
/// entities, adding each to `T`'s cache when enabled and not cached yet.
pub(crate) async fn get_list<T: Entity>(
    client: &Client,
    raw: &Value,
    key: Option<&str>,
    advanced: bool,
) -> Result<Vec<T>> {
    let page = match key {
        Some(key) => raw.get(key).unwrap_or(&Value::Null),
        None => raw,
    };
    let items = page
        .get("items")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::unexpected("malformed paging object: missing `items`"))?;

    let mut entities = items
        .iter()
        .filter(|item| !item.is_null())
        .map(T::from_raw)
        .collect::<Result<Vec<T>>>()?;

    if advanced {
        client.enrich_all(&mut entities).await?;
    }

    // List pages carry simplified objects; never let them replace a full entry
    let cache = T::cache(client.cache());
    if cache.is_enabled() {
        for entity in &entities {
            cache.set_if_absent(entity.id(), entity.clone());
        }
    }

    Ok(entities)
}

/// Paging switches of list accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub market: Option<String>,
    pub advanced: bool,
}

impl ListOptions {
    pub(crate) fn apply(&self, request: FetchRequest, default_market: &str) -> FetchRequest {
        request
            .query_opt("limit", self.limit)
            .query_opt("offset", self.offset)
            .query("market", self.market.as_deref().unwrap_or(default_market))
    }
}

use std::sync::Arc;

use crate::{
    client::Client,
    error::{Result, require},
    management::base::{GetOptions, ListOptions, get_entity, get_list},
    spotify::fetch::FetchRequest,
    types::{Album, Track},
};

pub struct AlbumManager<'a> {
    client: &'a Client,
}

impl<'a> AlbumManager<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str, options: GetOptions) -> Result<Arc<Album>> {
        let request = FetchRequest::get("/albums").segment(id)
            .query("market", &self.client.config().market);
        get_entity(self.client, id, request, options).await
    }

    /// Tracks of an album. Each track is written into the track cache when
    /// track caching is enabled.
    pub async fn get_tracks(&self, id: &str, options: &ListOptions) -> Result<Vec<Track>> {
        let id = require(Some(id), "id")?;
        let request = options.apply(
            FetchRequest::get("/albums").segment(id).segment("tracks"),
            &self.client.config().market,
        );

        let raw = self.client.fetch(request).await?;
        get_list(self.client, &raw, None, options.advanced).await
    }
}

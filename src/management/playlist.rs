use std::sync::Arc;

use crate::{
    client::Client,
    error::Result,
    management::base::{GetOptions, get_entity},
    spotify::fetch::FetchRequest,
    types::Playlist,
};

pub struct PlaylistManager<'a> {
    client: &'a Client,
}

impl<'a> PlaylistManager<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str, options: GetOptions) -> Result<Arc<Playlist>> {
        let request = FetchRequest::get("/playlists").segment(id)
            .query("market", &self.client.config().market);
        get_entity(self.client, id, request, options).await
    }
}

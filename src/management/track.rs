use std::sync::Arc;

use crate::{
    client::Client,
    error::Result,
    management::base::{GetOptions, get_entity},
    spotify::fetch::FetchRequest,
    types::Track,
};

pub struct TrackManager<'a> {
    client: &'a Client,
}

impl<'a> TrackManager<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Track by id, relinked for the configured market.
    pub async fn get(&self, id: &str, options: GetOptions) -> Result<Arc<Track>> {
        let request =
            FetchRequest::get("/tracks").segment(id).query("market", &self.client.config().market);
        get_entity(self.client, id, request, options).await
    }
}

use std::sync::Arc;

use crate::{
    client::Client,
    error::Result,
    management::base::{GetOptions, get_entity},
    spotify::fetch::FetchRequest,
    types::Episode,
};

pub struct EpisodeManager<'a> {
    client: &'a Client,
}

impl<'a> EpisodeManager<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str, options: GetOptions) -> Result<Arc<Episode>> {
        let request = FetchRequest::get("/episodes").segment(id)
            .query("market", &self.client.config().market);
        get_entity(self.client, id, request, options).await
    }
}

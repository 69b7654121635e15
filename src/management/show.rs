use std::sync::Arc;

use crate::{
    client::Client,
    error::{Result, require},
    management::base::{GetOptions, ListOptions, get_entity, get_list},
    spotify::fetch::FetchRequest,
    types::{Episode, Show},
};

pub struct ShowManager<'a> {
    client: &'a Client,
}

impl<'a> ShowManager<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Show by id, served from the show cache when possible.
    pub async fn get(&self, id: &str, options: GetOptions) -> Result<Arc<Show>> {
        let request = FetchRequest::get("/shows").segment(id)
            .query("market", &self.client.config().market);
        get_entity(self.client, id, request, options).await
    }

    /// Episodes of a show.
    ///
    /// Failures propagate like every other accessor; an empty `Vec` always means
    /// the show really has no episodes in that page.
    pub async fn get_episodes(&self, id: &str, options: &ListOptions) -> Result<Vec<Episode>> {
        let id = require(Some(id), "id")?;
        let request = options.apply(
            FetchRequest::get("/shows").segment(id).segment("episodes"),
            &self.client.config().market,
        );

        let raw = self.client.fetch(request).await?;
        get_list(self.client, &raw, None, options.advanced).await
    }
}

use std::sync::Arc;

use crate::{
    client::Client,
    error::Result,
    management::base::{GetOptions, get_entity},
    spotify::fetch::FetchRequest,
    types::Artist,
};

pub struct ArtistManager<'a> {
    client: &'a Client,
}

impl<'a> ArtistManager<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str, options: GetOptions) -> Result<Arc<Artist>> {
        get_entity(self.client, id, FetchRequest::get("/artists").segment(id), options).await
    }
}

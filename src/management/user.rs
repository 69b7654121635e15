use std::sync::Arc;

use crate::{
    client::Client,
    error::Result,
    management::base::{GetOptions, get_entity},
    spotify::fetch::FetchRequest,
    types::User,
};

pub struct UserManager<'a> {
    client: &'a Client,
}

impl<'a> UserManager<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Public profile of a user.
    pub async fn get(&self, id: &str, options: GetOptions) -> Result<Arc<User>> {
        get_entity(self.client, id, FetchRequest::get("/users").segment(id), options).await
    }
}

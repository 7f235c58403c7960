//! Rewrite API endpoints.

use crate::AuthorityClient;
use syncdns_core::{Result, RewriteRule};

const LIST_PATH: &str = "/control/rewrite/list";
const ADD_PATH: &str = "/control/rewrite/add";
const DELETE_PATH: &str = "/control/rewrite/delete";

/// Rewrite API endpoints
pub struct RewriteApi<'a> {
    client: &'a AuthorityClient,
}

impl<'a> RewriteApi<'a> {
    pub(crate) const fn new(client: &'a AuthorityClient) -> Self {
        Self { client }
    }

    /// List all configured rewrites
    pub async fn list(&self) -> Result<Vec<RewriteRule>> {
        self.client.get(LIST_PATH).await
    }

    /// Add a rewrite
    pub async fn add(&self, rule: &RewriteRule) -> Result<()> {
        self.client.post(ADD_PATH, rule).await
    }

    /// Delete the rewrite with this exact domain and answer
    pub async fn delete(&self, rule: &RewriteRule) -> Result<()> {
        self.client.post(DELETE_PATH, rule).await
    }
}

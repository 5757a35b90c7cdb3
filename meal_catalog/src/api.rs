use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{config::CatalogConfig, CatalogApiError, CatalogItem, CatalogResponse};

#[derive(Clone)]
pub struct CatalogApi {
    config: CatalogConfig,
    client: Arc<Client>,
}

impl CatalogApi {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogApiError> {
        let client = Client::builder().build().map_err(|e| CatalogApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CatalogApiError> {
        let url = self.url(path);
        trace!("🍽️ Sending catalog query: {url}");
        let mut req = self.client.get(url);
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| CatalogApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🍽️ Catalog query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| CatalogApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| CatalogApiError::RestResponseError(e.to_string()))?;
            Err(CatalogApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Searches the catalog by name. An empty `text` returns the catalog's default listing.
    pub async fn search(&self, text: &str) -> Result<Vec<CatalogItem>, CatalogApiError> {
        let response = self.rest_query::<CatalogResponse>("/search.php", &[("s", text)]).await?;
        let items = response.into_items();
        debug!("🍽️ Catalog search for '{text}' returned {} items", items.len());
        Ok(items)
    }

    /// Fetches a single catalog entry by id. Returns `None` if the catalog does not know the id.
    pub async fn lookup(&self, id: &str) -> Result<Option<CatalogItem>, CatalogApiError> {
        let response = self.rest_query::<CatalogResponse>("/lookup.php", &[("i", id)]).await?;
        let item = response.into_items().into_iter().next();
        if item.is_none() {
            debug!("🍽️ Catalog item {id} was not found");
        }
        Ok(item)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn urls_are_rooted_at_the_base() {
        let api = CatalogApi::new(CatalogConfig::new("http://localhost:9999/api/json/v1/1/")).unwrap();
        assert_eq!(api.url("/search.php"), "http://localhost:9999/api/json/v1/1/search.php");
    }
}

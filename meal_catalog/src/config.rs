use log::*;

pub const DEFAULT_CATALOG_URL: &str = "https://www.themealdb.com/api/json/v1/1";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_CATALOG_URL.to_string() }
    }
}

impl CatalogConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("FEAST_CATALOG_URL").unwrap_or_else(|_| {
            info!("FEAST_CATALOG_URL not set, using {DEFAULT_CATALOG_URL} as default");
            DEFAULT_CATALOG_URL.to_string()
        });
        Self::new(base_url)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = CatalogConfig::new("http://localhost:9000/api//");
        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(CatalogConfig::default().base_url, DEFAULT_CATALOG_URL);
    }
}

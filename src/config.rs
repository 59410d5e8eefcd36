use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
}

impl StorefrontConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".to_string());
        let data_dir = env::var("STOREFRONT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".storefront"));
        Ok(Self {
            api_base_url,
            data_dir,
        })
    }
}

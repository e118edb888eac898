use crate::error::{DashboardError, Result};
use crate::query::DEFAULT_PAGE_LIMIT;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const BASE_URL_KEY: &str = "API_BASE_URL";
pub const PAGE_LIMIT_KEY: &str = "API_PAGE_LIMIT";
pub const MAX_PAGES_KEY: &str = "API_MAX_PAGES";
pub const SERVICE_PATH_KEY: &str = "API_SERVICE_PATH";

pub const DEFAULT_MAX_PAGES: u32 = 500;
pub const DEFAULT_SERVICE_PATH: &str = "cisspoder-service";

/// Where and how to talk to the results API.
///
/// Built once by the caller and passed down; nothing here is cached globally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ApiSettings {
    #[schemars(description = "Root URL of the API, e.g. https://erp.example.com")]
    pub base_url: String,

    #[schemars(description = "Path segment of the data service under the base URL")]
    #[serde(default = "default_service_path")]
    pub service_path: String,

    #[schemars(description = "Records requested per page")]
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    #[schemars(description = "Upper bound on pages fetched for one query")]
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_service_path() -> String {
    DEFAULT_SERVICE_PATH.to_string()
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_path: default_service_path(),
            page_limit: default_page_limit(),
            max_pages: default_max_pages(),
        }
    }

    /// Reads settings through `lookup`, which maps a key to its value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_KEY).ok_or_else(|| DashboardError::Config {
            key: BASE_URL_KEY.to_string(),
            details: "not set".to_string(),
        })?;

        let mut settings = Self::new(base_url.trim());

        if let Some(path) = lookup(SERVICE_PATH_KEY) {
            settings.service_path = path.trim().trim_matches('/').to_string();
        }
        if let Some(raw) = lookup(PAGE_LIMIT_KEY) {
            settings.page_limit = parse_positive(PAGE_LIMIT_KEY, &raw)?;
        }
        if let Some(raw) = lookup(MAX_PAGES_KEY) {
            settings.max_pages = parse_positive(MAX_PAGES_KEY, &raw)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(DashboardError::Config {
                key: BASE_URL_KEY.to_string(),
                details: "must not be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DashboardError::Config {
                key: BASE_URL_KEY.to_string(),
                details: format!("'{}' is not an http(s) URL", url),
            });
        }
        if self.page_limit == 0 {
            return Err(DashboardError::Config {
                key: PAGE_LIMIT_KEY.to_string(),
                details: "must be positive".to_string(),
            });
        }
        if self.max_pages == 0 {
            return Err(DashboardError::Config {
                key: MAX_PAGES_KEY.to_string(),
                details: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.service_path,
            endpoint.trim_start_matches('/')
        )
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u32> {
    let value = raw.trim().parse::<u32>().map_err(|_| DashboardError::Config {
        key: key.to_string(),
        details: format!("'{}' is not a number", raw),
    })?;
    if value == 0 {
        return Err(DashboardError::Config {
            key: key.to_string(),
            details: "must be positive".to_string(),
        });
    }
    Ok(value)
}

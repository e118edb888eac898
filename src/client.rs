use crate::config::ApiSettings;
use crate::error::{DashboardError, Result};
use crate::forecast::ForecastAdjustment;
use crate::pagination::{collect_pages, Page, PageCollection};
use crate::query::{QueryPayload, ResultsQuery};
use crate::{build_dashboard, Dashboard};
use log::{info, warn};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};

pub const RESULTS_ENDPOINT: &str = "centro_resultado_bi";
pub const ADJUSTMENTS_ENDPOINT: &str = "set_centroresultado_config";

/// Reference listings used to fill the dashboard's filter and settings forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Companies,
    CostCenters,
    Accounts,
    ForecastSettings,
}

impl Catalog {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Companies => "cadastro_empresa",
            Self::CostCenters => "cadastro_centroresultados",
            Self::Accounts => "cadastro_contabil",
            Self::ForecastSettings => "centroresultado_config",
        }
    }
}

/// Talks to the results service on behalf of an already-authenticated user.
#[derive(Clone)]
pub struct ResultsClient {
    client: Client,
    settings: ApiSettings,
    access_token: String,
}

impl ResultsClient {
    pub fn new(settings: ApiSettings, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            settings,
            access_token: access_token.into(),
        }
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Response> {
        let url = self.settings.endpoint_url(endpoint);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(DashboardError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(res)
    }

    pub async fn fetch_page(&self, payload: &QueryPayload) -> Result<Page> {
        let res = self.post(RESULTS_ENDPOINT, payload).await?;
        let body = res.text().await?;
        decode_page(payload.page, &body)
    }

    /// Fetches every page of results for `query`.
    pub async fn fetch_results(&self, query: &ResultsQuery) -> Result<PageCollection> {
        query.validate()?;
        let base = query.to_payload(self.settings.page_limit);

        let collection = collect_pages(
            |page| {
                let payload = base.for_page(page);
                async move { self.fetch_page(&payload).await }
            },
            self.settings.max_pages,
        )
        .await;

        info!(
            "Fetched {} records in {} pages",
            collection.records.len(),
            collection.pages_fetched
        );
        Ok(collection)
    }

    /// Fetches and aggregates in one step.
    pub async fn load_dashboard(&self, query: &ResultsQuery) -> Result<Dashboard> {
        let collection = self.fetch_results(query).await?;
        build_dashboard(query, &collection)
    }

    /// First page of a reference listing; any failure yields an empty list.
    pub async fn fetch_catalog(&self, catalog: Catalog) -> Vec<Value> {
        let result = async {
            let res = self.post(catalog.endpoint(), &json!({ "page": 1 })).await?;
            Ok::<Page, DashboardError>(res.json::<Page>().await?)
        }
        .await;

        match result {
            Ok(page) => page.data,
            Err(e) => {
                warn!("Could not load {}: {}", catalog.endpoint(), e);
                Vec::new()
            }
        }
    }

    pub async fn submit_adjustments(&self, adjustments: &[ForecastAdjustment]) -> Result<()> {
        if adjustments.is_empty() {
            return Ok(());
        }
        self.post(ADJUSTMENTS_ENDPOINT, adjustments).await?;
        info!("Submitted {} forecast adjustments", adjustments.len());
        Ok(())
    }
}

/// Parses a results body into the page envelope.
fn decode_page(page: u32, body: &str) -> Result<Page> {
    serde_json::from_str(body).map_err(|e| DashboardError::PageFetch {
        page,
        reason: format!("unexpected response body: {}", e),
    })
}

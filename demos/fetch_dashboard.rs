use cost_center_results::{report, ApiSettings, Catalog, ResultsClient, ResultsQuery};
use dotenv::dotenv;
use std::error::Error;

// Expects API_BASE_URL and API_ACCESS_TOKEN in the environment (or a .env file).
// Optional: RESULTS_YEAR, RESULTS_COMPANY, RESULTS_COST_CENTER.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let settings = ApiSettings::from_env()?;
    let token = std::env::var("API_ACCESS_TOKEN")?;
    let client = ResultsClient::new(settings, token);

    let mut query = match std::env::var("RESULTS_YEAR") {
        Ok(year) => ResultsQuery::new(year.trim().parse()?),
        Err(_) => ResultsQuery::for_current_year(),
    };
    if let Ok(company) = std::env::var("RESULTS_COMPANY") {
        query = query.with_company(company);
    }
    if let Ok(center) = std::env::var("RESULTS_COST_CENTER") {
        query = query.with_cost_center(center);
    }

    let centers = client.fetch_catalog(Catalog::CostCenters).await;
    println!("{} cost centers available", centers.len());

    let dashboard = client.load_dashboard(&query).await?;
    println!(
        "{} records for {} ({:?}, complete: {}, skipped: {})",
        dashboard.records_fetched,
        query.year,
        dashboard.mode(),
        dashboard.complete,
        dashboard.skipped_count()
    );

    println!("{}", report::totals_csv(&dashboard.result.center_totals)?);

    Ok(())
}

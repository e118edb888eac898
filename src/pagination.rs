use crate::error::Result;
use futures::Future;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of the upstream listing envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Value>,

    #[serde(default)]
    pub total: u64,

    #[serde(default, rename = "hasNext")]
    pub has_next: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCollection {
    pub records: Vec<Value>,
    pub pages_fetched: u32,
    /// Total reported by the last page that arrived.
    pub reported_total: u64,
    /// False when collection stopped early (failed page or page cap).
    pub complete: bool,
}

/// Requests pages 1, 2, ... until one reports no next page.
///
/// A failing page ends the walk with what was gathered so far; so does
/// reaching `max_pages`. Both cases leave `complete` false.
pub async fn collect_pages<F, Fut>(mut fetch: F, max_pages: u32) -> PageCollection
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    let mut collection = PageCollection::default();
    let mut page_number = 1;

    loop {
        if page_number > max_pages {
            warn!(
                "Stopping after {} pages; upstream still reports more data",
                max_pages
            );
            break;
        }

        info!("Fetching page {}...", page_number);

        let page = match fetch(page_number).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Page {} failed, keeping earlier pages: {}", page_number, e);
                break;
            }
        };

        collection.pages_fetched += 1;
        collection.reported_total = page.total;
        let received = page.data.len();
        collection.records.extend(page.data);

        info!(
            "Page {}: {} records ({} of {} so far)",
            page_number,
            received,
            collection.records.len(),
            collection.reported_total
        );

        if !page.has_next {
            info!("Last page reached: {}", page_number);
            collection.complete = true;
            break;
        }

        page_number += 1;
    }

    collection
}

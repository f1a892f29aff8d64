//! Record lookup
//!
//! Pages through the provider's exact-match search and narrows the result to
//! records whose relative name matches exactly.

use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord, RecordQuery};

/// Finds the current state of a record
pub struct RecordLocator<'a> {
    provider: &'a dyn DnsProvider,
    page_size: u32,
    max_pages: u32,
}

impl<'a> RecordLocator<'a> {
    /// Create a locator over `provider` using the paging settings of `config`
    pub fn new(provider: &'a dyn DnsProvider, config: &EngineConfig) -> Self {
        Self {
            provider,
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }

    /// All records the provider returns for `rr`/`record_type` in `domain`
    ///
    /// Requests pages until one comes back empty and returns the records in
    /// fetch order. Search results may include near-matches.
    ///
    /// # Errors
    ///
    /// - Any provider error, unchanged
    /// - `Error::Provider` if page `max_pages + 1` still holds records
    pub async fn list_records(
        &self,
        record_type: &str,
        rr: &str,
        domain: &str,
    ) -> Result<Vec<DnsRecord>> {
        info!("Listing records: type={} rr={} domain={}", record_type, rr, domain);

        let mut records = Vec::new();
        let mut page_number = 1;

        loop {
            let query = RecordQuery::exact(domain, record_type, rr, page_number, self.page_size);
            let page = self.provider.describe_records(&query).await.map_err(|e| {
                error!(
                    "Record list failed: type={} rr={} domain={} page={}: {}",
                    record_type, rr, domain, page_number, e
                );
                e
            })?;

            if page.records.is_empty() {
                break;
            }

            debug!(
                "Fetched page {} with {} record(s) for {}.{}",
                page_number,
                page.records.len(),
                rr,
                domain
            );
            records.extend(page.records);

            // Page max_pages + 1 is fetched only to confirm the listing ended
            if page_number > self.max_pages {
                error!(
                    "Record list exceeded {} pages: type={} rr={} domain={}",
                    self.max_pages, record_type, rr, domain
                );
                return Err(Error::provider(
                    self.provider.provider_name(),
                    format!(
                        "record listing for {} {}.{} did not terminate after {} pages",
                        record_type, rr, domain, self.max_pages
                    ),
                ));
            }
            page_number += 1;
        }

        info!(
            "Listed {} record(s): type={} rr={} domain={}",
            records.len(),
            record_type,
            rr,
            domain
        );
        Ok(records)
    }

    /// The first record whose relative name equals `rr` exactly
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if no exact match exists
    /// - Any error from [`RecordLocator::list_records`]
    pub async fn get_record(&self, record_type: &str, rr: &str, domain: &str) -> Result<DnsRecord> {
        self.list_records(record_type, rr, domain)
            .await?
            .into_iter()
            .find(|record| record.rr == rr)
            .ok_or_else(|| Error::not_found(format!("{} {}.{}", record_type, rr, domain)))
    }
}

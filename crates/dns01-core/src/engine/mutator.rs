//! Single-record mutations
//!
//! Each operation is exactly one provider call. Failures are logged with the
//! record context and returned unchanged.

use tracing::{error, info};

use crate::error::Result;
use crate::traits::DnsProvider;

/// Issues create, update and delete calls for one record
pub struct RecordMutator<'a> {
    provider: &'a dyn DnsProvider,
}

impl<'a> RecordMutator<'a> {
    /// Create a mutator over `provider`
    pub fn new(provider: &'a dyn DnsProvider) -> Self {
        Self { provider }
    }

    /// Add a record, returning the provider-assigned identifier
    pub async fn create_record(
        &self,
        record_type: &str,
        rr: &str,
        domain: &str,
        value: &str,
    ) -> Result<String> {
        info!("Creating record: type={} rr={} domain={}", record_type, rr, domain);

        match self.provider.add_record(domain, rr, record_type, value).await {
            Ok(record_id) => {
                info!(
                    "Created record {}: type={} rr={} domain={}",
                    record_id, record_type, rr, domain
                );
                Ok(record_id)
            }
            Err(e) => {
                error!(
                    "Record create failed: type={} rr={} domain={}: {}",
                    record_type, rr, domain, e
                );
                Err(e)
            }
        }
    }

    /// Overwrite type and value of the record `record_id`
    ///
    /// The caller must have obtained `record_id` from a lookup.
    pub async fn update_record(
        &self,
        record_id: &str,
        record_type: &str,
        rr: &str,
        value: &str,
    ) -> Result<()> {
        info!("Updating record {}: type={} rr={}", record_id, record_type, rr);

        if let Err(e) = self
            .provider
            .update_record(record_id, rr, record_type, value)
            .await
        {
            error!(
                "Record update failed: id={} type={} rr={}: {}",
                record_id, record_type, rr, e
            );
            return Err(e);
        }

        info!("Updated record {}", record_id);
        Ok(())
    }

    /// Delete the record `record_id`
    pub async fn delete_record(&self, record_id: &str) -> Result<()> {
        info!("Deleting record {}", record_id);

        if let Err(e) = self.provider.delete_record(record_id).await {
            error!("Record delete failed: id={}: {}", record_id, e);
            return Err(e);
        }

        info!("Deleted record {}", record_id);
        Ok(())
    }
}

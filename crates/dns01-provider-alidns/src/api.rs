// Wire types of the Alibaba Cloud DNS API (version 2015-01-09)
//
// Only the fields the solver reads are modelled; everything else in the
// response bodies is ignored.

use dns01_core::traits::{DnsRecord, RecordPage};
use serde::Deserialize;

/// API version sent in `x-acs-version`
pub const API_VERSION: &str = "2015-01-09";

pub const ACTION_DESCRIBE: &str = "DescribeDomainRecords";
pub const ACTION_ADD: &str = "AddDomainRecord";
pub const ACTION_UPDATE: &str = "UpdateDomainRecord";
pub const ACTION_DELETE: &str = "DeleteDomainRecord";

/// `DescribeDomainRecords` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDomainRecordsResponse {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub domain_records: DomainRecords,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainRecords {
    #[serde(default)]
    pub record: Vec<Record>,
}

#[derive(Debug, Deserialize)]
pub struct Record {
    #[serde(rename = "RecordId")]
    pub record_id: String,
    #[serde(rename = "RR")]
    pub rr: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "DomainName", default)]
    pub domain_name: String,
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u32>,
}

impl From<Record> for DnsRecord {
    fn from(r: Record) -> Self {
        DnsRecord {
            record_id: r.record_id,
            rr: r.rr,
            record_type: r.record_type,
            value: r.value,
            domain_name: r.domain_name,
            ttl: r.ttl,
        }
    }
}

impl From<DescribeDomainRecordsResponse> for RecordPage {
    fn from(resp: DescribeDomainRecordsResponse) -> Self {
        RecordPage {
            records: resp
                .domain_records
                .record
                .into_iter()
                .map(DnsRecord::from)
                .collect(),
        }
    }
}

/// `AddDomainRecord` / `UpdateDomainRecord` / `DeleteDomainRecord` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordMutationResponse {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub record_id: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_response_decodes() {
        let body = r#"{
            "TotalCount": 2,
            "PageSize": 100,
            "PageNumber": 1,
            "RequestId": "536E9CAD-DB30-4647-AC87-AA5CC38C5382",
            "DomainRecords": {
                "Record": [
                    {"RR": "_acme-challenge", "Line": "default", "Status": "ENABLE",
                     "Locked": false, "Type": "TXT", "DomainName": "example.com",
                     "Value": "token", "RecordId": "9999985", "TTL": 600, "Weight": 1},
                    {"RR": "_acme-challenge.www", "Type": "TXT",
                     "Value": "other", "RecordId": "9999986"}
                ]
            }
        }"#;

        let resp: DescribeDomainRecordsResponse = serde_json::from_str(body).unwrap();
        let page = RecordPage::from(resp);

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].record_id, "9999985");
        assert_eq!(page.records[0].rr, "_acme-challenge");
        assert_eq!(page.records[0].ttl, Some(600));
        assert_eq!(page.records[1].domain_name, "");
        assert_eq!(page.records[1].ttl, None);
    }

    #[test]
    fn test_empty_page_decodes() {
        let body = r#"{"TotalCount": 0, "RequestId": "r", "DomainRecords": {"Record": []}}"#;
        let resp: DescribeDomainRecordsResponse = serde_json::from_str(body).unwrap();
        assert!(RecordPage::from(resp).records.is_empty());

        let resp: DescribeDomainRecordsResponse = serde_json::from_str("{}").unwrap();
        assert!(RecordPage::from(resp).records.is_empty());
    }

    #[test]
    fn test_error_response_decodes() {
        let body = r#"{
            "RequestId": "7B3B8F4D",
            "HostId": "alidns.aliyuncs.com",
            "Code": "DomainRecordDuplicate",
            "Message": "The DNS record already exists.",
            "Recommend": "https://api.aliyun.com/troubleshoot"
        }"#;
        let err: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.code, "DomainRecordDuplicate");
        assert_eq!(err.message, "The DNS record already exists.");
        assert_eq!(err.request_id, "7B3B8F4D");
    }
}

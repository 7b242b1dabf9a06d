//! Hetzner DNS provider.

use super::{DnsProvider, DnsRecord, RecordRequest, Zone};
use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://dns.hetzner.com";

/// Hetzner DNS API client.
pub struct HetznerProvider {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ZonesResponse {
    zones: Vec<Zone>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<DnsRecord>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    record: DnsRecord,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl HetznerProvider {
    /// Create a new Hetzner provider.
    pub fn new(api_token: String) -> Self {
        Self::with_base_url(api_token, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(api_token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token,
            base_url,
        }
    }

    async fn api_failure(response: reqwest::Response) -> DdnsError {
        let status = response.status();
        let message = match response.json::<ApiError>().await {
            Ok(e) => e.message,
            Err(_) => format!("HTTP {}", status),
        };

        DdnsError::Provider {
            provider: "hetzner".to_string(),
            message,
        }
    }

    /// Find an existing record matching (name, type) within the zone.
    async fn find_record(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Option<DnsRecord>> {
        let url = format!("{}/api/v1/records?zone_id={}", self.base_url, zone_id);

        let response = self
            .client
            .get(&url)
            .header("Auth-API-Token", &self.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_failure(response).await);
        }

        let records: RecordsResponse = response.json().await?;
        Ok(records
            .records
            .into_iter()
            .find(|r| r.name == name && r.record_type == record_type))
    }
}

#[async_trait]
impl DnsProvider for HetznerProvider {
    async fn list_zones(&self, page: u32, per_page: u32) -> Result<Vec<Zone>> {
        let url = format!(
            "{}/api/v1/zones?page={}&per_page={}",
            self.base_url, page, per_page
        );

        let response = self
            .client
            .get(&url)
            .header("Auth-API-Token", &self.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_failure(response).await);
        }

        let zones: ZonesResponse = response.json().await?;
        Ok(zones.zones)
    }

    async fn upsert_record(&self, request: RecordRequest) -> Result<DnsRecord> {
        let existing = self
            .find_record(&request.zone_id, &request.name, &request.record_type)
            .await?;

        let builder = match existing {
            Some(record) => {
                let url = format!("{}/api/v1/records/{}", self.base_url, record.id);
                self.client.put(&url)
            }
            None => {
                let url = format!("{}/api/v1/records", self.base_url);
                self.client.post(&url)
            }
        };

        let response = builder
            .header("Auth-API-Token", &self.api_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_failure(response).await);
        }

        let record: RecordResponse = response.json().await?;
        Ok(record.record)
    }
}

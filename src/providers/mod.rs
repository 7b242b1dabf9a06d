//! DNS provider contract and the zone-bound session built on top of it.

mod hetzner;

pub use hetzner::HetznerProvider;

use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;

/// Record type used for every upsert.
pub const RECORD_TYPE: &str = "AAAA";

/// Fixed record TTL in seconds, kept low so address changes propagate
/// quickly.
pub const RECORD_TTL: u64 = 60;

/// Zones fetched by the single startup listing call. No pagination loop
/// runs, so a zone beyond this page will not be found.
pub const ZONE_PAGE_SIZE: u32 = 100;

/// A DNS zone as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// Create-or-update request for a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRequest {
    pub zone_id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    pub ttl: u64,
}

/// A DNS record as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
}

/// Result of a successful record upsert.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    /// Provider-side id of the record that was created or updated.
    pub record_id: String,
    /// Record name.
    pub name: String,
    /// Value the record now holds.
    pub value: String,
    /// When the upsert completed.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Trait for DNS provider backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List zones visible to the credential, one page at a time.
    async fn list_zones(&self, page: u32, per_page: u32) -> Result<Vec<Zone>>;

    /// Create or update a record keyed by (zone, name, type).
    ///
    /// Repeated identical calls are safe; the provider applies
    /// create-or-update semantics.
    async fn upsert_record(&self, request: RecordRequest) -> Result<DnsRecord>;
}

/// An authenticated, zone-bound connection to the DNS provider.
///
/// Created once at startup and held for the process lifetime; stateless
/// between calls.
pub struct DnsSession {
    provider: Box<dyn DnsProvider>,
    zone_id: String,
}

impl std::fmt::Debug for DnsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsSession")
            .field("zone_id", &self.zone_id)
            .finish_non_exhaustive()
    }
}

impl DnsSession {
    /// Resolve `domain` to a zone id and bind a session to it.
    ///
    /// Scans the first page of zones for an exact name match. Failure here
    /// is a fatal startup condition and is not retried.
    pub async fn open(provider: Box<dyn DnsProvider>, domain: &str) -> Result<Self> {
        let zones = provider.list_zones(1, ZONE_PAGE_SIZE).await?;

        for zone in zones {
            if zone.name == domain {
                tracing::info!("found zone {} for {}", zone.id, zone.name);
                return Ok(Self {
                    provider,
                    zone_id: zone.id,
                });
            }
        }

        Err(DdnsError::ZoneNotFound(domain.to_string()))
    }

    /// Zone id the session is bound to.
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Upsert the AAAA record `record_name` to `address`.
    pub async fn upsert(&self, record_name: &str, address: Ipv6Addr) -> Result<UpdateOutcome> {
        tracing::info!(
            "updating record, zone {} name {} value {}",
            self.zone_id,
            record_name,
            address
        );

        let record = self
            .provider
            .upsert_record(RecordRequest {
                zone_id: self.zone_id.clone(),
                record_type: RECORD_TYPE.to_string(),
                name: record_name.to_string(),
                value: address.to_string(),
                ttl: RECORD_TTL,
            })
            .await?;

        tracing::info!("updated record {}", record.id);

        Ok(UpdateOutcome {
            record_id: record.id,
            name: record.name,
            value: record.value,
            timestamp: chrono::Utc::now(),
        })
    }
}

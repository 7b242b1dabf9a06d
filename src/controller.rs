//! Address-watching control loop.

use crate::error::Result;
use crate::providers::DnsSession;
use crate::resolver::AddressResolver;
use std::net::Ipv6Addr;
use std::time::Duration;
use tokio::time::{self, Instant};

/// The single piece of in-memory state: which address the record currently
/// points at, and the names it is keyed by.
///
/// Created once at startup with no address known, mutated in place on each
/// detected change, never persisted.
pub struct Rule {
    pub current_address: Option<Ipv6Addr>,
    pub interface: String,
    pub record: String,
}

impl Rule {
    pub fn new(interface: String, record: String) -> Self {
        Self {
            current_address: None,
            interface,
            record,
        }
    }
}

/// Owns the rule state and drives the two periodic triggers.
pub struct Controller {
    rule: Rule,
    resolver: Box<dyn AddressResolver>,
    session: DnsSession,
    fatal_resolve_errors: bool,
}

impl Controller {
    pub fn new(
        rule: Rule,
        resolver: Box<dyn AddressResolver>,
        session: DnsSession,
        fatal_resolve_errors: bool,
    ) -> Self {
        Self {
            rule,
            resolver,
            session,
            fatal_resolve_errors,
        }
    }

    /// Run both triggers until the process is terminated.
    ///
    /// The check logic runs once up front so the record is pushed
    /// immediately; each timer then first fires one full period later.
    /// Ticks are handled one at a time; when both timers are due in the
    /// same iteration, `select!` picks one and the other is handled on the
    /// next pass.
    pub async fn run(mut self, check_period: Duration, force_period: Duration) -> Result<()> {
        self.check_tick().await?;
        tracing::info!("waiting ...");

        let mut check = time::interval_at(Instant::now() + check_period, check_period);
        let mut force = time::interval_at(Instant::now() + force_period, force_period);

        loop {
            tokio::select! {
                _ = check.tick() => {
                    self.check_tick().await?;
                    tracing::info!("waiting ...");
                }
                _ = force.tick() => self.force_tick().await,
            }
        }
    }

    /// Resolve the interface address and push it if it changed.
    async fn check_tick(&mut self) -> Result<()> {
        tracing::debug!("checking {} for an address change", self.rule.interface);

        let address = match self.resolver.resolve() {
            Ok(address) => address,
            Err(e) if self.fatal_resolve_errors => return Err(e),
            Err(e) => {
                tracing::warn!("address resolution failed, skipping this tick: {}", e);
                return Ok(());
            }
        };

        if self.rule.current_address == Some(address) {
            tracing::debug!("address {} unchanged", address);
            return Ok(());
        }

        tracing::info!(
            "address changed: {:?} -> {}",
            self.rule.current_address,
            address
        );
        self.rule.current_address = Some(address);
        self.push(address).await;

        Ok(())
    }

    /// Re-send the last known address unconditionally. Never mutates the
    /// rule; a no-op until the first successful resolution.
    async fn force_tick(&mut self) {
        match self.rule.current_address {
            Some(address) => {
                tracing::info!("forced refresh of {}", address);
                self.push(address).await;
            }
            None => tracing::debug!("no address known yet, skipping forced refresh"),
        }
    }

    async fn push(&self, address: Ipv6Addr) {
        match self.session.upsert(&self.rule.record, address).await {
            Ok(outcome) => tracing::info!(
                "record {} set to {} at {}",
                outcome.record_id,
                outcome.value,
                outcome.timestamp
            ),
            // Not retried here; the next trigger attempts it again.
            Err(e) => tracing::error!("record update failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DdnsError, Result};
    use crate::providers::{DnsRecord, DnsSession, MockDnsProvider, Zone};
    use crate::resolver::MockAddressResolver;
    use std::sync::Mutex;

    fn zoned_provider() -> MockDnsProvider {
        let mut provider = MockDnsProvider::new();
        provider.expect_list_zones().returning(|_, _| {
            Ok(vec![Zone {
                id: "zone-1".to_string(),
                name: "example.com".to_string(),
            }])
        });
        provider
    }

    fn echo_record(request: &crate::providers::RecordRequest) -> DnsRecord {
        DnsRecord {
            id: "rec-1".to_string(),
            record_type: request.record_type.clone(),
            name: request.name.clone(),
            value: request.value.clone(),
        }
    }

    /// Resolver that replays a fixed sequence of snapshots, one per tick.
    fn scripted_resolver(snapshots: Vec<Result<Ipv6Addr>>) -> MockAddressResolver {
        let script = Mutex::new(snapshots.into_iter());
        let mut resolver = MockAddressResolver::new();
        resolver
            .expect_resolve()
            .returning(move || script.lock().unwrap().next().expect("snapshot script exhausted"));
        resolver
    }

    async fn controller_with(
        provider: MockDnsProvider,
        resolver: MockAddressResolver,
        fatal_resolve_errors: bool,
    ) -> Controller {
        let session = DnsSession::open(Box::new(provider), "example.com")
            .await
            .unwrap();
        Controller::new(
            Rule::new("eth0".to_string(), "home".to_string()),
            Box::new(resolver),
            session,
            fatal_resolve_errors,
        )
    }

    fn v6(s: &str) -> Ipv6Addr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_one_upsert_per_distinct_address() {
        // Snapshot sequence from the interface: new, unchanged, changed.
        let resolver = scripted_resolver(vec![
            Ok(v6("2001:db8::5")),
            Ok(v6("2001:db8::5")),
            Ok(v6("2001:db8::9")),
        ]);

        let mut provider = zoned_provider();
        provider
            .expect_upsert_record()
            .withf(|r| r.value == "2001:db8::5")
            .times(1)
            .returning(|r| Ok(echo_record(&r)));
        provider
            .expect_upsert_record()
            .withf(|r| r.value == "2001:db8::9")
            .times(1)
            .returning(|r| Ok(echo_record(&r)));

        let mut controller = controller_with(provider, resolver, false).await;

        controller.check_tick().await.unwrap();
        controller.check_tick().await.unwrap();
        controller.check_tick().await.unwrap();

        assert_eq!(controller.rule.current_address, Some(v6("2001:db8::9")));
    }

    #[tokio::test]
    async fn test_unchanged_address_does_nothing_observable() {
        let resolver = scripted_resolver((0..4).map(|_| Ok(v6("2001:db8::5"))).collect());

        let mut provider = zoned_provider();
        provider
            .expect_upsert_record()
            .times(1)
            .returning(|r| Ok(echo_record(&r)));

        let mut controller = controller_with(provider, resolver, false).await;

        for _ in 0..4 {
            controller.check_tick().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_force_tick_resends_identical_value() {
        let resolver = scripted_resolver(vec![Ok(v6("2001:db8::5"))]);

        let mut provider = zoned_provider();
        provider
            .expect_upsert_record()
            .withf(|r| r.value == "2001:db8::5")
            .times(2)
            .returning(|r| Ok(echo_record(&r)));

        let mut controller = controller_with(provider, resolver, false).await;

        controller.check_tick().await.unwrap();
        controller.force_tick().await;

        // The force path re-sends but never mutates.
        assert_eq!(controller.rule.current_address, Some(v6("2001:db8::5")));
    }

    #[tokio::test]
    async fn test_force_tick_before_any_resolution_is_noop() {
        let resolver = MockAddressResolver::new();

        let mut provider = zoned_provider();
        provider.expect_upsert_record().never();

        let mut controller = controller_with(provider, resolver, false).await;

        controller.force_tick().await;

        assert_eq!(controller.rule.current_address, None);
    }

    #[tokio::test]
    async fn test_resolver_failure_skips_tick_by_default() {
        let resolver = scripted_resolver(vec![
            Err(DdnsError::NoPublicAddress("eth0".to_string())),
            Ok(v6("2001:db8::5")),
        ]);

        let mut provider = zoned_provider();
        provider
            .expect_upsert_record()
            .times(1)
            .returning(|r| Ok(echo_record(&r)));

        let mut controller = controller_with(provider, resolver, false).await;

        // Failed tick is skipped without touching state, next tick recovers.
        controller.check_tick().await.unwrap();
        assert_eq!(controller.rule.current_address, None);

        controller.check_tick().await.unwrap();
        assert_eq!(controller.rule.current_address, Some(v6("2001:db8::5")));
    }

    #[tokio::test]
    async fn test_resolver_failure_is_fatal_when_configured() {
        let resolver = scripted_resolver(vec![Err(DdnsError::InterfaceDown("eth0".to_string()))]);

        let mut provider = zoned_provider();
        provider.expect_upsert_record().never();

        let mut controller = controller_with(provider, resolver, true).await;

        let err = controller.check_tick().await.unwrap_err();
        assert!(matches!(err, DdnsError::InterfaceDown(_)));
    }

    #[tokio::test]
    async fn test_failed_upsert_keeps_address_and_does_not_recheck() {
        let resolver = scripted_resolver(vec![Ok(v6("2001:db8::5")), Ok(v6("2001:db8::5"))]);

        let mut provider = zoned_provider();
        provider
            .expect_upsert_record()
            .times(1)
            .returning(|_| Err(DdnsError::Network("connection reset".to_string())));

        let mut controller = controller_with(provider, resolver, false).await;

        // The address is recorded before the push, so a failed upsert is
        // not re-driven by the change check; the force trigger re-sends it.
        controller.check_tick().await.unwrap();
        assert_eq!(controller.rule.current_address, Some(v6("2001:db8::5")));

        controller.check_tick().await.unwrap();
    }

    #[tokio::test]
    async fn test_force_tick_retries_after_failed_upsert() {
        let resolver = scripted_resolver(vec![Ok(v6("2001:db8::5"))]);

        let calls = std::sync::atomic::AtomicU32::new(0);
        let mut provider = zoned_provider();
        provider
            .expect_upsert_record()
            .withf(|r| r.value == "2001:db8::5")
            .times(2)
            .returning(move |r| {
                if calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    Err(DdnsError::Network("connection reset".to_string()))
                } else {
                    Ok(echo_record(&r))
                }
            });

        let mut controller = controller_with(provider, resolver, false).await;

        controller.check_tick().await.unwrap();
        controller.force_tick().await;
    }
}

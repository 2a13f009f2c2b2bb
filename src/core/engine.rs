use crate::config::registry::ServiceRegistry;
use crate::core::aggregator::Aggregator;
use crate::domain::model::{IpProfile, ServiceVerdict};
use crate::domain::ports::{Fetcher, GeoLookup};
use crate::utils::error::{CheckError, Result};
use std::time::Duration;

const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// One run's output: the IP profile the verdicts were computed against and
/// the verdicts themselves, in registry order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub profile: IpProfile,
    pub verdicts: Vec<ServiceVerdict>,
}

/// Drives a full detection run: resolves the IP profile once, then evaluates
/// services strictly one at a time with a pacing delay in between so the
/// upstream endpoints are not hammered.
pub struct CheckEngine<F: Fetcher, G: GeoLookup> {
    fetcher: F,
    geo: G,
    registry: ServiceRegistry,
    pacing: Duration,
}

impl<F: Fetcher, G: GeoLookup> CheckEngine<F, G> {
    pub fn new(fetcher: F, geo: G, registry: ServiceRegistry) -> Self {
        Self {
            fetcher,
            geo,
            registry,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Evaluates every registered service in registry order.
    pub async fn run_all(&self) -> RunReport {
        let profile = self.resolve_profile().await;
        let aggregator = Aggregator::new(&self.fetcher, &profile);

        let mut verdicts = Vec::with_capacity(self.registry.len());
        for (index, service) in self.registry.services().iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            tracing::info!(service = %service.id, "checking service");
            verdicts.push(aggregator.evaluate(service).await);
        }

        RunReport { profile, verdicts }
    }

    /// Evaluates a single service. An identifier missing from the registry
    /// is a configuration error, not a verdict.
    pub async fn run_one(&self, id: &str) -> Result<RunReport> {
        let service = self
            .registry
            .get(id)
            .ok_or_else(|| CheckError::UnknownService { id: id.to_string() })?;

        let profile = self.resolve_profile().await;
        tracing::info!(service = %service.id, "checking service");
        let verdict = Aggregator::new(&self.fetcher, &profile)
            .evaluate(service)
            .await;

        Ok(RunReport {
            profile,
            verdicts: vec![verdict],
        })
    }

    async fn resolve_profile(&self) -> IpProfile {
        let profile = self.geo.lookup().await;
        if profile.has_known_country() {
            tracing::info!(ip = %profile.ip, country = %profile.country_code, "resolved IP profile");
        } else {
            tracing::warn!("geolocation unavailable, falling back to probe-only detection");
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        ClassifierRules, ElementarySignal, Probe, ProbeOutcome, ServiceSpec, StatusAction,
        StatusRule, Status,
    };
    use async_trait::async_trait;

    struct FixedFetcher {
        status: u16,
    }

    #[async_trait]
    impl Fetcher for FixedFetcher {
        async fn fetch(&self, _probe: &Probe) -> ProbeOutcome {
            ProbeOutcome::Response {
                status_code: self.status,
                body_text: String::new(),
                final_url: "https://example.com/".to_string(),
            }
        }
    }

    struct FixedGeo {
        country: &'static str,
    }

    #[async_trait]
    impl GeoLookup for FixedGeo {
        async fn lookup(&self) -> IpProfile {
            IpProfile {
                country_code: self.country.to_string(),
                ..IpProfile::unknown()
            }
        }
    }

    fn test_registry() -> ServiceRegistry {
        let rules = ClassifierRules {
            status_rules: vec![StatusRule {
                codes: vec![200],
                action: StatusAction::Signal(ElementarySignal::Available),
            }],
            ..ClassifierRules::default()
        };
        let make = |id: &str, deny: &[&str]| ServiceSpec {
            id: id.to_string(),
            name: id.to_uppercase(),
            deny_list: deny.iter().map(|c| c.to_string()).collect(),
            probes: vec![Probe {
                label: "web".to_string(),
                url: format!("https://{id}.example.com/"),
                follow_redirects: true,
                timeout: Duration::from_secs(5),
                final_on_available: true,
                rules: rules.clone(),
            }],
        };
        ServiceRegistry::new(vec![make("alpha", &[]), make("beta", &["US"])])
    }

    #[tokio::test]
    async fn run_all_reports_in_registry_order() {
        let engine = CheckEngine::new(
            FixedFetcher { status: 200 },
            FixedGeo { country: "US" },
            test_registry(),
        )
        .with_pacing(Duration::ZERO);

        let report = engine.run_all().await;

        assert_eq!(report.verdicts.len(), 2);
        assert_eq!(report.verdicts[0].service_id, "alpha");
        assert_eq!(report.verdicts[0].status, Status::Success);
        // beta deny-lists US, so the gate fires before its probe.
        assert_eq!(report.verdicts[1].service_id, "beta");
        assert_eq!(report.verdicts[1].status, Status::Failed);
    }

    #[tokio::test]
    async fn run_one_selects_the_requested_service() {
        let engine = CheckEngine::new(
            FixedFetcher { status: 200 },
            FixedGeo { country: "DE" },
            test_registry(),
        )
        .with_pacing(Duration::ZERO);

        let report = engine.run_one("beta").await.unwrap();

        assert_eq!(report.verdicts.len(), 1);
        assert_eq!(report.verdicts[0].service_id, "beta");
        assert_eq!(report.verdicts[0].status, Status::Success);
        assert_eq!(report.verdicts[0].region, "DE");
    }

    #[tokio::test]
    async fn run_one_rejects_unknown_identifier() {
        let engine = CheckEngine::new(
            FixedFetcher { status: 200 },
            FixedGeo { country: "DE" },
            test_registry(),
        );

        let err = engine.run_one("nope").await.unwrap_err();
        assert!(matches!(err, CheckError::UnknownService { .. }));
    }
}

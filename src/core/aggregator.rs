use crate::core::classifier::classify;
use crate::core::gate::region_denied;
use crate::domain::model::{
    ElementarySignal, IpProfile, Reason, ServiceSpec, ServiceVerdict, Status,
};
use crate::domain::ports::Fetcher;

/// Elementary signals observed for one service, folded into a verdict once
/// the probe sequence ends or short-circuits.
#[derive(Debug, Default, Clone, Copy)]
struct Evidence {
    restricted: bool,
    available: bool,
    challenged: bool,
    denied: bool,
}

/// Runs one service's probe sequence in order and folds the signals into a
/// final verdict. The fetcher and the IP profile are shared across services;
/// the aggregator itself is stateless between calls.
pub struct Aggregator<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    profile: &'a IpProfile,
}

impl<'a, F: Fetcher + ?Sized> Aggregator<'a, F> {
    pub fn new(fetcher: &'a F, profile: &'a IpProfile) -> Self {
        Self { fetcher, profile }
    }

    /// Evaluates one service. The deny-list gate runs first and skips all
    /// probes on a hit; otherwise probes execute strictly in order, stopping
    /// early on a region-restriction signal or on an Available signal from a
    /// probe flagged final.
    pub async fn evaluate(&self, service: &ServiceSpec) -> ServiceVerdict {
        if region_denied(self.profile, &service.deny_list) {
            tracing::debug!(
                service = %service.id,
                country = %self.profile.country_code,
                "country is on the vendor deny-list, skipping probes"
            );
            return self.verdict(service, Status::Failed, Reason::RegionRestricted);
        }

        let mut evidence = Evidence::default();

        for probe in &service.probes {
            let outcome = self.fetcher.fetch(probe).await;
            let signal = classify(&outcome, &probe.rules);
            tracing::debug!(service = %service.id, probe = %probe.label, ?signal, "probe classified");

            match signal {
                ElementarySignal::RegionRestricted => {
                    evidence.restricted = true;
                    break;
                }
                ElementarySignal::Available => {
                    evidence.available = true;
                    if probe.final_on_available {
                        break;
                    }
                }
                ElementarySignal::ChallengeDetected => evidence.challenged = true,
                ElementarySignal::AccessDenied => evidence.denied = true,
                ElementarySignal::Unknown => {}
            }
        }

        self.resolve(service, evidence)
    }

    /// Priority fold: restriction > availability > challenge-only (partial)
    /// > explicit denial > no decisive signal at all.
    fn resolve(&self, service: &ServiceSpec, evidence: Evidence) -> ServiceVerdict {
        if evidence.restricted {
            return self.verdict(service, Status::Failed, Reason::RegionRestricted);
        }
        if evidence.available {
            let reason = if evidence.challenged {
                Reason::NormalAccessChallenged
            } else {
                Reason::NormalAccess
            };
            return self.verdict(service, Status::Success, reason);
        }
        if evidence.challenged {
            // A scripted check being blocked does not prove a browser would
            // be; downgrade to partial rather than failed.
            return self.verdict(service, Status::Partial, Reason::ScriptBlocked);
        }
        if evidence.denied {
            return self.verdict(service, Status::Failed, Reason::AccessDenied);
        }
        self.verdict(service, Status::Error, Reason::DetectionFailed)
    }

    fn verdict(&self, service: &ServiceSpec, status: Status, reason: Reason) -> ServiceVerdict {
        let region = match status {
            Status::Success | Status::Partial => {
                self.profile.country_code_or_unknown().to_string()
            }
            Status::Failed | Status::Error => "N/A".to_string(),
        };
        ServiceVerdict {
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            status,
            region,
            reason,
        }
    }
}

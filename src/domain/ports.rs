use crate::domain::model::{IpProfile, Probe, ProbeOutcome};
use async_trait::async_trait;

/// Executes one probe. Implementations convert every transport error into a
/// `ProbeOutcome::Failure`; this boundary never returns an error type.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, probe: &Probe) -> ProbeOutcome;
}

/// Resolves the caller's network identity. Degrades to `IpProfile::unknown()`
/// instead of failing.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self) -> IpProfile;
}

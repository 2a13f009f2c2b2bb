pub mod model;
pub mod ports;

pub use model::{
    ClassifierRules, ElementarySignal, FailureKind, IpKind, IpProfile, Probe, ProbeOutcome,
    Reason, ServiceSpec, ServiceVerdict, Status,
};
pub use ports::{Fetcher, GeoLookup};

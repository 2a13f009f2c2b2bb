pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{CliConfig, ServiceRegistry, ServicesFile};
pub use core::{Aggregator, CheckEngine, RunReport};
pub use domain::model::{
    ElementarySignal, IpProfile, Probe, ProbeOutcome, Reason, ServiceSpec, ServiceVerdict,
    Status,
};
pub use utils::error::{CheckError, Result};

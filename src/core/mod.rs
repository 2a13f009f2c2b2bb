pub mod aggregator;
pub mod classifier;
pub mod engine;
pub mod gate;

pub use aggregator::Aggregator;
pub use classifier::classify;
pub use engine::{CheckEngine, RunReport};
pub use gate::region_denied;

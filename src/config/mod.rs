pub mod cli;
pub mod registry;
pub mod services;

pub use cli::CliConfig;
pub use registry::ServiceRegistry;
pub use services::ServicesFile;

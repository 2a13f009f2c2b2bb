use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "regioncheck")]
#[command(about = "Detects region restrictions of streaming and AI services", version)]
pub struct CliConfig {
    /// Check a single service instead of the full registry
    #[arg(long, short = 's')]
    pub service: Option<String>,

    /// Verbose mode; logs per-probe classifications (does not alter verdicts)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Per-probe timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Delay between services in milliseconds, to stay under rate limits
    #[arg(long, default_value = "500")]
    pub pacing_ms: u64,

    /// TOML file replacing the builtin service registry
    #[arg(long)]
    pub services_file: Option<PathBuf>,

    /// Disable ANSI colors in the report
    #[arg(long)]
    pub no_color: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_range("timeout", self.timeout, 1, 120)?;
        validate_range("pacing_ms", self.pacing_ms, 0, 10_000)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CliConfig {
        CliConfig {
            service: None,
            verbose: false,
            timeout: 10,
            pacing_ms: 500,
            services_file: None,
            no_color: false,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = config();
        cfg.timeout = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn excessive_pacing_is_rejected() {
        let mut cfg = config();
        cfg.pacing_ms = 60_000;
        assert!(cfg.validate().is_err());
    }
}

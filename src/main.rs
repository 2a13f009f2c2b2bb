use clap::Parser;
use regioncheck::adapters::{http, GeoClient, HttpFetcher};
use regioncheck::utils::format::ReportFormatter;
use regioncheck::utils::{logger, validation::Validate};
use regioncheck::{CheckError, CliConfig, ServiceRegistry, ServicesFile, Status};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!(?config, "starting regioncheck");

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        std::process::exit(2);
    }

    let registry = match load_registry(&config) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    if let Some(id) = &config.service {
        if registry.get(id).is_none() {
            eprintln!(
                "{}",
                CheckError::UnknownService { id: id.clone() }
            );
            eprintln!("known services: {}", registry.ids().join(", "));
            std::process::exit(2);
        }
    }

    let fetcher = HttpFetcher::new()?;
    let geo = GeoClient::new(http::default_client()?);
    let engine = regioncheck::CheckEngine::new(fetcher, geo, registry)
        .with_pacing(Duration::from_millis(config.pacing_ms));

    let formatter = ReportFormatter::new(!config.no_color);
    formatter.print_header();

    let report = match &config.service {
        Some(id) => engine.run_one(id).await?,
        None => engine.run_all().await,
    };

    formatter.print_ip_profile(&report.profile);
    formatter.print_report(&report);

    let any_success = report.verdicts.iter().any(|v| v.status == Status::Success);
    if !any_success {
        std::process::exit(1);
    }
    Ok(())
}

fn load_registry(config: &CliConfig) -> regioncheck::Result<ServiceRegistry> {
    let mut registry = match &config.services_file {
        Some(path) => ServicesFile::from_path(path)?.into_registry()?,
        None => ServiceRegistry::builtin(),
    };
    registry.override_probe_timeout(Duration::from_secs(config.timeout));
    Ok(registry)
}

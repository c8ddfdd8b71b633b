use clap::Parser;
use cli::Cli;
use config::{API_KEY_ENV, Config, ConfigError, LoggingConfig, MetricsConfig};
use driver::DriverError;
use serverless_api::config::ValidationError;
use serverless_api::{ApiError, HttpClient, ServerlessApi};
use shared::metrics::MetricsError;
use shared::metrics_defs::describe_all;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod config;
mod driver;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid api config: {0}")]
    InvalidApiConfig(#[from] ValidationError),
    #[error("could not build API client: {0}")]
    Client(#[from] ApiError),
    #[error("could not initialise metrics: {0}")]
    Metrics(#[from] MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

fn init_logging(config: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    guard
}

fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    shared::metrics::init_statsd(&config.statsd_host, config.statsd_port, &config.prefix)?;
    describe_all(serverless_api::metrics_defs::ALL_METRICS);
    describe_all(trafficfilter::metrics_defs::ALL_METRICS);
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = Config::from_file(&cli.config)?.with_api_key(std::env::var(API_KEY_ENV).ok());

    let _sentry = init_logging(&config.logging);
    if let Some(metrics) = &config.metrics {
        init_metrics(metrics)?;
    }

    config.api.validate()?;
    let client: Arc<dyn ServerlessApi> = Arc::new(HttpClient::new(&config.api)?);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let report = rt.block_on(driver::execute(client, cli.command))?;

    report.log_diagnostics();
    println!("{}", report.to_json()?);

    if report.has_error() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ecfilter: {e}");
            ExitCode::FAILURE
        }
    }
}

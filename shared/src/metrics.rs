use metrics_exporter_statsd::{StatsdBuilder, StatsdError};

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("could not build statsd recorder: {0}")]
    Statsd(#[from] StatsdError),
    #[error("a global metrics recorder is already installed")]
    AlreadyInstalled,
}

/// Installs a global recorder that ships every metric to StatsD over UDP.
///
/// Must be called at most once per process, before any metric is recorded.
pub fn init_statsd(statsd_host: &str, statsd_port: u16, prefix: &str) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(statsd_host, statsd_port)
        .with_queue_size(5000)
        .build(Some(prefix))?;

    metrics::set_global_recorder(recorder).map_err(|_| MetricsError::AlreadyInstalled)?;

    tracing::info!(
        statsd_host = %statsd_host,
        statsd_port = statsd_port,
        prefix = %prefix,
        "Metrics exporter installed"
    );

    Ok(())
}

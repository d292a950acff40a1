use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vetrina_cache_hit_total",
            Unit::Count,
            "Total number of cache-tier hits, labeled by tier."
        );
        describe_counter!(
            "vetrina_cache_miss_total",
            Unit::Count,
            "Total number of cache-tier misses, labeled by tier."
        );
        describe_counter!(
            "vetrina_cache_error_total",
            Unit::Count,
            "Total number of failed cache-tier operations, labeled by tier."
        );
        describe_counter!(
            "vetrina_store_fetch_total",
            Unit::Count,
            "Total number of template-store fetches issued by flight leaders."
        );
        describe_counter!(
            "vetrina_flight_leader_total",
            Unit::Count,
            "Total number of fetches led by this instance."
        );
        describe_counter!(
            "vetrina_flight_follower_total",
            Unit::Count,
            "Total number of callers that joined an in-flight fetch."
        );
        describe_counter!(
            "vetrina_flight_timeout_total",
            Unit::Count,
            "Total number of followers that waited out the flight cap."
        );
    });
}

//! View definitions for the recorded measures.
//!
//! Four views, tagged by `{method, status, error}`: a call counter and three
//! explicit-bucket distributions. Registration is explicit: the caller hands
//! in its meter-provider builder once at startup and wires the returned
//! builder into its pipeline. Idempotency across repeated registration is
//! the metrics backend's concern, not this layer's.

use opentelemetry_sdk::metrics::{new_view, Aggregation, Instrument, MeterProviderBuilder, Stream};
use tracing::warn;

pub const CALLS_VIEW: &str = "redisrs/calls";
pub const LATENCY_VIEW: &str = "redisrs/latency";
pub const KEY_LENGTHS_VIEW: &str = "redisrs/key_lengths";
pub const VALUE_LENGTHS_VIEW: &str = "redisrs/value_lengths";

/// Latency buckets, milliseconds.
pub const LATENCY_BOUNDARIES_MS: &[f64] = &[
    0.0, 5.0, 10.0, 25.0, 40.0, 50.0, 75.0, 100.0, 200.0, 400.0, 600.0, 800.0, 1000.0, 2000.0,
    4000.0, 6000.0, 10000.0, 20000.0, 50000.0, 1000000.0,
];

/// Key length buckets, bytes.
pub const KEY_LENGTH_BOUNDARIES: &[f64] = &[
    0.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0,
];

/// Value length buckets, bytes.
pub const VALUE_LENGTH_BOUNDARIES: &[f64] = &[
    0.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 20000.0,
];

/// Attach the distribution views to a meter-provider builder.
///
/// The calls counter needs no view: count aggregation is a counter's native
/// behavior. A view that fails to build is logged and skipped rather than
/// failing the pipeline; observability must not break the data path.
pub fn register_views(builder: MeterProviderBuilder) -> MeterProviderBuilder {
    let builder = with_distribution(builder, LATENCY_VIEW, LATENCY_BOUNDARIES_MS);
    let builder = with_distribution(builder, KEY_LENGTHS_VIEW, KEY_LENGTH_BOUNDARIES);
    with_distribution(builder, VALUE_LENGTHS_VIEW, VALUE_LENGTH_BOUNDARIES)
}

fn with_distribution(
    builder: MeterProviderBuilder,
    name: &'static str,
    boundaries: &[f64],
) -> MeterProviderBuilder {
    let view = new_view(
        Instrument::new().name(name),
        Stream::new().aggregation(Aggregation::ExplicitBucketHistogram {
            boundaries: boundaries.to_vec(),
            record_min_max: true,
        }),
    );
    match view {
        Ok(view) => builder.with_view(view),
        Err(err) => {
            warn!(view = name, error = %err, "failed to build metric view, skipping");
            builder
        }
    }
}

//! The interception core: wrap one underlying call with a span and a
//! measurement batch.
//!
//! Everything the command facade does funnels through [`invoke_traced`]. The
//! wrapped call's outcome is passed through untouched; telemetry is purely a
//! side channel.

use std::fmt::Display;
use std::time::Instant;

use crate::lengths::{heuristic_lengths, Operand};
use crate::telemetry::{Measure, SpanStatus, TagSet, Telemetry};

/// Invoke `underlying` inside a span named `operation`, recording latency
/// and heuristic key/value lengths against `{method, status, error}` tags.
///
/// `key` and `value` are representative arguments used only for size
/// measurement; they need not coincide with what `underlying` captures. The
/// result - success or error - is returned exactly as produced: errors are
/// tagged and set on the span, never wrapped or converted.
///
/// Exactly one measurement batch is recorded per invocation, on both paths.
/// The span guard closes on drop, so the span ends on every exit path.
pub fn invoke_traced<T, E, F>(
    telemetry: &Telemetry,
    operation: &str,
    key: &Operand,
    value: &Operand,
    underlying: F,
) -> Result<T, E>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    let mut batch = telemetry.recorder().batch();
    let mut tags = TagSet::new(operation);

    let start = Instant::now();
    let mut span = telemetry.tracer().start_span(operation);

    let result = underlying();

    match &result {
        Ok(_) => tags.mark_ok(),
        Err(err) => {
            let message = err.to_string();
            span.set_status(SpanStatus::error(message.clone()));
            tags.mark_error(message);
        }
    }

    batch.add(Measure::LatencyMs, start.elapsed().as_secs_f64() * 1_000.0);
    for length in heuristic_lengths(key) {
        batch.add(Measure::KeyLength, length as f64);
    }
    for length in heuristic_lengths(value) {
        batch.add(Measure::ValueLength, length as f64);
    }
    batch.record(&tags);

    // Close the span after recording, mirroring the scope in which the
    // measurements were taken.
    drop(span);

    result
}

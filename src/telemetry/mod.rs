//! Telemetry capabilities consumed by the interception core.
//!
//! This module defines the narrow seams the instrumentation layer needs from
//! a tracing backend and a metrics backend, plus a [`Telemetry`] handle that
//! carries both explicitly. There is no ambient lookup: callers construct a
//! handle at composition time and pass it to the wrapper. The default handle
//! is fully inert, so instrumentation can never block the data path.
//!
//! Provided implementations:
//!
//! - [`NoopTracer`] / [`NoopRecorder`] - the defaults
//! - [`TracingTracer`] - spans via the `tracing` crate
//! - [`OtelRecorder`] - instruments on an OpenTelemetry meter
//! - [`register_views`] - explicit-bucket views for the distributions

pub mod metrics;
pub mod tracer;
pub mod views;

use std::sync::Arc;

pub use metrics::OtelRecorder;
pub use tracer::TracingTracer;
pub use views::register_views;

/// Span outcome classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Error,
}

/// Status attached to a span, derived from the outcome of the wrapped call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanStatus {
    pub code: StatusCode,
    pub message: String,
}

impl SpanStatus {
    pub fn ok() -> Self {
        Self {
            code: StatusCode::Ok,
            message: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::Error,
            message: message.into(),
        }
    }
}

/// Tracing capability: opens one scoped span per call.
pub trait Tracer: Send + Sync {
    /// Start a span named after the operation. The span stays open for the
    /// lifetime of the returned guard and closes when the guard drops,
    /// on every exit path.
    fn start_span(&self, name: &str) -> Box<dyn Span>;
}

/// A span guard. Closed on drop.
pub trait Span {
    /// Attach an outcome status. Only called on the error path; a span
    /// without a status is a successful one.
    fn set_status(&mut self, status: SpanStatus);
}

/// The quantities this layer observes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    /// Wall-clock latency of one call, in milliseconds.
    LatencyMs,
    /// Heuristic length of the key argument, in bytes.
    KeyLength,
    /// Heuristic length of the value argument, in bytes.
    ValueLength,
}

impl Measure {
    pub fn name(&self) -> &'static str {
        match self {
            Measure::LatencyMs => "redisrs/latency",
            Measure::KeyLength => "redisrs/key_length",
            Measure::ValueLength => "redisrs/value_length",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Measure::LatencyMs => "ms",
            Measure::KeyLength | Measure::ValueLength => "By",
        }
    }
}

/// Labels attached to one call's recordings. Built fresh per call, fixed key
/// set (`method`, `status`, `error`), immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSet {
    method: String,
    status: Option<&'static str>,
    error: Option<String>,
}

impl TagSet {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            status: None,
            error: None,
        }
    }

    pub fn mark_ok(&mut self) {
        self.status = Some("OK");
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = Some("ERROR");
        self.error = Some(message.into());
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn status(&self) -> Option<&'static str> {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Metrics capability: hands out measurement batches.
pub trait Recorder: Send + Sync {
    fn batch(&self) -> Box<dyn MeasurementBatch>;
}

/// Accumulator for one call's observations. Consumed by [`record`], so a
/// batch cannot be flushed twice.
///
/// [`record`]: MeasurementBatch::record
pub trait MeasurementBatch {
    fn add(&mut self, measure: Measure, value: f64);
    fn record(self: Box<Self>, tags: &TagSet);
}

/// Explicit telemetry context: a tracer handle and a recorder handle.
///
/// Cheap to clone; the default is inert on both sides.
#[derive(Clone)]
pub struct Telemetry {
    tracer: Arc<dyn Tracer>,
    recorder: Arc<dyn Recorder>,
}

impl Telemetry {
    pub fn new(tracer: Arc<dyn Tracer>, recorder: Arc<dyn Recorder>) -> Self {
        Self { tracer, recorder }
    }

    /// Tracing-crate spans plus OpenTelemetry metrics on the given meter.
    /// The common production wiring.
    pub fn with_meter(meter: &opentelemetry::metrics::Meter) -> Self {
        Self::new(Arc::new(TracingTracer), Arc::new(OtelRecorder::new(meter)))
    }

    pub fn tracer(&self) -> &dyn Tracer {
        self.tracer.as_ref()
    }

    pub fn recorder(&self) -> &dyn Recorder {
        self.recorder.as_ref()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(Arc::new(NoopTracer), Arc::new(NoopRecorder))
    }
}

/// Tracer whose spans are inert.
pub struct NoopTracer;

struct NoopSpan;

impl Tracer for NoopTracer {
    fn start_span(&self, _name: &str) -> Box<dyn Span> {
        Box::new(NoopSpan)
    }
}

impl Span for NoopSpan {
    fn set_status(&mut self, _status: SpanStatus) {}
}

/// Recorder whose batches discard every observation.
pub struct NoopRecorder;

struct NoopBatch;

impl Recorder for NoopRecorder {
    fn batch(&self) -> Box<dyn MeasurementBatch> {
        Box::new(NoopBatch)
    }
}

impl MeasurementBatch for NoopBatch {
    fn add(&mut self, _measure: Measure, _value: f64) {}
    fn record(self: Box<Self>, _tags: &TagSet) {}
}

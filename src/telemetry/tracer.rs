//! Tracer backed by the `tracing` crate.
//!
//! Spans carry the `otel.*` field conventions, so applications that layer
//! `tracing-opentelemetry` onto their subscriber get real OTel client spans;
//! without it the spans are still visible to any `tracing` subscriber.

use tracing::field::Empty;
use tracing::span::EnteredSpan;

use super::{Span, SpanStatus, StatusCode, Tracer};

/// Emits one `tracing` span per wrapped call.
///
/// `tracing` span names must be static, so the span is named
/// `redis.command` and the operation name is carried in `otel.name`,
/// which the OpenTelemetry bridge uses as the exported span name.
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(&self, name: &str) -> Box<dyn Span> {
        let span = tracing::info_span!(
            "redis.command",
            otel.name = name,
            otel.kind = "client",
            otel.status_code = Empty,
            error.message = Empty,
        );
        Box::new(TracingSpan {
            span: span.entered(),
        })
    }
}

struct TracingSpan {
    span: EnteredSpan,
}

impl Span for TracingSpan {
    fn set_status(&mut self, status: SpanStatus) {
        match status.code {
            StatusCode::Ok => {
                self.span.record("otel.status_code", "OK");
            }
            StatusCode::Error => {
                self.span.record("otel.status_code", "ERROR");
                self.span.record("error.message", status.message.as_str());
            }
        }
    }
}

//! Shared doubles for integration tests: a recording telemetry backend and
//! a scripted connection.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use redis::{ConnectionLike, ErrorKind, RedisError, RedisResult, Value};
use traced_redis::telemetry::{
    Measure, MeasurementBatch, Recorder, Span, SpanStatus, TagSet, Telemetry, Tracer,
};

/// A span as observed after it closed.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedSpan {
    pub name: String,
    pub status: Option<SpanStatus>,
}

#[derive(Clone, Default)]
pub struct SpanLog(Arc<Mutex<Vec<FinishedSpan>>>);

impl SpanLog {
    pub fn finished(&self) -> Vec<FinishedSpan> {
        self.0.lock().unwrap().clone()
    }
}

struct RecordingTracer {
    log: SpanLog,
}

struct RecordingSpan {
    name: String,
    status: Option<SpanStatus>,
    log: SpanLog,
}

impl Tracer for RecordingTracer {
    fn start_span(&self, name: &str) -> Box<dyn Span> {
        Box::new(RecordingSpan {
            name: name.to_string(),
            status: None,
            log: self.log.clone(),
        })
    }
}

impl Span for RecordingSpan {
    fn set_status(&mut self, status: SpanStatus) {
        self.status = Some(status);
    }
}

impl Drop for RecordingSpan {
    fn drop(&mut self) {
        self.log.0.lock().unwrap().push(FinishedSpan {
            name: std::mem::take(&mut self.name),
            status: self.status.take(),
        });
    }
}

/// A measurement batch as recorded, with its finalized tags.
#[derive(Clone, Debug)]
pub struct RecordedBatch {
    pub measurements: Vec<(Measure, f64)>,
    pub tags: TagSet,
}

impl RecordedBatch {
    pub fn values(&self, measure: Measure) -> Vec<f64> {
        self.measurements
            .iter()
            .filter(|(m, _)| *m == measure)
            .map(|(_, v)| *v)
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct BatchLog(Arc<Mutex<Vec<RecordedBatch>>>);

impl BatchLog {
    pub fn recorded(&self) -> Vec<RecordedBatch> {
        self.0.lock().unwrap().clone()
    }
}

struct RecordingRecorder {
    log: BatchLog,
}

struct RecordingBatch {
    measurements: Vec<(Measure, f64)>,
    log: BatchLog,
}

impl Recorder for RecordingRecorder {
    fn batch(&self) -> Box<dyn MeasurementBatch> {
        Box::new(RecordingBatch {
            measurements: Vec::new(),
            log: self.log.clone(),
        })
    }
}

impl MeasurementBatch for RecordingBatch {
    fn add(&mut self, measure: Measure, value: f64) {
        self.measurements.push((measure, value));
    }

    fn record(self: Box<Self>, tags: &TagSet) {
        self.log.0.lock().unwrap().push(RecordedBatch {
            measurements: self.measurements,
            tags: tags.clone(),
        });
    }
}

/// Telemetry context whose spans and batches are captured for assertions.
pub fn recording_telemetry() -> (Telemetry, SpanLog, BatchLog) {
    let spans = SpanLog::default();
    let batches = BatchLog::default();
    let telemetry = Telemetry::new(
        Arc::new(RecordingTracer { log: spans.clone() }),
        Arc::new(RecordingRecorder {
            log: batches.clone(),
        }),
    );
    (telemetry, spans, batches)
}

/// Connection double that replays scripted replies, then refuses further
/// requests with an I/O error.
pub struct FakeConnection {
    replies: VecDeque<RedisResult<Value>>,
    pub requests: Vec<Vec<u8>>,
}

impl FakeConnection {
    pub fn with_replies(replies: Vec<RedisResult<Value>>) -> Self {
        Self {
            replies: replies.into(),
            requests: Vec::new(),
        }
    }

    /// A connection that fails every request.
    pub fn refusing() -> Self {
        Self::with_replies(Vec::new())
    }

    pub fn refused_error() -> RedisError {
        RedisError::from((ErrorKind::IoError, "connection refused"))
    }
}

impl ConnectionLike for FakeConnection {
    fn req_packed_command(&mut self, cmd: &[u8]) -> RedisResult<Value> {
        self.requests.push(cmd.to_vec());
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(Self::refused_error()))
    }

    fn req_packed_commands(
        &mut self,
        cmd: &[u8],
        _offset: usize,
        count: usize,
    ) -> RedisResult<Vec<Value>> {
        self.requests.push(cmd.to_vec());
        (0..count)
            .map(|_| {
                self.replies
                    .pop_front()
                    .unwrap_or_else(|| Err(Self::refused_error()))
            })
            .collect()
    }

    fn get_db(&self) -> i64 {
        0
    }

    fn check_connection(&mut self) -> bool {
        true
    }

    fn is_open(&self) -> bool {
        true
    }
}

/// Opt-in log output for debugging test runs (TRACED_REDIS_LOG=debug).
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TRACED_REDIS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

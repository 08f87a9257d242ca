//! OpenTelemetry-backed recorder.
//!
//! One counter and three histograms, built once from a meter and shared by
//! every batch. Attach the views from [`super::views`] to the meter provider
//! to get the distribution bucket boundaries.

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

use super::views::{CALLS_VIEW, KEY_LENGTHS_VIEW, LATENCY_VIEW, VALUE_LENGTHS_VIEW};
use super::{Measure, MeasurementBatch, Recorder, TagSet};

/// Records call observations on OpenTelemetry instruments.
#[derive(Clone)]
pub struct OtelRecorder {
    calls: Counter<u64>,
    latency_ms: Histogram<f64>,
    key_length: Histogram<u64>,
    value_length: Histogram<u64>,
}

impl OtelRecorder {
    pub fn new(meter: &Meter) -> Self {
        Self {
            calls: meter
                .u64_counter(CALLS_VIEW)
                .with_description("The number of calls")
                .build(),
            latency_ms: meter
                .f64_histogram(LATENCY_VIEW)
                .with_description("The distribution of the latencies per method")
                .with_unit("ms")
                .build(),
            key_length: meter
                .u64_histogram(KEY_LENGTHS_VIEW)
                .with_description("The distribution of the key lengths")
                .with_unit("By")
                .build(),
            value_length: meter
                .u64_histogram(VALUE_LENGTHS_VIEW)
                .with_description("The distribution of the value lengths")
                .with_unit("By")
                .build(),
        }
    }
}

impl Recorder for OtelRecorder {
    fn batch(&self) -> Box<dyn MeasurementBatch> {
        Box::new(OtelBatch {
            instruments: self.clone(),
            observations: Vec::with_capacity(3),
        })
    }
}

struct OtelBatch {
    instruments: OtelRecorder,
    observations: Vec<(Measure, f64)>,
}

impl MeasurementBatch for OtelBatch {
    fn add(&mut self, measure: Measure, value: f64) {
        self.observations.push((measure, value));
    }

    fn record(self: Box<Self>, tags: &TagSet) {
        let attrs = tag_attributes(tags);
        for (measure, value) in self.observations {
            match measure {
                Measure::LatencyMs => {
                    // Each latency observation is one call.
                    self.instruments.calls.add(1, &attrs);
                    self.instruments.latency_ms.record(value, &attrs);
                }
                Measure::KeyLength => {
                    self.instruments.key_length.record(value as u64, &attrs);
                }
                Measure::ValueLength => {
                    self.instruments.value_length.record(value as u64, &attrs);
                }
            }
        }
    }
}

fn tag_attributes(tags: &TagSet) -> Vec<KeyValue> {
    let mut attrs = Vec::with_capacity(3);
    attrs.push(KeyValue::new("method", tags.method().to_string()));
    if let Some(status) = tags.status() {
        attrs.push(KeyValue::new("status", status));
    }
    if let Some(error) = tags.error() {
        attrs.push(KeyValue::new("error", error.to_string()));
    }
    attrs
}

//! Transparency contract: a traced call returns exactly what the underlying
//! connection produced, on both the success and failure paths, while exactly
//! one span and one measurement batch describe it.

mod common;

use common::{recording_telemetry, FakeConnection};
use redis::{ErrorKind, RedisResult, Value};
use traced_redis::telemetry::{Measure, StatusCode, Telemetry};
use traced_redis::TracedConnection;

#[test]
fn successful_write_returns_result_and_records_lengths() {
    common::init_logging();
    let (telemetry, spans, batches) = recording_telemetry();
    let conn = FakeConnection::with_replies(vec![Ok(Value::Okay)]);
    let mut conn = TracedConnection::new(conn, telemetry);

    let result: RedisResult<()> = conn.set("counter", "42");
    assert!(result.is_ok());

    let spans = spans.finished();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].name, "redisrs.Client.set");
    assert_eq!(spans[0].status, None, "success leaves span status unset");

    let batches = batches.recorded();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.tags.method(), "redisrs.Client.set");
    assert_eq!(batch.tags.status(), Some("OK"));
    assert_eq!(batch.tags.error(), None);
    assert_eq!(batch.values(Measure::KeyLength), vec![7.0]);
    assert_eq!(batch.values(Measure::ValueLength), vec![2.0]);

    let latency = batch.values(Measure::LatencyMs);
    assert_eq!(latency.len(), 1);
    assert!(latency[0] >= 0.0);
}

#[test]
fn successful_read_decodes_the_underlying_reply() {
    let (telemetry, _, _) = recording_telemetry();
    let conn = FakeConnection::with_replies(vec![Ok(Value::BulkString(b"hello".to_vec()))]);
    let mut conn = TracedConnection::new(conn, telemetry);

    let value: String = conn.get("greeting").unwrap();
    assert_eq!(value, "hello");
}

#[test]
fn failure_propagates_the_exact_error_and_tags_it() {
    let (telemetry, spans, batches) = recording_telemetry();
    let mut conn = TracedConnection::new(FakeConnection::refusing(), telemetry);

    let result: RedisResult<String> = conn.get("newer");
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoError);
    assert_eq!(
        err.to_string(),
        FakeConnection::refused_error().to_string(),
        "error must cross the facade unmodified"
    );

    let spans = spans.finished();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].name, "redisrs.Client.get");
    let status = spans[0].status.as_ref().expect("span status set on error");
    assert_eq!(status.code, StatusCode::Error);
    assert_eq!(status.message, err.to_string());

    let batches = batches.recorded();
    assert_eq!(batches.len(), 1, "finalization runs exactly once");
    let batch = &batches[0];
    assert_eq!(batch.tags.status(), Some("ERROR"));
    assert_eq!(batch.tags.error(), Some(err.to_string().as_str()));
    // The key is still measured on the failure path.
    assert_eq!(batch.values(Measure::KeyLength), vec![5.0]);
}

#[test]
fn keyless_command_failure_records_latency_only() {
    let (telemetry, spans, batches) = recording_telemetry();
    let mut conn = TracedConnection::new(FakeConnection::refusing(), telemetry);

    let result: RedisResult<String> = conn.ping();
    assert!(result.is_err());

    let spans = spans.finished();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].name, "redisrs.Client.ping");
    assert!(spans[0].status.is_some());

    let batches = batches.recorded();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.tags.method(), "redisrs.Client.ping");
    assert_eq!(batch.tags.status(), Some("ERROR"));
    assert!(batch.values(Measure::KeyLength).is_empty());
    assert!(batch.values(Measure::ValueLength).is_empty());
    let latency = batch.values(Measure::LatencyMs);
    assert_eq!(latency.len(), 1);
    assert!(latency[0] >= 0.0);
}

#[test]
fn one_batch_and_one_span_per_call() {
    let (telemetry, spans, batches) = recording_telemetry();
    let conn = FakeConnection::with_replies(vec![
        Ok(Value::Okay),
        Ok(Value::BulkString(b"42".to_vec())),
        // Third call hits the exhausted script and fails.
    ]);
    let mut conn = TracedConnection::new(conn, telemetry);

    let _: RedisResult<()> = conn.set("counter", "42");
    let _: RedisResult<String> = conn.get("counter");
    let _: RedisResult<String> = conn.get("counter");

    assert_eq!(spans.finished().len(), 3);
    let batches = batches.recorded();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].tags.status(), Some("OK"));
    assert_eq!(batches[1].tags.status(), Some("OK"));
    assert_eq!(batches[2].tags.status(), Some("ERROR"));
}

#[test]
fn multi_key_command_measures_each_key() {
    let (telemetry, _, batches) = recording_telemetry();
    let conn = FakeConnection::with_replies(vec![Ok(Value::Array(vec![
        Value::Nil,
        Value::Nil,
    ]))]);
    let mut conn = TracedConnection::new(conn, telemetry);

    let _: RedisResult<Vec<Option<String>>> = conn.mget(vec!["ab", "cde"]);

    let batches = batches.recorded();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].values(Measure::KeyLength), vec![2.0, 3.0]);
}

#[test]
fn default_telemetry_is_transparent() {
    let conn = FakeConnection::with_replies(vec![
        Ok(Value::Okay),
        Ok(Value::BulkString(b"42".to_vec())),
    ]);
    let mut conn = TracedConnection::new(conn, Telemetry::default());

    let _: () = conn.set("counter", "42").unwrap();
    let value: String = conn.get("counter").unwrap();
    assert_eq!(value, "42");

    let err = conn.ping::<String>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoError);
}

#[test]
fn raw_commands_are_traced_without_measurement() {
    let (telemetry, spans, batches) = recording_telemetry();
    let conn = FakeConnection::with_replies(vec![Ok(Value::Int(3))]);
    let mut conn = TracedConnection::new(conn, telemetry);

    let mut cmd = redis::Cmd::new();
    cmd.arg("OBJECT").arg("REFCOUNT").arg("counter");
    let value = conn.req_command(&cmd).unwrap();
    assert_eq!(value, Value::Int(3));

    assert_eq!(spans.finished()[0].name, "redisrs.Client.req_command");
    let batch = &batches.recorded()[0];
    assert!(batch.values(Measure::KeyLength).is_empty());
    assert!(batch.values(Measure::ValueLength).is_empty());
    assert_eq!(batch.values(Measure::LatencyMs).len(), 1);
}

//! traced-redis - distributed traces and metrics for redis-rs clients.
//!
//! Wraps every data-plane command of a synchronous redis-rs connection with
//! a trace span and metric recording, without changing what the command
//! returns or raises. Telemetry is a pure side channel: a failed command
//! yields the exact `RedisError` the connection produced, plus one span and
//! one batch of observations describing it.
//!
//! # Wiring
//!
//! ```ignore
//! use opentelemetry::metrics::MeterProvider;
//! use opentelemetry_sdk::metrics::SdkMeterProvider;
//! use traced_redis::telemetry::{register_views, Telemetry};
//! use traced_redis::TracedConnection;
//!
//! // Once at startup: attach the distribution views to the meter provider.
//! let provider = register_views(SdkMeterProvider::builder())
//!     .with_reader(reader)
//!     .build();
//! let telemetry = Telemetry::with_meter(&provider.meter("my-service"));
//!
//! // Per connection:
//! let conn = redis::Client::open("redis://127.0.0.1/")?.get_connection()?;
//! let mut conn = TracedConnection::new(conn, telemetry);
//! let _: () = conn.set("counter", "42")?;
//! ```
//!
//! Spans are emitted through `tracing` with the `otel.*` field conventions;
//! layer `tracing-opentelemetry` onto the subscriber to export them. With no
//! telemetry configured (`Telemetry::default()`) every instrumentation
//! operation is inert.

pub mod client;
pub mod intercept;
pub mod lengths;
pub mod telemetry;

pub use client::{TracedConnection, OPERATIONS};
pub use intercept::invoke_traced;
pub use lengths::{heuristic_lengths, Measurable, Operand};
pub use telemetry::Telemetry;

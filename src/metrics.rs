//! Metrics and tracing helpers.
//!
//! With the `metrics` feature, [`METRICS`] exposes OpenTelemetry instruments
//! exported through Prometheus. With the `tracing` feature,
//! [`tracing_helpers`] opens the spans executors wrap their work in.

#[cfg(feature = "metrics")]
pub use self::otel::{LifeguardMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram},
        KeyValue,
    };
    use opentelemetry_prometheus::PrometheusExporter;

    pub static METRICS: Lazy<LifeguardMetrics> = Lazy::new(LifeguardMetrics::init);

    pub struct LifeguardMetrics {
        /// `None` if the Prometheus exporter could not be registered
        pub exporter: Option<PrometheusExporter>,
        pub queries_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub query_errors_total: Counter<u64>,
        pub transactions_total: Counter<u64>,
    }

    impl LifeguardMetrics {
        pub fn init() -> Self {
            let exporter = match opentelemetry_prometheus::exporter().build() {
                Ok(exporter) => Some(exporter),
                Err(e) => {
                    log::warn!("Failed to build prometheus exporter: {}", e);
                    None
                }
            };
            let meter = global::meter("lifeguard");

            let queries_total = meter
                .u64_counter("lifeguard_queries_total")
                .with_description("Total queries executed")
                .build();

            let query_duration = meter
                .f64_histogram("lifeguard_query_duration_seconds")
                .with_description("Duration of queries")
                .build();

            let query_errors_total = meter
                .u64_counter("lifeguard_query_errors_total")
                .with_description("Total queries that failed")
                .build();

            let transactions_total = meter
                .u64_counter("lifeguard_transactions_total")
                .with_description("Transactions closed, by outcome")
                .build();

            Self {
                exporter,
                queries_total,
                query_duration,
                query_errors_total,
                transactions_total,
            }
        }

        pub fn record_query(&self, elapsed: std::time::Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        /// `outcome` is `"commit"` or `"rollback"`
        pub fn record_transaction(&self, outcome: &'static str) {
            self.transactions_total
                .add(1, &[KeyValue::new("outcome", outcome)]);
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    pub fn execute_query_span(sql: &str) -> Span {
        tracing::info_span!("lifeguard.query", db.statement = %sql)
    }

    pub fn acquire_connection_span() -> Span {
        tracing::info_span!("lifeguard.connect")
    }

    pub fn begin_transaction_span() -> Span {
        tracing::info_span!("lifeguard.transaction.begin")
    }

    pub fn commit_transaction_span() -> Span {
        tracing::info_span!("lifeguard.transaction.commit")
    }

    pub fn rollback_transaction_span() -> Span {
        tracing::info_span!("lifeguard.transaction.rollback")
    }
}
